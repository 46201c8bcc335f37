// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build number matching
//!
//! Build numbers in different pipelines share only their final numeric
//! segment (`20240101.86951`, `Release - NB - 86951`), so matching compares
//! trailing digit runs.

/// The run of ASCII digits at the end of `s`, if any
pub fn trailing_digits(s: &str) -> Option<&str> {
    let start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    Some(&s[start..])
}

fn matches(candidate: &str, wanted: &str, name_filter: Option<&str>) -> bool {
    if trailing_digits(candidate) != Some(wanted) {
        return false;
    }
    match name_filter {
        Some(filter) => candidate.contains(filter),
        None => true,
    }
}

/// Index of the first candidate whose build number matches `query`.
///
/// A query without trailing digits is compared whole.
pub fn find_match<'a, I>(candidates: I, query: &str, name_filter: Option<&str>) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted = trailing_digits(query).unwrap_or(query);
    candidates
        .into_iter()
        .position(|candidate| matches(candidate, wanted, name_filter))
}

#[cfg(test)]
#[path = "matching_tests.rs"]
mod tests;
