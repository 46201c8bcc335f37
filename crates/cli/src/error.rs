// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.

use std::fmt;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct BtError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
}

impl BtError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

impl fmt::Display for BtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for BtError {}

/// Common error builders
impl BtError {
    pub fn invalid_build_number(build_number: &str) -> Self {
        BtError::new(format!("Invalid build number '{}'", build_number))
            .with_context("Build numbers are at least 4 digits, e.g. 86951")
    }

    pub fn build_not_tracked(build_number: &str) -> Self {
        BtError::new(format!("Build {} is not being tracked", build_number))
            .with_context("It may have finished or been cleared")
            .with_suggestion("Check finished builds: bt history")
            .with_suggestion(format!("Start tracking: bt track {}", build_number))
    }

    pub fn connection_incomplete() -> Self {
        BtError::new("Azure DevOps connection is not configured")
            .with_context("Organization URL, project, access token and pipeline ids are required")
            .with_suggestion("bt config set azure.org_url https://dev.azure.com/<org>")
            .with_suggestion("bt config set azure.project <project>")
            .with_suggestion("bt config set azure.pat <token>  (or export BT_AZURE_PAT)")
            .with_suggestion("bt config set azure.pipelines.stage1 <id>  (also stage2, stage3)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_lists_context_and_suggestions() {
        let err = BtError::new("Something went wrong")
            .with_context("First context")
            .with_suggestion("Try this")
            .with_suggestion("Or this");

        let output = err.to_string();
        assert!(output.starts_with("Something went wrong"));
        assert!(output.contains("-> First context"));
        assert!(output.contains("1. Try this"));
        assert!(output.contains("2. Or this"));
    }

    #[test]
    fn build_not_tracked_suggests_history() {
        let output = BtError::build_not_tracked("86951").to_string();
        assert!(output.contains("Build 86951 is not being tracked"));
        assert!(output.contains("bt history"));
        assert!(output.contains("bt track 86951"));
    }
}
