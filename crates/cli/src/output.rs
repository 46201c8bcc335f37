// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use bt_core::tracking::should_continue_stage_polling;
use bt_core::{HistoricalBuild, Stage, StageResult, TrackedBuild, TrackerConfig};
use chrono::{DateTime, Local, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    if let Ok(json) = serde_json::to_string_pretty(value) {
        println!("{}", json);
    }
}

/// Print a list of items, with `header` above text output
pub fn print_list<T: Serialize + fmt::Display>(
    items: &[T],
    header: &str,
    empty: &str,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Text if items.is_empty() => println!("{}", empty),
        OutputFormat::Text => {
            println!("{}", header);
            for item in items {
                println!("{}", item);
            }
        }
        OutputFormat::Json => print_json(items),
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Short per-stage summary, e.g. `S1:completed NB:inProgress S3:- MTA:-`
fn stage_summary(build: &TrackedBuild) -> String {
    Stage::ALL
        .iter()
        .map(|stage| {
            let short = match stage {
                Stage::Stage1 => "S1",
                Stage::Stage2Nb => "NB",
                Stage::Stage3 => "S3",
                Stage::Stage2Mta => "MTA",
            };
            format!("{}:{}", short, stage_state(build.stages.get(*stage)))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn stage_state(result: Option<&StageResult>) -> &str {
    match result {
        Some(r) => r
            .result
            .as_deref()
            .or(r.status.as_deref())
            .unwrap_or(if r.completed_at.is_some() { "completed" } else { "-" }),
        None => "-",
    }
}

pub const STATUS_HEADER: &str = "BUILD      STATUS                  STAGE       STARTED           STAGES";

/// One row of `bt status`
#[derive(Debug, Serialize)]
pub struct StatusEntry {
    #[serde(flatten)]
    pub build: TrackedBuild,
    /// Later-stage polling has outlived its budget (display only)
    pub overdue: bool,
}

impl StatusEntry {
    pub fn new(build: TrackedBuild, tracker: &TrackerConfig, now: DateTime<Utc>) -> Self {
        let later_stage = matches!(
            build.status.polled_stage(),
            Some(Stage::Stage2Nb | Stage::Stage3 | Stage::Stage2Mta)
        );
        let overdue = later_stage && !should_continue_stage_polling(&build, tracker, now);
        Self { build, overdue }
    }
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:<23} {:<11} {:<17} {}",
            self.build.build_number,
            self.build.status.as_str(),
            self.build.current_stage.as_str(),
            local_time(self.build.started_at),
            stage_summary(&self.build),
        )?;
        if self.overdue {
            write!(f, "  (overdue)")?;
        }
        Ok(())
    }
}

/// Full detail of one tracked build for `bt show`
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct BuildDetail(pub StatusEntry);

impl fmt::Display for BuildDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let build = &self.0.build;
        writeln!(f, "Build: {}", build.build_number)?;
        writeln!(f, "  Status: {}", build.status)?;
        writeln!(f, "  Stage: {}", build.current_stage.as_str())?;
        writeln!(f, "  Started: {}", local_time(build.started_at))?;
        if let Some(since) = build.polling_started_at {
            writeln!(f, "  Polling since: {}", local_time(since))?;
        }
        if self.0.overdue {
            writeln!(f, "  Overdue: yes")?;
        }
        for stage in Stage::ALL {
            write!(f, "  {}: ", stage)?;
            match build.stages.get(stage) {
                None => write!(f, "-")?,
                Some(r) => {
                    write!(f, "{}", stage_state(Some(r)))?;
                    if let Some(at) = r.completed_at {
                        write!(f, " at {}", local_time(at))?;
                    }
                    if let Some(url) = &r.url {
                        write!(f, " ({})", url)?;
                    }
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub const HISTORY_HEADER: &str = "BUILD      RESULT      STARTED           FINISHED";

/// One row of `bt history`
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct HistoryEntry(pub HistoricalBuild);

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:<11} {:<17} {}",
            self.0.build.build_number,
            self.0.build.status.as_str(),
            local_time(self.0.build.started_at),
            local_time(self.0.completed_at),
        )
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
