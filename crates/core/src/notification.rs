// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing notifications
//!
//! Each notification carries a stable id, `{kind}-{build number}`, so the
//! notifier can suppress a second delivery of the same event.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    Stage1Complete,
    #[serde(rename = "stage2nb-complete")]
    Stage2NbComplete,
    Stage3Complete,
    AllComplete,
    Timeout,
    ConfigMissing,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Stage1Complete => "stage1-complete",
            NotificationKind::Stage2NbComplete => "stage2nb-complete",
            NotificationKind::Stage3Complete => "stage3-complete",
            NotificationKind::AllComplete => "all-complete",
            NotificationKind::Timeout => "timeout",
            NotificationKind::ConfigMissing => "config-missing",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A desktop notification about one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        build_number: &str,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("{}-{}", kind.as_str(), build_number),
            kind,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn stage1_complete(build_number: &str, delay_minutes: u32) -> Self {
        Self::new(
            NotificationKind::Stage1Complete,
            build_number,
            "Stage 1 Complete",
            format!(
                "Build {build_number} Stage 1 completed. Will start monitoring Stage 2 - NB in {delay_minutes} minutes."
            ),
        )
    }

    pub fn stage2_nb_complete(build_number: &str) -> Self {
        Self::new(
            NotificationKind::Stage2NbComplete,
            build_number,
            "Stage 2 - NB Complete",
            format!("Build {build_number} Stage 2 - NB succeeded. Now monitoring Stage 3."),
        )
    }

    pub fn stage3_complete(build_number: &str, delay_minutes: u32) -> Self {
        Self::new(
            NotificationKind::Stage3Complete,
            build_number,
            "Stage 3 Complete",
            format!(
                "Build {build_number} Stage 3 succeeded. Will start monitoring Stage 2 - MTA in {delay_minutes} minutes."
            ),
        )
    }

    pub fn all_complete(build_number: &str) -> Self {
        Self::new(
            NotificationKind::AllComplete,
            build_number,
            "All Stages Complete",
            format!("Build {build_number} completed every stage."),
        )
    }

    pub fn timeout(build_number: &str, minutes: i64) -> Self {
        Self::new(
            NotificationKind::Timeout,
            build_number,
            "Tracking Timed Out",
            format!("Build {build_number} Stage 1 did not complete within {minutes} minutes."),
        )
    }

    pub fn config_missing(build_number: &str) -> Self {
        Self::new(
            NotificationKind::ConfigMissing,
            build_number,
            "Configuration Missing",
            format!(
                "Cannot track build {build_number}: set the organization URL, project, access token and pipeline ids first."
            ),
        )
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
