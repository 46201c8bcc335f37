// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed timer identifiers
//!
//! Timers are registered with the scheduler under a string name of the form
//! `{kind}-{sanitized build number}`. The name is parsed back into a
//! [`TimerId`] once, when the timer fires, so handlers dispatch on the kind
//! rather than on string prefixes.

use crate::build::TrackingStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Which handler a timer wakes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerKind {
    /// Repeating Stage 1 poll
    CheckStage1,
    /// One-shot end of the delay before Stage 2 - NB polling
    StartPolling,
    /// Repeating poll shared by Stage 2 - NB and Stage 3
    PollStages,
    /// One-shot end of the delay before Stage 2 - MTA polling
    WaitMta,
    /// Repeating Stage 2 - MTA poll
    PollMta,
}

impl TimerKind {
    pub const ALL: [TimerKind; 5] = [
        TimerKind::CheckStage1,
        TimerKind::StartPolling,
        TimerKind::PollStages,
        TimerKind::WaitMta,
        TimerKind::PollMta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerKind::CheckStage1 => "check-stage1",
            TimerKind::StartPolling => "start-polling",
            TimerKind::PollStages => "poll-stages",
            TimerKind::WaitMta => "wait-mta",
            TimerKind::PollMta => "poll-mta",
        }
    }

    /// Whether a wake of this kind is meaningful for a build in `status`
    pub fn serves(&self, status: TrackingStatus) -> bool {
        match self {
            TimerKind::CheckStage1 => status == TrackingStatus::MonitoringStage1,
            TimerKind::StartPolling => status == TrackingStatus::WaitingStage2Nb,
            TimerKind::PollStages => matches!(
                status,
                TrackingStatus::MonitoringStage2Nb | TrackingStatus::MonitoringStage3
            ),
            TimerKind::WaitMta => status == TrackingStatus::WaitingStage2Mta,
            TimerKind::PollMta => status == TrackingStatus::MonitoringStage2Mta,
        }
    }

    /// The timer kind that should be armed while a build is in `status`
    pub fn for_status(status: TrackingStatus) -> Option<TimerKind> {
        match status {
            TrackingStatus::MonitoringStage1 => Some(TimerKind::CheckStage1),
            TrackingStatus::WaitingStage2Nb => Some(TimerKind::StartPolling),
            TrackingStatus::MonitoringStage2Nb | TrackingStatus::MonitoringStage3 => {
                Some(TimerKind::PollStages)
            }
            TrackingStatus::WaitingStage2Mta => Some(TimerKind::WaitMta),
            TrackingStatus::MonitoringStage2Mta => Some(TimerKind::PollMta),
            TrackingStatus::Completed | TrackingStatus::Failed | TrackingStatus::Timeout => None,
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drop every character outside `[A-Za-z0-9-]`
pub fn sanitize_build_number(build_number: &str) -> String {
    build_number
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// A timer for one kind of wake on one build
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimerId {
    pub kind: TimerKind,
    pub build_number: String,
}

impl TimerId {
    pub fn new(kind: TimerKind, build_number: impl Into<String>) -> Self {
        Self {
            kind,
            build_number: build_number.into(),
        }
    }

    /// All five timer ids a build could own
    pub fn all_for(build_number: &str) -> Vec<TimerId> {
        TimerKind::ALL
            .iter()
            .map(|kind| TimerId::new(*kind, build_number))
            .collect()
    }

    /// Scheduler name for this timer
    pub fn name(&self) -> String {
        format!(
            "{}-{}",
            self.kind.as_str(),
            sanitize_build_number(&self.build_number)
        )
    }

    /// Parse a scheduler name back into a timer id.
    ///
    /// The build number recovered is the sanitized form, which equals the
    /// original for digit-only build numbers.
    pub fn parse(name: &str) -> Option<TimerId> {
        TimerKind::ALL.iter().find_map(|kind| {
            let rest = name.strip_prefix(kind.as_str())?.strip_prefix('-')?;
            if rest.is_empty() {
                return None;
            }
            Some(TimerId::new(*kind, rest))
        })
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// When a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSchedule {
    /// Fire once after the delay
    Once(Duration),
    /// Fire every interval, first fire one interval from now
    Every(Duration),
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
