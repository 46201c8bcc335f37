// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracked build records
//!
//! A [`TrackedBuild`] is the persisted state of one build number moving
//! through the four stages. Its [`TrackingStatus`] decides which timer is
//! armed; [`CurrentStage`] is a coarser phase used only for display.

use crate::snapshot::BuildSnapshot;
use crate::stage::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of digits in a trackable build number
pub const MIN_BUILD_NUMBER_LEN: usize = 4;

/// Check that a build number is a digit string of at least four characters
pub fn validate_build_number(build_number: &str) -> bool {
    build_number.len() >= MIN_BUILD_NUMBER_LEN && build_number.bytes().all(|b| b.is_ascii_digit())
}

/// Tracking status of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    MonitoringStage1,
    WaitingStage2Nb,
    MonitoringStage2Nb,
    MonitoringStage3,
    WaitingStage2Mta,
    MonitoringStage2Mta,
    Completed,
    Failed,
    Timeout,
}

impl TrackingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TrackingStatus::Completed | TrackingStatus::Failed | TrackingStatus::Timeout
        )
    }

    /// The stage polled while in this status, if any
    pub fn polled_stage(&self) -> Option<Stage> {
        match self {
            TrackingStatus::MonitoringStage1 => Some(Stage::Stage1),
            TrackingStatus::MonitoringStage2Nb => Some(Stage::Stage2Nb),
            TrackingStatus::MonitoringStage3 => Some(Stage::Stage3),
            TrackingStatus::MonitoringStage2Mta => Some(Stage::Stage2Mta),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingStatus::MonitoringStage1 => "monitoring_stage1",
            TrackingStatus::WaitingStage2Nb => "waiting_stage2_nb",
            TrackingStatus::MonitoringStage2Nb => "monitoring_stage2_nb",
            TrackingStatus::MonitoringStage3 => "monitoring_stage3",
            TrackingStatus::WaitingStage2Mta => "waiting_stage2_mta",
            TrackingStatus::MonitoringStage2Mta => "monitoring_stage2_mta",
            TrackingStatus::Completed => "completed",
            TrackingStatus::Failed => "failed",
            TrackingStatus::Timeout => "timeout",
        }
    }
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-only phase indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentStage {
    Stage1,
    Stage2Nb,
    Stage3,
    Stage2Mta,
    Done,
}

impl CurrentStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrentStage::Stage1 => "stage1",
            CurrentStage::Stage2Nb => "stage2_nb",
            CurrentStage::Stage3 => "stage3",
            CurrentStage::Stage2Mta => "stage2_mta",
            CurrentStage::Done => "done",
        }
    }
}

impl fmt::Display for CurrentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What was last seen of one stage's external build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

impl StageResult {
    pub fn from_snapshot(snapshot: &BuildSnapshot) -> Self {
        Self {
            build_id: Some(snapshot.id),
            url: Some(snapshot.url.clone()),
            name: Some(snapshot.build_number.clone()),
            status: Some(snapshot.status.clone()),
            result: snapshot.result.clone(),
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Per-stage results, filled in as stages are reached
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage1: Option<StageResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage2_nb: Option<StageResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage3: Option<StageResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage2_mta: Option<StageResult>,
}

impl StageResults {
    pub fn get(&self, stage: Stage) -> Option<&StageResult> {
        match stage {
            Stage::Stage1 => self.stage1.as_ref(),
            Stage::Stage2Nb => self.stage2_nb.as_ref(),
            Stage::Stage3 => self.stage3.as_ref(),
            Stage::Stage2Mta => self.stage2_mta.as_ref(),
        }
    }

    fn slot_mut(&mut self, stage: Stage) -> &mut Option<StageResult> {
        match stage {
            Stage::Stage1 => &mut self.stage1,
            Stage::Stage2Nb => &mut self.stage2_nb,
            Stage::Stage3 => &mut self.stage3,
            Stage::Stage2Mta => &mut self.stage2_mta,
        }
    }

    /// Record the latest snapshot for a stage.
    ///
    /// Returns false and leaves the slot untouched once the stage has been
    /// marked completed.
    pub fn record(&mut self, stage: Stage, snapshot: &BuildSnapshot) -> bool {
        let slot = self.slot_mut(stage);
        if slot.as_ref().is_some_and(StageResult::is_completed) {
            return false;
        }
        *slot = Some(StageResult::from_snapshot(snapshot));
        true
    }

    /// Stamp a stage as completed at `at`
    pub fn complete(&mut self, stage: Stage, at: DateTime<Utc>) {
        let slot = self.slot_mut(stage);
        let result = slot.get_or_insert_with(StageResult::default);
        if result.completed_at.is_none() {
            result.completed_at = Some(at);
        }
    }
}

/// Persisted state of one build being tracked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedBuild {
    pub build_number: String,
    pub status: TrackingStatus,
    pub current_stage: CurrentStage,
    #[serde(default)]
    pub stages: StageResults,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,
    /// When polling of the current later stage began
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub polling_started_at: Option<DateTime<Utc>>,
}

impl TrackedBuild {
    /// A fresh record in `monitoring_stage1`
    pub fn new(build_number: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            build_number: build_number.into(),
            status: TrackingStatus::MonitoringStage1,
            current_stage: CurrentStage::Stage1,
            stages: StageResults::default(),
            started_at,
            polling_started_at: None,
        }
    }

    /// Start of the delay window before Stage 2 - NB polling
    pub fn stage1_completed_at(&self) -> Option<DateTime<Utc>> {
        self.stages.stage1.as_ref().and_then(|s| s.completed_at)
    }

    /// Start of the delay window before Stage 2 - MTA polling
    pub fn stage3_completed_at(&self) -> Option<DateTime<Utc>> {
        self.stages.stage3.as_ref().and_then(|s| s.completed_at)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// A tracked build that reached a terminal status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalBuild {
    #[serde(flatten)]
    pub build: TrackedBuild,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub completed_at: DateTime<Utc>,
}

impl HistoricalBuild {
    pub fn new(build: TrackedBuild, completed_at: DateTime<Utc>) -> Self {
        Self {
            build,
            completed_at,
        }
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
