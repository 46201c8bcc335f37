// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized tracker state

use bt_core::{history_cutoff, HistoricalBuild, Operation, TrackedBuild};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// In-flight builds and finished history, as persisted in `state.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializedState {
    #[serde(default)]
    pub tracked_builds: BTreeMap<String, TrackedBuild>,
    #[serde(default)]
    pub build_history: Vec<HistoricalBuild>,
}

impl MaterializedState {
    pub fn get(&self, build_number: &str) -> Option<&TrackedBuild> {
        self.tracked_builds.get(build_number)
    }

    /// History, most recently completed first
    pub fn history_newest_first(&self) -> Vec<HistoricalBuild> {
        let mut history = self.build_history.clone();
        history.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        history
    }

    /// Drop history entries outside the retention window.
    ///
    /// Returns the number of entries removed.
    pub fn prune_history(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = history_cutoff(now);
        let before = self.build_history.len();
        self.build_history.retain(|h| h.completed_at > cutoff);
        before - self.build_history.len()
    }

    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::UpsertTracked(build) => {
                self.tracked_builds
                    .insert(build.build_number.clone(), build.clone());
            }

            Operation::RemoveTracked { build_number } => {
                self.tracked_builds.remove(build_number);
            }

            Operation::Finalize {
                build,
                completed_at,
            } => {
                self.build_history
                    .push(HistoricalBuild::new(build.clone(), *completed_at));
                self.prune_history(*completed_at);
                self.tracked_builds.remove(&build.build_number);
            }

            Operation::PruneHistory { now } => {
                self.prune_history(*now);
            }
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
