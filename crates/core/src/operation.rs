// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations applied to the persisted tracker state

use crate::build::TrackedBuild;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// History entries older than this are purged
pub const HISTORY_RETENTION_DAYS: i64 = 30;

/// A single mutation of the store, applied and flushed atomically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Insert or replace an in-flight record
    UpsertTracked(TrackedBuild),

    /// Delete an in-flight record without writing history
    RemoveTracked { build_number: String },

    /// Append to history, prune, and remove the in-flight record
    Finalize {
        build: TrackedBuild,
        completed_at: DateTime<Utc>,
    },

    /// Drop history entries that fell outside the retention window
    PruneHistory { now: DateTime<Utc> },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::UpsertTracked(_) => "upsert_tracked",
            Operation::RemoveTracked { .. } => "remove_tracked",
            Operation::Finalize { .. } => "finalize",
            Operation::PruneHistory { .. } => "prune_history",
        }
    }

    /// Build number the operation touches, if any
    pub fn build_number(&self) -> Option<&str> {
        match self {
            Operation::UpsertTracked(build) => Some(&build.build_number),
            Operation::RemoveTracked { build_number } => Some(build_number),
            Operation::Finalize { build, .. } => Some(&build.build_number),
            Operation::PruneHistory { .. } => None,
        }
    }
}

/// Oldest `completed_at` still kept at `now`
pub fn history_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - chrono::Duration::days(HISTORY_RETENTION_DAYS)
}
