// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Point-in-time view of one external build

use serde::{Deserialize, Serialize};

/// Raw status value reported once a build has finished
pub const STATUS_COMPLETED: &str = "completed";

/// Raw result value reported for a successful build
pub const RESULT_SUCCEEDED: &str = "succeeded";

/// A build as returned by the build query service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSnapshot {
    pub id: u64,
    pub build_number: String,
    /// Pipeline definition name, when the service reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub url: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl BuildSnapshot {
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }

    pub fn succeeded(&self) -> bool {
        self.is_completed() && self.result.as_deref() == Some(RESULT_SUCCEEDED)
    }
}
