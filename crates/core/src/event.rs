// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events that drive the tracker

use serde::{Deserialize, Serialize};

/// User commands accepted by the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Begin tracking a build from Stage 1
    StartTracking { build_number: String },

    /// Stop tracking everything, without writing history
    ClearAll,
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A named timer fired
    Timer { id: String },

    /// A user command was dequeued
    Command(Command),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Timer { .. } => "timer",
            Event::Command(Command::StartTracking { .. }) => "command:start_tracking",
            Event::Command(Command::ClearAll) => "command:clear_all",
        }
    }
}
