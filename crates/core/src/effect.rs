// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Side effects requested by tracker decisions

use crate::notification::Notification;
use crate::operation::Operation;
use crate::timer::{TimerId, TimerSchedule};

/// Side effects the state machine asks the executor to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Apply an operation to the store
    Persist(Operation),

    /// Register or replace a timer
    SetTimer { id: TimerId, schedule: TimerSchedule },

    /// Cancel a timer; unknown ids are ignored
    CancelTimer { id: TimerId },

    /// Show a notification
    Notify(Notification),
}

/// Trait for operations that should be traced
///
/// Provides consistent naming and structured fields for logging.
pub trait TracedEffect {
    /// Effect name for log spans (e.g., "persist", "set_timer")
    fn name(&self) -> &'static str;

    /// Key-value pairs for structured logging
    fn fields(&self) -> Vec<(&'static str, String)>;
}

impl TracedEffect for Effect {
    fn name(&self) -> &'static str {
        match self {
            Effect::Persist(_) => "persist",
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
            Effect::Notify(_) => "notify",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Persist(op) => {
                let mut fields = vec![("op", op.name().to_string())];
                if let Some(build_number) = op.build_number() {
                    fields.push(("build", build_number.to_string()));
                }
                fields
            }
            Effect::SetTimer { id, schedule } => {
                let (mode, duration) = match schedule {
                    TimerSchedule::Once(d) => ("once", d),
                    TimerSchedule::Every(d) => ("every", d),
                };
                vec![
                    ("timer", id.name()),
                    ("mode", mode.to_string()),
                    ("secs", duration.as_secs().to_string()),
                ]
            }
            Effect::CancelTimer { id } => vec![("timer", id.name())],
            Effect::Notify(n) => vec![("id", n.id.clone())],
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
