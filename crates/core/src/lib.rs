// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bt-core: Core library for the bt build tracker
//!
//! This crate provides:
//! - Tracked build records and their status enumeration
//! - Pure stage-tracking decisions that produce effects
//! - Typed timer identifiers and their string encoding
//! - Tracker and connection configuration
//! - A clock abstraction for testable wall-clock time

pub mod build;
pub mod clock;
pub mod config;
pub mod effect;
pub mod event;
pub mod notification;
pub mod operation;
pub mod snapshot;
pub mod stage;
pub mod timer;
pub mod tracking;

pub use build::{
    validate_build_number, CurrentStage, HistoricalBuild, StageResult, StageResults,
    TrackedBuild, TrackingStatus,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{
    config_path, AzureSettings, ConfigError, ConfigSource, Connection, FileConfigSource,
    NotificationSettings, PipelineIds, Settings, StaticConfigSource, TrackerConfig,
};
pub use effect::{Effect, TracedEffect};
pub use event::{Command, Event};
pub use notification::{Notification, NotificationKind};
pub use operation::{history_cutoff, Operation, HISTORY_RETENTION_DAYS};
pub use snapshot::BuildSnapshot;
pub use stage::Stage;
pub use timer::{sanitize_build_number, TimerId, TimerKind, TimerSchedule};
pub use tracking::StartError;
