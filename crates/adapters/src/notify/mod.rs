// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification adapters

mod desktop;
mod noop;

pub use desktop::DesktopNotifyAdapter;
pub use noop::NoOpNotifyAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifyAdapter;

use async_trait::async_trait;
use bt_core::Notification;
use thiserror::Error;

/// Errors from notification delivery
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification failed: {0}")]
    Failed(String),
    #[error("{program} exited with error: {stderr}")]
    Command { program: &'static str, stderr: String },
}

/// Adapter trait for notification delivery
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    /// Show a notification; a repeat of a recently delivered id may be suppressed
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}
