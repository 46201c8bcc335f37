// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op notifier for when notifications are disabled.

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use bt_core::Notification;

/// Notify adapter that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNotifyAdapter;

impl NoOpNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for NoOpNotifyAdapter {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        tracing::debug!(id = %notification.id, "notifications disabled, dropping");
        Ok(())
    }
}
