// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notifications via `osascript` on macOS and `notify-send` elsewhere

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use bt_core::Notification;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::process::Command;

/// How long a delivered id keeps suppressing repeats
pub const DEDUPE_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Ids delivered recently, with the time each was shown
#[derive(Debug)]
struct ShownLog {
    window: Duration,
    shown: HashMap<String, Instant>,
}

impl ShownLog {
    fn new(window: Duration) -> Self {
        Self {
            window,
            shown: HashMap::new(),
        }
    }

    /// True if `id` was delivered within the window; expired ids are dropped
    fn recently_shown(&mut self, id: &str, now: Instant) -> bool {
        let window = self.window;
        self.shown
            .retain(|_, at| now.saturating_duration_since(*at) < window);
        self.shown.contains_key(id)
    }

    fn record(&mut self, id: &str, now: Instant) {
        self.shown.insert(id.to_string(), now);
    }
}

/// Desktop notifier that suppresses an id delivered within [`DEDUPE_WINDOW`]
#[derive(Clone, Debug)]
pub struct DesktopNotifyAdapter {
    shown: Arc<Mutex<ShownLog>>,
}

impl Default for DesktopNotifyAdapter {
    fn default() -> Self {
        Self::with_window(DEDUPE_WINDOW)
    }
}

impl DesktopNotifyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            shown: Arc::new(Mutex::new(ShownLog::new(window))),
        }
    }

    fn recently_shown(&self, id: &str) -> bool {
        self.shown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .recently_shown(id, Instant::now())
    }

    fn record_shown(&self, id: &str) {
        self.shown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record(id, Instant::now());
    }

    /// Run the command and record the id only once it succeeds
    async fn deliver(
        &self,
        id: &str,
        program: &'static str,
        mut cmd: Command,
    ) -> Result<(), NotifyError> {
        if self.recently_shown(id) {
            tracing::debug!(id, "already shown, suppressing");
            return Ok(());
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| NotifyError::Failed(format!("{program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NotifyError::Command {
                program,
                stderr: stderr.trim().to_string(),
            });
        }

        self.record_shown(id);
        Ok(())
    }

    fn command(notification: &Notification) -> (&'static str, Command) {
        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("osascript");
            cmd.arg("-e").arg(build_script(notification));
            ("osascript", cmd)
        } else {
            let mut cmd = Command::new("notify-send");
            cmd.arg("--app-name=bt")
                .arg(&notification.title)
                .arg(&notification.message);
            ("notify-send", cmd)
        }
    }
}

fn build_script(notification: &Notification) -> String {
    format!(
        r#"display notification "{}" with title "{}""#,
        escape_applescript(&notification.message),
        escape_applescript(&notification.title),
    )
}

/// Escape special characters for AppleScript strings
fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait]
impl NotifyAdapter for DesktopNotifyAdapter {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let (program, cmd) = Self::command(&notification);
        self.deliver(&notification.id, program, cmd).await
    }
}

#[cfg(test)]
#[path = "desktop_tests.rs"]
mod tests;
