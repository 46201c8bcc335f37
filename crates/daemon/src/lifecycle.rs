// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

use std::fs::File;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use bt_adapters::{
    AzureBuildQuery, DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError,
    QueryError, TracedBuildQuery, TracedNotifyAdapter,
};
use bt_core::{
    Clock, Command, ConfigError, ConfigSource, Event, FileConfigSource, Notification, SystemClock,
};
use bt_daemon::{DaemonPaths, PathsError};
use bt_engine::{Runtime, RuntimeDeps};
use bt_storage::Store;
use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Commands waiting for the event loop
const COMMAND_QUEUE: usize = 64;

/// Interval that drives timer checks.
///
/// The deadline survives other wakes of the event loop, and a stalled loop
/// gets one catch-up tick rather than a burst.
pub fn timer_ticker(period: std::time::Duration) -> tokio::time::Interval {
    let mut tick = tokio::time::interval(period);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tick
}

/// Daemon runtime with concrete adapter types (wrapped with tracing)
pub type DaemonRuntime = Runtime<
    TracedBuildQuery<AzureBuildQuery>,
    TracedNotifyAdapter<Notifier>,
    FileConfigSource,
    SystemClock,
>;

/// Notifier picked at startup from `[notifications] enabled`
#[derive(Clone)]
pub enum Notifier {
    Desktop(DesktopNotifyAdapter),
    Disabled(NoOpNotifyAdapter),
}

#[async_trait]
impl NotifyAdapter for Notifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        match self {
            Notifier::Desktop(n) => n.notify(notification).await,
            Notifier::Disabled(n) => n.notify(notification).await,
        }
    }
}

/// Daemon state during operation
pub struct DaemonState {
    pub paths: DaemonPaths,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Unix socket listener
    pub listener: UnixListener,
    /// Runtime for event processing
    pub runtime: DaemonRuntime,
    /// Commands accepted over IPC, processed by the event loop
    pub commands: mpsc::Receiver<Command>,
    command_tx: mpsc::Sender<Command>,
    /// When daemon started
    pub start_time: Instant,
    /// Shutdown requested flag
    pub shutdown_requested: bool,
}

impl DaemonState {
    /// Queue a command without waiting for it to run
    pub fn enqueue(&self, command: Command) -> Result<(), LifecycleError> {
        self.command_tx
            .try_send(command)
            .map_err(|_| LifecycleError::QueueFull)
    }

    /// Run one queued command to completion
    pub async fn process_command(&self, command: Command) -> Result<(), LifecycleError> {
        self.runtime
            .handle_event(Event::Command(command))
            .await
            .map_err(|e| LifecycleError::Runtime(e.to_string()))
    }

    /// Dispatch every timer that is due
    pub async fn fire_timers(&self) {
        self.runtime.fire_due().await;
    }

    /// Shutdown the daemon gracefully
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        for path in [
            &self.paths.socket_path,
            &self.paths.lock_path,
            &self.paths.version_path,
        ] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove file");
                }
            }
        }

        // Lock is released when self.lock_file is dropped
        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Paths(#[from] PathsError),

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(std::path::PathBuf, std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] bt_storage::StorageError),

    #[error("Build query client error: {0}")]
    Query(#[from] QueryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command queue is full, try again")]
    QueueFull,

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Start the daemon
pub async fn startup(paths: &DaemonPaths) -> Result<DaemonState, LifecycleError> {
    match startup_inner(paths).await {
        Ok(state) => Ok(state),
        Err(e) => {
            // A held lock belongs to the running daemon; leave its files alone
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(paths);
            }
            Err(e)
        }
    }
}

async fn startup_inner(paths: &DaemonPaths) -> Result<DaemonState, LifecycleError> {
    // 1. Create directories
    std::fs::create_dir_all(&paths.state_dir)?;
    if let Some(parent) = paths.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // 2. Acquire lock file FIRST - prevents races
    let mut lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&paths.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    {
        use std::io::Write;
        writeln!(lock_file, "{}", std::process::id())?;
    }

    std::fs::write(&paths.version_path, env!("CARGO_PKG_VERSION"))?;

    // 3. Config source; re-read on every wake
    let config = FileConfigSource::from_env()?;
    let settings = match config.load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "config unreadable, using defaults until fixed");
            Default::default()
        }
    };
    info!(config = %config.path().display(), "using config");

    // 4. Load state (prunes expired history)
    let clock = SystemClock;
    let store = Store::open(&paths.state_path, clock.now())?;
    info!(
        tracked = store.state().tracked_builds.len(),
        history = store.state().build_history.len(),
        "loaded state"
    );

    // 5. Adapters (wrapped with tracing for observability)
    let query = TracedBuildQuery::new(AzureBuildQuery::new()?);
    let notifier = if settings.notifications.enabled {
        Notifier::Desktop(DesktopNotifyAdapter::new())
    } else {
        info!("notifications disabled");
        Notifier::Disabled(NoOpNotifyAdapter::new())
    };

    let runtime = Runtime::new(
        RuntimeDeps {
            query,
            notify: TracedNotifyAdapter::new(notifier),
            config,
            store: Arc::new(Mutex::new(store)),
        },
        clock,
    );

    // 6. Re-arm timers for in-flight builds before accepting commands
    runtime
        .reconcile()
        .await
        .map_err(|e| LifecycleError::Runtime(e.to_string()))?;

    // 7. Remove stale socket and bind (LAST - only after all validation passes)
    if paths.socket_path.exists() {
        std::fs::remove_file(&paths.socket_path)?;
    }
    let listener = UnixListener::bind(&paths.socket_path)
        .map_err(|e| LifecycleError::BindFailed(paths.socket_path.clone(), e))?;

    let (command_tx, commands) = mpsc::channel(COMMAND_QUEUE);

    Ok(DaemonState {
        paths: paths.clone(),
        lock_file,
        listener,
        runtime,
        commands,
        command_tx,
        start_time: Instant::now(),
        shutdown_requested: false,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(paths: &DaemonPaths) {
    for path in [&paths.socket_path, &paths.version_path, &paths.lock_path] {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
