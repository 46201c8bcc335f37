// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands

use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};

use bt_core::{HistoricalBuild, TrackedBuild};
use bt_daemon::protocol::{self, ProtocolError};
use bt_daemon::{read_startup_error, DaemonPaths, Query, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for IPC requests
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("BT_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for daemon to start
pub fn timeout_connect() -> Duration {
    parse_duration_ms("BT_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for process to exit
pub fn timeout_exit() -> Duration {
    parse_duration_ms("BT_TIMEOUT_EXIT_MS").unwrap_or(Duration::from_secs(2))
}

/// Polling interval for retries
pub fn poll_interval() -> Duration {
    parse_duration_ms("BT_POLL_INTERVAL_MS").unwrap_or(Duration::from_millis(50))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("Connection timeout waiting for daemon to start")]
    DaemonStartTimeout,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Daemon status as reported over IPC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonStatus {
    pub uptime_secs: u64,
    pub tracked: usize,
    pub timers_armed: usize,
}

/// Daemon client
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect to daemon, auto-starting if not running
    pub async fn connect_or_start(paths: &DaemonPaths) -> Result<Self, ClientError> {
        // Restart a daemon left over from a different version
        if let Ok(daemon_version) = std::fs::read_to_string(&paths.version_path) {
            let cli_version = env!("CARGO_PKG_VERSION");
            if daemon_version.trim() != cli_version {
                tracing::info!(
                    daemon = daemon_version.trim(),
                    cli = cli_version,
                    "daemon version differs, restarting"
                );
                let _ = daemon_stop(paths).await;
            }
        }

        match Self::connect(paths) {
            Ok(client) => Ok(client),
            Err(ClientError::DaemonNotRunning) => {
                let child = start_daemon_background()?;
                Self::connect_with_retry(paths, timeout_connect(), child).await
            }
            Err(e) => Err(wrap_with_startup_error(e, paths)),
        }
    }

    /// Connect to existing daemon (no auto-start)
    pub fn connect(paths: &DaemonPaths) -> Result<Self, ClientError> {
        if !paths.socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }

        Ok(Self {
            socket_path: paths.socket_path.clone(),
        })
    }

    async fn connect_with_retry(
        paths: &DaemonPaths,
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            // Daemon exited early: startup failed
            if let Ok(Some(status)) = child.try_wait() {
                let poll_start = Instant::now();
                while poll_start.elapsed() < timeout_exit() {
                    if let Some(err) = read_startup_error(&paths.log_path) {
                        return Err(ClientError::DaemonStartFailed(err));
                    }
                    tokio::time::sleep(poll_interval()).await;
                }
                return Err(ClientError::DaemonStartFailed(format!(
                    "exited with {}",
                    status
                )));
            }

            match Self::connect(paths) {
                Ok(client) => return Ok(client),
                Err(ClientError::DaemonNotRunning) => {
                    tokio::time::sleep(poll_interval()).await;
                }
                Err(e) => return Err(wrap_with_startup_error(e, paths)),
            }
        }

        Err(wrap_with_startup_error(
            ClientError::DaemonStartTimeout,
            paths,
        ))
    }

    /// Send a request and receive a response with specific timeouts
    async fn send_with_timeout(
        &self,
        request: Request,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        let data = protocol::encode(&request)?;
        tokio::time::timeout(write_timeout, protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let response_bytes =
            tokio::time::timeout(read_timeout, protocol::read_message(&mut reader))
                .await
                .map_err(|_| ProtocolError::Timeout)??;

        Ok(protocol::decode(&response_bytes)?)
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        self.send_with_timeout(request, timeout_ipc(), timeout_ipc())
            .await
    }

    /// Queue manual tracking of a build
    pub async fn start_tracking(&self, build_number: &str) -> Result<(), ClientError> {
        let request = Request::StartTracking {
            build_number: build_number.to_string(),
        };
        match self.send(request).await? {
            Response::Accepted => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Queue clearing of every tracked build
    pub async fn clear_all(&self) -> Result<(), ClientError> {
        match self.send(Request::ClearAll).await? {
            Response::Accepted => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn list_tracked(&self) -> Result<Vec<TrackedBuild>, ClientError> {
        match self
            .send(Request::Query {
                query: Query::ListTracked,
            })
            .await?
        {
            Response::Tracked { builds } => Ok(builds),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn get_tracked(
        &self,
        build_number: &str,
    ) -> Result<Option<TrackedBuild>, ClientError> {
        match self
            .send(Request::Query {
                query: Query::GetTracked {
                    build_number: build_number.to_string(),
                },
            })
            .await?
        {
            Response::Build { build } => Ok(build.map(|b| *b)),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Finished builds, newest first
    pub async fn history(&self) -> Result<Vec<HistoricalBuild>, ClientError> {
        match self
            .send(Request::Query {
                query: Query::History,
            })
            .await?
        {
            Response::History { builds } => Ok(builds),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn status(&self) -> Result<DaemonStatus, ClientError> {
        match self.send(Request::Status).await? {
            Response::Status {
                uptime_secs,
                tracked,
                timers_armed,
            } => Ok(DaemonStatus {
                uptime_secs,
                tracked,
                timers_armed,
            }),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Get daemon version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        match self
            .send(Request::Hello {
                version: env!("CARGO_PKG_VERSION").to_string(),
            })
            .await?
        {
            Response::Hello { version } => Ok(version),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

/// Start the daemon in the background, returning the child process handle
fn start_daemon_background() -> Result<std::process::Child, ClientError> {
    let btd_path = find_btd_binary();

    Command::new(&btd_path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(format!("{}: {}", btd_path.display(), e)))
}

/// Stop the daemon (graceful first, then forceful).
///
/// Returns false if it wasn't running.
pub async fn daemon_stop(paths: &DaemonPaths) -> Result<bool, ClientError> {
    let client = match DaemonClient::connect(paths) {
        Ok(c) => c,
        Err(ClientError::DaemonNotRunning) => {
            cleanup_stale_pid(paths);
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let shutdown_result = client.shutdown().await;

    if let Some(pid) = read_daemon_pid(paths) {
        if shutdown_result.is_ok() {
            wait_for_exit(pid, timeout_exit()).await;
        }

        if process_exists(pid) {
            force_kill_daemon(pid);
            wait_for_exit(pid, timeout_exit()).await;
        }
    }

    cleanup_stale_pid(paths);
    if paths.socket_path.exists() {
        let _ = std::fs::remove_file(&paths.socket_path);
    }

    Ok(true)
}

/// Wait for a process to exit
async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return true;
        }
        tokio::time::sleep(poll_interval()).await;
    }
    false
}

/// Find the btd binary
fn find_btd_binary() -> PathBuf {
    // Explicit override (used by tests to ensure correct binary)
    if let Ok(path) = std::env::var("BT_DAEMON_BINARY") {
        return PathBuf::from(path);
    }

    // Check current executable's directory
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("btd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    // Fall back to PATH lookup
    PathBuf::from("btd")
}

/// Remove an orphaned PID file.
///
/// Only called from `daemon_stop`; `connect` must never touch it, since the
/// daemon may still be starting up.
fn cleanup_stale_pid(paths: &DaemonPaths) {
    if paths.lock_path.exists() {
        let _ = std::fs::remove_file(&paths.lock_path);
    }
}

/// Get the PID from the daemon PID file, if it exists
pub fn read_daemon_pid(paths: &DaemonPaths) -> Option<u32> {
    std::fs::read_to_string(&paths.lock_path)
        .ok()
        .and_then(|content| content.trim().parse::<u32>().ok())
}

/// Check if a process with the given PID exists
pub fn process_exists(pid: u32) -> bool {
    // kill -0 checks existence without sending a signal
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Force kill a daemon process
pub fn force_kill_daemon(pid: u32) -> bool {
    Command::new("kill")
        .args(["-9", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Prefer the error the daemon logged at startup, if any
fn wrap_with_startup_error(err: ClientError, paths: &DaemonPaths) -> ClientError {
    if matches!(err, ClientError::DaemonStartFailed(_)) {
        return err;
    }

    match read_startup_error(&paths.log_path) {
        Some(startup_error) => ClientError::DaemonStartFailed(startup_error),
        None => err,
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
