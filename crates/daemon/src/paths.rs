// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where the daemon keeps its socket, lock, log and state files

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides the socket directory (tests use short temp paths)
pub const SOCKET_DIR_ENV: &str = "BT_SOCKET_DIR";

/// Daemon log file name inside the state directory
pub const LOG_FILE: &str = "daemon.log";

/// Startup marker prefix written to the log before anything else.
/// Full format: "--- btd: starting (pid: 12345)"
pub const STARTUP_MARKER_PREFIX: &str = "--- btd: starting (pid: ";

#[derive(Debug, Error)]
pub enum PathsError {
    #[error("could not determine state directory")]
    NoStateDir,
}

/// Resolved daemon file layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonPaths {
    pub state_dir: PathBuf,
    /// Unix socket
    pub socket_path: PathBuf,
    /// Lock file holding the daemon PID
    pub lock_path: PathBuf,
    pub version_path: PathBuf,
    pub log_path: PathBuf,
    /// Persisted tracker state
    pub state_path: PathBuf,
}

impl DaemonPaths {
    /// Layout under explicit state and socket directories
    pub fn in_dirs(state_dir: &Path, socket_dir: &Path) -> Self {
        Self {
            state_dir: state_dir.to_path_buf(),
            socket_path: socket_dir.join("btd.sock"),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join(LOG_FILE),
            state_path: state_dir.join(bt_storage::STATE_FILE),
        }
    }

    /// Layout from `$XDG_STATE_HOME` and `$BT_SOCKET_DIR`
    pub fn from_env() -> Result<Self, PathsError> {
        Ok(Self::in_dirs(&state_dir()?, &socket_dir()))
    }
}

/// State directory: `$XDG_STATE_HOME/bt`, else `~/.local/state/bt`
fn state_dir() -> Result<PathBuf, PathsError> {
    if let Some(xdg) = std::env::var_os("XDG_STATE_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg).join("bt"));
    }
    let home = dirs::home_dir().ok_or(PathsError::NoStateDir)?;
    Ok(home.join(".local/state/bt"))
}

/// Socket directory.
///
/// Uses /tmp/bt by default to keep paths short (macOS SUN_LEN = 104).
fn socket_dir() -> PathBuf {
    match std::env::var_os(SOCKET_DIR_ENV).filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from("/tmp/bt"),
    }
}

/// Errors logged since the most recent startup marker, if any
pub fn read_startup_error(log_path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(log_path).ok()?;
    let start = content.rfind(STARTUP_MARKER_PREFIX)?;

    let errors: Vec<String> = content[start..]
        .lines()
        .filter(|line| line.contains(" ERROR ") || line.contains("Failed to start"))
        .map(|line| match line.split_once(": ") {
            Some((_, msg)) => msg.to_string(),
            None => line.to_string(),
        })
        .collect();

    if errors.is_empty() {
        None
    } else {
        Some(errors.join("\n"))
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
