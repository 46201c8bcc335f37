// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable JSON store
//!
//! Every applied operation rewrites `state.json` through a temp file and a
//! rename, so a crash leaves either the old document or the new one.

use crate::state::MaterializedState;
use bt_core::Operation;
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the state document inside the state directory
pub const STATE_FILE: &str = "state.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("corrupt state file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The tracker's persisted state and the file backing it
pub struct Store {
    path: PathBuf,
    state: MaterializedState,
}

impl Store {
    /// Open or create the store at `path`.
    ///
    /// Expired history is pruned on every open, and the document is written
    /// back if it did not exist or anything was pruned.
    pub fn open(path: impl Into<PathBuf>, now: DateTime<Utc>) -> Result<Self, StorageError> {
        let path = path.into();
        let (mut state, existed) = match fs::read_to_string(&path) {
            Ok(text) => {
                let state = serde_json::from_str(&text).map_err(|source| {
                    StorageError::Corrupt {
                        path: path.clone(),
                        source,
                    }
                })?;
                (state, true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                (MaterializedState::default(), false)
            }
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        let pruned = state.prune_history(now);
        if pruned > 0 {
            tracing::info!(pruned, "pruned expired history");
        }

        let store = Self { path, state };
        if !existed || pruned > 0 {
            store.flush()?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &MaterializedState {
        &self.state
    }

    /// Apply an operation and persist the result
    pub fn apply(&mut self, op: &Operation) -> Result<(), StorageError> {
        self.state.apply(op);
        self.flush()
    }

    fn flush(&self) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_vec_pretty(&self.state)?;
        let tmp = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp).map_err(io_err)?;
        file.write_all(&json).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
