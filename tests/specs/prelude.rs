// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for CLI specs.
//!
//! Every `Project` gets its own HOME, state, config and socket directories so
//! specs never touch the user's daemon or settings.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Upper bound for polling waits
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

/// Poll `check` until it returns true or `max_ms` elapses
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    check()
}

/// Isolated environment for one spec
pub struct Project {
    root: TempDir,
    socket_dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        let root = TempDir::new().unwrap();
        // Keep socket paths short
        let socket_dir = tempfile::Builder::new().prefix("bt").tempdir_in("/tmp").unwrap();
        for sub in ["home", "state", "config"] {
            std::fs::create_dir_all(root.path().join(sub)).unwrap();
        }
        Self { root, socket_dir }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.path().join("state")
    }

    /// Directory holding the daemon's state, lock and log files
    pub fn daemon_dir(&self) -> PathBuf {
        self.state_path().join("bt")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.path().join("config").join("bt").join("config.toml")
    }

    /// Write a file relative to the project root
    pub fn file(&self, rel: &str, content: &str) {
        let path = self.root.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Build a `bt` invocation inside this project
    pub fn bt(&self) -> CliBuilder {
        let mut cmd = Command::cargo_bin("bt").unwrap();
        cmd.current_dir(self.root.path())
            .env("HOME", self.root.path().join("home"))
            .env("XDG_STATE_HOME", self.state_path())
            .env("XDG_CONFIG_HOME", self.root.path().join("config"))
            .env("BT_SOCKET_DIR", self.socket_dir.path())
            .env_remove("BT_CONFIG")
            .env_remove("BT_AZURE_PAT")
            .env_remove("RUST_LOG")
            .timeout(Duration::from_secs(20));
        CliBuilder { cmd, args: vec![] }
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        // Best effort; most specs never start the daemon
        if self.daemon_dir().join("daemon.pid").exists() {
            let _ = self.bt().args(&["daemon", "stop"]).cmd_output();
        }
    }
}

pub struct CliBuilder {
    cmd: Command,
    args: Vec<String>,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    fn cmd_output(mut self) -> std::process::Output {
        self.cmd.args(&self.args).output().unwrap()
    }

    fn run(self) -> RunAssert {
        let args = self.args.join(" ");
        let output = self.cmd_output();
        RunAssert {
            args,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        }
    }

    /// Run and assert a zero exit code
    pub fn passes(self) -> RunAssert {
        let run = self.run();
        assert!(
            run.success,
            "`bt {}` failed\nstdout:\n{}\nstderr:\n{}",
            run.args, run.stdout, run.stderr
        );
        run
    }

    /// Run and assert a non-zero exit code
    pub fn fails(self) -> RunAssert {
        let run = self.run();
        assert!(
            !run.success,
            "`bt {}` unexpectedly passed\nstdout:\n{}",
            run.args, run.stdout
        );
        run
    }
}

pub struct RunAssert {
    args: String,
    pub stdout: String,
    pub stderr: String,
    success: bool,
}

impl RunAssert {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout.contains(needle),
            "`bt {}` stdout missing {:?}\nstdout:\n{}",
            self.args,
            needle,
            self.stdout
        );
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(
            !self.stdout.contains(needle),
            "`bt {}` stdout unexpectedly has {:?}\nstdout:\n{}",
            self.args,
            needle,
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr.contains(needle),
            "`bt {}` stderr missing {:?}\nstderr:\n{}",
            self.args,
            needle,
            self.stderr
        );
        self
    }

    /// Compare stdout exactly, with a readable diff on mismatch
    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout.as_str(), expected);
        self
    }
}
