// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle specs
//!
//! Verify daemon start/stop/status lifecycle.

use crate::prelude::*;

#[test]
fn daemon_status_when_not_running() {
    let temp = Project::empty();

    temp.bt()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_stop_when_not_running() {
    let temp = Project::empty();

    temp.bt()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_start_reports_success() {
    let temp = Project::empty();

    temp.bt()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon started");
}

#[test]
fn daemon_start_twice_reports_already_running() {
    let temp = Project::empty();
    temp.bt().args(&["daemon", "start"]).passes();

    temp.bt()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon already running");
}

#[test]
fn daemon_status_shows_details_after_start() {
    let temp = Project::empty();
    temp.bt().args(&["daemon", "start"]).passes();

    temp.bt()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Status: running")
        .stdout_has("Version:")
        .stdout_has("Uptime:")
        .stdout_has("Tracked builds: 0");
}

#[test]
fn daemon_stop_reports_success_and_cleans_up() {
    let temp = Project::empty();
    temp.bt().args(&["daemon", "start"]).passes();

    temp.bt()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon stopped");

    let dir = temp.daemon_dir();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || !dir.join("daemon.pid").exists()));
    temp.bt()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_creates_version_file() {
    let temp = Project::empty();
    temp.bt().args(&["daemon", "start"]).passes();

    let version_file = temp.daemon_dir().join("daemon.version");
    assert!(wait_for(SPEC_WAIT_MAX_MS, || version_file.exists()));
    let version = std::fs::read_to_string(version_file).unwrap();
    assert_eq!(version.trim(), env!("CARGO_PKG_VERSION"));
}
