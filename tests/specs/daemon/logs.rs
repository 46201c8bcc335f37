// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon logs specs

use crate::prelude::*;

#[test]
fn daemon_logs_without_log_file() {
    let temp = Project::empty();
    temp.bt()
        .args(&["daemon", "logs"])
        .passes()
        .stdout_has("No daemon log");
}

#[test]
fn daemon_logs_shows_startup_marker() {
    let temp = Project::empty();
    temp.bt().args(&["daemon", "start"]).passes();

    temp.bt()
        .args(&["daemon", "logs", "--lines", "10"])
        .passes()
        .stdout_has("btd: starting");
}

#[test]
fn daemon_logs_shows_ready_line() {
    let temp = Project::empty();
    temp.bt().args(&["daemon", "start"]).passes();

    let log = temp.daemon_dir().join("daemon.log");
    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        std::fs::read_to_string(&log).is_ok_and(|s| s.contains("Daemon ready"))
    }));
    temp.bt()
        .args(&["daemon", "logs"])
        .passes()
        .stdout_has("Daemon ready");
}
