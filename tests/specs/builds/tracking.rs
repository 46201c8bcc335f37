// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracking commands against a live daemon with no Azure connection.
//!
//! Without a connection every poll is skipped, so records stay in
//! `monitoring_stage1` and nothing reaches the network.

use crate::prelude::*;

#[test]
fn status_with_nothing_tracked() {
    let temp = Project::empty();
    temp.bt()
        .args(&["status"])
        .passes()
        .stdout_has("No builds being tracked");
}

#[test]
fn track_without_connection_fails_and_tracks_nothing() {
    let temp = Project::empty();
    temp.file("config/bt/config.toml", "[notifications]\nenabled = false\n");
    temp.bt()
        .args(&["track", "86951"])
        .fails()
        .stdout_lacks("Tracking build")
        .stderr_has("connection is not configured")
        .stderr_has("Build 86951 was not tracked");

    // The daemon refuses to start tracking without a connection
    temp.bt()
        .args(&["status"])
        .passes()
        .stdout_has("No builds being tracked");
}

#[test]
fn history_starts_empty() {
    let temp = Project::empty();
    temp.bt()
        .args(&["history", "--json"])
        .passes()
        .stdout_eq("[]\n");
}

#[test]
fn show_unknown_build_suggests_history() {
    let temp = Project::empty();
    temp.bt()
        .args(&["show", "86951"])
        .fails()
        .stderr_has("Build 86951 is not being tracked")
        .stderr_has("bt history");
}

#[test]
fn clear_with_nothing_tracked() {
    let temp = Project::empty();
    temp.bt()
        .args(&["clear"])
        .passes()
        .stdout_has("Cleared all tracked builds");
}
