// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input errors are reported without starting the daemon

use crate::prelude::*;

#[test]
fn track_rejects_short_build_number() {
    let temp = Project::empty();
    temp.bt()
        .args(&["track", "123"])
        .fails()
        .stderr_has("Invalid build number '123'");

    assert!(!temp.daemon_dir().join("daemon.pid").exists());
}

#[test]
fn track_rejects_non_numeric_build_number() {
    let temp = Project::empty();
    temp.bt()
        .args(&["track", "86a51"])
        .fails()
        .stderr_has("at least 4 digits");
}

#[test]
fn unknown_subcommand_fails() {
    let temp = Project::empty();
    temp.bt().args(&["launch"]).fails();
}

#[test]
fn track_requires_a_build_number() {
    let temp = Project::empty();
    temp.bt().args(&["track"]).fails().stderr_has("BUILD_NUMBER");
}
