// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Help and completion output

use crate::prelude::*;
use predicates::prelude::*;

#[test]
fn help_lists_tracking_commands() {
    let temp = Project::empty();
    temp.bt()
        .args(&["--help"])
        .passes()
        .stdout_has("track")
        .stdout_has("status")
        .stdout_has("history")
        .stdout_has("config")
        .stdout_has("daemon");
}

#[test]
fn version_flag_prints_version() {
    let temp = Project::empty();
    temp.bt()
        .args(&["--version"])
        .passes()
        .stdout_has(env!("CARGO_PKG_VERSION"));
}

#[test]
fn completions_are_generated_for_bash() {
    assert_cmd::Command::cargo_bin("bt")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_bt()"));
}
