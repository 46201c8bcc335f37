// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bt config` specs

use crate::prelude::*;

#[test]
fn config_path_points_into_xdg_config_home() {
    let temp = Project::empty();
    temp.bt()
        .args(&["config", "path"])
        .passes()
        .stdout_has(&temp.config_path().display().to_string());
}

#[test]
fn config_show_prints_defaults_without_a_file() {
    let temp = Project::empty();
    temp.bt()
        .args(&["config", "show"])
        .passes()
        .stdout_has("[tracker]")
        .stdout_has("stage1_interval_minutes = 2")
        .stdout_has("polling_max_attempts = 24");
}

#[test]
fn config_set_persists_value() {
    let temp = Project::empty();
    temp.bt()
        .args(&["config", "set", "tracker.polling_interval_minutes", "10"])
        .passes()
        .stdout_has("Set tracker.polling_interval_minutes = 10");

    temp.bt()
        .args(&["config", "show"])
        .passes()
        .stdout_has("polling_interval_minutes = 10");
    assert!(temp.config_path().exists());
}

#[test]
fn config_show_masks_access_token() {
    let temp = Project::empty();
    temp.bt()
        .args(&["config", "set", "azure.pat", "very-secret-token"])
        .passes()
        .stdout_lacks("very-secret-token");

    temp.bt()
        .args(&["config", "show", "--json"])
        .passes()
        .stdout_has("********")
        .stdout_lacks("very-secret-token");
}

#[test]
fn config_show_masks_token_from_environment() {
    let temp = Project::empty();
    temp.bt()
        .args(&["config", "show"])
        .env("BT_AZURE_PAT", "env-token")
        .passes()
        .stdout_has("********")
        .stdout_lacks("env-token");
}

#[test]
fn config_set_rejects_unknown_key() {
    let temp = Project::empty();
    temp.bt()
        .args(&["config", "set", "tracker.speed", "fast"])
        .fails()
        .stderr_has("tracker.speed");
    assert!(!temp.config_path().exists());
}

#[test]
fn config_set_rejects_zero_interval() {
    let temp = Project::empty();
    temp.bt()
        .args(&["config", "set", "tracker.stage1_interval_minutes", "0"])
        .fails();
}

#[test]
fn config_show_reports_malformed_file() {
    let temp = Project::empty();
    temp.file("config/bt/config.toml", "[tracker\n");
    temp.bt().args(&["config", "show"]).fails();
}
