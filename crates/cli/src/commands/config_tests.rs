// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

#[test]
fn set_value_creates_file_and_keeps_other_keys() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bt").join("config.toml");

    set_value(&path, "azure.project", "Platform").unwrap();
    set_value(&path, "tracker.polling_interval_minutes", "10").unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.azure.project, "Platform");
    assert_eq!(settings.tracker.polling_interval_minutes, 10);
    assert_eq!(settings.tracker.stage1_max_attempts, 60);
}

#[test]
fn set_value_rejects_unknown_key_without_writing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    assert!(set_value(&path, "azure.colour", "blue").is_err());
    assert!(!path.exists());
}

#[test]
fn render_masks_access_token() {
    let mut settings = Settings::default();
    settings.azure.pat = "super-secret".to_string();

    for format in [OutputFormat::Text, OutputFormat::Json] {
        let out = render(&settings, format).unwrap();
        assert!(!out.contains("super-secret"), "{out}");
        assert!(out.contains("********"), "{out}");
    }
}
