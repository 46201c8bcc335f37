// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bt_core::{BuildSnapshot, TrackingStatus};

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
}

fn build_in(status: TrackingStatus, polling_since: Option<DateTime<Utc>>) -> TrackedBuild {
    let mut build = TrackedBuild::new("86951", t0());
    build.status = status;
    build.polling_started_at = polling_since;
    build
}

#[test]
fn later_stage_past_budget_is_overdue() {
    // 5 minutes x 24 attempts
    let build = build_in(TrackingStatus::MonitoringStage3, Some(t0()));
    let now = t0() + chrono::Duration::minutes(120);

    let entry = StatusEntry::new(build, &TrackerConfig::default(), now);
    assert!(entry.overdue);
    assert!(entry.to_string().ends_with("(overdue)"));
}

#[test]
fn later_stage_inside_budget_is_not_overdue() {
    let build = build_in(TrackingStatus::MonitoringStage2Nb, Some(t0()));
    let now = t0() + chrono::Duration::minutes(119);

    assert!(!StatusEntry::new(build, &TrackerConfig::default(), now).overdue);
}

#[test]
fn stage1_and_waiting_builds_are_never_overdue() {
    let config = TrackerConfig::default();
    let late = t0() + chrono::Duration::days(2);

    for status in [
        TrackingStatus::MonitoringStage1,
        TrackingStatus::WaitingStage2Nb,
        TrackingStatus::WaitingStage2Mta,
    ] {
        let entry = StatusEntry::new(build_in(status, Some(t0())), &config, late);
        assert!(!entry.overdue, "{status:?}");
    }
}

#[test]
fn status_json_flattens_build_fields() {
    let entry = StatusEntry::new(
        build_in(TrackingStatus::MonitoringStage1, None),
        &TrackerConfig::default(),
        t0(),
    );
    let json = serde_json::to_value(&entry).unwrap();

    assert_eq!(json["buildNumber"], "86951");
    assert_eq!(json["status"], "monitoring_stage1");
    assert_eq!(json["overdue"], false);
}

#[test]
fn stage_summary_prefers_result_over_status() {
    let mut build = build_in(TrackingStatus::MonitoringStage3, Some(t0()));
    build.stages.record(
        Stage::Stage1,
        &BuildSnapshot {
            id: 1,
            build_number: "86951".to_string(),
            name: None,
            url: "https://example.invalid/1".to_string(),
            status: "completed".to_string(),
            result: Some("succeeded".to_string()),
        },
    );
    build.stages.record(
        Stage::Stage2Nb,
        &BuildSnapshot {
            id: 2,
            build_number: "1.0 - NB - 86951".to_string(),
            name: None,
            url: "https://example.invalid/2".to_string(),
            status: "inProgress".to_string(),
            result: None,
        },
    );

    assert_eq!(
        stage_summary(&build),
        "S1:succeeded NB:inProgress S3:- MTA:-"
    );
}

#[test]
fn json_flag_selects_format() {
    assert_eq!(OutputFormat::from_json_flag(true), OutputFormat::Json);
    assert_eq!(OutputFormat::from_json_flag(false), OutputFormat::Text);
}
