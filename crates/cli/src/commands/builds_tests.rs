// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bt_adapters::{FakeBuildQuery, QueryCall, QueryError};
use bt_core::{BuildSnapshot, PipelineIds};
use chrono::TimeZone;

fn conn() -> Connection {
    Connection {
        org_url: "https://dev.azure.com/acme".to_string(),
        project: "Platform".to_string(),
        pat: "token".to_string(),
        pipelines: PipelineIds {
            stage1: "101".to_string(),
            stage2: "202".to_string(),
            stage3: "303".to_string(),
        },
    }
}

fn snapshot(id: u64, status: &str, result: Option<&str>) -> BuildSnapshot {
    BuildSnapshot {
        id,
        build_number: "20260115.86951".to_string(),
        name: None,
        url: format!("https://dev.azure.com/acme/Platform/_build/results?buildId={id}"),
        status: status.to_string(),
        result: result.map(str::to_string),
    }
}

fn tracked_with_two_stages() -> TrackedBuild {
    let started = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
    let mut build = TrackedBuild::new("86951", started);
    build
        .stages
        .record(Stage::Stage1, &snapshot(11, "completed", Some("succeeded")));
    build
        .stages
        .record(Stage::Stage2Nb, &snapshot(22, "inProgress", None));
    build
}

#[tokio::test]
async fn refresh_fetches_only_recorded_stages() {
    let query = FakeBuildQuery::new();
    query.set_get(11, Ok(Some(snapshot(11, "completed", Some("succeeded")))));
    query.set_get(22, Ok(Some(snapshot(22, "completed", Some("failed")))));

    let live = refresh_stages(&query, &conn(), &tracked_with_two_stages()).await;

    assert_eq!(live.len(), 2);
    assert_eq!(live[0].stage, Stage::Stage1);
    assert_eq!(live[1].stage, Stage::Stage2Nb);
    assert_eq!(live[1].result.as_deref(), Some("failed"));
    assert_eq!(
        query.calls(),
        vec![
            QueryCall::Get { build_id: 11 },
            QueryCall::Get { build_id: 22 }
        ]
    );
}

#[tokio::test]
async fn refresh_reports_failures_per_stage() {
    let query = FakeBuildQuery::new();
    query.set_get(11, Err(QueryError::Authentication));

    let live = refresh_stages(&query, &conn(), &tracked_with_two_stages()).await;

    assert!(live[0].error.as_deref().unwrap().contains("authentication"));
    assert!(live[0].to_string().contains("error:"));
    // Unscripted lookups come back empty
    assert!(live[1].error.is_none());
    assert!(live[1].to_string().ends_with("not found"));
}

#[test]
fn live_stage_display_shows_status_and_result() {
    let stage = LiveStage {
        stage: Stage::Stage3,
        build_id: 33,
        status: Some("completed".to_string()),
        result: Some("succeeded".to_string()),
        error: None,
    };
    let line = stage.to_string();
    assert!(line.contains("#33"));
    assert!(line.ends_with("completed / succeeded"));
}
