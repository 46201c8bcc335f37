// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime tests

use super::*;
use bt_adapters::{FakeBuildQuery, FakeNotifyAdapter, QueryCall, QueryError};
use bt_core::{
    BuildSnapshot, FakeClock, FileConfigSource, NotificationKind, Operation, PipelineIds,
    TrackingStatus,
};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

type TestRuntime = Runtime<FakeBuildQuery, FakeNotifyAdapter, FileConfigSource, FakeClock>;

const STAGE1_PIPELINE: &str = "101";
const STAGE2_PIPELINE: &str = "202";
const STAGE3_PIPELINE: &str = "303";

struct Setup {
    runtime: TestRuntime,
    query: FakeBuildQuery,
    notify: FakeNotifyAdapter,
    clock: FakeClock,
    config_path: PathBuf,
    dir: TempDir,
}

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
}

fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

fn connected_settings() -> Settings {
    let mut settings = Settings::default();
    settings.azure.org_url = "https://dev.azure.com/acme".to_string();
    settings.azure.project = "Platform".to_string();
    settings.azure.pat = "secret".to_string();
    settings.azure.pipelines = PipelineIds {
        stage1: STAGE1_PIPELINE.to_string(),
        stage2: STAGE2_PIPELINE.to_string(),
        stage3: STAGE3_PIPELINE.to_string(),
    };
    settings
}

fn open_store(dir: &TempDir, now: DateTime<Utc>) -> Arc<Mutex<Store>> {
    Arc::new(Mutex::new(
        Store::open(dir.path().join("state.json"), now).unwrap(),
    ))
}

fn build_runtime(
    dir: &TempDir,
    store: Arc<Mutex<Store>>,
    clock: &FakeClock,
) -> (TestRuntime, FakeBuildQuery, FakeNotifyAdapter, PathBuf) {
    let config_path = dir.path().join("config.toml");
    let query = FakeBuildQuery::new();
    let notify = FakeNotifyAdapter::new();
    let runtime = Runtime::new(
        RuntimeDeps {
            query: query.clone(),
            notify: notify.clone(),
            config: FileConfigSource::new(&config_path),
            store,
        },
        clock.clone(),
    );
    (runtime, query, notify, config_path)
}

fn setup_with(settings: Settings) -> Setup {
    let dir = TempDir::new().unwrap();
    let clock = FakeClock::at(t0());
    let store = open_store(&dir, clock.now());
    let (runtime, query, notify, config_path) = build_runtime(&dir, store, &clock);
    settings.save(&config_path).unwrap();
    Setup {
        runtime,
        query,
        notify,
        clock,
        config_path,
        dir,
    }
}

fn setup() -> Setup {
    setup_with(connected_settings())
}

fn snapshot(build_number: &str, status: &str, result: Option<&str>) -> BuildSnapshot {
    BuildSnapshot {
        id: 7001,
        build_number: build_number.to_string(),
        name: None,
        url: "https://dev.azure.com/acme/Platform/_build/results?buildId=7001".to_string(),
        status: status.to_string(),
        result: result.map(str::to_string),
    }
}

impl Setup {
    fn status(&self, build_number: &str) -> Option<TrackingStatus> {
        self.runtime.tracked_build(build_number).map(|b| b.status)
    }

    fn armed(&self) -> Vec<String> {
        self.runtime.timer_names()
    }

    /// Advance the clock and dispatch every timer that fires
    async fn advance(&self, duration: Duration) {
        self.clock.advance(duration);
        for event in self.runtime.fired_timers() {
            self.runtime.handle_event(event).await.unwrap();
        }
    }

    fn script(&self, stage: Stage, result: Result<Option<BuildSnapshot>, QueryError>) {
        let pipeline = match stage {
            Stage::Stage1 => STAGE1_PIPELINE,
            Stage::Stage2Nb | Stage::Stage2Mta => STAGE2_PIPELINE,
            Stage::Stage3 => STAGE3_PIPELINE,
        };
        self.query.set_find(pipeline, stage.name_filter(), result);
    }

    async fn start(&self, build_number: &str) {
        self.runtime
            .handle_event(Event::Command(Command::StartTracking {
                build_number: build_number.to_string(),
            }))
            .await
            .unwrap();
    }
}

// Manual start

#[tokio::test]
async fn start_tracking_persists_record_and_arms_stage1_timer() {
    let s = setup();
    s.start("86951").await;

    let build = s.runtime.tracked_build("86951").unwrap();
    assert_eq!(build.status, TrackingStatus::MonitoringStage1);
    assert_eq!(build.started_at, t0());
    assert_eq!(s.armed(), vec!["check-stage1-86951"]);
    assert_eq!(
        s.runtime.next_deadline(),
        Some(t0() + chrono::Duration::minutes(2))
    );
    assert!(s.notify.calls().is_empty());
}

#[tokio::test]
async fn start_tracking_rejects_invalid_build_number() {
    let s = setup();
    let err = s.runtime.start_tracking("12a4").await.unwrap_err();

    assert!(matches!(err, RuntimeError::InvalidBuildNumber(ref bn) if bn == "12a4"));
    assert!(s.runtime.tracked_builds().is_empty());
    assert!(s.armed().is_empty());
}

#[tokio::test]
async fn start_tracking_without_connection_notifies_and_tracks_nothing() {
    let s = setup_with(Settings::default());
    s.start("86951").await;

    assert!(s.runtime.tracked_builds().is_empty());
    assert!(s.armed().is_empty());
    assert_eq!(s.notify.ids(), vec!["config-missing-86951"]);
}

#[tokio::test]
async fn restarting_a_build_replaces_its_record_and_timers() {
    let s = setup();
    s.start("86951").await;
    s.script(Stage::Stage1, Ok(Some(snapshot("86951", "completed", None))));
    s.advance(minutes(2)).await;
    assert_eq!(s.status("86951"), Some(TrackingStatus::WaitingStage2Nb));

    s.start("86951").await;

    let build = s.runtime.tracked_build("86951").unwrap();
    assert_eq!(build.status, TrackingStatus::MonitoringStage1);
    assert_eq!(build.started_at, s.clock.now());
    assert!(build.stages.stage1.is_none());
    assert_eq!(s.armed(), vec!["check-stage1-86951"]);
}

// Stage 1

#[tokio::test]
async fn stage1_completion_schedules_delayed_nb_polling() {
    let s = setup();
    s.start("86951").await;
    s.script(Stage::Stage1, Ok(Some(snapshot("86951", "completed", None))));

    s.advance(minutes(2)).await;

    let now = s.clock.now();
    let build = s.runtime.tracked_build("86951").unwrap();
    assert_eq!(build.status, TrackingStatus::WaitingStage2Nb);
    assert_eq!(build.stage1_completed_at(), Some(now));
    assert_eq!(s.armed(), vec!["start-polling-86951"]);
    assert_eq!(
        s.runtime.next_deadline(),
        Some(now + chrono::Duration::minutes(20))
    );

    let calls = s.notify.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, NotificationKind::Stage1Complete);
    assert_eq!(
        calls[0].message,
        "Build 86951 Stage 1 completed. Will start monitoring Stage 2 - NB in 20 minutes."
    );
}

#[tokio::test]
async fn stage1_in_progress_records_result_and_keeps_polling() {
    let s = setup();
    s.start("86951").await;
    s.script(Stage::Stage1, Ok(Some(snapshot("86951", "inProgress", None))));

    s.advance(minutes(2)).await;

    let build = s.runtime.tracked_build("86951").unwrap();
    assert_eq!(build.status, TrackingStatus::MonitoringStage1);
    let stage1 = build.stages.stage1.unwrap();
    assert_eq!(stage1.build_id, Some(7001));
    assert_eq!(stage1.status.as_deref(), Some("inProgress"));
    assert_eq!(s.armed(), vec!["check-stage1-86951"]);
    assert_eq!(
        s.query.calls(),
        vec![QueryCall::Find {
            pipeline_id: STAGE1_PIPELINE.to_string(),
            query: "86951".to_string(),
            name_filter: None,
        }]
    );
}

#[tokio::test]
async fn stage1_timeout_moves_build_to_history() {
    let s = setup();
    s.start("86951").await;

    // 60 attempts at 2 minutes
    for _ in 0..60 {
        s.advance(minutes(2)).await;
    }

    assert!(s.runtime.tracked_build("86951").is_none());
    assert!(s.armed().is_empty());
    let history = s.runtime.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].build.status, TrackingStatus::Timeout);
    assert_eq!(s.notify.ids(), vec!["timeout-86951"]);
}

#[tokio::test]
async fn query_failure_skips_cycle_and_keeps_timer() {
    let s = setup();
    s.start("86951").await;
    s.script(Stage::Stage1, Err(QueryError::RateLimited));

    s.advance(minutes(2)).await;

    assert_eq!(s.status("86951"), Some(TrackingStatus::MonitoringStage1));
    assert_eq!(s.armed(), vec!["check-stage1-86951"]);

    s.script(Stage::Stage1, Ok(Some(snapshot("86951", "completed", None))));
    s.advance(minutes(2)).await;
    assert_eq!(s.status("86951"), Some(TrackingStatus::WaitingStage2Nb));
}

#[tokio::test]
async fn missing_config_at_poll_time_skips_cycle() {
    let s = setup();
    s.start("86951").await;
    Settings::default().save(&s.config_path).unwrap();
    s.script(Stage::Stage1, Ok(Some(snapshot("86951", "completed", None))));

    s.advance(minutes(2)).await;

    assert_eq!(s.status("86951"), Some(TrackingStatus::MonitoringStage1));
    assert_eq!(s.armed(), vec!["check-stage1-86951"]);
    assert!(s.query.calls().is_empty());
}

// Later stages

#[tokio::test]
async fn full_lifecycle_reaches_history() {
    let s = setup();
    s.start("86951").await;

    s.script(Stage::Stage1, Ok(Some(snapshot("86951", "completed", None))));
    s.advance(minutes(2)).await;
    assert_eq!(s.status("86951"), Some(TrackingStatus::WaitingStage2Nb));

    s.advance(minutes(20)).await;
    assert_eq!(s.status("86951"), Some(TrackingStatus::MonitoringStage2Nb));
    assert_eq!(s.armed(), vec!["poll-stages-86951"]);

    s.script(
        Stage::Stage2Nb,
        Ok(Some(snapshot("1.0 - NB - 86951", "completed", Some("succeeded")))),
    );
    s.advance(minutes(5)).await;
    assert_eq!(s.status("86951"), Some(TrackingStatus::MonitoringStage3));
    assert_eq!(s.armed(), vec!["poll-stages-86951"]);

    s.script(
        Stage::Stage3,
        Ok(Some(snapshot("86951", "completed", Some("succeeded")))),
    );
    s.advance(minutes(5)).await;
    assert_eq!(s.status("86951"), Some(TrackingStatus::WaitingStage2Mta));
    assert_eq!(s.armed(), vec!["wait-mta-86951"]);

    s.advance(minutes(20)).await;
    assert_eq!(s.status("86951"), Some(TrackingStatus::MonitoringStage2Mta));
    assert_eq!(s.armed(), vec!["poll-mta-86951"]);

    s.script(
        Stage::Stage2Mta,
        Ok(Some(snapshot(
            "1.0 - MTA&Cancellation - 86951",
            "completed",
            Some("succeeded"),
        ))),
    );
    s.advance(minutes(5)).await;

    assert!(s.runtime.tracked_build("86951").is_none());
    assert!(s.armed().is_empty());
    let history = s.runtime.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].build.status, TrackingStatus::Completed);
    assert!(history[0].build.stages.stage2_mta.is_some());
    assert_eq!(
        s.notify.ids(),
        vec![
            "stage1-complete-86951",
            "stage2nb-complete-86951",
            "stage3-complete-86951",
            "all-complete-86951",
        ]
    );
}

#[tokio::test]
async fn failed_nb_build_does_not_advance() {
    let s = setup();
    s.start("86951").await;
    s.script(Stage::Stage1, Ok(Some(snapshot("86951", "completed", None))));
    s.advance(minutes(2)).await;
    s.advance(minutes(20)).await;

    s.script(
        Stage::Stage2Nb,
        Ok(Some(snapshot("1.0 - NB - 86951", "completed", Some("failed")))),
    );
    s.advance(minutes(5)).await;

    let build = s.runtime.tracked_build("86951").unwrap();
    assert_eq!(build.status, TrackingStatus::MonitoringStage2Nb);
    assert_eq!(
        build.stages.stage2_nb.unwrap().result.as_deref(),
        Some("failed")
    );
    assert_eq!(s.armed(), vec!["poll-stages-86951"]);
}

// Clear all

#[tokio::test]
async fn clear_all_removes_builds_without_history() {
    let s = setup();
    s.start("86951").await;
    s.start("86952").await;

    s.runtime
        .handle_event(Event::Command(Command::ClearAll))
        .await
        .unwrap();

    assert!(s.runtime.tracked_builds().is_empty());
    assert!(s.runtime.history().is_empty());
    assert!(s.armed().is_empty());
}

// Stale wakes

#[tokio::test]
async fn wake_for_untracked_build_cancels_timer() {
    let s = setup();
    s.runtime
        .handle_event(Event::Timer {
            id: "poll-stages-99999".to_string(),
        })
        .await
        .unwrap();

    assert!(s.query.calls().is_empty());
    assert!(s.armed().is_empty());
}

#[tokio::test]
async fn wake_for_wrong_status_cancels_only_that_timer() {
    let s = setup();
    s.start("86951").await;

    s.runtime
        .handle_event(Event::Timer {
            id: "poll-mta-86951".to_string(),
        })
        .await
        .unwrap();

    assert!(s.query.calls().is_empty());
    assert_eq!(s.status("86951"), Some(TrackingStatus::MonitoringStage1));
    assert_eq!(s.armed(), vec!["check-stage1-86951"]);
}

#[tokio::test]
async fn unparseable_timer_name_is_dropped() {
    let s = setup();
    s.runtime
        .handle_event(Event::Timer {
            id: "bogus".to_string(),
        })
        .await
        .unwrap();
    assert!(s.armed().is_empty());
}

// Reconcile

#[tokio::test]
async fn reconcile_advances_elapsed_mta_wait() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, t0());
    let mut build = TrackedBuild::new("86951", t0());
    build.status = TrackingStatus::WaitingStage2Mta;
    build.stages.complete(Stage::Stage1, t0());
    build.stages.complete(Stage::Stage3, t0() + chrono::Duration::minutes(30));
    store
        .lock()
        .unwrap()
        .apply(&Operation::UpsertTracked(build))
        .unwrap();

    // Restart an hour later
    let clock = FakeClock::at(t0() + chrono::Duration::hours(1));
    let (runtime, _query, _notify, config_path) = build_runtime(&dir, store, &clock);
    connected_settings().save(&config_path).unwrap();

    runtime.reconcile().await.unwrap();

    let build = runtime.tracked_build("86951").unwrap();
    assert_eq!(build.status, TrackingStatus::MonitoringStage2Mta);
    assert_eq!(build.polling_started_at, Some(clock.now()));
    assert_eq!(runtime.timer_names(), vec!["poll-mta-86951"]);
}

#[tokio::test]
async fn reconcile_resumes_pending_delay() {
    let s = setup();
    s.start("86951").await;
    s.script(Stage::Stage1, Ok(Some(snapshot("86951", "completed", None))));
    s.advance(minutes(2)).await;
    let completed_at = s.clock.now();

    // Restart five minutes into the delay
    s.clock.advance(minutes(5));
    let store = open_store(&s.dir, s.clock.now());
    let (runtime, _query, _notify, _) = build_runtime(&s.dir, store, &s.clock);
    runtime.reconcile().await.unwrap();

    assert_eq!(runtime.timer_names(), vec!["start-polling-86951"]);
    assert_eq!(
        runtime.next_deadline(),
        Some(completed_at + chrono::Duration::minutes(20))
    );
    assert_eq!(
        runtime.tracked_build("86951").unwrap().status,
        TrackingStatus::WaitingStage2Nb
    );
}

#[tokio::test]
async fn reconcile_rearms_stage1_polling() {
    let s = setup();
    s.start("86951").await;

    let store = open_store(&s.dir, s.clock.now());
    let (runtime, _query, _notify, _) = build_runtime(&s.dir, store, &s.clock);
    runtime.reconcile().await.unwrap();

    assert_eq!(runtime.timer_names(), vec!["check-stage1-86951"]);
}

#[tokio::test]
async fn failing_notifier_does_not_strand_other_due_timers() {
    let dir = TempDir::new().unwrap();
    let now = t0() + chrono::Duration::minutes(200);
    let store = open_store(&dir, t0());
    {
        let mut store = store.lock().unwrap();
        // Long past its stage 1 timeout
        store
            .apply(&Operation::UpsertTracked(TrackedBuild::new("1111", t0())))
            .unwrap();
        // Two minutes left of the stage 2 delay
        let mut waiting = TrackedBuild::new("2222", t0());
        waiting.status = TrackingStatus::WaitingStage2Nb;
        waiting
            .stages
            .complete(Stage::Stage1, now - chrono::Duration::minutes(18));
        store.apply(&Operation::UpsertTracked(waiting)).unwrap();
    }

    let clock = FakeClock::at(now);
    let (runtime, _query, notify, config_path) = build_runtime(&dir, store, &clock);
    connected_settings().save(&config_path).unwrap();
    notify.set_failing(true);

    runtime.reconcile().await.unwrap();
    clock.advance(minutes(2));
    runtime.fire_due().await;

    let history = runtime.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].build.build_number, "1111");
    assert_eq!(history[0].build.status, TrackingStatus::Timeout);
    assert_eq!(
        runtime.tracked_build("2222").unwrap().status,
        TrackingStatus::MonitoringStage2Nb
    );
    assert_eq!(runtime.timer_names(), vec!["poll-stages-2222"]);
    assert_eq!(notify.ids(), vec!["timeout-1111"]);
}

#[tokio::test]
async fn unreadable_config_falls_back_to_default_tracker_settings() {
    let s = setup();
    std::fs::write(&s.config_path, "not = [valid").unwrap();
    assert_eq!(s.runtime.tracker_config(), TrackerConfig::default());
}
