// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime for the build tracker
//!
//! Dispatches timer wakes and user commands to the tracking decisions in
//! `bt_core::tracking`, running build queries in between. Each event is
//! handled to completion before the next one.

use crate::{error::RuntimeError, Executor, Scheduler};
use bt_adapters::{BuildQuery, NotifyAdapter};
use bt_core::tracking::{self, StartError};
use bt_core::{
    Clock, Command, ConfigSource, Effect, Event, HistoricalBuild, Notification, Settings, Stage,
    TimerId, TimerKind, TrackedBuild, TrackerConfig,
};
use bt_storage::Store;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// Runtime adapter dependencies
pub struct RuntimeDeps<Q, N, S> {
    pub query: Q,
    pub notify: N,
    pub config: S,
    pub store: Arc<Mutex<Store>>,
}

/// Runtime that coordinates the tracker
pub struct Runtime<Q, N, S, C: Clock> {
    executor: Executor<N, C>,
    query: Q,
    config: S,
    clock: C,
}

impl<Q, N, S, C> Runtime<Q, N, S, C>
where
    Q: BuildQuery,
    N: NotifyAdapter,
    S: ConfigSource,
    C: Clock,
{
    /// Create a new runtime
    pub fn new(deps: RuntimeDeps<Q, N, S>, clock: C) -> Self {
        Self {
            executor: Executor::new(
                deps.notify,
                deps.store,
                Arc::new(Mutex::new(Scheduler::new())),
                clock.clone(),
            ),
            query: deps.query,
            config: deps.config,
            clock,
        }
    }

    /// Handle an incoming event
    pub async fn handle_event(&self, event: Event) -> Result<(), RuntimeError> {
        match event {
            Event::Timer { id } => self.handle_timer(&id).await,
            Event::Command(Command::StartTracking { build_number }) => {
                self.start_tracking(&build_number).await
            }
            Event::Command(Command::ClearAll) => self.clear_all().await,
        }
    }

    /// Timers due now, as events
    pub fn fired_timers(&self) -> Vec<Event> {
        let now = self.clock.now();
        self.executor
            .scheduler()
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .fired_timers(now)
    }

    /// Handle every due timer; a failing wake is logged and the rest still run
    pub async fn fire_due(&self) {
        for event in self.fired_timers() {
            if let Err(e) = self.handle_event(event.clone()).await {
                tracing::warn!(?event, error = %e, "timer handling failed");
            }
        }
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.executor
            .scheduler()
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .next_deadline()
    }

    /// Names of all armed timers
    pub fn timer_names(&self) -> Vec<String> {
        self.executor
            .scheduler()
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .timer_names()
    }

    pub fn tracked_builds(&self) -> Vec<TrackedBuild> {
        let store = self.executor.store();
        let store = store.lock().unwrap_or_else(|e| e.into_inner());
        store.state().tracked_builds.values().cloned().collect()
    }

    pub fn tracked_build(&self, build_number: &str) -> Option<TrackedBuild> {
        let store = self.executor.store();
        let store = store.lock().unwrap_or_else(|e| e.into_inner());
        store.state().get(build_number).cloned()
    }

    /// Finished builds, newest first
    pub fn history(&self) -> Vec<HistoricalBuild> {
        let store = self.executor.store();
        let store = store.lock().unwrap_or_else(|e| e.into_inner());
        store.state().history_newest_first()
    }

    /// Tracker settings, falling back to defaults if the config is unreadable
    pub fn tracker_config(&self) -> TrackerConfig {
        self.load_settings()
            .map(|s| s.tracker)
            .unwrap_or_default()
    }

    fn load_settings(&self) -> Option<Settings> {
        match self.config.load() {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load config");
                None
            }
        }
    }

    /// Prune history and re-arm timers for every in-flight build.
    ///
    /// Runs once at startup, before any other event.
    pub async fn reconcile(&self) -> Result<(), RuntimeError> {
        let builds = self.tracked_builds();
        let tracker = self.tracker_config();
        let now = self.clock.now();
        tracing::info!(tracked = builds.len(), "reconciling tracked builds");
        let effects = tracking::reconcile(&builds, &tracker, now);
        self.executor.execute_all(effects).await?;
        Ok(())
    }

    /// Manual start of tracking for one build
    pub async fn start_tracking(&self, build_number: &str) -> Result<(), RuntimeError> {
        let settings = self.load_settings().unwrap_or_default();
        let has_connection = settings.connection().is_some();
        let now = self.clock.now();

        match tracking::start_tracking(build_number, has_connection, &settings.tracker, now) {
            Ok(effects) => {
                tracing::info!(build = build_number, "tracking started");
                self.executor.execute_all(effects).await?;
                Ok(())
            }
            Err(StartError::InvalidBuildNumber(bn)) => {
                tracing::warn!(build = %bn, "invalid build number format");
                Err(RuntimeError::InvalidBuildNumber(bn))
            }
            Err(StartError::ConfigMissing) => {
                tracing::warn!(build = build_number, "connection settings incomplete, not tracking");
                self.executor
                    .execute(Effect::Notify(Notification::config_missing(build_number)))
                    .await?;
                Ok(())
            }
        }
    }

    /// Stop tracking every build without writing history
    pub async fn clear_all(&self) -> Result<(), RuntimeError> {
        let builds = self.tracked_builds();
        tracing::info!(count = builds.len(), "clearing all tracked builds");
        self.executor
            .execute_all(tracking::clear_all(&builds))
            .await?;
        Ok(())
    }

    async fn handle_timer(&self, name: &str) -> Result<(), RuntimeError> {
        let Some(id) = TimerId::parse(name) else {
            tracing::debug!(timer = name, "dropping unrecognised timer");
            self.executor
                .scheduler()
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .cancel_timer(name);
            return Ok(());
        };

        let build = match self.tracked_build(&id.build_number) {
            Some(build) if id.kind.serves(build.status) => build,
            other => {
                tracing::debug!(
                    timer = %id,
                    status = ?other.map(|b| b.status),
                    "stale wake, cancelling timer"
                );
                self.executor.execute_all(tracking::stale_wake(&id)).await?;
                return Ok(());
            }
        };

        let settings = self.load_settings();
        let tracker = settings.as_ref().map(|s| s.tracker).unwrap_or_default();

        match id.kind {
            TimerKind::CheckStage1 => {
                let now = self.clock.now();
                if let Some(effects) = tracking::check_stage1_timeout(&build, &tracker, now) {
                    tracing::info!(build = %build.build_number, "stage 1 timed out");
                    self.executor.execute_all(effects).await?;
                    return Ok(());
                }
                self.poll(&build, Stage::Stage1, settings.as_ref()).await
            }
            TimerKind::StartPolling | TimerKind::WaitMta => {
                tracing::info!(build = %build.build_number, "delay elapsed, starting to poll");
                let effects = tracking::on_delay_elapsed(&build, &tracker, self.clock.now());
                self.executor.execute_all(effects).await?;
                Ok(())
            }
            TimerKind::PollStages | TimerKind::PollMta => match build.status.polled_stage() {
                Some(stage) => self.poll(&build, stage, settings.as_ref()).await,
                None => Ok(()),
            },
        }
    }

    /// Query the service for `stage` and apply the result.
    ///
    /// Missing config and query failures skip the cycle; the timer stays armed.
    async fn poll(
        &self,
        build: &TrackedBuild,
        stage: Stage,
        settings: Option<&Settings>,
    ) -> Result<(), RuntimeError> {
        let Some(settings) = settings else {
            return Ok(());
        };
        let Some(conn) = settings.connection() else {
            tracing::warn!(build = %build.build_number, %stage, "connection settings incomplete, skipping poll");
            return Ok(());
        };

        let result = self
            .query
            .find(
                &conn,
                stage.pipeline_id(&conn.pipelines),
                &build.build_number,
                stage.name_filter(),
            )
            .await;

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(build = %build.build_number, %stage, error = %e, "query failed, retrying next cycle");
                return Ok(());
            }
        };

        let effects = tracking::on_poll(
            build,
            stage,
            snapshot.as_ref(),
            &settings.tracker,
            self.clock.now(),
        );
        if effects.is_empty() {
            tracing::debug!(build = %build.build_number, %stage, "no change");
        }
        self.executor.execute_all(effects).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
