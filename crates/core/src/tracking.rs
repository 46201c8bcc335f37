// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage-tracking decisions
//!
//! Pure functions from a tracked build, the tracker config and the current
//! time to the effects that move the build forward. Nothing here performs
//! I/O: the engine runs the build queries, feeds the results in, and
//! executes the returned effects in order.
//!
//! ```text
//! monitoring_stage1 ──completed──▶ waiting_stage2_nb ──delay──▶ monitoring_stage2_nb
//!        │                                                          │ succeeded
//!     timeout                                                       ▼
//!        ▼                 monitoring_stage2_mta ◀──delay── waiting_stage2_mta ◀── monitoring_stage3
//!    (history)                    │ succeeded                                succeeded
//!                                 ▼
//!                            completed (history)
//! ```

use crate::build::{validate_build_number, CurrentStage, TrackedBuild, TrackingStatus};
use crate::config::TrackerConfig;
use crate::effect::Effect;
use crate::notification::Notification;
use crate::operation::Operation;
use crate::snapshot::BuildSnapshot;
use crate::stage::Stage;
use crate::timer::{TimerId, TimerKind, TimerSchedule};
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Why a manual start was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("invalid build number {0:?}: expected at least 4 digits")]
    InvalidBuildNumber(String),
    #[error("connection settings are incomplete")]
    ConfigMissing,
}

fn set_timer(kind: TimerKind, build_number: &str, schedule: TimerSchedule) -> Effect {
    Effect::SetTimer {
        id: TimerId::new(kind, build_number),
        schedule,
    }
}

fn cancel_timer(kind: TimerKind, build_number: &str) -> Effect {
    Effect::CancelTimer {
        id: TimerId::new(kind, build_number),
    }
}

fn to_std(duration: chrono::Duration) -> Duration {
    duration.to_std().unwrap_or(Duration::ZERO)
}

/// Manual start of tracking for `build_number`.
///
/// Any existing record for the build is replaced and all of its timers are
/// cancelled before the Stage 1 timer is armed.
pub fn start_tracking(
    build_number: &str,
    has_connection: bool,
    config: &TrackerConfig,
    now: DateTime<Utc>,
) -> Result<Vec<Effect>, StartError> {
    if !validate_build_number(build_number) {
        return Err(StartError::InvalidBuildNumber(build_number.to_string()));
    }
    if !has_connection {
        return Err(StartError::ConfigMissing);
    }

    let mut effects: Vec<Effect> = TimerId::all_for(build_number)
        .into_iter()
        .map(|id| Effect::CancelTimer { id })
        .collect();
    effects.push(Effect::Persist(Operation::UpsertTracked(TrackedBuild::new(
        build_number,
        now,
    ))));
    effects.push(set_timer(
        TimerKind::CheckStage1,
        build_number,
        TimerSchedule::Every(config.stage1_interval()),
    ));
    Ok(effects)
}

/// Stop tracking every build: cancel all timer names and delete records.
pub fn clear_all<'a>(builds: impl IntoIterator<Item = &'a TrackedBuild>) -> Vec<Effect> {
    let mut effects = Vec::new();
    for build in builds {
        effects.extend(
            TimerId::all_for(&build.build_number)
                .into_iter()
                .map(|id| Effect::CancelTimer { id }),
        );
        effects.push(Effect::Persist(Operation::RemoveTracked {
            build_number: build.build_number.clone(),
        }));
    }
    effects
}

/// Whether Stage 1 is still inside its wall-clock budget
pub fn should_continue_stage1_polling(
    build: &TrackedBuild,
    config: &TrackerConfig,
    now: DateTime<Utc>,
) -> bool {
    now - build.started_at < config.stage1_timeout()
}

/// Whether the current later stage is still inside its polling budget.
///
/// Only used for display; later stages are never timed out.
pub fn should_continue_stage_polling(
    build: &TrackedBuild,
    config: &TrackerConfig,
    now: DateTime<Utc>,
) -> bool {
    match build.polling_started_at {
        Some(since) => now - since < config.stage_polling_timeout(),
        None => true,
    }
}

/// Time out a Stage 1 build whose budget is spent.
///
/// Returns `None` while polling should continue.
pub fn check_stage1_timeout(
    build: &TrackedBuild,
    config: &TrackerConfig,
    now: DateTime<Utc>,
) -> Option<Vec<Effect>> {
    if should_continue_stage1_polling(build, config, now) {
        return None;
    }

    let mut timed_out = build.clone();
    timed_out.status = TrackingStatus::Timeout;
    Some(vec![
        Effect::Persist(Operation::Finalize {
            build: timed_out,
            completed_at: now,
        }),
        cancel_timer(TimerKind::CheckStage1, &build.build_number),
        Effect::Notify(Notification::timeout(
            &build.build_number,
            config.stage1_timeout().num_minutes(),
        )),
    ])
}

/// Apply one poll result for `stage`.
///
/// An absent build changes nothing. A found build refreshes the stage's
/// recorded fields; the status only moves on when the stage qualifies.
pub fn on_poll(
    build: &TrackedBuild,
    stage: Stage,
    snapshot: Option<&BuildSnapshot>,
    config: &TrackerConfig,
    now: DateTime<Utc>,
) -> Vec<Effect> {
    let Some(snapshot) = snapshot else {
        return Vec::new();
    };

    let mut next = build.clone();
    let refreshed = next.stages.record(stage, snapshot);

    let qualifies = if stage.requires_success() {
        snapshot.succeeded()
    } else {
        snapshot.is_completed()
    };
    if !qualifies {
        return if refreshed && next != *build {
            vec![Effect::Persist(Operation::UpsertTracked(next))]
        } else {
            Vec::new()
        };
    }

    next.stages.complete(stage, now);
    let bn = build.build_number.as_str();
    let delay = to_std(config.stage_delay());

    match stage {
        Stage::Stage1 => {
            next.status = TrackingStatus::WaitingStage2Nb;
            next.current_stage = CurrentStage::Stage2Nb;
            vec![
                cancel_timer(TimerKind::CheckStage1, bn),
                Effect::Persist(Operation::UpsertTracked(next)),
                set_timer(TimerKind::StartPolling, bn, TimerSchedule::Once(delay)),
                Effect::Notify(Notification::stage1_complete(
                    bn,
                    config.delay_after_stage1_minutes,
                )),
            ]
        }
        Stage::Stage2Nb => {
            // poll-stages keeps running for Stage 3
            next.status = TrackingStatus::MonitoringStage3;
            next.current_stage = CurrentStage::Stage3;
            next.polling_started_at = Some(now);
            vec![
                Effect::Persist(Operation::UpsertTracked(next)),
                Effect::Notify(Notification::stage2_nb_complete(bn)),
            ]
        }
        Stage::Stage3 => {
            next.status = TrackingStatus::WaitingStage2Mta;
            next.current_stage = CurrentStage::Stage2Mta;
            next.polling_started_at = None;
            vec![
                cancel_timer(TimerKind::PollStages, bn),
                Effect::Persist(Operation::UpsertTracked(next)),
                set_timer(TimerKind::WaitMta, bn, TimerSchedule::Once(delay)),
                Effect::Notify(Notification::stage3_complete(
                    bn,
                    config.delay_after_stage1_minutes,
                )),
            ]
        }
        Stage::Stage2Mta => {
            next.status = TrackingStatus::Completed;
            next.current_stage = CurrentStage::Done;
            next.polling_started_at = None;
            vec![
                cancel_timer(TimerKind::PollMta, bn),
                Effect::Persist(Operation::Finalize {
                    build: next,
                    completed_at: now,
                }),
                Effect::Notify(Notification::all_complete(bn)),
            ]
        }
    }
}

/// Leave a `waiting_*` status once its delay has passed.
///
/// Returns no effects for any other status.
pub fn on_delay_elapsed(
    build: &TrackedBuild,
    config: &TrackerConfig,
    now: DateTime<Utc>,
) -> Vec<Effect> {
    let (wait, poll, status) = match build.status {
        TrackingStatus::WaitingStage2Nb => (
            TimerKind::StartPolling,
            TimerKind::PollStages,
            TrackingStatus::MonitoringStage2Nb,
        ),
        TrackingStatus::WaitingStage2Mta => (
            TimerKind::WaitMta,
            TimerKind::PollMta,
            TrackingStatus::MonitoringStage2Mta,
        ),
        _ => return Vec::new(),
    };

    let mut next = build.clone();
    next.status = status;
    next.polling_started_at = Some(now);
    let bn = build.build_number.as_str();
    vec![
        cancel_timer(wait, bn),
        Effect::Persist(Operation::UpsertTracked(next)),
        set_timer(poll, bn, TimerSchedule::Every(config.polling_interval())),
    ]
}

/// A wake for a build that no longer needs it: drop the timer.
pub fn stale_wake(id: &TimerId) -> Vec<Effect> {
    vec![Effect::CancelTimer { id: id.clone() }]
}

/// End of the delay window for a `waiting_*` build, if it has an anchor
pub fn delay_end(build: &TrackedBuild, config: &TrackerConfig) -> Option<DateTime<Utc>> {
    let anchor = match build.status {
        TrackingStatus::WaitingStage2Nb => build.stage1_completed_at(),
        TrackingStatus::WaitingStage2Mta => build.stage3_completed_at(),
        _ => None,
    }?;
    Some(anchor + config.stage_delay())
}

/// Re-arm timers after a restart.
///
/// History is pruned first. Every in-flight build gets the one timer its
/// status calls for; waiting builds whose delay already passed (or that
/// lost their anchor) advance straight to polling, and terminal records left
/// in flight are moved to history.
pub fn reconcile<'a>(
    builds: impl IntoIterator<Item = &'a TrackedBuild>,
    config: &TrackerConfig,
    now: DateTime<Utc>,
) -> Vec<Effect> {
    let mut effects = vec![Effect::Persist(Operation::PruneHistory { now })];

    for build in builds {
        let bn = build.build_number.as_str();
        match build.status {
            TrackingStatus::MonitoringStage1 => effects.push(set_timer(
                TimerKind::CheckStage1,
                bn,
                TimerSchedule::Every(config.stage1_interval()),
            )),
            TrackingStatus::MonitoringStage2Nb | TrackingStatus::MonitoringStage3 => effects
                .push(set_timer(
                    TimerKind::PollStages,
                    bn,
                    TimerSchedule::Every(config.polling_interval()),
                )),
            TrackingStatus::MonitoringStage2Mta => effects.push(set_timer(
                TimerKind::PollMta,
                bn,
                TimerSchedule::Every(config.polling_interval()),
            )),
            TrackingStatus::WaitingStage2Nb | TrackingStatus::WaitingStage2Mta => {
                match delay_end(build, config).filter(|end| *end > now) {
                    Some(end) => {
                        let kind = if build.status == TrackingStatus::WaitingStage2Nb {
                            TimerKind::StartPolling
                        } else {
                            TimerKind::WaitMta
                        };
                        effects.push(set_timer(kind, bn, TimerSchedule::Once(to_std(end - now))));
                    }
                    None => effects.extend(on_delay_elapsed(build, config, now)),
                }
            }
            TrackingStatus::Completed | TrackingStatus::Failed | TrackingStatus::Timeout => {
                effects.push(Effect::Persist(Operation::Finalize {
                    build: build.clone(),
                    completed_at: now,
                }))
            }
        }
    }

    effects
}

#[cfg(test)]
#[path = "tracking_tests.rs"]
mod tests;
