// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use crate::Scheduler;
use bt_adapters::NotifyAdapter;
use bt_core::{Clock, Effect, TimerSchedule};
use bt_storage::Store;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors that can occur during effect execution
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("storage error: {0}")]
    Storage(#[from] bt_storage::StorageError),
}

/// Executes effects against the store, the scheduler and the notifier
pub struct Executor<N, C> {
    notify: N,
    store: Arc<Mutex<Store>>,
    scheduler: Arc<Mutex<Scheduler>>,
    clock: C,
}

impl<N, C> Executor<N, C>
where
    N: NotifyAdapter,
    C: Clock,
{
    pub fn new(
        notify: N,
        store: Arc<Mutex<Store>>,
        scheduler: Arc<Mutex<Scheduler>>,
        clock: C,
    ) -> Self {
        Self {
            notify,
            store,
            scheduler,
            clock,
        }
    }

    /// Execute a single effect with tracing
    pub async fn execute(&self, effect: Effect) -> Result<(), ExecuteError> {
        use bt_core::TracedEffect;

        let op_name = effect.name();
        let fields = effect.fields();
        tracing::debug!(effect = op_name, ?fields, "executing");

        let start = std::time::Instant::now();
        let result = self.execute_inner(effect).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => tracing::debug!(effect = op_name, elapsed_ms, "completed"),
            Err(e) => tracing::error!(effect = op_name, elapsed_ms, error = %e, "failed"),
        }

        result
    }

    async fn execute_inner(&self, effect: Effect) -> Result<(), ExecuteError> {
        match effect {
            Effect::Persist(operation) => {
                let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
                store.apply(&operation)?;
            }

            Effect::SetTimer { id, schedule } => {
                let now = self.clock.now();
                let mut scheduler = self.scheduler.lock().unwrap_or_else(|e| e.into_inner());
                match schedule {
                    TimerSchedule::Once(duration) => scheduler.set_timer(id.name(), duration, now),
                    TimerSchedule::Every(interval) => {
                        scheduler.set_repeating(id.name(), interval, now)
                    }
                }
            }

            Effect::CancelTimer { id } => {
                self.scheduler
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .cancel_timer(&id.name());
            }

            // A lost notification must not stop the transition it reports
            Effect::Notify(notification) => {
                let id = notification.id.clone();
                if let Err(e) = self.notify.notify(notification).await {
                    tracing::warn!(%id, error = %e, "notification failed");
                }
            }
        }
        Ok(())
    }

    /// Execute multiple effects in order, stopping at the first failure
    pub async fn execute_all(&self, effects: Vec<Effect>) -> Result<(), ExecuteError> {
        for effect in effects {
            self.execute(effect).await?;
        }
        Ok(())
    }

    pub fn store(&self) -> Arc<Mutex<Store>> {
        Arc::clone(&self.store)
    }

    pub fn scheduler(&self) -> Arc<Mutex<Scheduler>> {
        Arc::clone(&self.scheduler)
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
