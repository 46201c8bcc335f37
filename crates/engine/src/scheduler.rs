// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named wake-up timers
//!
//! Timers are keyed by name: registering a name that already exists
//! replaces it, and cancelling an unknown name does nothing. Firing is
//! coarse; the daemon polls [`Scheduler::fired_timers`] on a tick.

use bt_core::Event;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Timer {
    fire_at: DateTime<Utc>,
    repeat: Option<Duration>,
}

fn after(now: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    now + chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero())
}

/// In-memory timer table
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: HashMap<String, Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire once, `duration` from `now`
    pub fn set_timer(&mut self, id: String, duration: Duration, now: DateTime<Utc>) {
        self.timers.insert(
            id,
            Timer {
                fire_at: after(now, duration),
                repeat: None,
            },
        );
    }

    /// Fire every `interval`, first one interval from `now`
    pub fn set_repeating(&mut self, id: String, interval: Duration, now: DateTime<Utc>) {
        self.timers.insert(
            id,
            Timer {
                fire_at: after(now, interval),
                repeat: Some(interval),
            },
        );
    }

    pub fn cancel_timer(&mut self, id: &str) {
        self.timers.remove(id);
    }

    pub fn is_armed(&self, id: &str) -> bool {
        self.timers.contains_key(id)
    }

    /// Names of all armed timers, sorted
    pub fn timer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.timers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timers.values().map(|t| t.fire_at).min()
    }

    /// Collect timers due at `now`, earliest first.
    ///
    /// One-shot timers are removed. Repeating timers are re-armed one
    /// interval after `now`, so a long sleep yields a single wake rather
    /// than a burst.
    pub fn fired_timers(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut due: Vec<(DateTime<Utc>, String)> = self
            .timers
            .iter()
            .filter(|(_, t)| t.fire_at <= now)
            .map(|(id, t)| (t.fire_at, id.clone()))
            .collect();
        due.sort();

        for (_, id) in &due {
            let repeat = self.timers.get(id).and_then(|t| t.repeat);
            match repeat {
                Some(interval) => {
                    if let Some(timer) = self.timers.get_mut(id) {
                        timer.fire_at = after(now, interval);
                    }
                }
                None => {
                    self.timers.remove(id);
                }
            }
        }

        due.into_iter().map(|(_, id)| Event::Timer { id }).collect()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
