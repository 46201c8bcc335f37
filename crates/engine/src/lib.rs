// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bt execution engine
//!
//! Runs tracker decisions against the real world: timers, the store, build
//! queries and notifications.

mod error;
mod executor;
mod runtime;
mod scheduler;

pub use error::RuntimeError;
pub use executor::{ExecuteError, Executor};
pub use runtime::{Runtime, RuntimeDeps};
pub use scheduler::Scheduler;
