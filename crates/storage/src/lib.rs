// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bt-storage: Persistent tracker state
//!
//! The whole state is one JSON document, rewritten atomically after every
//! operation.

mod state;
mod store;

pub use state::MaterializedState;
pub use store::{Store, StorageError, STATE_FILE};
