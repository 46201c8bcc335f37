// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bt daemon library: IPC protocol and on-disk layout shared with the CLI

pub mod paths;
pub mod protocol;

pub use paths::{read_startup_error, DaemonPaths, PathsError, STARTUP_MARKER_PREFIX};
pub use protocol::{
    ProtocolError, Query, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION,
};
