// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use bt_core::{validate_build_number, Command};
use bt_daemon::protocol::{self, Query, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};
use tokio::net::UnixStream;
use tracing::{debug, error, warn};

use crate::lifecycle::DaemonState;

/// Handle a single client connection
pub async fn handle_connection(
    daemon: &mut DaemonState,
    stream: UnixStream,
) -> Result<(), ServerError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!(?request, "received request");
    let response = handle_request(daemon, request);
    debug!(?response, "sending response");

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
        .await
        .map_err(ServerError::Protocol)?;

    Ok(())
}

/// Handle a single request and return a response.
///
/// Tracking commands are queued for the event loop and acknowledged at once.
fn handle_request(daemon: &mut DaemonState, request: Request) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "client version differs");
            }
            Response::Hello {
                version: PROTOCOL_VERSION.to_string(),
            }
        }

        Request::Status => Response::Status {
            uptime_secs: daemon.start_time.elapsed().as_secs(),
            tracked: daemon.runtime.tracked_builds().len(),
            timers_armed: daemon.runtime.timer_names().len(),
        },

        Request::Shutdown => {
            daemon.shutdown_requested = true;
            Response::ShuttingDown
        }

        Request::StartTracking { build_number } => {
            if !validate_build_number(&build_number) {
                warn!(build = %build_number, "rejecting invalid build number");
                return Response::Error {
                    message: format!(
                        "invalid build number {:?}: expected at least 4 digits",
                        build_number
                    ),
                };
            }
            enqueue(daemon, Command::StartTracking { build_number })
        }

        Request::ClearAll => enqueue(daemon, Command::ClearAll),

        Request::Query { query } => handle_query(daemon, query),
    }
}

fn enqueue(daemon: &DaemonState, command: Command) -> Response {
    match daemon.enqueue(command) {
        Ok(()) => Response::Accepted,
        Err(e) => Response::Error {
            message: e.to_string(),
        },
    }
}

/// Handle query requests
fn handle_query(daemon: &DaemonState, query: Query) -> Response {
    match query {
        Query::ListTracked => Response::Tracked {
            builds: daemon.runtime.tracked_builds(),
        },
        Query::GetTracked { build_number } => Response::Build {
            build: daemon.runtime.tracked_build(&build_number).map(Box::new),
        },
        Query::History => Response::History {
            builds: daemon.runtime.history(),
        },
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Request timeout")]
    Timeout,
}
