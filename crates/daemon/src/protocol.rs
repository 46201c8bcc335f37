// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between `bt` and `btd`.
//!
//! Each message is a 4-byte big-endian length followed by a JSON body.
//! One request and one response per connection.

use bt_core::{HistoricalBuild, TrackedBuild};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Protocol version, tied to the crate version
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout for reading or writing one message
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest accepted message body
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Request from CLI to daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    Ping,
    Hello {
        version: String,
    },
    Status,
    Shutdown,
    /// Begin tracking a build; acknowledged before it is processed
    StartTracking {
        build_number: String,
    },
    /// Stop tracking every build; acknowledged before it is processed
    ClearAll,
    Query {
        query: Query,
    },
}

/// Read-only queries over tracker state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Query {
    ListTracked,
    GetTracked { build_number: String },
    History,
}

/// Response from daemon to CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Ok,
    Pong,
    Hello {
        version: String,
    },
    ShuttingDown,
    /// Command queued for the event loop
    Accepted,
    Status {
        uptime_secs: u64,
        tracked: usize,
        timers_armed: usize,
    },
    Tracked {
        builds: Vec<TrackedBuild>,
    },
    Build {
        build: Option<Box<TrackedBuild>>,
    },
    History {
        builds: Vec<HistoricalBuild>,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("timed out")]
    Timeout,

    #[error("connection closed")]
    ConnectionClosed,
}

/// Serialize a message body (no length prefix)
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write one length-prefixed message
pub async fn write_message<W>(writer: &mut W, data: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: data.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let len = u32::try_from(data.len()).map_err(|_| ProtocolError::MessageTooLarge {
        size: data.len(),
        max: MAX_MESSAGE_SIZE,
    })?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed message.
///
/// EOF before the length prefix means the peer hung up.
pub async fn read_message<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut data = vec![0u8; len];
    reader.read_exact(&mut data).await?;
    Ok(data)
}

/// Read and decode a request within `timeout`
pub async fn read_request<R>(reader: &mut R, timeout: Duration) -> Result<Request, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

/// Encode and write a response within `timeout`
pub async fn write_response<W>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let data = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &data))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
