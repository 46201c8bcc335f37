// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Azure DevOps build query adapters

mod client;
mod matching;

pub use client::AzureBuildQuery;
pub use matching::{find_match, trailing_digits};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeBuildQuery, QueryCall};

use async_trait::async_trait;
use bt_core::{BuildSnapshot, Connection};
use thiserror::Error;

/// Errors from build queries
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("authentication failed, check the personal access token")]
    Authentication,
    #[error("project or pipeline not found")]
    NotFound,
    #[error("rate limited by Azure DevOps")]
    RateLimited,
    #[error("request failed with HTTP {status}")]
    Http { status: u16 },
    #[error("invalid organization URL {url:?}: {reason}")]
    InvalidOrgUrl { url: String, reason: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Looks up builds in the external build service
#[async_trait]
pub trait BuildQuery: Clone + Send + Sync + 'static {
    /// Find the first build of `pipeline_id` whose build number matches
    /// `query`, optionally also containing `name_filter`
    async fn find(
        &self,
        conn: &Connection,
        pipeline_id: &str,
        query: &str,
        name_filter: Option<&str>,
    ) -> Result<Option<BuildSnapshot>, QueryError>;

    /// Fetch one build by id; `None` if it does not exist
    async fn get(&self, conn: &Connection, build_id: u64)
        -> Result<Option<BuildSnapshot>, QueryError>;
}
