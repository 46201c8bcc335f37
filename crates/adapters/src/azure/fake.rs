// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake build query for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{BuildQuery, QueryError};
use async_trait::async_trait;
use bt_core::{BuildSnapshot, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryCall {
    Find {
        pipeline_id: String,
        query: String,
        name_filter: Option<String>,
    },
    Get {
        build_id: u64,
    },
}

type FindKey = (String, Option<String>);

#[derive(Default)]
struct FakeState {
    finds: HashMap<FindKey, Result<Option<BuildSnapshot>, QueryError>>,
    gets: HashMap<u64, Result<Option<BuildSnapshot>, QueryError>>,
    calls: Vec<QueryCall>,
}

/// Fake build query with scripted responses per pipeline and filter.
///
/// Unscripted lookups return `Ok(None)`.
#[derive(Clone, Default)]
pub struct FakeBuildQuery {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeBuildQuery {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(pipeline_id: &str, name_filter: Option<&str>) -> FindKey {
        (pipeline_id.to_string(), name_filter.map(str::to_string))
    }

    /// Script the result of `find` for a pipeline and filter
    pub fn set_find(
        &self,
        pipeline_id: &str,
        name_filter: Option<&str>,
        result: Result<Option<BuildSnapshot>, QueryError>,
    ) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.finds.insert(Self::key(pipeline_id, name_filter), result);
    }

    /// Script the result of `get` for a build id
    pub fn set_get(&self, build_id: u64, result: Result<Option<BuildSnapshot>, QueryError>) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.gets.insert(build_id, result);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<QueryCall> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }
}

#[async_trait]
impl BuildQuery for FakeBuildQuery {
    async fn find(
        &self,
        _conn: &Connection,
        pipeline_id: &str,
        query: &str,
        name_filter: Option<&str>,
    ) -> Result<Option<BuildSnapshot>, QueryError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.calls.push(QueryCall::Find {
            pipeline_id: pipeline_id.to_string(),
            query: query.to_string(),
            name_filter: name_filter.map(str::to_string),
        });
        inner
            .finds
            .get(&Self::key(pipeline_id, name_filter))
            .cloned()
            .unwrap_or(Ok(None))
    }

    async fn get(
        &self,
        _conn: &Connection,
        build_id: u64,
    ) -> Result<Option<BuildSnapshot>, QueryError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.calls.push(QueryCall::Get { build_id });
        inner.gets.get(&build_id).cloned().unwrap_or(Ok(None))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
