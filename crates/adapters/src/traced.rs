// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::azure::{BuildQuery, QueryError};
use crate::notify::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use bt_core::{BuildSnapshot, Connection, Notification};
use tracing::Instrument;

/// Wrapper that adds tracing to any BuildQuery
#[derive(Clone)]
pub struct TracedBuildQuery<Q> {
    inner: Q,
}

impl<Q> TracedBuildQuery<Q> {
    pub fn new(inner: Q) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<Q: BuildQuery> BuildQuery for TracedBuildQuery<Q> {
    async fn find(
        &self,
        conn: &Connection,
        pipeline_id: &str,
        query: &str,
        name_filter: Option<&str>,
    ) -> Result<Option<BuildSnapshot>, QueryError> {
        let span = tracing::info_span!("query.find", pipeline_id, query, filter = ?name_filter);
        async {
            tracing::debug!("searching");

            let start = std::time::Instant::now();
            let result = self.inner.find(conn, pipeline_id, query, name_filter).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(Some(build)) => tracing::info!(
                    build_id = build.id,
                    build_number = %build.build_number,
                    status = %build.status,
                    result = ?build.result,
                    elapsed_ms,
                    "build found"
                ),
                Ok(None) => tracing::info!(elapsed_ms, "no matching build"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "query failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn get(
        &self,
        conn: &Connection,
        build_id: u64,
    ) -> Result<Option<BuildSnapshot>, QueryError> {
        let span = tracing::info_span!("query.get", build_id);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.get(conn, build_id).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(found) => tracing::debug!(elapsed_ms, found = found.is_some(), "fetched"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "fetch failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any NotifyAdapter
#[derive(Clone)]
pub struct TracedNotifyAdapter<N> {
    inner: N,
}

impl<N> TracedNotifyAdapter<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: NotifyAdapter> NotifyAdapter for TracedNotifyAdapter<N> {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let span = tracing::info_span!("notify", id = %notification.id);
        async {
            let result = self.inner.notify(notification).await;
            // A failed notification never blocks tracking
            match &result {
                Ok(()) => tracing::info!("delivered"),
                Err(e) => tracing::warn!(error = %e, "delivery failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
