// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Azure DevOps REST client

use super::matching::find_match;
use super::{BuildQuery, QueryError};
use async_trait::async_trait;
use bt_core::{BuildSnapshot, Connection};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

pub const API_VERSION: &str = "7.2-preview.8";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct BuildList {
    #[serde(default)]
    value: Vec<RawBuild>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBuild {
    id: u64,
    #[serde(default)]
    build_number: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    definition: Option<Definition>,
}

#[derive(Debug, Deserialize)]
struct Definition {
    name: Option<String>,
}

/// Organization URL without a trailing slash, checked to be HTTPS
pub fn clean_org_url(org_url: &str) -> Result<String, QueryError> {
    let invalid = |reason: &str| QueryError::InvalidOrgUrl {
        url: org_url.to_string(),
        reason: reason.to_string(),
    };
    let parsed = Url::parse(org_url).map_err(|_| invalid("expected https://dev.azure.com/<org>"))?;
    if parsed.scheme() != "https" {
        return Err(invalid("must use HTTPS"));
    }
    Ok(org_url.trim_end_matches('/').to_string())
}

/// List endpoint for builds of one pipeline definition
pub fn builds_url(conn: &Connection, pipeline_id: &str) -> Result<String, QueryError> {
    let org = clean_org_url(&conn.org_url)?;
    Ok(format!(
        "{org}/{}/_apis/build/builds?definitions={pipeline_id}&statusFilter=all&api-version={API_VERSION}",
        conn.project
    ))
}

/// Endpoint for a single build
pub fn build_url(conn: &Connection, build_id: u64) -> Result<String, QueryError> {
    let org = clean_org_url(&conn.org_url)?;
    Ok(format!(
        "{org}/{}/_apis/build/builds/{build_id}?api-version={API_VERSION}",
        conn.project
    ))
}

/// Human-facing results page for a build
pub fn results_url(org: &str, project: &str, build_id: u64) -> String {
    format!("{org}/{project}/_build/results?buildId={build_id}")
}

/// Map a non-success status to its error
pub fn status_error(status: StatusCode) -> QueryError {
    match status.as_u16() {
        401 | 403 => QueryError::Authentication,
        404 => QueryError::NotFound,
        429 => QueryError::RateLimited,
        code => QueryError::Http { status: code },
    }
}

fn snapshot(raw: RawBuild, org: &str, project: &str) -> BuildSnapshot {
    BuildSnapshot {
        url: results_url(org, project, raw.id),
        id: raw.id,
        build_number: raw.build_number,
        name: raw.definition.and_then(|d| d.name),
        status: raw.status,
        result: raw.result,
    }
}

/// Pick the matching build out of a list response body
pub fn parse_find_response(
    body: &str,
    conn: &Connection,
    query: &str,
    name_filter: Option<&str>,
) -> Result<Option<BuildSnapshot>, QueryError> {
    let list: BuildList =
        serde_json::from_str(body).map_err(|e| QueryError::Decode(e.to_string()))?;
    let org = clean_org_url(&conn.org_url)?;
    let index = find_match(
        list.value.iter().map(|b| b.build_number.as_str()),
        query,
        name_filter,
    );
    Ok(index
        .and_then(|i| list.value.into_iter().nth(i))
        .map(|raw| snapshot(raw, &org, &conn.project)))
}

/// Parse a single-build response body
pub fn parse_get_response(body: &str, conn: &Connection) -> Result<BuildSnapshot, QueryError> {
    let raw: RawBuild =
        serde_json::from_str(body).map_err(|e| QueryError::Decode(e.to_string()))?;
    let org = clean_org_url(&conn.org_url)?;
    Ok(snapshot(raw, &org, &conn.project))
}

/// Build query backed by the Azure DevOps REST API
#[derive(Clone)]
pub struct AzureBuildQuery {
    http: reqwest::Client,
}

impl AzureBuildQuery {
    pub fn new() -> Result<Self, QueryError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("bt/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        Ok(Self { http })
    }

    async fn fetch(&self, url: &str, pat: &str) -> Result<(StatusCode, String), QueryError> {
        let response = self
            .http
            .get(url)
            .basic_auth("", Some(pat))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        Ok((status, body))
    }
}

#[async_trait]
impl BuildQuery for AzureBuildQuery {
    async fn find(
        &self,
        conn: &Connection,
        pipeline_id: &str,
        query: &str,
        name_filter: Option<&str>,
    ) -> Result<Option<BuildSnapshot>, QueryError> {
        let url = builds_url(conn, pipeline_id)?;
        let (status, body) = self.fetch(&url, &conn.pat).await?;
        if !status.is_success() {
            return Err(status_error(status));
        }
        parse_find_response(&body, conn, query, name_filter)
    }

    async fn get(
        &self,
        conn: &Connection,
        build_id: u64,
    ) -> Result<Option<BuildSnapshot>, QueryError> {
        let url = build_url(conn, build_id)?;
        let (status, body) = self.fetch(&url, &conn.pat).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error(status));
        }
        parse_get_response(&body, conn).map(Some)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
