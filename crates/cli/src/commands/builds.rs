// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build tracking commands: track, clear, status, show, history

use crate::client::DaemonClient;
use crate::error::BtError;
use crate::output::{
    self, BuildDetail, HistoryEntry, OutputFormat, StatusEntry, HISTORY_HEADER, STATUS_HEADER,
};
use anyhow::Result;
use bt_adapters::{AzureBuildQuery, BuildQuery, TracedBuildQuery};
use bt_core::{ConfigSource, Connection, FileConfigSource, Stage, TrackedBuild, TrackerConfig};
use chrono::Utc;
use serde::Serialize;
use std::fmt;

/// Start tracking; the number has already been validated by the caller
pub async fn track(client: &DaemonClient, build_number: &str) -> Result<()> {
    let build_number = build_number.trim();
    let settings = FileConfigSource::from_env()?.load().unwrap_or_default();
    let connected = settings.connection().is_some();

    // Sent regardless so the daemon raises its config-missing notification
    client.start_tracking(build_number).await?;
    if !connected {
        return Err(BtError::connection_incomplete()
            .with_context(format!("Build {} was not tracked", build_number))
            .into());
    }
    println!("Tracking build {}", build_number);
    Ok(())
}

pub async fn clear(client: &DaemonClient) -> Result<()> {
    client.clear_all().await?;
    println!("Cleared all tracked builds");
    Ok(())
}

pub async fn status(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let tracker = tracker_config();
    let now = Utc::now();
    let entries: Vec<StatusEntry> = client
        .list_tracked()
        .await?
        .into_iter()
        .map(|build| StatusEntry::new(build, &tracker, now))
        .collect();

    output::print_list(&entries, STATUS_HEADER, "No builds being tracked", format);
    Ok(())
}

pub async fn show(
    client: &DaemonClient,
    build_number: &str,
    refresh: bool,
    format: OutputFormat,
) -> Result<()> {
    let build_number = build_number.trim();
    let Some(build) = client.get_tracked(build_number).await? else {
        return Err(BtError::build_not_tracked(build_number).into());
    };

    let live = if refresh {
        let settings = FileConfigSource::from_env()?.load()?;
        let conn = settings
            .connection()
            .ok_or_else(BtError::connection_incomplete)?;
        let query = TracedBuildQuery::new(AzureBuildQuery::new()?);
        Some(refresh_stages(&query, &conn, &build).await)
    } else {
        None
    };

    let detail = BuildDetail(StatusEntry::new(build, &tracker_config(), Utc::now()));
    match format {
        OutputFormat::Text => {
            print!("{}", detail);
            if let Some(live) = &live {
                println!("Live:");
                for stage in live {
                    println!("{}", stage);
                }
            }
        }
        OutputFormat::Json => {
            let value = ShowOutput {
                build: &detail,
                live: live.as_deref(),
            };
            output::print_json(&value);
        }
    }
    Ok(())
}

pub async fn history(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let entries: Vec<HistoryEntry> = client
        .history()
        .await?
        .into_iter()
        .map(HistoryEntry)
        .collect();

    output::print_list(&entries, HISTORY_HEADER, "No finished builds", format);
    Ok(())
}

/// Tracker settings for display; defaults when the file is unreadable
fn tracker_config() -> TrackerConfig {
    FileConfigSource::from_env()
        .and_then(|source| source.load())
        .map(|settings| settings.tracker)
        .unwrap_or_default()
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    build: &'a BuildDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    live: Option<&'a [LiveStage]>,
}

/// Current state of one recorded stage build, fetched on demand
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStage {
    pub stage: Stage,
    pub build_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl fmt::Display for LiveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} (#{}): ", self.stage, self.build_id)?;
        if let Some(error) = &self.error {
            return write!(f, "error: {}", error);
        }
        match (&self.status, &self.result) {
            (Some(status), Some(result)) => write!(f, "{} / {}", status, result),
            (Some(status), None) => write!(f, "{}", status),
            _ => write!(f, "not found"),
        }
    }
}

/// Fetch every stage that has a recorded build id.
///
/// Failures are reported per stage so one bad lookup does not hide the rest.
pub async fn refresh_stages<Q: BuildQuery>(
    query: &Q,
    conn: &Connection,
    build: &TrackedBuild,
) -> Vec<LiveStage> {
    let mut live = Vec::new();
    for stage in Stage::ALL {
        let Some(build_id) = build.stages.get(stage).and_then(|r| r.build_id) else {
            continue;
        };
        let mut entry = LiveStage {
            stage,
            build_id,
            status: None,
            result: None,
            error: None,
        };
        match query.get(conn, build_id).await {
            Ok(Some(snapshot)) => {
                entry.status = Some(snapshot.status);
                entry.result = snapshot.result;
            }
            Ok(None) => {}
            Err(e) => entry.error = Some(e.to_string()),
        }
        live.push(entry);
    }
    live
}

#[cfg(test)]
#[path = "builds_tests.rs"]
mod tests;
