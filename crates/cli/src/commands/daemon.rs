// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bt daemon`: manage the background tracker process

use crate::client::{daemon_stop, read_daemon_pid, DaemonClient};
use anyhow::Result;
use bt_daemon::DaemonPaths;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon if it is not running
    Start,
    /// Stop the daemon
    Stop,
    /// Show whether the daemon is running
    Status,
    /// Print the daemon log
    Logs {
        /// Number of trailing lines to show
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },
}

pub async fn handle(args: DaemonArgs, paths: &DaemonPaths) -> Result<()> {
    match args.command {
        DaemonCommand::Start => start(paths).await,
        DaemonCommand::Stop => stop(paths).await,
        DaemonCommand::Status => status(paths).await,
        DaemonCommand::Logs { lines } => logs(paths, lines),
    }
}

async fn start(paths: &DaemonPaths) -> Result<()> {
    if DaemonClient::connect(paths).is_ok() {
        println!("Daemon already running");
        return Ok(());
    }
    let client = DaemonClient::connect_or_start(paths).await?;
    let version = client.hello().await?;
    println!("Daemon started (version {})", version);
    Ok(())
}

async fn stop(paths: &DaemonPaths) -> Result<()> {
    if daemon_stop(paths).await? {
        println!("Daemon stopped");
    } else {
        println!("Daemon not running");
    }
    Ok(())
}

async fn status(paths: &DaemonPaths) -> Result<()> {
    let Ok(client) = DaemonClient::connect(paths) else {
        println!("Daemon not running");
        return Ok(());
    };

    // A leftover socket with no daemon behind it
    let (status, version) = match (client.status().await, client.hello().await) {
        (Ok(status), Ok(version)) => (status, version),
        _ => {
            println!("Daemon not running");
            return Ok(());
        }
    };

    println!("Status: running");
    if let Some(pid) = read_daemon_pid(paths) {
        println!("PID: {}", pid);
    }
    println!("Version: {}", version);
    println!("Uptime: {}", format_uptime(status.uptime_secs));
    println!("Tracked builds: {}", status.tracked);
    println!("Timers armed: {}", status.timers_armed);
    Ok(())
}

fn logs(paths: &DaemonPaths, lines: usize) -> Result<()> {
    let content = match std::fs::read_to_string(&paths.log_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("No daemon log at {}", paths.log_path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for line in tail(&content, lines) {
        println!("{}", line);
    }
    Ok(())
}

/// Last `n` lines of `content`
fn tail(content: &str, n: usize) -> Vec<&str> {
    let all: Vec<&str> = content.lines().collect();
    all[all.len().saturating_sub(n)..].to_vec()
}

fn format_uptime(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {}m {}s", h, m, s)
    } else if m > 0 {
        format!("{}m {}s", m, s)
    } else {
        format!("{}s", s)
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
