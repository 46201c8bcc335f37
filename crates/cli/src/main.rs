// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bt - build tracker CLI

mod client;
mod commands;
mod completions;
mod error;
mod output;

use anyhow::Result;
use bt_core::validate_build_number;
use bt_daemon::DaemonPaths;
use clap::{Parser, Subcommand};
use commands::{builds, config, daemon};
use completions::CompletionsArgs;
use error::BtError;
use output::OutputFormat;
use tracing_subscriber::EnvFilter;

use crate::client::DaemonClient;

#[derive(Parser)]
#[command(
    name = "bt",
    version,
    about = "Build tracker - follow a build through its pipeline stages"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start tracking a build by number
    Track {
        /// Build number (at least 4 digits)
        build_number: String,
    },
    /// Stop tracking every build
    Clear,
    /// List builds being tracked
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Show one tracked build
    Show {
        build_number: String,
        /// Fetch the live state of each recorded stage build
        #[arg(long)]
        refresh: bool,
        #[arg(long)]
        json: bool,
    },
    /// List finished builds, newest first
    History {
        #[arg(long)]
        json: bool,
    },
    /// View or edit settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommand,
    },
    /// Daemon management
    Daemon(daemon::DaemonArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    // Commands that never need the daemon
    let command = match cli.command {
        Commands::Completions(args) => {
            completions::generate_completions::<Cli>(args.shell);
            return Ok(());
        }
        Commands::Config { command } => return config::handle(command),
        Commands::Daemon(args) => {
            let paths = DaemonPaths::from_env()?;
            return daemon::handle(args, &paths).await;
        }
        // Reject bad input before spawning anything
        Commands::Track { build_number } if !validate_build_number(build_number.trim()) => {
            return Err(BtError::invalid_build_number(build_number.trim()).into());
        }
        command => command,
    };

    let paths = DaemonPaths::from_env()?;
    let client = DaemonClient::connect_or_start(&paths).await?;

    match command {
        Commands::Track { build_number } => builds::track(&client, &build_number).await,
        Commands::Clear => builds::clear(&client).await,
        Commands::Status { json } => {
            builds::status(&client, OutputFormat::from_json_flag(json)).await
        }
        Commands::Show {
            build_number,
            refresh,
            json,
        } => {
            builds::show(
                &client,
                &build_number,
                refresh,
                OutputFormat::from_json_flag(json),
            )
            .await
        }
        Commands::History { json } => {
            builds::history(&client, OutputFormat::from_json_flag(json)).await
        }
        Commands::Completions(_) | Commands::Config { .. } | Commands::Daemon(_) => Ok(()),
    }
}
