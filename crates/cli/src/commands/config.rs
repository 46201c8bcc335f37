// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bt config`: view and edit config.toml

use crate::output::OutputFormat;
use anyhow::Result;
use bt_core::{config_path, ConfigSource, FileConfigSource, Settings};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective settings (access token masked)
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Set one value, e.g. `bt config set tracker.polling_interval_minutes 10`
    Set { key: String, value: String },
    /// Print the config file location
    Path,
}

pub fn handle(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show { json } => {
            let source = FileConfigSource::from_env()?;
            let settings = source.load()?;
            println!(
                "{}",
                render(&settings, OutputFormat::from_json_flag(json))?
            );
        }
        ConfigCommand::Set { key, value } => {
            let path = config_path()?;
            set_value(&path, &key, &value)?;
            let shown = if key == "azure.pat" { "********" } else { &value };
            println!("Set {} = {}", key, shown);
        }
        ConfigCommand::Path => println!("{}", config_path()?.display()),
    }
    Ok(())
}

/// Load, update and save one key
fn set_value(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut settings = Settings::load(path)?;
    settings.set(key, value)?;
    settings.save(path)?;
    Ok(())
}

fn render(settings: &Settings, format: OutputFormat) -> Result<String> {
    let masked = settings.masked();
    Ok(match format {
        OutputFormat::Text => toml::to_string_pretty(&masked)?,
        OutputFormat::Json => serde_json::to_string_pretty(&masked)?,
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
