// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracker and connection configuration
//!
//! Settings live in a single `config.toml`. Every section and key is
//! optional; anything missing keeps its default, so a partial file merges
//! shallowly over the defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Overrides the config file location
pub const CONFIG_ENV: &str = "BT_CONFIG";

/// Overrides the personal access token from the config file
pub const PAT_ENV: &str = "BT_AZURE_PAT";

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Pipeline definition ids for the three pipelines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineIds {
    pub stage1: String,
    /// Shared by Stage 2 - NB and Stage 2 - MTA
    pub stage2: String,
    pub stage3: String,
}

/// `[azure]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureSettings {
    pub org_url: String,
    pub project: String,
    pub pat: String,
    pub pipelines: PipelineIds,
}

/// `[tracker]` section: polling cadence and limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub stage1_interval_minutes: u32,
    pub stage1_max_attempts: u32,
    /// Delay before both Stage 2 flavours start polling
    pub delay_after_stage1_minutes: u32,
    pub polling_interval_minutes: u32,
    pub polling_max_attempts: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            stage1_interval_minutes: 2,
            stage1_max_attempts: 60,
            delay_after_stage1_minutes: 20,
            polling_interval_minutes: 5,
            polling_max_attempts: 24,
        }
    }
}

fn minutes(n: u32) -> Duration {
    Duration::from_secs(u64::from(n) * 60)
}

impl TrackerConfig {
    pub fn stage1_interval(&self) -> Duration {
        minutes(self.stage1_interval_minutes)
    }

    pub fn polling_interval(&self) -> Duration {
        minutes(self.polling_interval_minutes)
    }

    pub fn stage_delay(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.delay_after_stage1_minutes))
    }

    /// Wall-clock budget for Stage 1 before the build times out
    pub fn stage1_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(
            i64::from(self.stage1_interval_minutes) * i64::from(self.stage1_max_attempts),
        )
    }

    /// Wall-clock budget for each later stage, display only
    pub fn stage_polling_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(
            i64::from(self.polling_interval_minutes) * i64::from(self.polling_max_attempts),
        )
    }
}

/// `[notifications]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Everything read from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub azure: AzureSettings,
    pub tracker: TrackerConfig,
    pub notifications: NotificationSettings,
}

/// A complete set of connection parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub org_url: String,
    pub project: String,
    pub pat: String,
    pub pipelines: PipelineIds,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Write settings to a file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, text).map_err(write_err)
    }

    /// The connection parameters, if every one of them is set
    pub fn connection(&self) -> Option<Connection> {
        let azure = &self.azure;
        Some(Connection {
            org_url: non_empty(&azure.org_url)?,
            project: non_empty(&azure.project)?,
            pat: non_empty(&azure.pat)?,
            pipelines: PipelineIds {
                stage1: non_empty(&azure.pipelines.stage1)?,
                stage2: non_empty(&azure.pipelines.stage2)?,
                stage3: non_empty(&azure.pipelines.stage3)?,
            },
        })
    }

    /// Set one value by dotted key, e.g. `tracker.polling_interval_minutes`
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let positive = || -> Result<u32, ConfigError> {
            match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(invalid()),
            }
        };

        match key {
            "azure.org_url" => self.azure.org_url = value.trim_end_matches('/').to_string(),
            "azure.project" => self.azure.project = value.to_string(),
            "azure.pat" => self.azure.pat = value.to_string(),
            "azure.pipelines.stage1" => self.azure.pipelines.stage1 = value.to_string(),
            "azure.pipelines.stage2" => self.azure.pipelines.stage2 = value.to_string(),
            "azure.pipelines.stage3" => self.azure.pipelines.stage3 = value.to_string(),
            "tracker.stage1_interval_minutes" => self.tracker.stage1_interval_minutes = positive()?,
            "tracker.stage1_max_attempts" => self.tracker.stage1_max_attempts = positive()?,
            "tracker.delay_after_stage1_minutes" => {
                self.tracker.delay_after_stage1_minutes =
                    value.trim().parse().map_err(|_| invalid())?
            }
            "tracker.polling_interval_minutes" => {
                self.tracker.polling_interval_minutes = positive()?
            }
            "tracker.polling_max_attempts" => self.tracker.polling_max_attempts = positive()?,
            "notifications.enabled" => {
                self.notifications.enabled = value.trim().parse().map_err(|_| invalid())?
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// A copy safe to display, with the access token masked
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        if !masked.azure.pat.is_empty() {
            masked.azure.pat = "********".to_string();
        }
        masked
    }
}

/// Resolve the config file path.
///
/// `$BT_CONFIG` wins, then `$XDG_CONFIG_HOME/bt/config.toml`, then
/// `~/.config/bt/config.toml`.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Ok(PathBuf::from(xdg).join("bt").join(CONFIG_FILE));
        }
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(home.join(".config").join("bt").join(CONFIG_FILE))
}

/// Where settings come from at each wake
pub trait ConfigSource: Send + Sync + 'static {
    fn load(&self) -> Result<Settings, ConfigError>;
}

/// Reads `config.toml` from disk on every load
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
    pat_override: Option<String>,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pat_override: None,
        }
    }

    /// File source at the resolved config path, honouring `$BT_AZURE_PAT`
    pub fn from_env() -> Result<Self, ConfigError> {
        let pat_override = std::env::var(PAT_ENV).ok().filter(|p| !p.is_empty());
        Ok(Self::new(config_path()?).with_pat_override(pat_override))
    }

    pub fn with_pat_override(mut self, pat: Option<String>) -> Self {
        self.pat_override = pat;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> Result<Settings, ConfigError> {
        let mut settings = Settings::load(&self.path)?;
        if let Some(pat) = &self.pat_override {
            settings.azure.pat = pat.clone();
        }
        Ok(settings)
    }
}

/// Fixed in-memory settings
#[derive(Debug, Clone, Default)]
pub struct StaticConfigSource {
    settings: Settings,
}

impl StaticConfigSource {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl ConfigSource for StaticConfigSource {
    fn load(&self) -> Result<Settings, ConfigError> {
        Ok(self.settings.clone())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
