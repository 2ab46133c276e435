//! Application configuration management.
//!
//! Handles loading and validating the runtime settings: the API key list,
//! pacing delays, and the sheet layout (which row enrichment starts at and
//! which columns are read and written).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Application configuration.
///
/// Every field except `api_keys` has a default, so a minimal config file is
/// just `{"api_keys": ["..."]}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// YouTube Data API keys, tried in order. Must not be empty.
    #[serde(default)]
    pub api_keys: Vec<String>,
    /// Pause after each successfully enriched row, in seconds.
    #[serde(default = "default_row_delay_secs")]
    pub row_delay_secs: u64,
    /// Pause after every API key has hit its quota, in seconds.
    #[serde(default = "default_quota_backoff_secs")]
    pub quota_backoff_secs: u64,
    /// Per-request HTTP timeout, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// First 1-based sheet row to process (row 1 is the header).
    #[serde(default = "default_start_row")]
    pub start_row: usize,
    /// 1-based column holding the channel URL.
    #[serde(default = "default_url_column")]
    pub url_column: usize,
    /// First 1-based column the five metadata values are written to.
    #[serde(default = "default_output_column")]
    pub output_column: usize,
    /// 1-based column that receives the "Invalid URL" marker.
    ///
    /// Defaults to 6, the convention of the sheet layout this tool grew up
    /// with (the marker lands inside the output block).
    #[serde(default = "default_marker_column")]
    pub marker_column: usize,
}

const fn default_row_delay_secs() -> u64 {
    5
}

const fn default_quota_backoff_secs() -> u64 {
    3600
}

const fn default_http_timeout_secs() -> u64 {
    30
}

const fn default_start_row() -> usize {
    2
}

const fn default_url_column() -> usize {
    2
}

const fn default_output_column() -> usize {
    3
}

const fn default_marker_column() -> usize {
    6
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            row_delay_secs: default_row_delay_secs(),
            quota_backoff_secs: default_quota_backoff_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            start_row: default_start_row(),
            url_column: default_url_column(),
            output_column: default_output_column(),
            marker_column: default_marker_column(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is missing, unreadable,
    /// unparseable, or fails validation.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&default_config_path())
    }

    /// Load configuration from an explicit path.
    ///
    /// Unlike settings that can fall back to defaults, a missing config file
    /// is an error here: a default config carries no API keys and cannot
    /// authenticate a single request.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, unparseable, or
    /// fails validation.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Configuration(format!(
                "config file not found at {}: create it with at least {{\"api_keys\": [\"...\"]}}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            Error::Configuration(format!(
                "failed to parse config file {}: {e}",
                path.display()
            ))
        })?;

        config.validate()?;

        info!("loaded config from {}", path.display());
        debug!(
            "{} API key(s), row delay {}s, quota backoff {}s",
            config.api_keys.len(),
            config.row_delay_secs,
            config.quota_backoff_secs
        );

        Ok(config)
    }

    /// Save configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// file cannot be written.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;

        info!("saved config to {}", path.display());
        Ok(())
    }

    /// Check the configuration for values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.api_keys.is_empty() {
            return Err(Error::Configuration(
                "at least one API key is required".to_string(),
            ));
        }
        if self.api_keys.iter().any(|k| k.trim().is_empty()) {
            return Err(Error::Configuration(
                "API keys must not be blank".to_string(),
            ));
        }
        if self.start_row == 0
            || self.url_column == 0
            || self.output_column == 0
            || self.marker_column == 0
        {
            return Err(Error::Configuration(
                "sheet rows and columns are 1-based; zero is not a valid address".to_string(),
            ));
        }
        Ok(())
    }

    /// Pause inserted after each successfully enriched row.
    #[must_use]
    pub const fn row_delay(&self) -> Duration {
        Duration::from_secs(self.row_delay_secs)
    }

    /// Pause taken when the whole key pool is quota-exhausted.
    #[must_use]
    pub const fn quota_backoff(&self) -> Duration {
        Duration::from_secs(self.quota_backoff_secs)
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Default config file location.
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("channelsheet")
        .join("config.json")
}
