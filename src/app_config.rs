use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::lyric_document::MergeOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Merge time labels that fall within the tolerance window
    #[serde(default = "default_true")]
    pub merge_lyrics: bool,

    /// Merge tolerance window in milliseconds
    #[serde(default = "default_merge_window_ms")]
    pub merge_window_ms: u64,

    /// Candidate output directories, tried in declaration order
    #[serde(default)]
    pub outputs: Vec<PathBuf>,

    /// Only write lyrics next to an already present audio file
    #[serde(default)]
    pub exist_only: bool,

    /// Overwrite lyric files that already exist
    #[serde(default)]
    pub overwrite: bool,

    /// API client settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// NCM API client settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of retries after a failed request
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Cookie snapshot location, platform config directory when unset
    #[serde(default)]
    pub cookie_path: Option<PathBuf>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

// Windows wider than this would glue unrelated lines together
const MAX_MERGE_WINDOW_MS: u64 = 10_000;

fn default_true() -> bool {
    true
}

fn default_merge_window_ms() -> u64 {
    20
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    4 // Default to 4 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

/// Directory holding the config file and the cookie snapshot
pub fn app_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("ncmlyrics"))
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_secs == 0 {
            return Err(anyhow!("API timeout must be at least one second"));
        }

        if self.api.retry_backoff_ms == 0 {
            return Err(anyhow!("Retry backoff must be at least one millisecond"));
        }

        if self.merge_window_ms > MAX_MERGE_WINDOW_MS {
            return Err(anyhow!(
                "Merge window of {} ms is wider than the allowed maximum of {} ms",
                self.merge_window_ms,
                MAX_MERGE_WINDOW_MS
            ));
        }

        Ok(())
    }

    // @returns: Merge options derived from this configuration
    pub fn merge_options(&self) -> MergeOptions {
        if self.merge_lyrics {
            MergeOptions::with_window(self.merge_window_ms)
        } else {
            MergeOptions::disabled()
        }
    }

    /// Default config file location under the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        app_config_dir().map(|dir| dir.join("config.json"))
    }
}

impl ApiConfig {
    // @returns: Cookie snapshot path, falling back to the platform config directory
    pub fn get_cookie_path(&self) -> Option<PathBuf> {
        self.cookie_path
            .clone()
            .or_else(|| app_config_dir().map(|dir| dir.join("cookies.json")))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            merge_lyrics: true,
            merge_window_ms: default_merge_window_ms(),
            outputs: Vec::new(),
            exist_only: false,
            overwrite: false,
            api: ApiConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            cookie_path: None,
        }
    }
}
