//! Configuration loading and management
//!
//! Handles parsing of `.opsboard.toml` configuration files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::poller::PollKind;

/// Config file name looked up in the working directory
pub const CONFIG_FILE: &str = ".opsboard.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote data source settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Per-resource poll intervals
    #[serde(default)]
    pub poll: PollConfig,

    /// Local board persistence settings
    #[serde(default)]
    pub board: BoardConfig,
}

/// Remote data source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the per-resource paths are joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Tasks resource path
    #[serde(default = "default_tasks_path")]
    pub tasks_path: String,

    /// Token statistics resource path
    #[serde(default = "default_token_stats_path")]
    pub token_stats_path: String,

    /// Activity feed resource path
    #[serde(default = "default_activity_path")]
    pub activity_path: String,

    /// Bot status resource path
    #[serde(default = "default_bot_status_path")]
    pub bot_status_path: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_tasks_path() -> String {
    "tasks.json".to_string()
}

fn default_token_stats_path() -> String {
    "token-stats.json".to_string()
}

fn default_activity_path() -> String {
    "activity.json".to_string()
}

fn default_bot_status_path() -> String {
    "bot-status.json".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tasks_path: default_tasks_path(),
            token_stats_path: default_token_stats_path(),
            activity_path: default_activity_path(),
            bot_status_path: default_bot_status_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Full URL for one poll kind's resource
    pub fn resource_url(&self, kind: PollKind) -> String {
        let path = match kind {
            PollKind::Tasks => &self.tasks_path,
            PollKind::TokenStats => &self.token_stats_path,
            PollKind::Activity => &self.activity_path,
            PollKind::BotStatus => &self.bot_status_path,
        };
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Poll interval configuration, one fixed interval per data kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Tasks resource refresh interval in seconds
    #[serde(default = "default_slow_interval")]
    pub tasks_secs: u64,

    /// Token statistics refresh interval in seconds
    #[serde(default = "default_slow_interval")]
    pub token_stats_secs: u64,

    /// Activity feed refresh interval in seconds
    #[serde(default = "default_slow_interval")]
    pub activity_secs: u64,

    /// Bot status refresh interval in seconds
    #[serde(default = "default_fast_interval")]
    pub bot_status_secs: u64,
}

fn default_slow_interval() -> u64 {
    60
}

fn default_fast_interval() -> u64 {
    30
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            tasks_secs: default_slow_interval(),
            token_stats_secs: default_slow_interval(),
            activity_secs: default_slow_interval(),
            bot_status_secs: default_fast_interval(),
        }
    }
}

impl PollConfig {
    /// Interval for one poll kind
    pub fn interval(&self, kind: PollKind) -> Duration {
        let secs = match kind {
            PollKind::Tasks => self.tasks_secs,
            PollKind::TokenStats => self.token_stats_secs,
            PollKind::Activity => self.activity_secs,
            PollKind::BotStatus => self.bot_status_secs,
        };
        Duration::from_secs(secs)
    }
}

/// Local board persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Directory for the persisted board snapshot (defaults to the platform
    /// data dir when unset)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a `.opsboard.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "api.base_url cannot be empty".to_string(),
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "api.timeout_secs must be > 0".to_string(),
            ));
        }
        for (field, value) in [
            ("poll.tasks_secs", self.poll.tasks_secs),
            ("poll.token_stats_secs", self.poll.token_stats_secs),
            ("poll.activity_secs", self.poll.activity_secs),
            ("poll.bot_status_secs", self.poll.bot_status_secs),
        ] {
            if value == 0 {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "{field} must be > 0"
                )));
            }
        }
        for (field, value) in [
            ("api.tasks_path", &self.api.tasks_path),
            ("api.token_stats_path", &self.api.token_stats_path),
            ("api.activity_path", &self.api.activity_path),
            ("api.bot_status_path", &self.api.bot_status_path),
        ] {
            if value.trim().is_empty() {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "{field} cannot be empty"
                )));
            }
        }
        Ok(())
    }
}
