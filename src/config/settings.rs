//! User settings and preferences
//!
//! Manages client settings stored in ~/.sfdb-admin/config.toml

use crate::config::ConnectionConfig;
use crate::config::connections::DEFAULT_DATABASE;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the admin REST API, including the `/api` prefix
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Seconds between liveness pings while connected
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_database")]
    pub default_database: String,

    /// tracing filter directive, e.g. "sfdb_admin=debug"
    #[serde(default)]
    pub log_filter: Option<String>,
}

fn default_api_endpoint() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_poll_interval() -> u64 {
    1
}

fn default_request_timeout() -> u64 {
    30
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
            default_database: default_database(),
            log_filter: None,
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs must be at least 1".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if !(self.api_endpoint.starts_with("http://") || self.api_endpoint.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "api_endpoint must be an http(s) URL: {}",
                self.api_endpoint
            )));
        }
        Ok(())
    }
}

/// Load settings from config file
pub fn load_settings() -> ConfigResult<Settings> {
    load_settings_from(&ConnectionConfig::config_dir()?.join("config.toml"))
}

/// Load settings from an explicit path, falling back to defaults if absent
pub fn load_settings_from(path: &Path) -> ConfigResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::NotFound(format!("Failed to read settings file: {}", e)))?;
    let settings: Settings = toml::from_str(&content)?;
    settings.validate()?;
    Ok(settings)
}
