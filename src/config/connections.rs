//! Connection configuration
//!
//! Manages SFDB connection profiles stored in ~/.sfdb-admin/connections.toml
//! and the `user:password@host:port/db?ttl=N` token sent to the admin API.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Database used when none is given
pub const DEFAULT_DATABASE: &str = "MAIN";

/// Session TTL in seconds used when none is given
pub const DEFAULT_TTL_SECONDS: u32 = 60;

/// SFDB connection parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Connection profile name
    #[serde(default)]
    pub name: String,

    /// SFDB host
    pub host: String,

    /// SFDB port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username
    #[serde(default = "default_user")]
    pub user: String,

    /// Password
    #[serde(default, skip_serializing)]
    pub password: String,

    /// Database name
    #[serde(default = "default_database")]
    pub database: String,

    /// Server-side session TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConnectionsFile {
    #[serde(default)]
    connections: Vec<ConnectionConfig>,
}

fn default_port() -> u16 {
    27910
}

fn default_user() -> String {
    "root".to_string()
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_ttl() -> u32 {
    DEFAULT_TTL_SECONDS
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            name: "local".to_string(),
            host: "localhost".to_string(),
            port: default_port(),
            user: default_user(),
            password: String::new(),
            database: default_database(),
            ttl_seconds: default_ttl(),
        }
    }
}

impl ConnectionConfig {
    /// Parse a `user:password@host:port/db?ttl=N` token into a ConnectionConfig
    pub fn from_conn_str(token: &str) -> ConfigResult<Self> {
        let token = token.trim();

        let (creds, target) = token
            .rsplit_once('@')
            .ok_or_else(|| ConfigError::Invalid("connection string must contain @".into()))?;

        let (user, password) = match creds.split_once(':') {
            Some((u, p)) => (u.to_string(), p.to_string()),
            None => (creds.to_string(), String::new()),
        };

        let (target, query) = match target.split_once('?') {
            Some((t, q)) => (t, Some(q)),
            None => (target, None),
        };

        let (host_port, database) = match target.split_once('/') {
            Some((hp, db)) if !db.is_empty() => (hp, db.to_string()),
            Some((hp, _)) => (hp, default_database()),
            None => (target, default_database()),
        };

        let (host, port) = match host_port.rsplit_once(':') {
            Some((h, p)) => {
                let port = p
                    .parse::<u16>()
                    .map_err(|_| ConfigError::Invalid(format!("Invalid port: {}", p)))?;
                (h.to_string(), port)
            }
            None => (host_port.to_string(), default_port()),
        };

        let ttl_seconds = match query {
            Some(q) => parse_ttl_param(q)?,
            None => default_ttl(),
        };

        let config = Self {
            name: format!("{}@{}", database, host),
            host,
            port,
            user,
            password,
            database,
            ttl_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build the connection token sent to `/connect`
    pub fn conn_str(&self) -> String {
        format!(
            "{}:{}@{}:{}/{}?ttl={}",
            self.user, self.password, self.host, self.port, self.database, self.ttl_seconds
        )
    }

    /// Connection target without credentials, safe to log
    pub fn display_target(&self) -> String {
        format!("{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }

    /// Check the parameters the connection form would reject
    pub fn validate(&self) -> ConfigResult<()> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be between 1 and 65535".into()));
        }
        if self.ttl_seconds == 0 {
            return Err(ConfigError::Invalid("ttl must be at least 1 second".into()));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::Invalid("database must not be empty".into()));
        }
        Ok(())
    }

    /// Get the config directory path (~/.sfdb-admin/)
    pub fn config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".sfdb-admin"))
    }

    /// Get the connections file path
    pub fn connections_file() -> ConfigResult<PathBuf> {
        Ok(Self::config_dir()?.join("connections.toml"))
    }
}

/// Parse the `ttl` value from the token's query string
fn parse_ttl_param(query: &str) -> ConfigResult<u32> {
    for param in query.split('&') {
        if let Some(value) = param.strip_prefix("ttl=") {
            return value
                .parse::<u32>()
                .map_err(|_| ConfigError::Invalid(format!("Invalid ttl: {}", value)));
        }
    }
    Ok(default_ttl())
}

/// Load all connection profiles from config file
pub fn load_connections() -> ConfigResult<Vec<ConnectionConfig>> {
    load_connections_from(&ConnectionConfig::connections_file()?)
}

/// Load connection profiles from an explicit path
pub fn load_connections_from(path: &Path) -> ConfigResult<Vec<ConnectionConfig>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::NotFound(format!("Failed to read connections file: {}", e)))?;
    let file: ConnectionsFile = toml::from_str(&content)?;
    Ok(file.connections)
}

/// Find a connection by name
pub fn find_connection(name: &str) -> ConfigResult<ConnectionConfig> {
    let connections = load_connections()?;
    connections
        .into_iter()
        .find(|c| c.name == name)
        .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
}
