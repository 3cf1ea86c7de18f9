//! Configuration loading for the Duck Games API server.
//!
//! Configuration lives in `clicker-config.yaml` (or the file named by
//! `CLICKER_CONFIG`). Every field has a default, so the file is
//! optional. A few environment variables override the file so a
//! deployment can change the bind address and database without editing
//! it:
//!
//! - `CLICKER_HOST` overrides `server.host`
//! - `CLICKER_PORT` overrides `server.port`
//! - `DATABASE_URL` overrides `database.url`

use std::path::Path;
use std::time::Duration;

use clicker_core::DEFAULT_OUTBOUND_CAPACITY;
use clicker_db::{DEFAULT_TOP_LIMIT, SqliteConfig};
use serde::Deserialize;

/// Config file read when `CLICKER_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "clicker-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held a value of the wrong shape.
    #[error("invalid value for {key}: {message}")]
    Invalid {
        /// The variable that was rejected.
        key: String,
        /// Why it was rejected.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClickerConfig {
    /// Bind address and WebSocket tuning.
    #[serde(default)]
    pub server: ServerConfig,

    /// Leaderboard database.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Leaderboard read settings.
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
}

impl ClickerConfig {
    /// Load configuration from `CLICKER_CONFIG` or [`DEFAULT_CONFIG_PATH`],
    /// falling back to defaults when the file does not exist, then apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed, or if an override is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CLICKER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        let path = Path::new(&path);

        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `CLICKER_PORT` is not a port.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `CLICKER_PORT` is not a port.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CLICKER_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("CLICKER_PORT") {
            self.server.port = val.parse().map_err(|e| ConfigError::Invalid {
                key: String::from("CLICKER_PORT"),
                message: format!("{e}"),
            })?;
        }
        if let Some(val) = lookup("DATABASE_URL") {
            self.database.url = val;
        }
        Ok(())
    }
}

/// HTTP listener and WebSocket session settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Close clicker sessions that send nothing for this many seconds.
    /// Zero disables the timeout.
    #[serde(default)]
    pub ws_idle_timeout_secs: u64,

    /// Counter values a session may fall behind before it is dropped.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
}

impl ServerConfig {
    /// The idle timeout, if enabled.
    pub const fn idle_timeout(&self) -> Option<Duration> {
        if self.ws_idle_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.ws_idle_timeout_secs))
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ws_idle_timeout_secs: 0,
            outbound_buffer: default_outbound_buffer(),
        }
    }
}

/// Leaderboard database settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Pool configuration for [`clicker_db::SqlitePool::connect`].
    pub fn to_sqlite_config(&self) -> SqliteConfig {
        SqliteConfig::new(&self.url)
            .with_max_connections(self.max_connections)
            .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Leaderboard read settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaderboardConfig {
    /// How many entries `GET /leaderboard` returns.
    #[serde(default = "default_top_limit")]
    pub top_limit: u32,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            top_limit: default_top_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8000
}

const fn default_outbound_buffer() -> usize {
    DEFAULT_OUTBOUND_CAPACITY
}

fn default_database_url() -> String {
    "sqlite://games.db?mode=rwc".to_owned()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_connect_timeout_secs() -> u64 {
    5
}

const fn default_top_limit() -> u32 {
    DEFAULT_TOP_LIMIT
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn default_config() {
        let config = ClickerConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.idle_timeout(), None);
        assert_eq!(config.server.outbound_buffer, 64);
        assert_eq!(config.database.url, "sqlite://games.db?mode=rwc");
        assert_eq!(config.leaderboard.top_limit, 5);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9000
  ws_idle_timeout_secs: 30
  outbound_buffer: 16

database:
  url: "sqlite::memory:"
  max_connections: 1
  connect_timeout_secs: 2

leaderboard:
  top_limit: 10
"#;
        let config = ClickerConfig::parse(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.idle_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.server.outbound_buffer, 16);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 1);
        assert_eq!(config.leaderboard.top_limit, 10);

        let sqlite = config.database.to_sqlite_config();
        assert_eq!(sqlite.max_connections, 1);
        assert_eq!(sqlite.connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn parse_partial_yaml_fills_defaults() {
        let config = ClickerConfig::parse("server:\n  port: 1234\n").unwrap();
        assert_eq!(config.server.port, 1234);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database, DatabaseConfig::default());
    }

    #[test]
    fn invalid_yaml_is_error() {
        let result = ClickerConfig::parse("server: [not, a, map]");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: BTreeMap<&str, &str> = [
            ("CLICKER_HOST", "127.0.0.1"),
            ("CLICKER_PORT", "7000"),
            ("DATABASE_URL", "sqlite://other.db"),
        ]
        .into_iter()
        .collect();

        let mut config = ClickerConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| (*v).to_owned()))
            .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.database.url, "sqlite://other.db");
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let mut config = ClickerConfig::default();
        let result = config.apply_overrides(|key| (key == "CLICKER_PORT").then(|| "http".to_owned()));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
