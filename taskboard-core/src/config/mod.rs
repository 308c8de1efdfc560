//! Configuration for the task board services
//!
//! Defaults are usable out of the box. A TOML file or `TASKBOARD_<SECTION>_<KEY>`
//! environment variables override them; either path ends in [`Config::validate`].

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

mod error;

pub use error::ConfigError;

const ENV_PREFIX: &str = "TASKBOARD";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub invites: InvitesConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Upper bound on a single request, store access included
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

/// Board store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Maximum pooled connections
    pub pool_size: u32,

    /// How long a writer waits on a locked database
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,
}

/// Invite link configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvitesConfig {
    /// Lifetime of the expiry embedded in every signed token
    #[serde(with = "humantime_serde")]
    pub token_ttl: Duration,

    /// Hex encoded 32 byte ed25519 seed. A random key is used when absent,
    /// which invalidates outstanding tokens on restart.
    pub signing_key: Option<String>,

    /// Attempts made when concurrent saves keep conflicting
    pub max_conflict_retries: u32,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include timestamps
    pub with_timestamp: bool,

    /// Include target module
    pub with_target: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./data/taskboard.db"),
            pool_size: 8,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl Default for InvitesConfig {
    fn default() -> Self {
        Self {
            token_ttl: crate::core_board::token::DEFAULT_TOKEN_TTL,
            signing_key: None,
            max_conflict_retries: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: TASKBOARD_<SECTION>_<KEY>
    /// Example: TASKBOARD_SERVER_BIND_ADDRESS=0.0.0.0:8080
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any `TASKBOARD_*` key lookup, then validate
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |section: &str, key: &str| lookup(&format!("{}_{}_{}", ENV_PREFIX, section, key));

        if let Some(addr) = var("SERVER", "BIND_ADDRESS") {
            self.server.bind_address = parse_value("bind address", &addr)?;
        }
        if let Some(timeout) = var("SERVER", "REQUEST_TIMEOUT") {
            self.server.request_timeout = parse_duration("request timeout", &timeout)?;
        }

        if let Some(path) = var("STORE", "DATABASE_PATH") {
            self.store.database_path = PathBuf::from(path);
        }
        if let Some(size) = var("STORE", "POOL_SIZE") {
            self.store.pool_size = parse_value("pool size", &size)?;
        }
        if let Some(timeout) = var("STORE", "BUSY_TIMEOUT") {
            self.store.busy_timeout = parse_duration("busy timeout", &timeout)?;
        }

        if let Some(ttl) = var("INVITES", "TOKEN_TTL") {
            self.invites.token_ttl = parse_duration("token ttl", &ttl)?;
        }
        if let Some(key) = var("INVITES", "SIGNING_KEY") {
            self.invites.signing_key = Some(key);
        }
        if let Some(retries) = var("INVITES", "MAX_CONFLICT_RETRIES") {
            self.invites.max_conflict_retries = parse_value("max conflict retries", &retries)?;
        }

        if let Some(level) = var("LOGGING", "LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = var("LOGGING", "JSON_FORMAT") {
            self.logging.json_format = parse_value("JSON flag", &json)?;
        }
        if let Some(timestamp) = var("LOGGING", "WITH_TIMESTAMP") {
            self.logging.with_timestamp = parse_value("timestamp flag", &timestamp)?;
        }
        if let Some(target) = var("LOGGING", "WITH_TARGET") {
            self.logging.with_target = parse_value("target flag", &target)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&contents)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.request_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.store.pool_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "pool_size must be greater than 0".to_string(),
            ));
        }

        if self.invites.token_ttl.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "token_ttl must be greater than 0".to_string(),
            ));
        }

        if self.invites.max_conflict_retries == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_conflict_retries must be greater than 0".to_string(),
            ));
        }

        if let Some(key) = &self.invites.signing_key {
            let key = key.trim();
            if key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::ValidationFailed(
                    "signing_key must be 64 hex digits".to_string(),
                ));
            }
        }

        if crate::logging::LogLevel::parse(&self.logging.level).is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_toml()?).map_err(|source| ConfigError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn parse_value<T>(what: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ConfigError::InvalidValue(format!("Invalid {}: {}", what, e)))
}

fn parse_duration(what: &str, raw: &str) -> Result<Duration, ConfigError> {
    humantime_serde::re::humantime::parse_duration(raw.trim())
        .map_err(|e| ConfigError::InvalidValue(format!("Invalid {}: {}", what, e)))
}
