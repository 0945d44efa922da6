//! Demo configuration loading from file and environment variables.

use memberdb_db::DbRuntimeSettings;
use serde::Deserialize;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Top-level demo configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Scenario inputs.
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

/// Which connection provider the repository is built on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// A new connection per operation.
    Direct,
    /// Connections checked out of an `r2d2` pool.
    #[default]
    Pooled,
}

/// Returned when a string names no known [`ProviderKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider '{0}', expected \"direct\" or \"pooled\"")]
pub struct ParseProviderKindError(String);

impl FromStr for ProviderKind {
    type Err = ParseProviderKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "pooled" => Ok(Self::Pooled),
            _ => Err(ParseProviderKindError(s.to_string())),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Connection provider to use.
    #[serde(default)]
    pub provider: ProviderKind,

    /// SQLite busy timeout, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,

    /// How long a pool checkout may block, in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,
}

impl DatabaseConfig {
    /// The runtime settings handed to `memberdb-db`.
    pub fn runtime_settings(&self) -> DbRuntimeSettings {
        DbRuntimeSettings {
            busy_timeout_ms: self.busy_timeout_ms,
            pool_max_size: self.pool_max_size,
            connection_timeout_ms: self.connection_timeout_ms,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "memberdb_repository=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// The member the CRUD scenario creates, updates and deletes.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    /// Identifier of the scenario member.
    #[serde(default = "default_member_id")]
    pub member_id: String,

    /// Balance at creation.
    #[serde(default = "default_money")]
    pub money: i32,

    /// Balance after the update step.
    #[serde(default = "default_updated_money")]
    pub updated_money: i32,
}

fn default_db_path() -> String {
    "memberdb.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    DbRuntimeSettings::default().busy_timeout_ms
}

fn default_pool_max_size() -> u32 {
    DbRuntimeSettings::default().pool_max_size
}

fn default_connection_timeout_ms() -> u64 {
    DbRuntimeSettings::default().connection_timeout_ms
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_member_id() -> String {
    "memberVo".to_string()
}

fn default_money() -> i32 {
    10_000
}

fn default_updated_money() -> i32 {
    20_000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            provider: ProviderKind::default(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
            connection_timeout_ms: default_connection_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            member_id: default_member_id(),
            money: default_money(),
            updated_money: default_updated_money(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `MEMBERDB_DB_PATH` overrides `database.path`
/// - `MEMBERDB_PROVIDER` overrides `database.provider` ("direct" or "pooled")
/// - `MEMBERDB_BUSY_TIMEOUT_MS` overrides `database.busy_timeout_ms`
/// - `MEMBERDB_POOL_MAX_SIZE` overrides `database.pool_max_size`
/// - `MEMBERDB_CONNECTION_TIMEOUT_MS` overrides `database.connection_timeout_ms`
/// - `MEMBERDB_LOG_LEVEL` overrides `logging.level`
/// - `MEMBERDB_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// Unparseable override values are ignored with a warning.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(db_path) = var("MEMBERDB_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(provider) = parse_override(&var, "MEMBERDB_PROVIDER") {
        config.database.provider = provider;
    }
    if let Some(ms) = parse_override(&var, "MEMBERDB_BUSY_TIMEOUT_MS") {
        config.database.busy_timeout_ms = ms;
    }
    if let Some(size) = parse_override(&var, "MEMBERDB_POOL_MAX_SIZE") {
        config.database.pool_max_size = size;
    }
    if let Some(ms) = parse_override(&var, "MEMBERDB_CONNECTION_TIMEOUT_MS") {
        config.database.connection_timeout_ms = ms;
    }
    if let Some(level) = var("MEMBERDB_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("MEMBERDB_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}

fn parse_override<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let value = var(key)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(
                var = key,
                value = %value,
                error = %e,
                "ignoring invalid config override"
            );
            None
        }
    }
}
