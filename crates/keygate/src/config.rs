//! Configuration loading and management

use anyhow::{Context, Result, bail};
use chrono::Duration;
use keygate_auth::config::MAX_ACCESS_TOKEN_EXPIRE_MINUTES;
use keygate_auth::{AuthConfig, HashCost};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx SQLite URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Token and password hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSection {
    /// Token signing secret; there is deliberately no default
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_access_token_expire_minutes")]
    pub access_token_expire_minutes: i64,
    #[serde(default = "default_hash_memory_kib")]
    pub hash_memory_kib: u32,
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            secret_key: None,
            algorithm: default_algorithm(),
            access_token_expire_minutes: default_access_token_expire_minutes(),
            hash_memory_kib: default_hash_memory_kib(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any
    #[serde(default = "default_cors_origins")]
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_cors_origins(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_database_url() -> String {
    "sqlite:./data/keygate.db?mode=rwc".to_string()
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_token_expire_minutes() -> i64 {
    keygate_auth::config::DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES
}

fn default_hash_memory_kib() -> u32 {
    HashCost::default().memory_kib
}

fn default_hash_iterations() -> u32 {
    HashCost::default().iterations
}

fn default_hash_parallelism() -> u32 {
    HashCost::default().parallelism
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    Defaults,
}

impl Config {
    /// Load configuration from a file
    ///
    /// Runs before logging is set up, so the caller reports the returned
    /// source once the subscriber is installed.
    pub fn load(path: &str) -> Result<(Self, ConfigSource)> {
        let config_path = Path::new(path);

        // Check if config file exists
        if !config_path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults));
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok((config, ConfigSource::File))
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        let minutes = self.auth.access_token_expire_minutes;
        if !(1..=MAX_ACCESS_TOKEN_EXPIRE_MINUTES).contains(&minutes) {
            bail!(
                "access_token_expire_minutes must be between 1 and {}, got {}",
                MAX_ACCESS_TOKEN_EXPIRE_MINUTES,
                minutes
            );
        }
        AuthConfig::parse_algorithm(&self.auth.algorithm)?;
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            bail!("Unknown logging format: {}", self.logging.format);
        }
        Ok(())
    }

    /// Build the immutable auth settings
    pub fn auth_config(&self) -> Result<AuthConfig> {
        Ok(AuthConfig {
            secret_key: self.auth.secret_key.clone().filter(|s| !s.is_empty()),
            algorithm: AuthConfig::parse_algorithm(&self.auth.algorithm)?,
            access_token_ttl: Duration::try_minutes(self.auth.access_token_expire_minutes)
                .with_context(|| {
                    format!(
                        "access_token_expire_minutes out of range: {}",
                        self.auth.access_token_expire_minutes
                    )
                })?,
            hash_cost: HashCost {
                memory_kib: self.auth.hash_memory_kib,
                iterations: self.auth.hash_iterations,
                parallelism: self.auth.hash_parallelism,
            },
        })
    }
}
