//! Layered configuration loading and validation.

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local directory holding config and the default database.
pub const CONFIG_DIR: &str = ".token-auth";

/// Prefix of environment overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "TOKEN_AUTH_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `logging.level` is not a tracing level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// `logging.format` is neither json nor pretty.
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    /// `database.path` is empty.
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    /// `database.max_connections` is zero.
    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    /// A cache TTL is zero.
    #[error("Invalid {field}: must be at least 1 second")]
    InvalidTtl {
        /// Dotted path of the offending key.
        field: &'static str,
    },

    /// `cache.max_capacity` is zero.
    #[error("Invalid cache max_capacity: {0}. Must be at least 1")]
    InvalidCacheCapacity(u64),

    /// `listing.per_page` is zero.
    #[error("Invalid per_page: {0}. Must be at least 1")]
    InvalidPerPage(u32),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .token-auth/config.yaml (project config, created by init)
    /// 3. .token-auth/local.yaml (project local overrides, optional)
    /// 4. Environment variables (TOKEN_AUTH_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_in(".")
    }

    /// Same as [`ConfigLoader::load`], rooted at `project_root` instead of the working directory.
    pub fn load_in(project_root: impl AsRef<Path>) -> Result<Config> {
        let dir = project_root.as_ref().join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.cache.key_ttl_secs == 0 {
            return Err(ConfigError::InvalidTtl { field: "cache.key_ttl_secs" });
        }

        if config.cache.count_ttl_secs == 0 {
            return Err(ConfigError::InvalidTtl { field: "cache.count_ttl_secs" });
        }

        if config.cache.max_capacity == 0 {
            return Err(ConfigError::InvalidCacheCapacity(config.cache.max_capacity));
        }

        if config.listing.per_page == 0 {
            return Err(ConfigError::InvalidPerPage(config.listing.per_page));
        }

        Ok(())
    }
}
