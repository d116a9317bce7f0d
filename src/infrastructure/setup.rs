//! Project setup and service wiring
//!
//! Handles project initialization:
//! - Configuration directory creation
//! - Default config file creation
//! - Database migrations
//!
//! and builds a `CredentialStore` from a loaded `Config`.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::cache::{MokaTransientCache, NullTransientCache};
use crate::adapters::sqlite::{initialize_database_with, PoolConfig, SqliteUserMetaStore};
use crate::domain::models::Config;
use crate::domain::ports::TransientCache;
use crate::infrastructure::config::CONFIG_DIR;
use crate::services::{CredentialStore, CredentialStoreSettings};

/// Default configuration template content
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Token auth key listing configuration
# Override settings by editing this file, adding .token-auth/local.yaml,
# or setting environment variables with the TOKEN_AUTH_ prefix
#
# Example environment variables:
#   export TOKEN_AUTH_DATABASE__PATH=/custom/path/token-auth.db
#   export TOKEN_AUTH_CACHE__KEY_TTL_SECS=600
#   export TOKEN_AUTH_LOGGING__LEVEL=debug

# Database configuration
database:
  # Path to SQLite database file (project-local)
  path: ".token-auth/token-auth.db"

  # Maximum number of database connections in pool
  max_connections: 5

# Logging configuration
logging:
  # Log level: trace, debug, info, warn, error
  level: "info"

  # Log format: json, pretty
  format: "pretty"

# Transient cache in front of key and count lookups
cache:
  enabled: true

  # Reissued or revoked keys may be served stale for up to this long
  key_ttl_secs: 3600

  # The credentialed-user total may lag by up to this long
  count_ttl_secs: 3600

  max_capacity: 10000

# Listing defaults
listing:
  per_page: 30
"#;

/// Setup paths and directories
pub struct SetupPaths {
    /// `.token-auth/`
    pub config_dir: PathBuf,
    /// `.token-auth/config.yaml`
    pub config_file: PathBuf,
    /// `.token-auth/token-auth.db`
    pub database_file: PathBuf,
}

impl SetupPaths {
    /// Get setup paths for the current directory
    pub fn new() -> Result<Self> {
        let current_dir = std::env::current_dir()
            .context("Failed to get current directory")?;
        Ok(Self::under(current_dir))
    }

    /// Setup paths rooted at `project_root`
    pub fn under(project_root: impl AsRef<Path>) -> Self {
        let config_dir = project_root.as_ref().join(CONFIG_DIR);
        Self {
            config_file: config_dir.join("config.yaml"),
            database_file: config_dir.join("token-auth.db"),
            config_dir,
        }
    }

    /// Check if the project is already initialized
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists() && self.database_file.exists()
    }
}

/// Create the configuration directory
pub fn create_config_dir(paths: &SetupPaths) -> Result<bool> {
    if paths.config_dir.exists() {
        return Ok(false);
    }

    fs::create_dir_all(&paths.config_dir)
        .context("Failed to create config directory")?;

    Ok(true)
}

/// Create the default configuration file
pub fn create_config_file(paths: &SetupPaths, force: bool) -> Result<bool> {
    if paths.config_file.exists() && !force {
        return Ok(false);
    }

    fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE)
        .context("Failed to write config file")?;

    Ok(true)
}

/// Create the database file and apply pending migrations
pub async fn run_migrations(paths: &SetupPaths) -> Result<()> {
    let db_url = format!("sqlite:{}", paths.database_file.display());
    let pool = initialize_database_with(&db_url, Some(PoolConfig { max_connections: 1, ..PoolConfig::default() }))
        .await
        .context("Failed to initialize database")?;
    pool.close().await;
    Ok(())
}

/// Open the configured database and wrap it in a credential store.
///
/// The SQLite store is returned alongside so fixture commands can write to it.
pub async fn build_credential_store(config: &Config) -> Result<(CredentialStore, Arc<SqliteUserMetaStore>)> {
    let pool = initialize_database_with(&config.database.url(), Some(PoolConfig::from(&config.database)))
        .await
        .context("Failed to initialize database. Run 'token-auth-keys init' first.")?;

    let store = Arc::new(SqliteUserMetaStore::new(pool));
    let cache: Arc<dyn TransientCache> = if config.cache.enabled {
        Arc::new(MokaTransientCache::with_capacity(config.cache.max_capacity))
    } else {
        Arc::new(NullTransientCache::new())
    };

    let credentials = CredentialStore::with_settings(
        store.clone(),
        cache,
        CredentialStoreSettings::from(&config.cache),
    );
    Ok((credentials, store))
}
