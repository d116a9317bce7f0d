//! SQLite database adapters.

pub mod connection;
pub mod migrations;
pub mod user_meta_repository;

pub use connection::{create_pool, create_test_pool, ConnectionError, PoolConfig};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use user_meta_repository::SqliteUserMetaStore;

use sqlx::SqlitePool;

/// Failures while opening and migrating a database.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The pool could not be opened.
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    /// A migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
}

/// Open a pool with default sizing and apply pending migrations.
pub async fn initialize_database(database_url: &str) -> Result<SqlitePool, DatabaseError> {
    initialize_database_with(database_url, None).await
}

/// Open a pool with explicit sizing and apply pending migrations.
pub async fn initialize_database_with(
    database_url: &str,
    config: Option<PoolConfig>,
) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, config).await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}
