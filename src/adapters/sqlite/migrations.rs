//! Schema migrations embedded in the binary.
//!
//! Applied versions are recorded in `schema_migrations`. Each migration and
//! its version row commit in one transaction, so a failed migration leaves
//! the schema at the previous version.

use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;

/// Failures while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A migration, or the bookkeeping around it, failed.
    #[error("Failed to execute migration {version}: {source}")]
    ExecutionError {
        /// Version being applied; `0` for the bookkeeping table itself.
        version: i64,
        /// Underlying database error.
        #[source]
        source: sqlx::Error,
    },
    /// The recorded schema version could not be read.
    #[error("Failed to get schema version: {0}")]
    VersionCheckError(#[source] sqlx::Error),
}

/// One versioned schema change.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Strictly increasing version number.
    pub version: i64,
    /// Short human-readable summary, stored alongside the version.
    pub description: String,
    /// SQL script; may contain several statements.
    pub sql: String,
}

/// Applies pending migrations to a pool.
pub struct Migrator {
    pool: SqlitePool,
}

impl Migrator {
    /// Migrator over `pool`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply every migration newer than the recorded schema version.
    ///
    /// Returns the number of migrations applied.
    pub async fn run_embedded_migrations(&self, migrations: Vec<Migration>) -> Result<usize, MigrationError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now')),
                description TEXT
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|source| MigrationError::ExecutionError { version: 0, source })?;

        let current = self.current_version().await?;
        let mut applied = 0;
        for migration in migrations.iter().filter(|m| m.version > current) {
            self.apply(migration).await?;
            tracing::info!(version = migration.version, description = %migration.description, "applied migration");
            applied += 1;
        }
        Ok(applied)
    }

    /// Highest applied version, `0` on a fresh database.
    async fn current_version(&self) -> Result<i64, MigrationError> {
        let (version,): (i64,) = sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(MigrationError::VersionCheckError)?;
        Ok(version)
    }

    async fn apply(&self, migration: &Migration) -> Result<(), MigrationError> {
        let failed = |source| MigrationError::ExecutionError { version: migration.version, source };

        let mut tx: Transaction<'_, Sqlite> = self.pool.begin().await.map_err(failed)?;
        sqlx::raw_sql(&migration.sql).execute(&mut *tx).await.map_err(failed)?;
        sqlx::query("INSERT INTO schema_migrations (version, description) VALUES (?, ?)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
        tx.commit().await.map_err(failed)
    }
}

/// Every migration shipped with the crate, in version order.
pub fn all_embedded_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Users and user metadata".to_string(),
        sql: include_str!("../../../migrations/001_initial_schema.sql").to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_test_pool;

    #[tokio::test]
    async fn test_migrations_apply_once() {
        let pool = create_test_pool().await.unwrap();
        let migrator = Migrator::new(pool.clone());

        assert_eq!(migrator.run_embedded_migrations(all_embedded_migrations()).await.unwrap(), 1);
        assert_eq!(migrator.run_embedded_migrations(all_embedded_migrations()).await.unwrap(), 0);
        assert_eq!(migrator.current_version().await.unwrap(), 1);

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'user_meta') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables, vec![("user_meta".to_string(),), ("users".to_string(),)]);
    }

    #[tokio::test]
    async fn test_failed_migration_leaves_version_unchanged() {
        let pool = create_test_pool().await.unwrap();
        let migrator = Migrator::new(pool);
        migrator.run_embedded_migrations(all_embedded_migrations()).await.unwrap();

        let broken = Migration {
            version: 2,
            description: "broken".to_string(),
            sql: "CREATE TABLE extra (id INTEGER); SELECT * FROM missing_table;".to_string(),
        };
        let result = migrator.run_embedded_migrations(vec![broken]).await;

        assert!(matches!(result, Err(MigrationError::ExecutionError { version: 2, .. })));
        assert_eq!(migrator.current_version().await.unwrap(), 1);
    }
}
