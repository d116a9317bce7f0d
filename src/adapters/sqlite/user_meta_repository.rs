//! SQLite implementation of the UserMetaStore.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::models::{
    UserId, UserRecord, CREDENTIALED_MARKER, PUBLIC_KEY_META_KEY, SECRET_KEY_META_KEY,
};
use crate::domain::ports::{StoreError, UserMetaStore};

/// `UserMetaStore` over the `users` and `user_meta` tables.
pub struct SqliteUserMetaStore {
    pool: SqlitePool,
}

impl SqliteUserMetaStore {
    /// Wrap a pool whose schema is already migrated.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace a user row.
    pub async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO users (id, login, email, display_name) VALUES (?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET login = excluded.login, email = excluded.email, display_name = excluded.display_name"#
        )
        .bind(to_db_id(user.id)?)
        .bind(&user.login)
        .bind(&user.email)
        .bind(&user.display_name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Set a single-valued meta entry, replacing any existing rows for the key.
    pub async fn set_meta(&self, user_id: UserId, meta_key: &str, meta_value: &str) -> Result<(), StoreError> {
        let id = to_db_id(user_id)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_meta WHERE user_id = ? AND meta_key = ?")
            .bind(id)
            .bind(meta_key)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO user_meta (user_id, meta_key, meta_value) VALUES (?, ?, ?)")
            .bind(id)
            .bind(meta_key)
            .bind(meta_value)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove every row for a meta key. Returns the number of rows removed.
    pub async fn delete_meta(&self, user_id: UserId, meta_key: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM user_meta WHERE user_id = ? AND meta_key = ?")
            .bind(to_db_id(user_id)?)
            .bind(meta_key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Write a key pair together with its credentialed marker.
    ///
    /// Fixture writer for tests and local development; production issuance
    /// happens outside this crate.
    pub async fn put_credential(&self, user_id: UserId, public_key: &str, secret_key: &str) -> Result<(), StoreError> {
        let id = to_db_id(user_id)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_meta WHERE user_id = ? AND (meta_key IN (?, ?) OR meta_value = ?)")
            .bind(id)
            .bind(PUBLIC_KEY_META_KEY)
            .bind(SECRET_KEY_META_KEY)
            .bind(CREDENTIALED_MARKER)
            .execute(&mut *tx)
            .await?;

        for (meta_key, meta_value) in [
            (PUBLIC_KEY_META_KEY, public_key),
            (SECRET_KEY_META_KEY, secret_key),
            (secret_key, CREDENTIALED_MARKER),
        ] {
            sqlx::query("INSERT INTO user_meta (user_id, meta_key, meta_value) VALUES (?, ?, ?)")
                .bind(id)
                .bind(meta_key)
                .bind(meta_value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Remove a user's key pair and marker.
    pub async fn remove_credential(&self, user_id: UserId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM user_meta WHERE user_id = ? AND (meta_key IN (?, ?) OR meta_value = ?)")
            .bind(to_db_id(user_id)?)
            .bind(PUBLIC_KEY_META_KEY)
            .bind(SECRET_KEY_META_KEY)
            .bind(CREDENTIALED_MARKER)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserMetaStore for SqliteUserMetaStore {
    async fn get_user(&self, user_id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let Ok(id) = to_db_id(user_id) else {
            return Ok(None);
        };

        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, login, email, display_name FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn get_meta(&self, user_id: UserId, meta_key: &str) -> Result<Option<String>, StoreError> {
        let Ok(id) = to_db_id(user_id) else {
            return Ok(None);
        };

        let value: Option<(Option<String>,)> = sqlx::query_as(
            "SELECT meta_value FROM user_meta WHERE user_id = ? AND meta_key = ? ORDER BY umeta_id LIMIT 1"
        )
        .bind(id)
        .bind(meta_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value.and_then(|(v,)| v))
    }

    async fn list_users_by_meta_value(
        &self,
        meta_value: &str,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<UserRecord>, StoreError> {
        // SQLite offsets are signed; anything larger is past every row
        let Ok(offset) = i64::try_from(offset) else {
            return Ok(Vec::new());
        };

        let rows: Vec<UserRow> = sqlx::query_as(
            r#"SELECT u.id, u.login, u.email, u.display_name
               FROM users u
               WHERE EXISTS (SELECT 1 FROM user_meta m WHERE m.user_id = u.id AND m.meta_value = ?)
               ORDER BY u.id ASC
               LIMIT ? OFFSET ?"#
        )
        .bind(meta_value)
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_users_by_meta_value(&self, meta_value: &str) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"SELECT COUNT(DISTINCT m.user_id)
               FROM user_meta m
               JOIN users u ON u.id = m.user_id
               WHERE m.meta_value = ?"#
        )
        .bind(meta_value)
        .fetch_one(&self.pool)
        .await?;

        u64::try_from(count).map_err(|_| StoreError::CorruptRow(format!("negative count: {count}")))
    }
}

fn to_db_id(user_id: UserId) -> Result<i64, StoreError> {
    i64::try_from(user_id.as_u64())
        .map_err(|_| StoreError::Query(format!("user id out of range: {user_id}")))
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    login: String,
    email: String,
    display_name: String,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = u64::try_from(row.id)
            .map_err(|_| StoreError::CorruptRow(format!("negative user id: {}", row.id)))?;

        Ok(Self {
            id: UserId::new(id),
            login: row.login,
            email: row.email,
            display_name: row.display_name,
        })
    }
}
