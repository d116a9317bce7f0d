//! User metadata store port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::{UserId, UserRecord};

/// Failures of the backing user/metadata store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection or pool failure.
    #[error("Store unreachable: {0}")]
    Unavailable(String),

    /// The store rejected a query.
    #[error("Query failed: {0}")]
    Query(String),

    /// A row could not be mapped to a domain value.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::CorruptRow(err.to_string())
            }
            other => Self::Query(other.to_string()),
        }
    }
}

/// Read interface over users and their key/value metadata.
#[async_trait]
pub trait UserMetaStore: Send + Sync {
    /// Get a user by id.
    async fn get_user(&self, user_id: UserId) -> Result<Option<UserRecord>, StoreError>;

    /// Get the first value stored under `meta_key` for a user.
    async fn get_meta(&self, user_id: UserId, meta_key: &str) -> Result<Option<String>, StoreError>;

    /// List users having any metadata row whose value equals `meta_value`,
    /// ordered by user id ascending.
    async fn list_users_by_meta_value(
        &self,
        meta_value: &str,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<UserRecord>, StoreError>;

    /// Count distinct users having any metadata row whose value equals `meta_value`.
    async fn count_users_by_meta_value(&self, meta_value: &str) -> Result<u64, StoreError>;
}
