//! Transient cache port.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Cache failures. Callers treat every variant as a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be reached or refused the operation.
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Get/set string cache with a per-entry time to live.
///
/// A value set with TTL `t` is either present and fresh, or absent, once
/// `t` has elapsed.
#[async_trait]
pub trait TransientCache: Send + Sync {
    /// Fetch a fresh value.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value, replacing any previous entry and its TTL.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Drop an entry. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
