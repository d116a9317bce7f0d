//! Null transient cache implementation.
//!
//! Used when caching is disabled but the credential store still needs a
//! `TransientCache`.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::ports::{CacheError, TransientCache};

/// A cache that stores nothing; every read is a miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransientCache;

impl NullTransientCache {
    /// The null cache.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransientCache for NullTransientCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
