//! Shared test doubles for integration tests.
//!
//! - `MemoryUserMetaStore`: in-memory store with per-operation call counters
//!   and a switch that makes every call fail as unreachable
//! - `ManualClockCache`: TTL cache driven by an explicit clock
//! - `FailingCache`: cache whose every operation errors

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use token_auth_keys::domain::models::{
    UserId, UserRecord, CREDENTIALED_MARKER, PUBLIC_KEY_META_KEY, SECRET_KEY_META_KEY,
};
use token_auth_keys::domain::ports::{CacheError, StoreError, TransientCache, UserMetaStore};

/// Initialize a test subscriber once; later calls are no-ops.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[derive(Default)]
pub struct MemoryUserMetaStore {
    users: Mutex<BTreeMap<u64, UserRecord>>,
    meta: Mutex<Vec<(u64, String, String)>>,
    unavailable: AtomicBool,
    pub get_meta_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub count_calls: AtomicUsize,
}

impl MemoryUserMetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, id: u64) {
        let record = UserRecord::new(id, format!("user{id}"), format!("user{id}@example.com"));
        self.users.lock().unwrap().insert(id, record);
    }

    /// Add a user with a key pair and the credentialed marker row.
    pub fn add_credentialed(&self, id: u64, public_key: &str, secret_key: &str) {
        self.add_user(id);
        self.set_meta(id, PUBLIC_KEY_META_KEY, public_key);
        self.set_meta(id, SECRET_KEY_META_KEY, secret_key);
        self.meta
            .lock()
            .unwrap()
            .push((id, secret_key.to_string(), CREDENTIALED_MARKER.to_string()));
    }

    pub fn set_meta(&self, id: u64, key: &str, value: &str) {
        let mut meta = self.meta.lock().unwrap();
        meta.retain(|(uid, k, _)| !(*uid == id && k == key));
        meta.push((id, key.to_string(), value.to_string()));
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn meta_reads(&self) -> usize {
        self.get_meta_calls.load(Ordering::SeqCst)
    }

    pub fn counts(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn marked_ids(&self, meta_value: &str) -> Vec<u64> {
        let meta = self.meta.lock().unwrap();
        let users = self.users.lock().unwrap();
        let mut ids: Vec<u64> = meta
            .iter()
            .filter(|(id, _, value)| value == meta_value && users.contains_key(id))
            .map(|(id, _, _)| *id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[async_trait]
impl UserMetaStore for MemoryUserMetaStore {
    async fn get_user(&self, user_id: UserId) -> Result<Option<UserRecord>, StoreError> {
        self.check()?;
        Ok(self.users.lock().unwrap().get(&user_id.as_u64()).cloned())
    }

    async fn get_meta(&self, user_id: UserId, meta_key: &str) -> Result<Option<String>, StoreError> {
        self.get_meta_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .meta
            .lock()
            .unwrap()
            .iter()
            .find(|(id, key, _)| *id == user_id.as_u64() && key == meta_key)
            .map(|(_, _, value)| value.clone()))
    }

    async fn list_users_by_meta_value(
        &self,
        meta_value: &str,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<UserRecord>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let ids = self.marked_ids(meta_value);
        let users = self.users.lock().unwrap();
        Ok(ids
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .filter_map(|id| users.get(&id).cloned())
            .collect())
    }

    async fn count_users_by_meta_value(&self, meta_value: &str) -> Result<u64, StoreError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.marked_ids(meta_value).len() as u64)
    }
}

/// TTL cache whose clock only moves when told to.
#[derive(Default)]
pub struct ManualClockCache {
    now: Mutex<Duration>,
    entries: Mutex<HashMap<String, (String, Duration)>>,
}

impl ManualClockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }

    pub fn contains(&self, key: &str) -> bool {
        let now = *self.now.lock().unwrap();
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .is_some_and(|(_, expires_at)| *expires_at > now)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl TransientCache for ManualClockCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = *self.now.lock().unwrap();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > now => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let now = *self.now.lock().unwrap();
        self.entries.lock().unwrap().insert(key.to_string(), (value, now + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Cache backend that is always down.
#[derive(Default)]
pub struct FailingCache {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl TransientCache for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("cache offline".to_string()))
    }
}
