//! Credential Store
//!
//! Read path over per-user API credentials. Key lookups and the
//! credentialed-user count go through the transient cache first and fall
//! back to the user metadata store on a miss. Tokens are derived from the
//! two keys on every read and never cached on their own.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, instrument, warn};

use crate::domain::errors::CredentialResult;
use crate::domain::models::{
    CacheConfig, CredentialListPage, PageRequest, UserCredential, UserId, UserRecord,
    CREDENTIALED_MARKER, PUBLIC_KEY_CACHE_NAMESPACE, PUBLIC_KEY_META_KEY,
    SECRET_KEY_CACHE_NAMESPACE, SECRET_KEY_META_KEY, TOTAL_COUNT_CACHE_KEY,
};
use crate::domain::ports::{StoreError, TransientCache, UserMetaStore};
use crate::services::token::{cache_key, derive_token};

/// Default lifetime of cached keys and of the cached count.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Cache lifetimes used by the credential store.
///
/// A reissued or revoked credential may be served stale for up to
/// `key_ttl`, and the total count may lag by up to `count_ttl`, unless the
/// caller invalidates explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialStoreSettings {
    /// Lifetime of cached public and secret keys.
    pub key_ttl: Duration,
    /// Lifetime of the cached credentialed-user count.
    pub count_ttl: Duration,
}

impl Default for CredentialStoreSettings {
    fn default() -> Self {
        Self {
            key_ttl: DEFAULT_CACHE_TTL,
            count_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl From<&CacheConfig> for CredentialStoreSettings {
    fn from(config: &CacheConfig) -> Self {
        Self {
            key_ttl: Duration::from_secs(config.key_ttl_secs),
            count_ttl: Duration::from_secs(config.count_ttl_secs),
        }
    }
}

/// Cache-fronted credential lookups.
///
/// Both collaborators are injected; the store holds no process-wide state.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use token_auth_keys::adapters::cache::MokaTransientCache;
/// use token_auth_keys::adapters::sqlite::{initialize_database, SqliteUserMetaStore};
/// use token_auth_keys::services::CredentialStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let pool = initialize_database("sqlite:.token-auth/token-auth.db").await?;
/// let store = CredentialStore::new(
///     Arc::new(SqliteUserMetaStore::new(pool)),
///     Arc::new(MokaTransientCache::new()),
/// );
/// let page = store.list_page(1, 30).await?;
/// println!("{} of {} credentialed users", page.len(), page.total_count);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn UserMetaStore>,
    cache: Arc<dyn TransientCache>,
    settings: CredentialStoreSettings,
}

impl CredentialStore {
    /// Create a credential store with the default one-hour TTLs.
    pub fn new(store: Arc<dyn UserMetaStore>, cache: Arc<dyn TransientCache>) -> Self {
        Self::with_settings(store, cache, CredentialStoreSettings::default())
    }

    /// Create with custom TTLs.
    pub fn with_settings(
        store: Arc<dyn UserMetaStore>,
        cache: Arc<dyn TransientCache>,
        settings: CredentialStoreSettings,
    ) -> Self {
        Self {
            store,
            cache,
            settings,
        }
    }

    /// Public key of a user, empty when none was issued or the id is zero.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_public_key(&self, user_id: UserId) -> CredentialResult<String> {
        self.cached_meta(user_id, PUBLIC_KEY_CACHE_NAMESPACE, PUBLIC_KEY_META_KEY)
            .await
    }

    /// Secret key of a user, empty when none was issued or the id is zero.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_secret_key(&self, user_id: UserId) -> CredentialResult<String> {
        self.cached_meta(user_id, SECRET_KEY_CACHE_NAMESPACE, SECRET_KEY_META_KEY)
            .await
    }

    /// Token of a user: `sha256(secret_key ++ public_key)`.
    ///
    /// A user without keys gets the digest of the empty string.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_token(&self, user_id: UserId) -> CredentialResult<String> {
        let secret_key = self.get_secret_key(user_id).await?;
        let public_key = self.get_public_key(user_id).await?;
        Ok(derive_token(&secret_key, &public_key))
    }

    /// Full credential row of one user, `None` when the user does not exist.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_credential(&self, user_id: UserId) -> CredentialResult<Option<UserCredential>> {
        if user_id.is_empty() {
            return Ok(None);
        }
        let user = self
            .store
            .get_user(user_id)
            .await
            .map_err(|err| log_store_failure("get_user", err))?;
        match user {
            Some(user) => self.assemble(user).await.map(Some),
            None => Ok(None),
        }
    }

    /// One page of credentialed users, ordered by user id ascending.
    ///
    /// A page past the end comes back empty. `total_count` is the cached
    /// count and may lag issuance by up to the count TTL.
    #[instrument(skip(self))]
    pub async fn list_page(&self, page_number: u32, page_size: u32) -> CredentialResult<CredentialListPage> {
        let request = PageRequest::new(page_number, page_size)?;

        let users = self
            .store
            .list_users_by_meta_value(CREDENTIALED_MARKER, request.page_size(), request.offset())
            .await
            .map_err(|err| log_store_failure("list_users_by_meta_value", err))?;

        let mut records = Vec::with_capacity(users.len());
        for user in users {
            records.push(self.assemble(user).await?);
        }

        let total_count = self.total_credentialed_users().await?;

        debug!(
            page_number,
            page_size,
            returned = records.len(),
            total_count,
            "credential page assembled"
        );

        Ok(CredentialListPage {
            records,
            page_number: request.page_number(),
            page_size: request.page_size(),
            total_count,
        })
    }

    /// Number of distinct users holding the credentialed marker.
    #[instrument(skip(self), level = "debug")]
    pub async fn total_credentialed_users(&self) -> CredentialResult<u64> {
        if let Some(raw) = self.cache_get(TOTAL_COUNT_CACHE_KEY).await {
            match raw.parse::<u64>() {
                // A cached zero is refreshed, matching how empty keys are treated
                Ok(count) if count > 0 => {
                    debug!(count, "credential count cache hit");
                    return Ok(count);
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "ignoring malformed cached credential count"),
            }
        }

        let count = self
            .store
            .count_users_by_meta_value(CREDENTIALED_MARKER)
            .await
            .map_err(|err| log_store_failure("count_users_by_meta_value", err))?;

        if count > 0 {
            self.cache_set(TOTAL_COUNT_CACHE_KEY, count.to_string(), self.settings.count_ttl)
                .await;
        }
        Ok(count)
    }

    /// Drop both cached keys of a user, e.g. after a reissue or revoke.
    pub async fn invalidate_user(&self, user_id: UserId) {
        if user_id.is_empty() {
            return;
        }
        for namespace in [PUBLIC_KEY_CACHE_NAMESPACE, SECRET_KEY_CACHE_NAMESPACE] {
            self.cache_delete(&cache_key(namespace, user_id)).await;
        }
        debug!(%user_id, "invalidated cached credential");
    }

    /// Drop the cached credentialed-user count.
    pub async fn invalidate_count(&self) {
        self.cache_delete(TOTAL_COUNT_CACHE_KEY).await;
    }

    async fn assemble(&self, user: UserRecord) -> CredentialResult<UserCredential> {
        let public_key = self.get_public_key(user.id).await?;
        let secret_key = self.get_secret_key(user.id).await?;
        let token = derive_token(&secret_key, &public_key);

        Ok(UserCredential {
            user_id: user.id,
            login: user.login,
            email: user.email,
            display_name: user.display_name,
            public_key,
            secret_key,
            token,
        })
    }

    async fn cached_meta(&self, user_id: UserId, namespace: &str, meta_key: &str) -> CredentialResult<String> {
        if user_id.is_empty() {
            return Ok(String::new());
        }

        let key = cache_key(namespace, user_id);
        // Empty entries count as misses so a freshly issued key shows up
        if let Some(value) = self.cache_get(&key).await.filter(|value| !value.is_empty()) {
            debug!(%user_id, meta_key, "credential cache hit");
            return Ok(value);
        }

        debug!(%user_id, meta_key, "credential cache miss");
        let value = self
            .store
            .get_meta(user_id, meta_key)
            .await
            .map_err(|err| log_store_failure("get_meta", err))?
            .unwrap_or_default();

        if !value.is_empty() {
            self.cache_set(&key, value.clone(), self.settings.key_ttl).await;
        }
        Ok(value)
    }

    async fn cache_get(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "cache read failed, falling back to store");
                None
            }
        }
    }

    async fn cache_set(&self, key: &str, value: String, ttl: Duration) {
        if let Err(err) = self.cache.set(key, value, ttl).await {
            warn!(error = %err, "cache write failed");
        }
    }

    async fn cache_delete(&self, key: &str) {
        if let Err(err) = self.cache.delete(key).await {
            warn!(error = %err, "cache delete failed");
        }
    }
}

fn log_store_failure(operation: &str, err: StoreError) -> StoreError {
    error!(operation, error = %err, "user metadata store failed");
    err
}
