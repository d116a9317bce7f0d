//! Domain models.

pub mod config;
pub mod credential;

pub use config::{CacheConfig, Config, DatabaseConfig, ListingConfig, LoggingConfig};
pub use credential::{
    CredentialListPage, PageRequest, UserCredential, UserId, UserRecord, CREDENTIALED_MARKER,
    DEFAULT_PAGE_SIZE, PUBLIC_KEY_CACHE_NAMESPACE, PUBLIC_KEY_META_KEY,
    SECRET_KEY_CACHE_NAMESPACE, SECRET_KEY_META_KEY, TOTAL_COUNT_CACHE_KEY,
};
