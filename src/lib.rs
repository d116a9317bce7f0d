//! token-auth-keys: administrative read path over per-user REST API credentials.
//!
//! Every user may hold a public key and a secret key stored as user metadata.
//! The token presented by API clients is `sha256(secret ++ public)` and is
//! always derived, never stored. This crate lists credentialed users one page
//! at a time with a transient cache in front of every key lookup and the total
//! count.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the two ports
//!   (`UserMetaStore`, `TransientCache`)
//! - **Service Layer** (`services`): `CredentialStore` and token derivation
//! - **Adapters** (`adapters`): SQLite store, moka and null caches
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, setup
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use token_auth_keys::adapters::cache::MokaTransientCache;
//! use token_auth_keys::adapters::sqlite::{initialize_database, SqliteUserMetaStore};
//! use token_auth_keys::services::CredentialStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = initialize_database("sqlite:.token-auth/token-auth.db").await?;
//!     let store = CredentialStore::new(
//!         Arc::new(SqliteUserMetaStore::new(pool)),
//!         Arc::new(MokaTransientCache::new()),
//!     );
//!     let page = store.list_page(1, 30).await?;
//!     println!("{} of {}", page.len(), page.total_count);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::models::{
    CacheConfig, Config, CredentialListPage, DatabaseConfig, ListingConfig, LoggingConfig,
    PageRequest, UserCredential, UserId, UserRecord,
};
pub use domain::ports::{CacheError, StoreError, TransientCache, UserMetaStore};
pub use domain::{CredentialError, CredentialResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{derive_token, CredentialStore, CredentialStoreSettings, EMPTY_TOKEN};
