//! Service layer: credential lookups and token derivation.

pub mod credential_store;
pub mod token;

pub use credential_store::{CredentialStore, CredentialStoreSettings, DEFAULT_CACHE_TTL};
pub use token::{cache_key, derive_token, sha256_hex, EMPTY_TOKEN};
