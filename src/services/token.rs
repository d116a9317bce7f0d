//! Token and cache-key derivation.
//!
//! Both use SHA-256 rendered as lowercase hex.

use sha2::{Digest, Sha256};

use crate::domain::models::UserId;

/// Digest of the empty concatenation, i.e. the token of a user with no keys.
pub const EMPTY_TOKEN: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Hex-encoded SHA-256 of `input`.
pub fn sha256_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

/// Derive a user's token from their key pair.
///
/// The secret key is hashed before the public key.
pub fn derive_token(secret_key: &str, public_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret_key.as_bytes());
    hasher.update(public_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Cache key for one user's entry within a namespace.
pub fn cache_key(namespace: &str, user_id: UserId) -> String {
    sha256_hex(format!("{namespace}{user_id}").as_bytes())
}
