//! Credential domain model.
//!
//! A user's REST API credential is a public/secret key pair kept in the
//! user's metadata, plus a token derived from both. The token is never
//! stored; it is recomputed from the two keys on every read.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::{CredentialError, CredentialResult};

/// Meta-key holding a user's public key.
pub const PUBLIC_KEY_META_KEY: &str = "rest_api_token_auth_public_key";

/// Meta-key holding a user's secret key.
pub const SECRET_KEY_META_KEY: &str = "rest_api_token_auth_secret_key";

/// Meta value marking a user as credentialed.
///
/// Issuance writes a reverse-lookup row whose key is the secret and whose
/// value is this constant, so users can be enumerated by value.
pub const CREDENTIALED_MARKER: &str = "rest_api_token_auth_secret_key";

/// Cache namespace for public key entries.
pub const PUBLIC_KEY_CACHE_NAMESPACE: &str = "rest_api_token_auth_cache_user_public_key";

/// Cache namespace for secret key entries.
pub const SECRET_KEY_CACHE_NAMESPACE: &str = "rest_api_token_auth_cache_user_secret_key";

/// Cache key of the credentialed-user count.
pub const TOTAL_COUNT_CACHE_KEY: &str = "rest-api-token-auth-total-api-keys";

/// Default number of rows per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Stable numeric user identifier. Zero is the empty identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wrap a raw id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// True for the zero id, which never names a real user.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user as enumerated by the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable id.
    pub id: UserId,
    /// Login name.
    pub login: String,
    /// Email address.
    pub email: String,
    /// Name shown in listings.
    pub display_name: String,
}

impl UserRecord {
    /// Record whose display name defaults to the login.
    pub fn new(id: impl Into<UserId>, login: impl Into<String>, email: impl Into<String>) -> Self {
        let login = login.into();
        Self {
            id: id.into(),
            display_name: login.clone(),
            login,
            email: email.into(),
        }
    }
}

/// One row of the credential listing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredential {
    /// Owner of the credential.
    pub user_id: UserId,
    /// Owner's login.
    pub login: String,
    /// Owner's email.
    pub email: String,
    /// Owner's display name.
    pub display_name: String,
    /// Empty when no key was ever issued.
    pub public_key: String,
    /// Paired with `public_key`; redacted from `Debug`.
    pub secret_key: String,
    /// `sha256(secret_key ++ public_key)`, hex encoded.
    pub token: String,
}

impl UserCredential {
    /// Both halves of the key pair are present.
    pub fn is_complete(&self) -> bool {
        !self.public_key.is_empty() && !self.secret_key.is_empty()
    }
}

impl fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredential")
            .field("user_id", &self.user_id)
            .field("login", &self.login)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("public_key", &self.public_key)
            .field("secret_key", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Validated page coordinates. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_number: u32,
    page_size: u32,
}

impl PageRequest {
    /// Validate a request; both coordinates must be non-zero.
    pub fn new(page_number: u32, page_size: u32) -> CredentialResult<Self> {
        if page_number == 0 || page_size == 0 {
            return Err(CredentialError::InvalidPageRequest {
                page_number,
                page_size,
            });
        }
        Ok(Self {
            page_number,
            page_size,
        })
    }

    /// 1-based page number.
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Rows per page.
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows skipped before this page.
    pub const fn offset(&self) -> u64 {
        self.page_size as u64 * (self.page_number as u64 - 1)
    }
}

/// A single page of credentials plus the pagination totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialListPage {
    /// Rows of this page, by user id ascending.
    pub records: Vec<UserCredential>,
    /// 1-based page number.
    pub page_number: u32,
    /// Requested rows per page.
    pub page_size: u32,
    /// Users holding the credentialed marker, as of the last count refresh.
    pub total_count: u64,
}

impl CredentialListPage {
    /// `ceil(total_count / page_size)`.
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(u64::from(self.page_size))
    }

    /// No rows on this page.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows on this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
