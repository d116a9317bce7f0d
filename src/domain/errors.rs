//! Domain errors for the credential read path.

use thiserror::Error;

use crate::domain::ports::StoreError;

/// Errors surfaced by the credential store.
///
/// Missing credentials are never errors; they come back as empty strings
/// or zero counts. Only an unreachable backing store or a malformed page
/// request produce an `Err`.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The backing store failed; never retried.
    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// Page number or page size was zero.
    #[error("Invalid page request: page {page_number} with page size {page_size}")]
    InvalidPageRequest {
        /// Requested 1-based page.
        page_number: u32,
        /// Requested rows per page.
        page_size: u32,
    },
}

/// Result alias for credential store operations.
pub type CredentialResult<T> = Result<T, CredentialError>;
