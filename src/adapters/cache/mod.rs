//! Transient cache adapters.
//!
//! `MokaTransientCache` uses `moka` for TTL-based concurrent caching with a
//! per-entry expiry. `NullTransientCache` never stores anything, for
//! deployments that read straight from the store.

pub mod moka_cache;
pub mod null_cache;

pub use moka_cache::MokaTransientCache;
pub use null_cache::NullTransientCache;
