//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - UserMetaStore: per-user metadata lookups and credentialed-user enumeration
//! - TransientCache: string cache with per-entry TTL
//!
//! The credential store only ever talks to these traits, so any backing store
//! or cache can be injected at construction time.

pub mod transient_cache;
pub mod user_meta_store;

pub use transient_cache::{CacheError, TransientCache};
pub use user_meta_store::{StoreError, UserMetaStore};
