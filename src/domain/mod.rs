//! Domain layer for the token auth key listing
//!
//! Core models, the port traits adapters implement, and domain errors.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CredentialError, CredentialResult};
