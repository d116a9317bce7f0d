//! Infrastructure layer module
//!
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//! - Project setup and service wiring
//!
//! Storage and cache adapters live in `crate::adapters`.

pub mod config;
pub mod logging;
pub mod setup;
