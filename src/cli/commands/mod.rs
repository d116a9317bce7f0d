//! CLI command implementations.

pub mod init;
pub mod keys;
pub mod seed;
