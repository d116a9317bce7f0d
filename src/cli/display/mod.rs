//! Display primitives for CLI output: tables, key masking and colors.

pub mod colors;
pub mod table;

pub use colors::*;
pub use table::*;
