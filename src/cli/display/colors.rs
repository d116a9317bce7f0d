//! Color mapping for credential state.
//!
//! All coloring respects `NO_COLOR` automatically via the `colored` crate.

use colored::Colorize;

/// Label for whether a credential carries both keys.
pub fn colorize_completeness(complete: bool) -> colored::ColoredString {
    if complete {
        "complete".green().bold()
    } else {
        "partial".yellow()
    }
}

/// Render a key value, dimming the placeholder used for empty keys.
pub fn colorize_key(value: &str) -> colored::ColoredString {
    if value.is_empty() {
        "-".dimmed()
    } else {
        value.normal()
    }
}
