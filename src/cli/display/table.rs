//! Table builder wrapper around comfy-table for consistent list display.

use colored::Colorize;
use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};

/// Create a standard list table with the given headers.
///
/// Uses the NOTHING preset (no borders). comfy-table honours `NO_COLOR`.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Render a page of rows with a pagination footer.
pub fn render_page(entity_name: &str, table: Table, shown: usize, page_number: u32, total_pages: u64, total: u64) -> String {
    if total == 0 {
        return format!("No {entity_name}s found.");
    }
    let footer = format!(
        "page {} of {}, {} total",
        page_number.to_string().bold(),
        total_pages.max(1),
        total.to_string().bold(),
    );
    if shown == 0 {
        return format!("No {entity_name}s on this page.\n{footer}");
    }
    format!("{table}\n\n{footer}")
}

/// Mask all but the last `visible` characters of a secret.
pub fn mask_secret(secret: &str, visible: usize) -> String {
    let len = secret.chars().count();
    if len == 0 {
        return String::new();
    }
    if len <= visible {
        return "*".repeat(len);
    }
    let tail: String = secret.chars().skip(len - visible).collect();
    format!("{}{}", "*".repeat(len - visible), tail)
}
