//! Table formatting and display helpers

use tabled::{
    settings::{object::Rows, Alignment, Color, Style},
    Table, Tabled,
};

/// Placeholder shown for empty values
pub const NOT_SET: &str = "<not set>";

/// Render rows as a sharp-bordered table with a centered header.
///
/// The header is tinted cyan unless `no_color` is set.
pub fn render_table<T: Tabled>(rows: &[T], no_color: bool) -> String {
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.modify(Rows::first(), Alignment::center());

    if !no_color {
        table.modify(Rows::first(), Color::FG_CYAN);
    }

    table.to_string()
}

/// Hide all but the last four characters of a credential
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return NOT_SET.to_string();
    }

    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }

    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

/// Display form of a plain value, with a placeholder when empty
pub fn display_value(value: &str) -> String {
    if value.is_empty() {
        NOT_SET.to_string()
    } else {
        value.to_string()
    }
}
