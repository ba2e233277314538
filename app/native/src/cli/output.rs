//! CLI output formatting.
//!
//! Human-readable output is a titled table; `--json` output is pretty JSON on
//! stdout so it can be piped.

use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::WallpaperdError;

/// Prints `value` as pretty JSON.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), WallpaperdError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints `rows` under a bold `title (count)` heading, or `empty` dimmed when
/// there are none.
pub fn print_table<R: Tabled>(title: &str, rows: Vec<R>, empty: &str) {
    if rows.is_empty() {
        println!("{}", empty.dimmed());
        return;
    }

    let count = rows.len();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", format!("{title} ({count})").bold());
    println!("{table}");
}

/// Prints a green success line.
pub fn print_success(message: &str) { println!("{} {message}", "✓".green()); }

/// Shortens `s` to at most `max_chars` characters, ending in an ellipsis when
/// cut.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Formats a boolean as a colored mark.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}
