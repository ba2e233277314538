//! JSON Schema for the configuration file.

use crate::config::AppConfig;

/// Returns the configuration JSON Schema, pretty-printed.
#[must_use]
pub fn print_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}
