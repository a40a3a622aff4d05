//! JSON reporter
//!
//! Outputs the full ReviewResult as pretty-printed JSON, the same
//! shape `persist` writes to disk.

use crate::models::ReviewResult;
use anyhow::Result;

/// Render result as JSON
pub fn render(result: &ReviewResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Render result as compact JSON (single line)
#[allow(dead_code)] // Public API helper
pub fn render_compact(result: &ReviewResult) -> Result<String> {
    Ok(serde_json::to_string(result)?)
}
