//! Fatal error taxonomy for the review engine
//!
//! Only conditions that abort a review live here. A rule that throws is
//! recovered by the evaluator into a synthetic finding; a missing
//! artifact is a per-rule contract decision, never an error.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    /// Missing or unreadable shared registry, or a review that selects
    /// zero reviewable dimensions. Aborts before any rule runs.
    #[error("configuration error: {0}")]
    Config(String),

    /// Report could not be written. Raised only after the in-memory
    /// result is fully computed so callers can still print it.
    #[error("failed to persist report to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
