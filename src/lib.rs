//! Conforma - declarative conformance scoring engine
//!
//! Resolves a review target to a fixed set of conventional artifacts,
//! runs a registry of pure rules grouped into weighted dimensions,
//! scores each dimension, and aggregates a weighted advisory verdict
//! into a versioned, persisted report.

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod discovery;
mod error;
pub mod evaluator;
pub mod models;
pub mod report;
pub mod rules;
pub mod scoring;

pub use error::ReviewError;
