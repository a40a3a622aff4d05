//! Configuration module for Conforma
//!
//! This module handles:
//! - The shared registry record (conforma/registry.toml) — conventional
//!   roots, required documentation sections, cross-tool table patterns,
//!   and the suppression list. Required; absence is fatal.
//! - Per-target records (conforma/targets/<target>.toml) — adapter
//!   module/class and entity names. Optional; absence skips the
//!   dimensions that depend on it.

mod registry_config;
mod target_config;

pub use registry_config::{
    load_registry_config,
    RegistryConfig,
    SuppressionRecord,
};
pub use target_config::{
    load_target_config,
    TargetConfig,
};
