//! Per-target configuration records
//!
//! Each reviewable target may carry a record at
//! `<project-root>/conforma/targets/<target>.toml`:
//!
//! ```toml
//! adapter_module = "layout_adapter"
//! adapter_class = "LayoutAdapter"
//! entities = ["LayoutNode", "LayoutRun"]
//! ```
//!
//! The record is optional. When it is absent the dimensions that depend
//! solely on it are skipped for the run; this is not an error and must
//! not lower any score.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One target's declared wiring into the ingestion engine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetConfig {
    /// Module name of the target's adapter under the adapters package.
    #[serde(default)]
    pub adapter_module: Option<String>,

    /// Class name of the target's adapter.
    #[serde(default)]
    pub adapter_class: Option<String>,

    /// Entity class names the target persists.
    #[serde(default)]
    pub entities: Vec<String>,
}

impl TargetConfig {
    /// Conventional location of a target's record.
    pub fn path_in(project_root: &Path, target: &str) -> PathBuf {
        project_root
            .join("conforma")
            .join("targets")
            .join(format!("{target}.toml"))
    }
}

/// Load a target's record if it exists. A missing file is `None`; a file
/// that exists but does not parse is treated the same way, with a warning,
/// so one broken record degrades to a skip rather than killing the review.
pub fn load_target_config(project_root: &Path, target: &str) -> Option<TargetConfig> {
    let path = TargetConfig::path_in(project_root, target);
    let content = std::fs::read_to_string(&path).ok()?;

    match toml::from_str::<TargetConfig>(&content) {
        Ok(config) => {
            debug!("Loaded target config from {}", path.display());
            Some(config)
        }
        Err(e) => {
            warn!("Ignoring unparseable target config {}: {}", path.display(), e);
            None
        }
    }
}
