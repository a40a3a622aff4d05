//! Shared registry record
//!
//! Loaded once per process from `<project-root>/conforma/registry.toml`.
//! Everything the resolver and the rules need that is not target-specific
//! lives here: conventional directory roots, required documentation
//! sections, per-tool table patterns for cross-tool SQL analysis, and
//! the declared suppression list.
//!
//! # Configuration Format
//!
//! ```toml
//! # conforma/registry.toml
//! engine_root = "src/sot-engine"
//! tools_root = "src/tools"
//! sql_dirs = ["src/sot-engine/dbt/models", "src/insights/queries"]
//!
//! blueprint_sections = ["Purpose", "Data Contract", "Output Schema"]
//! eval_strategy_sections = ["Dimensions", "Ground Truth", "Rollup"]
//!
//! [table_patterns]
//! lizard = ["lz_lizard_"]
//! scc = ["lz_scc_"]
//!
//! [[suppressions]]
//! rule = "ENTITY_RUN_PK"
//! target = "layout-scanner"
//! reason = "layout runs are keyed by collection, documented in ADR-014"
//! ```

use crate::error::ReviewError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

fn default_engine_root() -> String {
    "src/sot-engine".to_string()
}

fn default_tools_root() -> String {
    "src/tools".to_string()
}

/// The shared registry record. Read-only after load.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Root of the ingestion engine (entities, adapters, orchestrator).
    #[serde(default = "default_engine_root")]
    pub engine_root: String,

    /// Root under which each tool keeps its Makefile, schemas and docs.
    #[serde(default = "default_tools_root")]
    pub tools_root: String,

    /// Directories scanned for cross-tool SQL (relative to project root).
    #[serde(default)]
    pub sql_dirs: Vec<String>,

    /// Section headings every BLUEPRINT.md must carry.
    #[serde(default)]
    pub blueprint_sections: Vec<String>,

    /// Section headings every EVAL_STRATEGY.md must carry.
    #[serde(default)]
    pub eval_strategy_sections: Vec<String>,

    /// Tool name → landing-zone table name fragments, used to attribute
    /// SQL table references to tools.
    #[serde(default)]
    pub table_patterns: BTreeMap<String, Vec<String>>,

    /// Documented, accepted exceptions. Matching candidates are dropped
    /// before they reach any result.
    #[serde(default)]
    pub suppressions: Vec<SuppressionRecord>,
}

/// One declared exception in the registry file.
#[derive(Debug, Clone, Deserialize)]
pub struct SuppressionRecord {
    /// Rule id the exception applies to.
    pub rule: String,
    /// Restrict to one target; absent means every target.
    #[serde(default)]
    pub target: Option<String>,
    /// Restrict to artifacts whose relative path contains this fragment.
    #[serde(default)]
    pub artifact: Option<String>,
    /// Why the exception exists. Required so the list stays auditable.
    pub reason: String,
}

impl RegistryConfig {
    /// Conventional location of the registry record.
    pub fn path_in(project_root: &Path) -> PathBuf {
        project_root.join("conforma").join("registry.toml")
    }
}

/// Load the shared registry record. Absence or a parse failure is a
/// hard configuration error: without the registry no dimension can be
/// resolved, so the whole review aborts.
pub fn load_registry_config(project_root: &Path) -> Result<RegistryConfig, ReviewError> {
    let path = RegistryConfig::path_in(project_root);
    let content = std::fs::read_to_string(&path).map_err(|e| {
        ReviewError::Config(format!(
            "shared registry not readable at {}: {}",
            path.display(),
            e
        ))
    })?;

    let config: RegistryConfig = toml::from_str(&content).map_err(|e| {
        ReviewError::Config(format!("invalid registry at {}: {}", path.display(), e))
    })?;

    debug!(
        "Loaded registry from {} ({} suppressions)",
        path.display(),
        config.suppressions.len()
    );
    Ok(config)
}
