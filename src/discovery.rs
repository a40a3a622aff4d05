//! Discovery Resolver
//!
//! Resolves a target name to the fixed set of conventional artifact
//! paths a review operates on. Pure path derivation: the resolver never
//! reads artifact contents, only the two configuration records.
//!
//! A missing shared registry aborts resolution (configuration error).
//! A missing per-target record marks the dimensions that depend solely
//! on it as not-applicable; the evaluator omits those dimensions from
//! the result entirely.

use crate::config::{load_registry_config, load_target_config, RegistryConfig, TargetConfig};
use crate::error::ReviewError;
use crate::models::Dimension;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Target name for the repository-wide cross-tool review, which has no
/// per-target record by design.
pub const CROSS_TOOL_TARGET: &str = "cross-tool";

/// The resolved artifact map for one review run. All paths are absolute
/// (project root already joined). `Option` fields are conventions that
/// exist only when their prerequisite configuration is present.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub target: String,
    pub project_root: PathBuf,

    // Engine-side conventions (shared registry).
    pub entities_file: PathBuf,
    pub adapter_init: PathBuf,
    pub orchestrator_file: PathBuf,
    pub repositories_file: PathBuf,
    pub schema_sql: PathBuf,

    /// Adapter module file; requires the per-target record.
    pub adapter_file: Option<PathBuf>,

    // Tool-side conventions (tools_root/<target>/...).
    pub output_schema: PathBuf,
    pub makefile: PathBuf,
    pub blueprint_doc: PathBuf,
    pub eval_strategy_doc: PathBuf,

    /// Analytics SQL directories for cross-tool checks.
    pub sql_dirs: Vec<PathBuf>,

    // Target wiring carried through from the per-target record.
    pub entity_names: Vec<String>,
    pub adapter_class: Option<String>,

    /// Dimensions skipped for this run because their prerequisite
    /// configuration is absent. A skip, not a failure.
    pub not_applicable: BTreeSet<Dimension>,
}

impl ArtifactSet {
    /// Render a path relative to the project root for report output.
    pub fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.project_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Resolve a target against the layered configuration.
///
/// Returns the artifact map together with the loaded registry; the
/// registry also carries the suppression list and rule inputs (required
/// sections, table patterns) that rules consult at evaluation time.
pub fn resolve(
    project_root: &Path,
    target: &str,
) -> Result<(ArtifactSet, RegistryConfig), ReviewError> {
    let registry = load_registry_config(project_root)?;

    let target_config = if target == CROSS_TOOL_TARGET {
        None
    } else {
        load_target_config(project_root, target)
    };

    let artifacts = derive_paths(project_root, target, &registry, target_config.as_ref());
    debug!(
        "Resolved target '{}': {} dimensions not applicable",
        target,
        artifacts.not_applicable.len()
    );
    Ok((artifacts, registry))
}

fn derive_paths(
    project_root: &Path,
    target: &str,
    registry: &RegistryConfig,
    target_config: Option<&TargetConfig>,
) -> ArtifactSet {
    let engine = project_root.join(&registry.engine_root);
    let persistence = engine.join("persistence");
    let tool_root = project_root.join(&registry.tools_root).join(target);

    let adapter_file = target_config
        .and_then(|c| c.adapter_module.as_deref())
        .map(|module| persistence.join("adapters").join(format!("{module}.py")));

    let mut not_applicable = BTreeSet::new();
    if target_config.is_none() {
        for dim in Dimension::ALL {
            if dim.requires_target_config() {
                not_applicable.insert(dim);
            }
        }
    }

    ArtifactSet {
        target: target.to_string(),
        project_root: project_root.to_path_buf(),
        entities_file: persistence.join("entities.py"),
        adapter_init: persistence.join("adapters").join("__init__.py"),
        orchestrator_file: engine.join("orchestrator.py"),
        repositories_file: persistence.join("repositories.py"),
        schema_sql: persistence.join("schema.sql"),
        adapter_file,
        output_schema: tool_root.join("schemas").join("output.schema.json"),
        makefile: tool_root.join("Makefile"),
        blueprint_doc: tool_root.join("BLUEPRINT.md"),
        eval_strategy_doc: tool_root.join("EVAL_STRATEGY.md"),
        sql_dirs: registry
            .sql_dirs
            .iter()
            .map(|d| project_root.join(d))
            .collect(),
        entity_names: target_config.map(|c| c.entities.clone()).unwrap_or_default(),
        adapter_class: target_config.and_then(|c| c.adapter_class.clone()),
        not_applicable,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn seed_registry(root: &Path, body: &str) {
        let dir = root.join("conforma");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(dir.join("registry.toml"), body).expect("write registry");
    }

    fn seed_target(root: &Path, name: &str, body: &str) {
        let dir = root.join("conforma").join("targets");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(dir.join(format!("{name}.toml")), body).expect("write target");
    }

    #[test]
    fn test_missing_registry_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = resolve(dir.path(), "lizard").expect_err("should abort");
        assert!(matches!(err, ReviewError::Config(_)));
    }

    #[test]
    fn test_full_resolution() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_registry(
            dir.path(),
            "engine_root = \"engine\"\ntools_root = \"tools\"\nsql_dirs = [\"queries\"]\n",
        );
        seed_target(
            dir.path(),
            "lizard",
            "adapter_module = \"lizard_adapter\"\nadapter_class = \"LizardAdapter\"\nentities = [\"LizardRun\"]\n",
        );

        let (artifacts, _) = resolve(dir.path(), "lizard").expect("resolve");
        assert!(artifacts.not_applicable.is_empty());
        assert_eq!(
            artifacts.adapter_file.as_deref(),
            Some(
                dir.path()
                    .join("engine/persistence/adapters/lizard_adapter.py")
                    .as_path()
            )
        );
        assert_eq!(
            artifacts.entities_file,
            dir.path().join("engine/persistence/entities.py")
        );
        assert_eq!(
            artifacts.blueprint_doc,
            dir.path().join("tools/lizard/BLUEPRINT.md")
        );
        assert_eq!(artifacts.sql_dirs, vec![dir.path().join("queries")]);
        assert_eq!(artifacts.entity_names, vec!["LizardRun"]);
    }

    #[test]
    fn test_absent_target_record_skips_dimensions() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_registry(dir.path(), "");

        let (artifacts, _) = resolve(dir.path(), "unknown-tool").expect("resolve");
        assert!(artifacts.not_applicable.contains(&Dimension::EntityPersistence));
        assert!(artifacts.not_applicable.contains(&Dimension::AdapterSchema));
        assert!(!artifacts
            .not_applicable
            .contains(&Dimension::DocumentationAlignment));
        assert!(artifacts.adapter_file.is_none());
        assert!(artifacts.entity_names.is_empty());
    }

    #[test]
    fn test_cross_tool_target_never_loads_target_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_registry(dir.path(), "");
        // Even if a stray record exists for the literal name it is ignored.
        seed_target(dir.path(), CROSS_TOOL_TARGET, "entities = [\"X\"]\n");

        let (artifacts, _) = resolve(dir.path(), CROSS_TOOL_TARGET).expect("resolve");
        assert!(artifacts.entity_names.is_empty());
        assert!(artifacts.not_applicable.contains(&Dimension::EntityPersistence));
    }

    #[test]
    fn test_relative_rendering() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_registry(dir.path(), "");
        let (artifacts, _) = resolve(dir.path(), CROSS_TOOL_TARGET).expect("resolve");
        assert_eq!(
            artifacts.relative(&artifacts.schema_sql),
            PathBuf::from("src/sot-engine/persistence/schema.sql")
        );
    }
}
