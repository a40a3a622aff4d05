//! End-to-end review tests over an on-disk fixture project
//!
//! Each test builds its own temp project laid out the way the platform
//! conventions expect (engine persistence modules, per-tool directory,
//! conforma configuration), then drives the library the same way the
//! CLI does: resolve, evaluate, build, persist.

use conforma::artifacts::FsArtifacts;
use conforma::discovery;
use conforma::evaluator::Evaluator;
use conforma::models::{Dimension, OverallStatus, ReviewType, Severity};
use conforma::report;
use conforma::rules::{default_registry, SuppressionSet};
use conforma::ReviewError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const REGISTRY_TOML: &str = r#"
engine_root = "src/sot-engine"
tools_root = "src/tools"
sql_dirs = ["queries"]
blueprint_sections = ["Purpose", "Outputs"]
eval_strategy_sections = ["Evaluation Modes"]

[table_patterns]
scc = ["lz_scc_"]
lizard = ["lz_lizard_"]
"#;

const LIZARD_TARGET_TOML: &str = r#"
adapter_module = "lizard_adapter"
adapter_class = "LizardAdapter"
entities = ["LizardFunctionMetric"]
"#;

const ENTITIES_PY: &str = "\
from dataclasses import dataclass

@dataclass(frozen=True)
class LizardFunctionMetric:
    run_pk: int
    file_path: str

    def __post_init__(self):
        self._validate_relative_path(self.file_path)
";

const LIZARD_ADAPTER_PY: &str = "\
SCHEMA_PATH = \"persistence/schema.sql\"
LZ_TABLES = [\"lz_lizard_function_metrics\"]
TABLE_DDL = {\"lz_lizard_function_metrics\": \"CREATE TABLE lz_lizard_function_metrics\"}
QUALITY_RULES = []

class LizardAdapter(BaseAdapter):
    pass
";

const ADAPTERS_INIT_PY: &str = "\
from .lizard_adapter import LizardAdapter

__all__ = [\"LizardAdapter\"]
";

const ORCHESTRATOR_PY: &str = "\
TOOL_INGESTION_CONFIGS = [
    ToolIngestionConfig(\"lizard\", LizardAdapter, ToolRunRepository),
]
";

const REPOSITORIES_PY: &str = "\
_VALID_LZ_TABLES = frozenset([
    \"lz_tool_runs\",
    \"lz_lizard_function_metrics\",
])
";

const SCHEMA_SQL: &str = "\
CREATE TABLE lz_lizard_function_metrics (
    run_pk INTEGER NOT NULL,
    file_path TEXT NOT NULL
);
";

const OUTPUT_SCHEMA_JSON: &str = r#"{
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "required": ["metadata", "data"],
    "properties": {
        "metadata": {
            "required": [
                "tool_name", "tool_version", "run_id", "repo_id",
                "branch", "commit", "timestamp", "schema_version"
            ]
        },
        "data": {}
    }
}"#;

const MAKEFILE: &str = "\
analyze: deps
\tlizard . --output $(OUTPUT_DIR)/output.json
";

const BLUEPRINT_MD: &str = "\
# Purpose

Measures cyclomatic complexity per function.

## Outputs

output.json per the shared contract.
";

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, body).expect("write fixture");
}

/// A fully conforming lizard integration.
fn conforming_project() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "conforma/registry.toml", REGISTRY_TOML);
    write(root, "conforma/targets/lizard.toml", LIZARD_TARGET_TOML);
    write(root, "src/sot-engine/persistence/entities.py", ENTITIES_PY);
    write(
        root,
        "src/sot-engine/persistence/adapters/lizard_adapter.py",
        LIZARD_ADAPTER_PY,
    );
    write(
        root,
        "src/sot-engine/persistence/adapters/__init__.py",
        ADAPTERS_INIT_PY,
    );
    write(root, "src/sot-engine/orchestrator.py", ORCHESTRATOR_PY);
    write(
        root,
        "src/sot-engine/persistence/repositories.py",
        REPOSITORIES_PY,
    );
    write(root, "src/sot-engine/persistence/schema.sql", SCHEMA_SQL);
    write(
        root,
        "src/tools/lizard/schemas/output.schema.json",
        OUTPUT_SCHEMA_JSON,
    );
    write(root, "src/tools/lizard/Makefile", MAKEFILE);
    write(root, "src/tools/lizard/BLUEPRINT.md", BLUEPRINT_MD);
    dir
}

fn review(
    root: &Path,
    target: &str,
    review_type: ReviewType,
    suppressions: Vec<conforma::config::SuppressionRecord>,
) -> conforma::models::ReviewResult {
    let (artifacts, registry) = discovery::resolve(root, target).expect("resolve");
    let evaluator = Evaluator::new(default_registry(), SuppressionSet::new(suppressions), 2);
    let provider = FsArtifacts::new();
    let dimensions = evaluator
        .evaluate(review_type, &artifacts, &registry, &provider)
        .expect("evaluate");
    report::build(target, review_type, dimensions).expect("build")
}

#[test]
fn conforming_project_scores_strong_pass() {
    let dir = conforming_project();
    let result = review(dir.path(), "lizard", ReviewType::ToolImplementation, vec![]);

    assert_eq!(result.summary.dimensions_reviewed, 5);
    assert_eq!(result.summary.total_findings, 0, "{:#?}", result.dimensions);
    for dimension in &result.dimensions {
        assert_eq!(dimension.score, 5, "{} not clean", dimension.dimension);
    }
    assert!((result.summary.overall_score - 5.0).abs() < 1e-9);
    assert_eq!(result.summary.overall_status, OverallStatus::StrongPass);
}

#[test]
fn summary_always_agrees_with_dimension_payload() {
    let dir = conforming_project();
    // Break the blueprint so there is something to count.
    write(dir.path(), "src/tools/lizard/BLUEPRINT.md", "# Purpose\n\nTBD\n");

    let result = review(dir.path(), "lizard", ReviewType::ToolImplementation, vec![]);
    let recount: usize = result.dimensions.iter().map(|d| d.findings.len()).sum();
    assert!(recount > 0);
    assert_eq!(result.summary.total_findings, recount);

    let by_severity: usize = result.summary.by_severity.values().sum();
    assert_eq!(by_severity, recount);
}

#[test]
fn missing_target_record_skips_rather_than_fails() {
    let dir = conforming_project();
    // No conforma/targets/scc.toml exists; engine-side artifacts also
    // lack any scc wiring.
    let result = review(dir.path(), "scc", ReviewType::ToolImplementation, vec![]);

    let reviewed: Vec<Dimension> = result.dimensions.iter().map(|d| d.dimension).collect();
    assert!(!reviewed.contains(&Dimension::EntityPersistence));
    assert!(!reviewed.contains(&Dimension::AdapterSchema));
    assert_eq!(result.summary.dimensions_reviewed, 3);

    // Renormalization: weights of the skipped dimensions are excluded
    // from the denominator, not counted as zeros.
    let weight_sum: f64 = result.dimensions.iter().map(|d| d.weight).sum();
    assert!((weight_sum - 0.45).abs() < 1e-9);
}

#[test]
fn suppression_is_idempotent_and_reversible() {
    let dir = conforming_project();
    fs::remove_file(dir.path().join("src/tools/lizard/BLUEPRINT.md")).expect("remove");

    let suppression = conforma::config::SuppressionRecord {
        rule: "BLUEPRINT_PRESENT".to_string(),
        target: Some("lizard".to_string()),
        artifact: None,
        reason: "doc migration tracked separately".to_string(),
    };

    let blueprint_findings = |result: &conforma::models::ReviewResult| {
        result
            .dimensions
            .iter()
            .flat_map(|d| &d.findings)
            .filter(|f| f.rule_id == "BLUEPRINT_PRESENT")
            .count()
    };

    for _ in 0..2 {
        let suppressed = review(
            dir.path(),
            "lizard",
            ReviewType::ToolImplementation,
            vec![suppression.clone()],
        );
        assert_eq!(blueprint_findings(&suppressed), 0);
    }

    let unsuppressed = review(dir.path(), "lizard", ReviewType::ToolImplementation, vec![]);
    assert_eq!(blueprint_findings(&unsuppressed), 1);
}

#[test]
fn repeated_runs_are_deterministic() {
    let dir = conforming_project();
    // A few deliberate violations to give the runs something to order.
    write(dir.path(), "src/tools/lizard/BLUEPRINT.md", "# Notes\n\nTODO\n");
    fs::remove_file(
        dir.path()
            .join("src/tools/lizard/schemas/output.schema.json"),
    )
    .expect("remove");

    let fingerprint = |result: &conforma::models::ReviewResult| -> Vec<(String, String)> {
        result
            .dimensions
            .iter()
            .flat_map(|d| &d.findings)
            .map(|f| (f.rule_id.clone(), f.message.clone()))
            .collect()
    };

    let first = review(dir.path(), "lizard", ReviewType::ToolImplementation, vec![]);
    let second = review(dir.path(), "lizard", ReviewType::ToolImplementation, vec![]);
    assert_eq!(fingerprint(&first), fingerprint(&second));
    // Fresh identity per run, same content.
    assert_ne!(first.review_id, second.review_id);
}

#[test]
fn missing_shared_registry_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = discovery::resolve(dir.path(), "lizard").expect_err("must fail");
    assert!(matches!(err, ReviewError::Config(_)));
}

#[test]
fn cross_tool_review_flags_direct_run_pk_join() {
    let dir = conforming_project();
    write(
        dir.path(),
        "queries/complexity_vs_size.sql",
        "SELECT *\nFROM lz_scc_file_metrics sm\nJOIN lz_lizard_function_metrics lf\n  ON sm.run_pk = lf.run_pk\n",
    );

    let result = review(dir.path(), "cross-tool", ReviewType::CrossTool, vec![]);
    assert_eq!(result.summary.dimensions_reviewed, 1);

    let dim = &result.dimensions[0];
    assert_eq!(dim.dimension, Dimension::CrossToolConsistency);
    assert_eq!(dim.findings.len(), 1);
    assert_eq!(dim.findings[0].severity, Severity::Warning);
    assert_eq!(dim.findings[0].line, Some(4));
    // One warning scores 3, and a single 3 renormalizes to WEAK_PASS.
    assert_eq!(dim.score, 3);
    assert_eq!(result.summary.overall_status, OverallStatus::WeakPass);
}

#[test]
fn blueprint_alignment_runs_thorough_rules() {
    let dir = conforming_project();
    // EVAL_STRATEGY.md is absent, which only the thorough review reports.
    let standard = review(dir.path(), "lizard", ReviewType::ToolImplementation, vec![]);
    let thorough = review(dir.path(), "lizard", ReviewType::BlueprintAlignment, vec![]);

    let has_eval = |result: &conforma::models::ReviewResult| {
        result
            .dimensions
            .iter()
            .flat_map(|d| &d.findings)
            .any(|f| f.rule_id == "EVAL_STRATEGY_SECTIONS")
    };
    assert!(!has_eval(&standard));
    assert!(has_eval(&thorough));
}

#[test]
fn report_persists_atomically_under_output_dir() {
    let dir = conforming_project();
    let out = tempfile::tempdir().expect("tempdir");
    let result = review(dir.path(), "lizard", ReviewType::ToolImplementation, vec![]);

    let location = report::persist(&result, out.path()).expect("persist");
    assert!(location.starts_with(out.path()));

    let body = fs::read_to_string(&location).expect("read back");
    let parsed: conforma::models::ReviewResult =
        serde_json::from_str(&body).expect("well-formed report");
    assert_eq!(parsed.schema_version, result.schema_version);
    assert_eq!(parsed.summary.total_findings, result.summary.total_findings);
}

#[test]
fn blocked_output_dir_surfaces_report_before_persist_error() {
    // A plain file where the output directory should be makes every
    // write fail. The review itself must still run to completion: the
    // command prints the rendered report first, then propagates the
    // persistence error, so the error here must be the persist variant
    // reached only after a fully computed result.
    let dir = conforming_project();
    let blocked = dir.path().join("review-out");
    fs::write(&blocked, "in the way").expect("write blocker");

    let cli = conforma::cli::Cli {
        log_level: "error".to_string(),
        command: conforma::cli::Commands::Review {
            target: "lizard".to_string(),
            review_type: "tool_implementation".to_string(),
            output_dir: blocked.clone(),
            project_root: dir.path().to_path_buf(),
            format: "json".to_string(),
            workers: 2,
        },
    };

    let err = conforma::cli::run(cli).expect_err("persist must fail");
    let review_err = err
        .downcast_ref::<ReviewError>()
        .expect("persist error, not an earlier failure");
    assert!(matches!(review_err, ReviewError::Persist { .. }));
    assert!(err.to_string().contains("failed to persist report"));
}
