//! Tool output contract rules
//!
//! The downstream warehouse only accepts tool output that matches the
//! published JSON-Schema contract and the `output.json` filename
//! convention. These rules validate the schema file itself and the
//! Makefile `analyze` target that produces the output.

use crate::artifacts::ArtifactProvider;
use crate::config::RegistryConfig;
use crate::discovery::ArtifactSet;
use crate::models::{Category, Dimension, Severity};
use crate::rules::base::{read_or_empty, FindingCandidate, Rule};
use anyhow::Result;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const EXPECTED_DRAFT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Metadata fields every tool output schema must require.
const METADATA_FIELDS: &[&str] = &[
    "tool_name",
    "tool_version",
    "run_id",
    "repo_id",
    "branch",
    "commit",
    "timestamp",
    "schema_version",
];

static ANALYZE_TARGET: OnceLock<Regex> = OnceLock::new();
static REPO_NAME_JSON: OnceLock<Regex> = OnceLock::new();

/// Output schema file exists, parses as JSON, and declares draft
/// 2020-12. Absence and unparseable content are both findings here,
/// which lets `OUTPUT_SCHEMA_CONTRACT` stay silent on broken files.
pub struct OutputSchemaJson;

impl Rule for OutputSchemaJson {
    fn id(&self) -> &'static str {
        "OUTPUT_SCHEMA_JSON"
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn category(&self) -> Category {
        Category::MissingRequirement
    }
    fn dimension(&self) -> Dimension {
        Dimension::OutputContract
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let rel = artifacts.relative(&artifacts.output_schema);

        let Some(content) = provider.content(&artifacts.output_schema) else {
            return Ok(vec![FindingCandidate::new("Output schema file missing")
                .at(rel)
                .recommend("Add schemas/output.schema.json")]);
        };

        let schema: Value = match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(err) => {
                return Ok(vec![FindingCandidate::new("Output schema is invalid JSON")
                    .at(rel)
                    .evidence(err.to_string())
                    .recommend("Fix the JSON syntax")]);
            }
        };

        let draft = schema.get("$schema").and_then(Value::as_str).unwrap_or("");
        if draft != EXPECTED_DRAFT {
            return Ok(vec![FindingCandidate::new("Schema draft is not 2020-12")
                .at(rel)
                .evidence(draft)
                .recommend(format!("Declare \"$schema\": \"{EXPECTED_DRAFT}\""))]);
        }
        Ok(vec![])
    }
}

/// Schema requires `metadata`/`data` top level plus the standard
/// metadata fields. Silent when the file is missing or unparseable
/// (covered by `OUTPUT_SCHEMA_JSON`).
pub struct OutputSchemaContract;

impl Rule for OutputSchemaContract {
    fn id(&self) -> &'static str {
        "OUTPUT_SCHEMA_CONTRACT"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn category(&self) -> Category {
        Category::MissingRequirement
    }
    fn dimension(&self) -> Dimension {
        Dimension::OutputContract
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let Some(content) = provider.content(&artifacts.output_schema) else {
            return Ok(vec![]);
        };
        let Ok(schema) = serde_json::from_str::<Value>(&content) else {
            return Ok(vec![]);
        };
        let rel = artifacts.relative(&artifacts.output_schema);

        let required_top: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut missing: Vec<String> = Vec::new();
        for field in ["metadata", "data"] {
            if !required_top.contains(&field) {
                missing.push(field.to_string());
            }
        }

        let metadata_required: Vec<&str> = schema
            .pointer("/properties/metadata/required")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        for field in METADATA_FIELDS {
            if !metadata_required.contains(field) {
                missing.push(format!("metadata.{field}"));
            }
        }

        Ok(missing
            .into_iter()
            .map(|field| {
                FindingCandidate::new(format!("Schema does not require '{field}'"))
                    .at(rel.clone())
                    .evidence(field)
                    .recommend("Add the field to the schema's required list")
            })
            .collect())
    }
}

/// Makefile `analyze` target writes `output.json`; flags the
/// `$(REPO_NAME).json` drift the older tools carried.
pub struct OutputFilenameConvention;

impl Rule for OutputFilenameConvention {
    fn id(&self) -> &'static str {
        "OUTPUT_FILENAME_CONVENTION"
    }
    fn severity(&self) -> Severity {
        Severity::Info
    }
    fn category(&self) -> Category {
        Category::NamingDrift
    }
    fn dimension(&self) -> Dimension {
        Dimension::OutputContract
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let content = read_or_empty(provider, &artifacts.makefile);
        let rel = artifacts.relative(&artifacts.makefile);

        let analyze = ANALYZE_TARGET.get_or_init(|| {
            Regex::new(r"(?m)^analyze:.*?\n((?:\t.*\n)*)").expect("valid regex")
        });
        let Some(caps) = analyze.captures(&content) else {
            return Ok(vec![FindingCandidate::new(
                "No analyze target found in Makefile",
            )
            .at(rel)
            .recommend("Add an analyze target that writes output.json")]);
        };

        let commands = &caps[1];
        if commands.contains("output.json")
            || commands.contains("--output-dir")
            || commands.contains("--output")
        {
            return Ok(vec![]);
        }

        let repo_name = REPO_NAME_JSON
            .get_or_init(|| Regex::new(r"\$\(REPO_NAME\)\.json").expect("valid regex"));
        if repo_name.is_match(commands) {
            return Ok(vec![FindingCandidate::new(
                "analyze target uses $(REPO_NAME).json instead of output.json",
            )
            .at(rel)
            .evidence("$(REPO_NAME).json")
            .recommend("Write output.json (or pass --output $(OUTPUT_DIR)/output.json)")]);
        }
        Ok(vec![])
    }
}
