//! Report assembly and persistence
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON
//!
//! A report is built once per invocation with a fresh id and timestamp,
//! and persisted under a deterministic `<target>-<timestamp>.json`
//! name. Writes go to a temp file in the destination directory first
//! and are renamed into place, so a crash mid-write never leaves a
//! half-written report.

pub mod json;
pub mod text;

use crate::error::ReviewError;
use crate::models::{
    DimensionResult, ReviewResult, ReviewSummary, ReviewType, Severity, REPORT_SCHEMA_VERSION,
};
use crate::scoring;
use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a review result in the specified format
pub fn render(result: &ReviewResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(result),
        OutputFormat::Json => json::render(result),
    }
}

/// Assemble the immutable report from scored dimension results.
///
/// The summary is derived here and nowhere else; tallies and the
/// verdict always agree with the dimension payload. Zero reviewed
/// dimensions surfaces as the aggregator's configuration error.
pub fn build(
    target: &str,
    review_type: ReviewType,
    dimensions: Vec<DimensionResult>,
) -> Result<ReviewResult, ReviewError> {
    let (overall_score, overall_status) = scoring::aggregate(&dimensions)?;

    let mut by_severity: BTreeMap<Severity, usize> = BTreeMap::new();
    let mut total_findings = 0;
    for dimension in &dimensions {
        for finding in &dimension.findings {
            *by_severity.entry(finding.severity).or_insert(0) += 1;
            total_findings += 1;
        }
    }

    Ok(ReviewResult {
        schema_version: REPORT_SCHEMA_VERSION,
        review_id: Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        target: target.to_string(),
        review_type,
        summary: ReviewSummary {
            total_findings,
            by_severity,
            overall_score,
            overall_status,
            dimensions_reviewed: dimensions.len(),
        },
        dimensions,
    })
}

/// Deterministic report filename for a `(target, timestamp)` pair.
fn report_file_name(target: &str, timestamp: &DateTime<Utc>) -> String {
    let compact = timestamp
        .to_rfc3339_opts(SecondsFormat::Secs, true)
        .replace([':', '-'], "");
    format!("{target}-{compact}.json")
}

/// Write the report to `<output_dir>/<target>-<timestamp>.json`.
pub fn persist(result: &ReviewResult, output_dir: &Path) -> Result<PathBuf, ReviewError> {
    let persist_err = |path: &Path, source: std::io::Error| ReviewError::Persist {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(output_dir).map_err(|e| persist_err(output_dir, e))?;

    let body = json::render(result).map_err(|e| {
        persist_err(
            output_dir,
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
        )
    })?;

    let final_path = output_dir.join(report_file_name(&result.target, &result.timestamp));
    let tmp_path = final_path.with_extension("json.tmp");
    std::fs::write(&tmp_path, body).map_err(|e| persist_err(&tmp_path, e))?;
    std::fs::rename(&tmp_path, &final_path).map_err(|e| persist_err(&final_path, e))?;

    info!("Report written to {}", final_path.display());
    Ok(final_path)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Category, Dimension, DimensionStatus, Finding};
    use chrono::TimeZone;

    pub(crate) fn sample_dimensions() -> Vec<DimensionResult> {
        let finding = Finding {
            severity: Severity::Warning,
            category: Category::MissingRequirement,
            rule_id: "BLUEPRINT_SECTIONS".to_string(),
            target_artifact: Some(PathBuf::from("src/tools/lizard/BLUEPRINT.md")),
            line: None,
            message: "BLUEPRINT.md missing required section 'Outputs'".to_string(),
            evidence: "Outputs".to_string(),
            recommendation: "Add an 'Outputs' section".to_string(),
        };
        vec![
            DimensionResult {
                dimension: Dimension::EntityPersistence,
                weight: Dimension::EntityPersistence.weight(),
                score: 5,
                status: DimensionStatus::Pass,
                findings: vec![],
            },
            DimensionResult {
                dimension: Dimension::DocumentationAlignment,
                weight: Dimension::DocumentationAlignment.weight(),
                score: 3,
                status: DimensionStatus::Warn,
                findings: vec![finding],
            },
        ]
    }

    #[test]
    fn test_build_derives_summary_from_dimensions() {
        let result = build("lizard", ReviewType::ToolImplementation, sample_dimensions())
            .expect("build");

        assert_eq!(result.schema_version, REPORT_SCHEMA_VERSION);
        assert_eq!(result.target, "lizard");
        assert_eq!(result.summary.total_findings, 1);
        assert_eq!(result.summary.by_severity.get(&Severity::Warning), Some(&1));
        assert_eq!(result.summary.dimensions_reviewed, 2);

        let recount: usize = result.dimensions.iter().map(|d| d.findings.len()).sum();
        assert_eq!(result.summary.total_findings, recount);
    }

    #[test]
    fn test_build_fresh_id_per_invocation() {
        let a = build("lizard", ReviewType::ToolImplementation, sample_dimensions())
            .expect("build");
        let b = build("lizard", ReviewType::ToolImplementation, sample_dimensions())
            .expect("build");
        assert_ne!(a.review_id, b.review_id);
    }

    #[test]
    fn test_build_zero_dimensions_is_config_error() {
        let err = build("lizard", ReviewType::CrossTool, vec![]).expect_err("must fail");
        assert!(matches!(err, ReviewError::Config(_)));
    }

    #[test]
    fn test_report_file_name_compact_utc() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(
            report_file_name("lizard", &ts),
            "lizard-20260314T092653Z.json"
        );
    }

    #[test]
    fn test_persist_writes_named_report() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = build("lizard", ReviewType::ToolImplementation, sample_dimensions())
            .expect("build");

        let path = persist(&result, dir.path()).expect("persist");
        assert!(path.exists());
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .expect("file name")
            .starts_with("lizard-"));

        let body = std::fs::read_to_string(&path).expect("read back");
        let parsed: ReviewResult = serde_json::from_str(&body).expect("parse");
        assert_eq!(parsed.review_id, result.review_id);

        // No temp file left behind.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
