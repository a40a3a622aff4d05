//! Core data models for Conforma
//!
//! These models are used throughout the codebase for representing
//! findings, per-dimension results, and the versioned review report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Report schema version, bumped on breaking shape changes.
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Severity levels for findings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What kind of conformance problem a finding describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PatternViolation,
    MissingRequirement,
    Inconsistency,
    AntiPattern,
    PlaceholderContent,
    NamingDrift,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::PatternViolation => write!(f, "pattern_violation"),
            Category::MissingRequirement => write!(f, "missing_requirement"),
            Category::Inconsistency => write!(f, "inconsistency"),
            Category::AntiPattern => write!(f, "anti_pattern"),
            Category::PlaceholderContent => write!(f, "placeholder_content"),
            Category::NamingDrift => write!(f, "naming_drift"),
        }
    }
}

/// The weighted rule groups a review is scored across
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    EntityPersistence,
    AdapterSchema,
    OrchestratorWiring,
    OutputContract,
    CrossToolConsistency,
    DocumentationAlignment,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::EntityPersistence,
        Dimension::AdapterSchema,
        Dimension::OrchestratorWiring,
        Dimension::OutputContract,
        Dimension::CrossToolConsistency,
        Dimension::DocumentationAlignment,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Dimension::EntityPersistence => "entity_persistence",
            Dimension::AdapterSchema => "adapter_schema",
            Dimension::OrchestratorWiring => "orchestrator_wiring",
            Dimension::OutputContract => "output_contract",
            Dimension::CrossToolConsistency => "cross_tool_consistency",
            Dimension::DocumentationAlignment => "documentation_alignment",
        }
    }

    /// Relative weight in the overall verdict. Weights across all six
    /// dimensions sum to 1.0; aggregation renormalizes over the subset
    /// actually reviewed.
    pub fn weight(&self) -> f64 {
        match self {
            Dimension::EntityPersistence => 0.20,
            Dimension::AdapterSchema => 0.20,
            Dimension::OrchestratorWiring => 0.15,
            Dimension::OutputContract => 0.15,
            Dimension::CrossToolConsistency => 0.15,
            Dimension::DocumentationAlignment => 0.15,
        }
    }

    /// Dimensions whose rules only make sense with a per-target config
    /// record (entity names, adapter class). When that record is absent
    /// these are skipped, not failed.
    pub fn requires_target_config(&self) -> bool {
        matches!(self, Dimension::EntityPersistence | Dimension::AdapterSchema)
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Which subset of dimensions a review runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewType {
    ToolImplementation,
    CrossTool,
    BlueprintAlignment,
}

impl ReviewType {
    pub fn id(&self) -> &'static str {
        match self {
            ReviewType::ToolImplementation => "tool_implementation",
            ReviewType::CrossTool => "cross_tool",
            ReviewType::BlueprintAlignment => "blueprint_alignment",
        }
    }

    /// Fixed review-type → dimension-set table, in declaration order.
    pub fn dimensions(&self) -> &'static [Dimension] {
        match self {
            ReviewType::ToolImplementation => &[
                Dimension::EntityPersistence,
                Dimension::AdapterSchema,
                Dimension::OrchestratorWiring,
                Dimension::OutputContract,
                Dimension::DocumentationAlignment,
            ],
            ReviewType::CrossTool => &[Dimension::CrossToolConsistency],
            ReviewType::BlueprintAlignment => &[Dimension::DocumentationAlignment],
        }
    }

    /// Blueprint alignment reruns the documentation dimension with its
    /// thorough-only rules included.
    pub fn thorough(&self) -> bool {
        matches!(self, ReviewType::BlueprintAlignment)
    }
}

impl std::str::FromStr for ReviewType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tool_implementation" | "tool-implementation" => Ok(ReviewType::ToolImplementation),
            "cross_tool" | "cross-tool" => Ok(ReviewType::CrossTool),
            "blueprint_alignment" | "blueprint-alignment" => Ok(ReviewType::BlueprintAlignment),
            _ => Err(anyhow::anyhow!(
                "Unknown review type '{}'. Valid types: tool_implementation, cross_tool, blueprint_alignment",
                s
            )),
        }
    }
}

impl std::fmt::Display for ReviewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewType::ToolImplementation => write!(f, "tool_implementation"),
            ReviewType::CrossTool => write!(f, "cross_tool"),
            ReviewType::BlueprintAlignment => write!(f, "blueprint_alignment"),
        }
    }
}

/// One rule observation. Produced by exactly one rule execution and
/// never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub category: Category,
    pub rule_id: String,
    /// Path relative to the project root, when the finding points at a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_artifact: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub evidence: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub recommendation: String,
}

/// Pass/warn/fail status of a single dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionStatus {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for DimensionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimensionStatus::Pass => write!(f, "pass"),
            DimensionStatus::Warn => write!(f, "warn"),
            DimensionStatus::Fail => write!(f, "fail"),
        }
    }
}

/// One dimension's evaluation outcome. `score` and `status` are derived
/// from `findings` at construction; they are never set independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionResult {
    pub dimension: Dimension,
    pub weight: f64,
    pub score: u8,
    pub status: DimensionStatus,
    pub findings: Vec<Finding>,
}

/// Advisory verdict derived from the weighted overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    StrongPass,
    Pass,
    WeakPass,
    NeedsWork,
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallStatus::StrongPass => write!(f, "STRONG_PASS"),
            OverallStatus::Pass => write!(f, "PASS"),
            OverallStatus::WeakPass => write!(f, "WEAK_PASS"),
            OverallStatus::NeedsWork => write!(f, "NEEDS_WORK"),
        }
    }
}

/// Finding tallies plus the aggregated verdict, derived entirely from
/// the dimension results so the report is internally consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub total_findings: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub overall_score: f64,
    pub overall_status: OverallStatus,
    pub dimensions_reviewed: usize,
}

/// The top-level report. Constructed once per invocation, immutable
/// thereafter; a re-run produces a new report with a new id/timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResult {
    pub schema_version: u32,
    pub review_id: String,
    pub timestamp: DateTime<Utc>,
    pub target: String,
    pub review_type: ReviewType,
    pub dimensions: Vec<DimensionResult>,
    pub summary: ReviewSummary,
}
