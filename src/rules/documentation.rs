//! Documentation alignment rules
//!
//! Blueprint and evaluation-strategy documents are the contract a tool
//! states about itself. These rules check they exist, carry the
//! required sections, and have not drifted into placeholder text or
//! stale naming.

use crate::artifacts::ArtifactProvider;
use crate::config::RegistryConfig;
use crate::discovery::ArtifactSet;
use crate::models::{Category, Dimension, Severity};
use crate::rules::base::{FindingCandidate, Rule};
use anyhow::Result;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

static HEADING: OnceLock<Regex> = OnceLock::new();
static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

/// Level 1-3 markdown headings, stripped of their `#` markers.
fn markdown_sections(content: &str) -> Vec<String> {
    let heading = HEADING.get_or_init(|| Regex::new(r"^#{1,3}\s+(.+)$").expect("valid regex"));
    content
        .lines()
        .filter_map(|line| heading.captures(line.trim()))
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// One candidate per required section with no heading containing it
/// (case-insensitive substring match).
fn missing_section_candidates(
    content: &str,
    required: &[String],
    doc: &Path,
    doc_name: &str,
) -> Vec<FindingCandidate> {
    let sections: Vec<String> = markdown_sections(content)
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect();

    required
        .iter()
        .filter(|req| {
            let needle = req.to_lowercase();
            !sections.iter().any(|s| s.contains(&needle))
        })
        .map(|req| {
            FindingCandidate::new(format!("{doc_name} missing required section '{req}'"))
                .at(doc)
                .evidence(req.clone())
                .recommend(format!("Add a '{req}' section"))
        })
        .collect()
}

/// `BLUEPRINT.md` exists; absence is the finding.
pub struct BlueprintPresent;

impl Rule for BlueprintPresent {
    fn id(&self) -> &'static str {
        "BLUEPRINT_PRESENT"
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn category(&self) -> Category {
        Category::MissingRequirement
    }
    fn dimension(&self) -> Dimension {
        Dimension::DocumentationAlignment
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        if provider.content(&artifacts.blueprint_doc).is_none() {
            return Ok(vec![FindingCandidate::new("BLUEPRINT.md missing")
                .at(artifacts.relative(&artifacts.blueprint_doc))
                .recommend("Add a BLUEPRINT.md describing the tool")]);
        }
        Ok(vec![])
    }
}

/// Required blueprint sections, from the shared registry.
pub struct BlueprintSections;

impl Rule for BlueprintSections {
    fn id(&self) -> &'static str {
        "BLUEPRINT_SECTIONS"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn category(&self) -> Category {
        Category::MissingRequirement
    }
    fn dimension(&self) -> Dimension {
        Dimension::DocumentationAlignment
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let Some(content) = provider.content(&artifacts.blueprint_doc) else {
            return Ok(vec![]);
        };
        Ok(missing_section_candidates(
            &content,
            &registry.blueprint_sections,
            &artifacts.relative(&artifacts.blueprint_doc),
            "BLUEPRINT.md",
        ))
    }
}

/// Placeholder text left in the blueprint.
pub struct BlueprintPlaceholder;

impl Rule for BlueprintPlaceholder {
    fn id(&self) -> &'static str {
        "BLUEPRINT_PLACEHOLDER"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn category(&self) -> Category {
        Category::PlaceholderContent
    }
    fn dimension(&self) -> Dimension {
        Dimension::DocumentationAlignment
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let Some(content) = provider.content(&artifacts.blueprint_doc) else {
            return Ok(vec![]);
        };
        let placeholder = PLACEHOLDER.get_or_init(|| {
            Regex::new(r"(?i)\b(TBD|TODO|FIXME|lorem ipsum)\b").expect("valid regex")
        });
        let rel = artifacts.relative(&artifacts.blueprint_doc);

        let mut candidates = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if let Some(m) = placeholder.find(line) {
                candidates.push(
                    FindingCandidate::new(format!(
                        "Placeholder text '{}' in BLUEPRINT.md",
                        m.as_str()
                    ))
                    .at(rel.clone())
                    .line(idx as u32 + 1)
                    .evidence(line.trim())
                    .recommend("Replace the placeholder with real content"),
                );
            }
        }
        Ok(candidates)
    }
}

/// Required eval-strategy sections; exhaustive reviews only.
pub struct EvalStrategySections;

impl Rule for EvalStrategySections {
    fn id(&self) -> &'static str {
        "EVAL_STRATEGY_SECTIONS"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn category(&self) -> Category {
        Category::MissingRequirement
    }
    fn dimension(&self) -> Dimension {
        Dimension::DocumentationAlignment
    }
    fn thorough_only(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let rel = artifacts.relative(&artifacts.eval_strategy_doc);
        let Some(content) = provider.content(&artifacts.eval_strategy_doc) else {
            return Ok(vec![FindingCandidate::new("EVAL_STRATEGY.md missing")
                .at(rel)
                .recommend("Add an EVAL_STRATEGY.md")]);
        };
        Ok(missing_section_candidates(
            &content,
            &registry.eval_strategy_sections,
            &rel,
            "EVAL_STRATEGY.md",
        ))
    }
}

/// Blueprint refers to the tool by an underscored variant of its
/// hyphenated name; exhaustive reviews only.
pub struct DocNamingDrift;

impl Rule for DocNamingDrift {
    fn id(&self) -> &'static str {
        "DOC_NAMING_DRIFT"
    }
    fn severity(&self) -> Severity {
        Severity::Info
    }
    fn category(&self) -> Category {
        Category::NamingDrift
    }
    fn dimension(&self) -> Dimension {
        Dimension::DocumentationAlignment
    }
    fn thorough_only(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        if !artifacts.target.contains('-') {
            return Ok(vec![]);
        }
        let Some(content) = provider.content(&artifacts.blueprint_doc) else {
            return Ok(vec![]);
        };

        let drifted = artifacts.target.replace('-', "_");
        for (idx, line) in content.lines().enumerate() {
            if line.contains(&drifted) {
                return Ok(vec![FindingCandidate::new(format!(
                    "BLUEPRINT.md refers to the tool as '{}' instead of '{}'",
                    drifted, artifacts.target
                ))
                .at(artifacts.relative(&artifacts.blueprint_doc))
                .line(idx as u32 + 1)
                .evidence(line.trim())
                .recommend(format!("Use the canonical name '{}'", artifacts.target))]);
            }
        }
        Ok(vec![])
    }
}
