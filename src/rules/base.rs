//! Base rule trait and types

use crate::artifacts::ArtifactProvider;
use crate::config::RegistryConfig;
use crate::discovery::ArtifactSet;
use crate::models::{Category, Dimension, Severity};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// What a rule reports before the evaluator stamps it with the rule's
/// declared severity, category, and id.
#[derive(Debug, Clone)]
pub struct FindingCandidate {
    /// Artifact the candidate points at, relative to the project root.
    pub target_artifact: Option<PathBuf>,
    pub line: Option<u32>,
    pub message: String,
    pub evidence: String,
    pub recommendation: String,
}

impl FindingCandidate {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            target_artifact: None,
            line: None,
            message: message.into(),
            evidence: String::new(),
            recommendation: String::new(),
        }
    }

    pub fn at(mut self, artifact: impl Into<PathBuf>) -> Self {
        self.target_artifact = Some(artifact.into());
        self
    }

    pub fn line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = evidence.into();
        self
    }

    pub fn recommend(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }
}

/// Trait for all conformance rules
///
/// A rule is a named, side-effect-free predicate over resolved artifact
/// contents. It declares a fixed `(id, severity, category, dimension)`
/// tuple; every candidate it produces is reported with exactly that
/// metadata.
///
/// # Example Implementation
///
/// ```ignore
/// pub struct MakefilePresent;
///
/// impl Rule for MakefilePresent {
///     fn id(&self) -> &'static str { "MAKEFILE_PRESENT" }
///     fn severity(&self) -> Severity { Severity::Error }
///     fn category(&self) -> Category { Category::MissingRequirement }
///     fn dimension(&self) -> Dimension { Dimension::OutputContract }
///
///     fn evaluate(
///         &self,
///         artifacts: &ArtifactSet,
///         _registry: &RegistryConfig,
///         provider: &dyn ArtifactProvider,
///     ) -> Result<Vec<FindingCandidate>> {
///         if provider.content(&artifacts.makefile).is_none() {
///             return Ok(vec![FindingCandidate::new("Makefile missing")]);
///         }
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Stable identifier for this rule, unique across the registry.
    fn id(&self) -> &'static str;

    /// Severity of every finding this rule produces.
    fn severity(&self) -> Severity;

    /// Category of every finding this rule produces.
    fn category(&self) -> Category;

    /// The weighted dimension this rule belongs to.
    fn dimension(&self) -> Dimension;

    /// Whether this rule runs only in exhaustive review modes.
    ///
    /// Default: `false` (runs whenever its dimension is selected).
    fn thorough_only(&self) -> bool {
        false
    }

    /// Evaluate the rule against resolved artifacts.
    ///
    /// Must not panic on missing or malformed input: a rule whose
    /// artifact is absent either returns no candidates or reports the
    /// absence as a candidate, per its own contract. An `Err` is
    /// recovered by the evaluator into a synthetic error finding.
    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>>;
}

/// Read an artifact as text, treating absence as empty content. Rules
/// that only probe for required patterns use this so a missing file
/// simply fails every probe.
pub(crate) fn read_or_empty(provider: &dyn ArtifactProvider, path: &Path) -> String {
    provider
        .content(path)
        .map(|c| c.to_string())
        .unwrap_or_default()
}
