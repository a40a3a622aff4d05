//! Rule execution engine with parallel support
//!
//! The evaluator maps a review type to its dimension set, runs every
//! applicable rule of each selected dimension on a rayon pool, and
//! folds the surviving findings into scored `DimensionResult`s.
//!
//! ```text
//! review type -> dimensions -> rules (declaration order)
//!                                 |  par_iter, catch_unwind
//!                                 v
//!                  candidates -> suppression -> Finding
//!                                 |  reordered by rule index
//!                                 v
//!                    score() -> DimensionResult
//! ```
//!
//! A dimension the resolver marked not-applicable is omitted from the
//! output entirely; absence means skipped, not zero findings. A rule
//! that returns `Err` or panics is recovered into a single
//! error-severity finding against its own id and evaluation continues.

use crate::artifacts::ArtifactProvider;
use crate::config::RegistryConfig;
use crate::discovery::ArtifactSet;
use crate::models::{Category, Dimension, DimensionResult, Finding, ReviewType, Severity};
use crate::rules::{Rule, RuleRegistry, SuppressionSet};
use crate::scoring;
use anyhow::Result;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Seam for alternative dimension evaluation backends. The shipped
/// implementation is rule-driven and the CLI drives
/// [`Evaluator::evaluate`] directly; this trait exists purely as the
/// extension point where an externally judged backend plugs in without
/// touching the scoring or report layers.
pub trait DimensionEvaluator: Send + Sync {
    /// Findings for one dimension, in a deterministic order.
    fn evaluate_dimension(
        &self,
        dimension: Dimension,
        thorough: bool,
        artifacts: &ArtifactSet,
        registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Vec<Finding>;
}

/// Runs registered rules and assembles scored dimension results.
pub struct Evaluator {
    rules: RuleRegistry,
    suppressions: SuppressionSet,
    workers: usize,
}

impl Evaluator {
    /// # Arguments
    /// * `workers` - Worker threads for rule execution (0 = auto-detect)
    pub fn new(rules: RuleRegistry, suppressions: SuppressionSet, workers: usize) -> Self {
        let workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
                .min(16)
        } else {
            workers
        };
        Self {
            rules,
            suppressions,
            workers,
        }
    }

    /// Evaluate every applicable dimension of `review_type`.
    pub fn evaluate(
        &self,
        review_type: ReviewType,
        artifacts: &ArtifactSet,
        registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<DimensionResult>> {
        let start = Instant::now();
        info!(
            "Starting {} review of '{}' on {} workers",
            review_type.id(),
            artifacts.target,
            self.workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;

        let mut results = Vec::new();
        for &dimension in review_type.dimensions() {
            if artifacts.not_applicable.contains(&dimension) {
                debug!("Dimension {} not applicable, skipped", dimension.id());
                continue;
            }

            let rules = self.rules.rules_for(dimension, review_type.thorough());
            debug!("Dimension {}: {} rules", dimension.id(), rules.len());

            // Indexed so parallel completion order cannot leak into the
            // findings sequence.
            let mut per_rule: Vec<(usize, Vec<Finding>)> = pool.install(|| {
                rules
                    .par_iter()
                    .enumerate()
                    .map(|(idx, rule)| {
                        (idx, self.run_single_rule(rule, artifacts, registry, provider))
                    })
                    .collect()
            });
            per_rule.sort_by_key(|(idx, _)| *idx);

            let findings: Vec<Finding> =
                per_rule.into_iter().flat_map(|(_, f)| f).collect();
            let (score, status) = scoring::score(&findings);
            results.push(DimensionResult {
                dimension,
                weight: dimension.weight(),
                score,
                status,
                findings,
            });
        }

        info!(
            "Review of '{}' finished: {} dimensions in {}ms",
            artifacts.target,
            results.len(),
            start.elapsed().as_millis()
        );
        Ok(results)
    }

    /// Run one rule, recovering errors and panics into a synthetic
    /// finding so one bad rule never aborts the review.
    fn run_single_rule(
        &self,
        rule: &Arc<dyn Rule>,
        artifacts: &ArtifactSet,
        registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Vec<Finding> {
        debug!("Running rule: {}", rule.id());

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            rule.evaluate(artifacts, registry, provider)
        }));

        let candidates = match outcome {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(err)) => {
                warn!("Rule {} failed: {}", rule.id(), err);
                return vec![crashed_finding(rule.id(), &err.to_string())];
            }
            Err(panic_info) => {
                let msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                warn!("Rule {} panicked: {}", rule.id(), msg);
                return vec![crashed_finding(rule.id(), &msg)];
            }
        };

        candidates
            .into_iter()
            .filter(|c| {
                let suppressed = self.suppressions.is_suppressed(
                    rule.id(),
                    &artifacts.target,
                    c.target_artifact.as_deref(),
                );
                if suppressed {
                    debug!("Suppressed {} candidate: {}", rule.id(), c.message);
                }
                !suppressed
            })
            .map(|c| Finding {
                severity: rule.severity(),
                category: rule.category(),
                rule_id: rule.id().to_string(),
                target_artifact: c.target_artifact,
                line: c.line,
                message: c.message,
                evidence: c.evidence,
                recommendation: c.recommendation,
            })
            .collect()
    }
}

impl DimensionEvaluator for Evaluator {
    fn evaluate_dimension(
        &self,
        dimension: Dimension,
        thorough: bool,
        artifacts: &ArtifactSet,
        registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Vec<Finding> {
        self.rules
            .rules_for(dimension, thorough)
            .iter()
            .flat_map(|rule| self.run_single_rule(rule, artifacts, registry, provider))
            .collect()
    }
}

fn crashed_finding(rule_id: &str, detail: &str) -> Finding {
    Finding {
        severity: Severity::Error,
        category: Category::PatternViolation,
        rule_id: rule_id.to_string(),
        target_artifact: None,
        line: None,
        message: format!("rule crashed: {detail}"),
        evidence: String::new(),
        recommendation: "Report this as an engine defect".to_string(),
    }
}
