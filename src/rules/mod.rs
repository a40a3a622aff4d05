//! Conformance rules
//!
//! This module provides the rule framework and the static registry of
//! rule implementations, grouped by dimension.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      RuleRegistry                       │
//! │  - Static table: dimension → ordered rules              │
//! │  - Built once at startup, injected into the evaluator   │
//! └─────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                        Rule Trait                       │
//! │  - id / severity / category / dimension (fixed tuple)   │
//! │  - evaluate(artifacts, registry, provider) → candidates │
//! │  - thorough_only(): extra rules for exhaustive reviews  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Rules are pure predicates over loaded artifact content: no writes, no
//! mutation, and no panics on missing or malformed input. A rule whose
//! artifact is absent either returns no candidates or reports the absence
//! as a `missing_requirement` candidate, per its own declared contract.

mod base;
mod suppression;

mod adapter_schema;
mod cross_tool;
mod documentation;
mod entity_persistence;
mod orchestrator_wiring;
mod output_contract;

pub use base::{FindingCandidate, Rule};
pub use suppression::SuppressionSet;

pub use adapter_schema::{
    AdapterBaseClass, AdapterConstants, AdapterMissing, AdapterSchemaSql,
};
pub use cross_tool::CrossToolRunPkJoin;
pub use documentation::{
    BlueprintPlaceholder, BlueprintPresent, BlueprintSections, DocNamingDrift,
    EvalStrategySections,
};
pub use entity_persistence::{
    EntityFrozen, EntityPathValidated, EntityPostInit, EntityRegistered, EntityRunPk,
};
pub use orchestrator_wiring::{
    AdapterExported, OrchestratorRegistered, RepoTableWhitelist,
};
pub use output_contract::{
    OutputFilenameConvention, OutputSchemaContract, OutputSchemaJson,
};

use crate::models::Dimension;
use std::sync::Arc;

/// Static table mapping each dimension to its ordered rule list.
///
/// Rule order within a dimension is declaration order and is part of the
/// output contract: two runs over identical inputs must produce
/// byte-identical finding sequences.
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleRegistry {
    /// Build a registry from an explicit rule list.
    pub fn new(rules: Vec<Arc<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Rules registered for one dimension, in declaration order.
    /// Thorough-only rules are included only when `thorough` is set.
    pub fn rules_for(&self, dimension: Dimension, thorough: bool) -> Vec<Arc<dyn Rule>> {
        self.rules
            .iter()
            .filter(|r| r.dimension() == dimension)
            .filter(|r| thorough || !r.thorough_only())
            .cloned()
            .collect()
    }

    /// All registered rules, in declaration order.
    pub fn all(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The default rule set, in declaration order.
pub fn default_registry() -> RuleRegistry {
    RuleRegistry::new(vec![
        // Entity & persistence pattern
        Arc::new(EntityRegistered),
        Arc::new(EntityFrozen),
        Arc::new(EntityPostInit),
        Arc::new(EntityRunPk),
        Arc::new(EntityPathValidated),
        // Adapter vs warehouse schema
        Arc::new(AdapterMissing),
        Arc::new(AdapterConstants),
        Arc::new(AdapterBaseClass),
        Arc::new(AdapterSchemaSql),
        // Engine wiring
        Arc::new(AdapterExported),
        Arc::new(OrchestratorRegistered),
        Arc::new(RepoTableWhitelist),
        // Tool output contract
        Arc::new(OutputSchemaJson),
        Arc::new(OutputSchemaContract),
        Arc::new(OutputFilenameConvention),
        // Cross-tool SQL consistency
        Arc::new(CrossToolRunPkJoin),
        // Documentation alignment
        Arc::new(BlueprintPresent),
        Arc::new(BlueprintSections),
        Arc::new(BlueprintPlaceholder),
        Arc::new(EvalStrategySections),
        Arc::new(DocNamingDrift),
    ])
}
