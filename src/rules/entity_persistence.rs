//! Entity & persistence pattern rules
//!
//! Validates that every entity the target registers is a frozen
//! dataclass with `__post_init__` validation, carries the `run_pk`
//! foreign key, and validates path fields. All checks are text probes
//! over the shared entities module.

use crate::artifacts::ArtifactProvider;
use crate::config::RegistryConfig;
use crate::discovery::ArtifactSet;
use crate::models::{Category, Dimension, Severity};
use crate::rules::base::{read_or_empty, FindingCandidate, Rule};
use anyhow::Result;
use regex::Regex;

/// Extract the body of a class from source content: the `class` line and
/// every following line until the next top-level statement.
fn find_class_body(content: &str, class_name: &str) -> String {
    let pattern = match Regex::new(&format!(r"class\s+{}\b[^:]*:", regex::escape(class_name))) {
        Ok(re) => re,
        Err(_) => return String::new(),
    };
    let Some(m) = pattern.find(content) else {
        return String::new();
    };

    let mut body_lines = Vec::new();
    for (i, line) in content[m.start()..].lines().enumerate() {
        if i > 0
            && !line.is_empty()
            && !line.starts_with(char::is_whitespace)
            && !line.starts_with('#')
        {
            break;
        }
        body_lines.push(line);
    }
    body_lines.join("\n")
}

/// A target with no registered entities cannot be validated at all.
pub struct EntityRegistered;

impl Rule for EntityRegistered {
    fn id(&self) -> &'static str {
        "ENTITY_REGISTERED"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn category(&self) -> Category {
        Category::MissingRequirement
    }
    fn dimension(&self) -> Dimension {
        Dimension::EntityPersistence
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        _provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        if artifacts.entity_names.is_empty() {
            return Ok(vec![FindingCandidate::new(format!(
                "No entities registered for target '{}'",
                artifacts.target
            ))
            .recommend(format!(
                "Add an `entities` list to conforma/targets/{}.toml",
                artifacts.target
            ))]);
        }
        Ok(vec![])
    }
}

/// Entities must be declared `@dataclass(frozen=True)`.
pub struct EntityFrozen;

impl Rule for EntityFrozen {
    fn id(&self) -> &'static str {
        "ENTITY_FROZEN"
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn category(&self) -> Category {
        Category::PatternViolation
    }
    fn dimension(&self) -> Dimension {
        Dimension::EntityPersistence
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let content = read_or_empty(provider, &artifacts.entities_file);
        let rel = artifacts.relative(&artifacts.entities_file);

        let mut candidates = Vec::new();
        for name in &artifacts.entity_names {
            let pattern = Regex::new(&format!(
                r"@dataclass\(frozen=True\)\s*\nclass\s+{}\b",
                regex::escape(name)
            ))?;
            if !pattern.is_match(&content) {
                candidates.push(
                    FindingCandidate::new(format!(
                        "Entity '{name}' is not declared with @dataclass(frozen=True)"
                    ))
                    .at(rel.clone())
                    .recommend(format!("Add @dataclass(frozen=True) to class {name}")),
                );
            }
        }
        Ok(candidates)
    }
}

/// Entities should validate their fields in `__post_init__`.
pub struct EntityPostInit;

impl Rule for EntityPostInit {
    fn id(&self) -> &'static str {
        "ENTITY_POST_INIT"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn category(&self) -> Category {
        Category::PatternViolation
    }
    fn dimension(&self) -> Dimension {
        Dimension::EntityPersistence
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let content = read_or_empty(provider, &artifacts.entities_file);
        let rel = artifacts.relative(&artifacts.entities_file);

        let mut candidates = Vec::new();
        for name in &artifacts.entity_names {
            let body = find_class_body(&content, name);
            if !body.contains("__post_init__") {
                candidates.push(
                    FindingCandidate::new(format!(
                        "Entity '{name}' has no __post_init__ validation"
                    ))
                    .at(rel.clone())
                    .recommend(format!("Add __post_init__ to {name} for field validation")),
                );
            }
        }
        Ok(candidates)
    }
}

/// Entities are expected to be keyed by `run_pk`. A different key is
/// worth surfacing, not failing.
pub struct EntityRunPk;

impl Rule for EntityRunPk {
    fn id(&self) -> &'static str {
        "ENTITY_RUN_PK"
    }
    fn severity(&self) -> Severity {
        Severity::Info
    }
    fn category(&self) -> Category {
        Category::Inconsistency
    }
    fn dimension(&self) -> Dimension {
        Dimension::EntityPersistence
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let content = read_or_empty(provider, &artifacts.entities_file);
        let rel = artifacts.relative(&artifacts.entities_file);

        let mut candidates = Vec::new();
        for name in &artifacts.entity_names {
            let body = find_class_body(&content, name);
            if !body.contains("run_pk:") && !body.contains("run_pk :") {
                candidates.push(
                    FindingCandidate::new(format!(
                        "Entity '{name}' does not have a run_pk field (may use different key)"
                    ))
                    .at(rel.clone()),
                );
            }
        }
        Ok(candidates)
    }
}

/// Path-bearing entities must validate paths as repo-relative.
pub struct EntityPathValidated;

impl Rule for EntityPathValidated {
    fn id(&self) -> &'static str {
        "ENTITY_PATH_VALIDATED"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn category(&self) -> Category {
        Category::PatternViolation
    }
    fn dimension(&self) -> Dimension {
        Dimension::EntityPersistence
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let content = read_or_empty(provider, &artifacts.entities_file);
        let rel = artifacts.relative(&artifacts.entities_file);

        let mut candidates = Vec::new();
        for name in &artifacts.entity_names {
            let body = find_class_body(&content, name);
            let has_path_field = body.contains("relative_path:") || body.contains("file_path:");
            let has_validation = body.contains("_validate_relative_path")
                || body.contains("_validate_repo_relative_path");
            if has_path_field && !has_validation {
                candidates.push(
                    FindingCandidate::new(format!(
                        "Entity '{name}' has a path field but no path validation in __post_init__"
                    ))
                    .at(rel.clone())
                    .recommend("Add _validate_relative_path call in __post_init__"),
                );
            }
        }
        Ok(candidates)
    }
}
