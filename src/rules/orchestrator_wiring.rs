//! Orchestrator wiring rules
//!
//! A tool that persists results must be reachable from the engine: its
//! adapter exported from the adapters package, an ingestion entry in
//! the orchestrator, and its tables whitelisted in the repository
//! layer.

use crate::artifacts::ArtifactProvider;
use crate::config::RegistryConfig;
use crate::discovery::ArtifactSet;
use crate::models::{Category, Dimension, Severity};
use crate::rules::base::{read_or_empty, FindingCandidate, Rule};
use anyhow::Result;
use regex::Regex;

/// Adapter class imported and exported from `adapters/__init__.py`.
///
/// Needs the per-target `adapter_class`; without it there is nothing
/// to look for and the rule stays silent.
pub struct AdapterExported;

impl Rule for AdapterExported {
    fn id(&self) -> &'static str {
        "ADAPTER_EXPORTED"
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn category(&self) -> Category {
        Category::MissingRequirement
    }
    fn dimension(&self) -> Dimension {
        Dimension::OrchestratorWiring
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let Some(class_name) = artifacts.adapter_class.as_deref() else {
            return Ok(vec![]);
        };
        let rel = artifacts.relative(&artifacts.adapter_init);

        let Some(content) = provider.content(&artifacts.adapter_init) else {
            return Ok(vec![FindingCandidate::new("adapters/__init__.py not found")
                .at(rel)
                .recommend(format!("Create it and export {class_name}"))]);
        };

        let import_pattern =
            Regex::new(&format!(r"from\s+\.[\w_]+\s+import\s+.*{}", regex::escape(class_name)))?;
        if !import_pattern.is_match(&content) {
            return Ok(vec![FindingCandidate::new(format!(
                "Adapter {class_name} not imported in adapters/__init__.py"
            ))
            .at(rel)
            .evidence(class_name)
            .recommend(format!("Add 'from .<module> import {class_name}'"))]);
        }

        // Import seen; an __all__ entry (or any later mention) covers
        // the export side.
        let export_pattern = Regex::new(&format!(r#"["']{}["']"#, regex::escape(class_name)))?;
        if !export_pattern.is_match(&content) {
            return Ok(vec![FindingCandidate::new(format!(
                "Adapter {class_name} not in __all__ export list"
            ))
            .at(rel)
            .evidence(class_name)
            .recommend(format!("Add \"{class_name}\" to __all__"))]);
        }
        Ok(vec![])
    }
}

/// Tool and adapter registered in the orchestrator ingestion table.
pub struct OrchestratorRegistered;

impl Rule for OrchestratorRegistered {
    fn id(&self) -> &'static str {
        "ORCHESTRATOR_REGISTERED"
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn category(&self) -> Category {
        Category::MissingRequirement
    }
    fn dimension(&self) -> Dimension {
        Dimension::OrchestratorWiring
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let content = read_or_empty(provider, &artifacts.orchestrator_file);
        let rel = artifacts.relative(&artifacts.orchestrator_file);

        let config_pattern = Regex::new(&format!(
            r#"ToolIngestionConfig\s*\(\s*["']{}["']\s*,"#,
            regex::escape(&artifacts.target)
        ))?;
        if !config_pattern.is_match(&content) {
            return Ok(vec![FindingCandidate::new(format!(
                "Tool '{}' not found in TOOL_INGESTION_CONFIGS",
                artifacts.target
            ))
            .at(rel)
            .recommend("Add a ToolIngestionConfig entry to orchestrator.py")]);
        }
        Ok(vec![])
    }
}

/// Adapter landing-zone tables present in the repository-layer
/// whitelist. A table missing there cannot be queried by run, which
/// surfaces much later as silent empty results.
pub struct RepoTableWhitelist;

impl Rule for RepoTableWhitelist {
    fn id(&self) -> &'static str {
        "REPO_TABLE_WHITELIST"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn category(&self) -> Category {
        Category::Inconsistency
    }
    fn dimension(&self) -> Dimension {
        Dimension::OrchestratorWiring
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let Some(adapter_file) = artifacts.adapter_file.as_deref() else {
            return Ok(vec![]);
        };
        let Some(adapter_content) = provider.content(adapter_file) else {
            return Ok(vec![]);
        };
        let repos = read_or_empty(provider, &artifacts.repositories_file);
        let rel = artifacts.relative(&artifacts.repositories_file);

        let mut candidates = Vec::new();
        for table in super::adapter_schema::adapter_tables(&adapter_content) {
            if !repos.contains(&table) {
                candidates.push(
                    FindingCandidate::new(format!(
                        "Table '{table}' not in repository whitelist"
                    ))
                    .at(rel.clone())
                    .evidence(table.clone())
                    .recommend(format!("Add {table} to _VALID_LZ_TABLES in repositories.py")),
                );
            }
        }
        Ok(candidates)
    }
}
