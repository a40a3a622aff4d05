//! Adapter vs warehouse schema rules
//!
//! Validates the target's landing-zone adapter: required module
//! constants, base-class inheritance, and agreement between the tables
//! the adapter declares and the warehouse schema.sql.

use crate::artifacts::ArtifactProvider;
use crate::config::RegistryConfig;
use crate::discovery::ArtifactSet;
use crate::models::{Category, Dimension, Severity};
use crate::rules::base::{read_or_empty, FindingCandidate, Rule};
use anyhow::Result;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

static LZ_TABLE_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Landing-zone table names quoted anywhere in the adapter source.
pub(crate) fn adapter_tables(content: &str) -> BTreeSet<String> {
    let pattern = LZ_TABLE_PATTERN
        .get_or_init(|| Regex::new(r#""(lz_\w+)""#).expect("valid regex"));
    pattern
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect()
}

/// Module-level constants every adapter must define.
const REQUIRED_CONSTANTS: &[&str] = &["SCHEMA_PATH", "LZ_TABLES", "TABLE_DDL", "QUALITY_RULES"];

/// Absence of the adapter file is itself the finding for this rule;
/// the other adapter rules stay silent when the file is missing.
pub struct AdapterMissing;

impl Rule for AdapterMissing {
    fn id(&self) -> &'static str {
        "ADAPTER_MISSING"
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn category(&self) -> Category {
        Category::MissingRequirement
    }
    fn dimension(&self) -> Dimension {
        Dimension::AdapterSchema
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        _registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let present = artifacts
            .adapter_file
            .as_deref()
            .map(|path| provider.content(path).is_some())
            .unwrap_or(false);
        if !present {
            return Ok(vec![FindingCandidate::new(format!(
                "Adapter file not found for target '{}'",
                artifacts.target
            ))
            .recommend("Add the adapter module under persistence/adapters/")]);
        }
        Ok(vec![])
    }
}

/// Adapters declare their schema wiring through module constants.
pub struct AdapterConstants;

impl Rule for AdapterConstants {
    fn id(&self) -> &'static str {
        "ADAPTER_CONSTANTS"
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn category(&self) -> Category {
        Category::MissingRequirement
    }
    fn dimension(&self) -> Dimension {
        Dimension::AdapterSchema
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
        let Some(content) = provider.content(adapter_file) else {
            return Ok(vec![]);
        };
        let rel = artifacts.relative(adapter_file);

        let mut candidates = Vec::new();
        for constant in REQUIRED_CONSTANTS {
            let pattern = Regex::new(&format!(r"(?m)^{}\s*=", regex::escape(constant)))?;
            if !pattern.is_match(&content) {
                candidates.push(
                    FindingCandidate::new(format!(
                        "Adapter missing required constant '{constant}'"
                    ))
                    .at(rel.clone())
                    .recommend(format!("Add module-level {constant} constant to adapter")),
                );
            }
        }
        Ok(candidates)
    }
}

/// Adapters must inherit from BaseAdapter.
pub struct AdapterBaseClass;

impl Rule for AdapterBaseClass {
    fn id(&self) -> &'static str {
        "ADAPTER_BASE_CLASS"
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn category(&self) -> Category {
        Category::PatternViolation
    }
    fn dimension(&self) -> Dimension {
        Dimension::AdapterSchema
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
        let Some(content) = provider.content(adapter_file) else {
            return Ok(vec![]);
        };

        if !content.contains("(BaseAdapter)") {
            return Ok(vec![FindingCandidate::new(
                "Adapter does not inherit from BaseAdapter",
            )
            .at(artifacts.relative(adapter_file))
            .recommend("Inherit from BaseAdapter")]);
        }
        Ok(vec![])
    }
}

/// Every landing-zone table the adapter declares must exist in schema.sql.
pub struct AdapterSchemaSql;

impl Rule for AdapterSchemaSql {
    fn id(&self) -> &'static str {
        "ADAPTER_SCHEMA_SQL"
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn category(&self) -> Category {
        Category::Inconsistency
    }
    fn dimension(&self) -> Dimension {
        Dimension::AdapterSchema
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
        let Some(content) = provider.content(adapter_file) else {
            return Ok(vec![]);
        };
        let schema_sql = read_or_empty(provider, &artifacts.schema_sql);
        let rel = artifacts.relative(&artifacts.schema_sql);

        let mut candidates = Vec::new();
        for table in adapter_tables(&content) {
            if !schema_sql.contains(&table) {
                candidates.push(
                    FindingCandidate::new(format!(
                        "Table '{table}' defined in adapter but not found in schema.sql"
                    ))
                    .at(rel.clone())
                    .evidence(table.clone())
                    .recommend(format!("Add CREATE TABLE for {table} in schema.sql")),
                );
            }
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::MockArtifacts;
    use crate::discovery;

    const GOOD_ADAPTER: &str = "\
SCHEMA_PATH = \"persistence/schema.sql\"
LZ_TABLES = [\"lz_lizard_functions\"]
TABLE_DDL = {\"lz_lizard_functions\": \"...\"}
QUALITY_RULES = []

class LizardAdapter(BaseAdapter):
    pass
";

    fn fixture(adapter_src: Option<&str>, schema_sql: &str) -> (ArtifactSet, RegistryConfig, MockArtifacts) {
        let registry: RegistryConfig = toml::from_str("").expect("registry");
        let artifacts =
            discovery::test_support::artifact_set_for(std::path::Path::new("/proj"), "lizard");

        let mut entries = vec![("/proj/src/sot-engine/persistence/schema.sql", schema_sql)];
        if let Some(src) = adapter_src {
            entries.push((
                "/proj/src/sot-engine/persistence/adapters/lizard_adapter.py",
                src,
            ));
        }
        (artifacts, registry, MockArtifacts::new(entries))
    }

    #[test]
    fn test_conforming_adapter_is_clean() {
        let (artifacts, registry, provider) =
            fixture(Some(GOOD_ADAPTER), "CREATE TABLE lz_lizard_functions (run_pk INTEGER);");

        for rule in [
            &AdapterMissing as &dyn Rule,
            &AdapterConstants,
            &AdapterBaseClass,
            &AdapterSchemaSql,
        ] {
            let candidates = rule
                .evaluate(&artifacts, &registry, &provider)
                .expect("evaluate");
            assert!(candidates.is_empty(), "{} fired", rule.id());
        }
    }

    #[test]
    fn test_absent_adapter_is_the_missing_rule_only() {
        let (artifacts, registry, provider) = fixture(None, "");

        let missing = AdapterMissing
            .evaluate(&artifacts, &registry, &provider)
            .expect("evaluate");
        assert_eq!(missing.len(), 1);

        // The other adapter rules stay silent by contract.
        assert!(AdapterConstants
            .evaluate(&artifacts, &registry, &provider)
            .expect("evaluate")
            .is_empty());
        assert!(AdapterBaseClass
            .evaluate(&artifacts, &registry, &provider)
            .expect("evaluate")
            .is_empty());
    }

    #[test]
    fn test_missing_constants_reported_individually() {
        let src = "SCHEMA_PATH = \"x\"\n\nclass LizardAdapter(BaseAdapter):\n    pass\n";
        let (artifacts, registry, provider) = fixture(Some(src), "");
        let candidates = AdapterConstants
            .evaluate(&artifacts, &registry, &provider)
            .expect("evaluate");
        assert_eq!(candidates.len(), 3);
        assert!(candidates[0].message.contains("LZ_TABLES"));
    }

    #[test]
    fn test_base_class_violation() {
        let src = "class LizardAdapter:\n    pass\n";
        let (artifacts, registry, provider) = fixture(Some(src), "");
        assert_eq!(
            AdapterBaseClass
                .evaluate(&artifacts, &registry, &provider)
                .expect("evaluate")
                .len(),
            1
        );
    }

    #[test]
    fn test_table_absent_from_schema_sql() {
        let (artifacts, registry, provider) = fixture(Some(GOOD_ADAPTER), "-- empty schema");
        let candidates = AdapterSchemaSql
            .evaluate(&artifacts, &registry, &provider)
            .expect("evaluate");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].evidence, "lz_lizard_functions");
    }
}
