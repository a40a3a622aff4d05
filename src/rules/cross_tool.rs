//! Cross-tool SQL rules
//!
//! `run_pk` values are per-tool surrogate keys; they never line up
//! across tools. Analytics SQL that touches tables from two or more
//! tools must correlate runs through `collection_run_id`, tool-specific
//! run-pk columns, or `lz_tool_runs`. A direct `a.run_pk = b.run_pk`
//! join across tools silently produces empty or wrong results.

use crate::artifacts::ArtifactProvider;
use crate::config::RegistryConfig;
use crate::discovery::ArtifactSet;
use crate::models::{Category, Dimension, Severity};
use crate::rules::base::{FindingCandidate, Rule};
use anyhow::Result;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

static RUN_PK_JOIN: OnceLock<Regex> = OnceLock::new();
static COLLECTION_RUN_ID: OnceLock<Regex> = OnceLock::new();
static TOOL_RUN_PK: OnceLock<Regex> = OnceLock::new();
static LZ_TOOL_RUNS: OnceLock<Regex> = OnceLock::new();
static TABLE_ALIAS: OnceLock<Regex> = OnceLock::new();
static CTE_NAME: OnceLock<Regex> = OnceLock::new();

/// Alias classification: a known tool, a CTE, or unresolvable.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AliasSource {
    Tool(String),
    Cte,
    Unknown,
}

/// Which tools a SQL file touches, by table-name substring against the
/// registry's `table_patterns` map.
fn tools_in_sql(sql: &str, table_patterns: &BTreeMap<String, Vec<String>>) -> BTreeSet<String> {
    let sql_lower = sql.to_lowercase();
    table_patterns
        .iter()
        .filter(|(_, patterns)| {
            patterns
                .iter()
                .any(|p| sql_lower.contains(&p.to_lowercase()))
        })
        .map(|(tool, _)| tool.clone())
        .collect()
}

fn classify_table(table: &str, table_patterns: &BTreeMap<String, Vec<String>>) -> AliasSource {
    let table_lower = table.to_lowercase();
    for (tool, patterns) in table_patterns {
        if patterns
            .iter()
            .any(|p| table_lower.contains(&p.to_lowercase()))
        {
            return AliasSource::Tool(tool.clone());
        }
    }
    AliasSource::Unknown
}

/// Map `alias -> source` from FROM/JOIN clauses and CTE definitions.
fn table_aliases(
    sql: &str,
    table_patterns: &BTreeMap<String, Vec<String>>,
) -> BTreeMap<String, AliasSource> {
    let mut aliases = BTreeMap::new();

    let from_join = TABLE_ALIAS.get_or_init(|| {
        Regex::new(r"(?i)\b(?:from|join)\s+([\w_]+)\s+(?:as\s+)?(\w+)\b").expect("valid regex")
    });
    for caps in from_join.captures_iter(sql) {
        let source = classify_table(&caps[1], table_patterns);
        aliases.insert(caps[2].to_lowercase(), source);
    }

    let cte = CTE_NAME.get_or_init(|| Regex::new(r"(?i)\b(\w+)\s+as\s*\(").expect("valid regex"));
    for caps in cte.captures_iter(sql) {
        aliases.insert(caps[1].to_lowercase(), AliasSource::Cte);
    }

    aliases
}

/// Direct `run_pk = run_pk` joins between tables of different tools.
pub struct CrossToolRunPkJoin;

impl Rule for CrossToolRunPkJoin {
    fn id(&self) -> &'static str {
        "CROSS_TOOL_RUN_PK_JOIN"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn category(&self) -> Category {
        Category::AntiPattern
    }
    fn dimension(&self) -> Dimension {
        Dimension::CrossToolConsistency
    }

    fn evaluate(
        &self,
        artifacts: &ArtifactSet,
        registry: &RegistryConfig,
        provider: &dyn ArtifactProvider,
    ) -> Result<Vec<FindingCandidate>> {
        let join_pattern = RUN_PK_JOIN.get_or_init(|| {
            Regex::new(r"(?i)\bon\s+(\w+)\.run_pk\s*=\s*(\w+)\.run_pk").expect("valid regex")
        });
        let collection_run_id = COLLECTION_RUN_ID
            .get_or_init(|| Regex::new(r"(?i)\bcollection_run_id\b").expect("valid regex"));
        let tool_run_pk =
            TOOL_RUN_PK.get_or_init(|| Regex::new(r"(?i)\b\w+_run_pk\b").expect("valid regex"));
        let lz_tool_runs =
            LZ_TOOL_RUNS.get_or_init(|| Regex::new(r"(?i)\blz_tool_runs\b").expect("valid regex"));

        let mut candidates = Vec::new();

        for sql_dir in &artifacts.sql_dirs {
            for sql_file in provider.files_under(sql_dir, "sql") {
                let Some(sql) = provider.content(&sql_file) else {
                    continue;
                };

                // Fewer than two tools referenced means no cross-tool
                // join is possible in this file.
                if tools_in_sql(&sql, &registry.table_patterns).len() < 2 {
                    continue;
                }

                let has_escape = collection_run_id.is_match(&sql)
                    || tool_run_pk.is_match(&sql)
                    || lz_tool_runs.is_match(&sql);

                let aliases = table_aliases(&sql, &registry.table_patterns);
                let rel = artifacts.relative(&sql_file);

                for caps in join_pattern.captures_iter(&sql) {
                    let alias1 = caps[1].to_lowercase();
                    let alias2 = caps[2].to_lowercase();
                    if alias1 == alias2 {
                        continue;
                    }

                    let source1 = aliases.get(&alias1).unwrap_or(&AliasSource::Unknown);
                    let source2 = aliases.get(&alias2).unwrap_or(&AliasSource::Unknown);

                    let (tool1, tool2) = match (source1, source2) {
                        (AliasSource::Tool(a), AliasSource::Tool(b)) if a != b => (a, b),
                        // CTEs can be pre-correlated intermediates; trust
                        // them when the file carries a correct pattern.
                        _ => continue,
                    };
                    if has_escape {
                        continue;
                    }

                    let line = sql[..caps.get(0).map(|m| m.start()).unwrap_or(0)]
                        .matches('\n')
                        .count() as u32
                        + 1;
                    candidates.push(
                        FindingCandidate::new(format!(
                            "Direct run_pk join between '{alias1}' ({tool1}) and '{alias2}' ({tool2})"
                        ))
                        .at(rel.clone())
                        .line(line)
                        .evidence(caps[0].to_string())
                        .recommend(
                            "Correlate via collection_run_id, tool-specific run_pk columns, \
                             or lz_tool_runs",
                        ),
                    );
                }
            }
        }
        Ok(candidates)
    }
}
