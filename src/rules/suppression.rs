//! Declared suppression of known, accepted findings.
//!
//! Exception policy is data, not code: rather than scattering
//! "do not flag X for tool Y" conditionals through rule bodies, the
//! registry file declares `(rule, target?, artifact?)` tuples with a
//! reason. A candidate matching any entry is discarded at generation
//! time and never appears anywhere in a report, including counts.

use crate::config::SuppressionRecord;
use std::path::Path;

/// Read-only suppression set, loaded once per process and shared across
/// concurrent rule executions.
#[derive(Debug, Clone, Default)]
pub struct SuppressionSet {
    entries: Vec<SuppressionRecord>,
}

impl SuppressionSet {
    pub fn new(entries: Vec<SuppressionRecord>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a candidate from `rule_id` for `target` pointing at
    /// `artifact` matches a declared exception.
    ///
    /// An entry without a target filter applies to every target; an
    /// entry without an artifact filter applies to every artifact. The
    /// artifact filter is a substring match on the relative path.
    pub fn is_suppressed(&self, rule_id: &str, target: &str, artifact: Option<&Path>) -> bool {
        self.entries.iter().any(|entry| {
            if entry.rule != rule_id {
                return false;
            }
            if let Some(ref t) = entry.target {
                if t != target {
                    return false;
                }
            }
            if let Some(ref fragment) = entry.artifact {
                let Some(path) = artifact else {
                    return false;
                };
                if !path.to_string_lossy().contains(fragment.as_str()) {
                    return false;
                }
            }
            true
        })
    }
}
