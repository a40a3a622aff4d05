//! Dimension scoring and overall aggregation
//!
//! Both functions are pure: the same multiset of finding severities
//! always yields the same score, and the same dimension results always
//! yield the same verdict.
//!
//! # Rubric (first match wins)
//!
//! ```text
//! 1. no findings                          -> 5
//! 2. 0 err, 0 warn, 1-3 info              -> 4
//! 3. 0 err and (>=4 info or 1-3 warn)     -> 3
//! 4. 1-2 err or >=4 warn                  -> 2
//! 5. >=3 err                              -> 1
//! ```
//!
//! Status: score >= 4 pass, == 3 warn, <= 2 fail.
//!
//! # Aggregation
//!
//! Weighted mean over the dimensions actually reviewed, with weights
//! renormalized over that subset. A skipped dimension affects neither
//! numerator nor denominator. Verdict thresholds: >= 4.0 STRONG_PASS,
//! >= 3.5 PASS, >= 3.0 WEAK_PASS, otherwise NEEDS_WORK.

use crate::error::ReviewError;
use crate::models::{DimensionResult, DimensionStatus, Finding, OverallStatus, Severity};

/// Score a dimension's findings with the fixed rubric.
pub fn score(findings: &[Finding]) -> (u8, DimensionStatus) {
    let errors = count(findings, Severity::Error);
    let warnings = count(findings, Severity::Warning);
    let infos = count(findings, Severity::Info);

    let score = if findings.is_empty() {
        5
    } else if errors == 0 && warnings == 0 && (1..=3).contains(&infos) {
        4
    } else if errors == 0 && (infos >= 4 || (1..=3).contains(&warnings)) {
        3
    } else if (1..=2).contains(&errors) || warnings >= 4 {
        2
    } else {
        1
    };

    let status = match score {
        4 | 5 => DimensionStatus::Pass,
        3 => DimensionStatus::Warn,
        _ => DimensionStatus::Fail,
    };
    (score, status)
}

/// Combine per-dimension scores into the overall advisory verdict.
///
/// Zero reviewed dimensions is a configuration error, never a silent
/// division by zero.
pub fn aggregate(dimensions: &[DimensionResult]) -> Result<(f64, OverallStatus), ReviewError> {
    if dimensions.is_empty() {
        return Err(ReviewError::Config(
            "no dimensions were reviewed; nothing to aggregate".to_string(),
        ));
    }

    let total_weight: f64 = dimensions.iter().map(|d| d.weight).sum();
    let weighted_sum: f64 = dimensions
        .iter()
        .map(|d| f64::from(d.score) * d.weight)
        .sum();
    let overall = weighted_sum / total_weight;

    let status = if overall >= 4.0 {
        OverallStatus::StrongPass
    } else if overall >= 3.5 {
        OverallStatus::Pass
    } else if overall >= 3.0 {
        OverallStatus::WeakPass
    } else {
        OverallStatus::NeedsWork
    };
    Ok((overall, status))
}

fn count(findings: &[Finding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}
