//! Text (terminal) reporter with colors and formatting

use crate::models::{DimensionStatus, OverallStatus, ReviewResult, Severity};
use anyhow::Result;
use console::style;

fn status_label(status: DimensionStatus) -> console::StyledObject<&'static str> {
    match status {
        DimensionStatus::Pass => style("pass").green(),
        DimensionStatus::Warn => style("warn").yellow(),
        DimensionStatus::Fail => style("fail").red(),
    }
}

fn verdict_label(status: OverallStatus) -> console::StyledObject<&'static str> {
    match status {
        OverallStatus::StrongPass => style("STRONG_PASS").green().bold(),
        OverallStatus::Pass => style("PASS").green(),
        OverallStatus::WeakPass => style("WEAK_PASS").yellow(),
        OverallStatus::NeedsWork => style("NEEDS_WORK").red().bold(),
    }
}

fn severity_tag(severity: Severity) -> console::StyledObject<&'static str> {
    match severity {
        Severity::Error => style("[E]").red(),
        Severity::Warning => style("[W]").yellow(),
        Severity::Info => style("[I]").dim(),
    }
}

/// Render result as formatted terminal output
pub fn render(result: &ReviewResult) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{} {} ({})\n",
        style("Conformance Review").bold(),
        result.target,
        result.review_type.id()
    ));
    out.push_str(&format!(
        "{}\n",
        style("──────────────────────────────────────").dim()
    ));
    out.push_str(&format!(
        "Overall: {} {:.2}/5  Dimensions: {}  Findings: {}\n\n",
        verdict_label(result.summary.overall_status),
        result.summary.overall_score,
        result.summary.dimensions_reviewed,
        result.summary.total_findings
    ));

    for dimension in &result.dimensions {
        out.push_str(&format!(
            "{} {}  score {}/5  weight {:.2}\n",
            status_label(dimension.status),
            style(dimension.dimension.id()).bold(),
            dimension.score,
            dimension.weight
        ));
        for finding in &dimension.findings {
            let location = match (&finding.target_artifact, finding.line) {
                (Some(path), Some(line)) => format!(" ({}:{})", path.display(), line),
                (Some(path), None) => format!(" ({})", path.display()),
                _ => String::new(),
            };
            out.push_str(&format!(
                "    {} {} {}{}\n",
                severity_tag(finding.severity),
                style(&finding.rule_id).dim(),
                finding.message,
                style(location).dim()
            ));
            if !finding.recommendation.is_empty() {
                out.push_str(&format!(
                    "        {} {}\n",
                    style("fix:").dim(),
                    finding.recommendation
                ));
            }
        }
    }

    Ok(out)
}
