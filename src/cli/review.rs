//! `conforma review` - run one conformance review end to end

use crate::artifacts::FsArtifacts;
use crate::discovery;
use crate::evaluator::Evaluator;
use crate::report::{self, OutputFormat};
use crate::rules::{default_registry, SuppressionSet};
use anyhow::Result;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub fn run(
    target: &str,
    review_type: &str,
    output_dir: &Path,
    project_root: &Path,
    format: &str,
    workers: usize,
) -> Result<()> {
    let review_type = crate::models::ReviewType::from_str(review_type)?;
    let format = OutputFormat::from_str(format)?;

    let (artifacts, registry) = discovery::resolve(project_root, target)?;
    let suppressions = SuppressionSet::new(registry.suppressions.clone());
    if !suppressions.is_empty() {
        info!("Loaded {} suppression entries", suppressions.len());
    }

    let provider = FsArtifacts::new();
    let evaluator = Evaluator::new(default_registry(), suppressions, workers);
    let dimensions = evaluator.evaluate(review_type, &artifacts, &registry, &provider)?;

    let result = report::build(target, review_type, dimensions)?;

    // Printed before any disk write: a persist failure must not hide
    // the computed result.
    println!("{}", report::render(&result, format)?);

    let location = report::persist(&result, output_dir)?;
    println!("Report: {}", location.display());
    Ok(())
}
