//! `conforma rules` - enumerate the static rule registry

use crate::models::Dimension;
use crate::rules::default_registry;
use anyhow::{anyhow, Result};
use console::style;

pub fn run(dimension: Option<&str>) -> Result<()> {
    let filter = match dimension {
        Some(id) => Some(
            Dimension::ALL
                .into_iter()
                .find(|d| d.id() == id)
                .ok_or_else(|| {
                    anyhow!(
                        "Unknown dimension '{}'. Valid dimensions: {}",
                        id,
                        Dimension::ALL
                            .iter()
                            .map(|d| d.id())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                })?,
        ),
        None => None,
    };

    let registry = default_registry();
    let mut shown = 0;
    for rule in registry.all() {
        if let Some(dim) = filter {
            if rule.dimension() != dim {
                continue;
            }
        }
        let thorough = if rule.thorough_only() {
            " (thorough only)"
        } else {
            ""
        };
        println!(
            "{:<28} {:<8} {:<20} {}{}",
            style(rule.id()).bold(),
            rule.severity(),
            rule.category(),
            rule.dimension().id(),
            style(thorough).dim()
        );
        shown += 1;
    }
    println!("\n{} rules", shown);
    Ok(())
}
