//! CLI command definitions and handlers

mod review;
mod rules;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Conforma - declarative conformance scoring for tool integrations
#[derive(Parser, Debug)]
#[command(name = "conforma")]
#[command(
    version,
    about = "Score a tool integration against the platform's conformance rules",
    long_about = "Conforma resolves a target's conventional artifacts (adapter, entities, \
schema, orchestrator wiring, output contract, documentation), evaluates a static registry \
of rules grouped into weighted dimensions, and aggregates the findings into an advisory \
verdict.\n\n\
All reads are local files; suppressions and conventions live in conforma/registry.toml.",
    after_help = "\
Examples:
  conforma review --target lizard                      Review one tool integration
  conforma review --target cross-tool --review-type cross_tool   Cross-tool SQL review
  conforma review --target lizard --format json        JSON report on stdout
  conforma rules                                       List every registered rule
  conforma rules --dimension adapter_schema            Rules of one dimension"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a conformance review and persist the report
    #[command(after_help = "\
Examples:
  conforma review --target lizard
  conforma review --target git-sizer --review-type blueprint_alignment
  conforma review --target cross-tool --review-type cross_tool --workers 4
  conforma review --target lizard --output-dir reviews/ --format json")]
    Review {
        /// Target tool name, or the literal `cross-tool`
        #[arg(long)]
        target: String,

        /// Review type: tool_implementation, cross_tool, blueprint_alignment
        #[arg(long, default_value = "tool_implementation", value_parser = [
            "tool_implementation", "tool-implementation",
            "cross_tool", "cross-tool",
            "blueprint_alignment", "blueprint-alignment",
        ])]
        review_type: String,

        /// Directory the report is written to
        #[arg(long, short = 'o', default_value = "review-results")]
        output_dir: PathBuf,

        /// Project root the artifact conventions are resolved against
        #[arg(long, default_value = ".")]
        project_root: PathBuf,

        /// Output format for stdout: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Number of parallel workers (1-64)
        #[arg(long, default_value = "8", value_parser = parse_workers)]
        workers: usize,
    },

    /// List the registered rules (id, severity, category, dimension)
    Rules {
        /// Only rules of this dimension (e.g. adapter_schema)
        #[arg(long)]
        dimension: Option<String>,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Review {
            target,
            review_type,
            output_dir,
            project_root,
            format,
            workers,
        } => review::run(
            &target,
            &review_type,
            &output_dir,
            &project_root,
            &format,
            workers,
        ),
        Commands::Rules { dimension } => rules::run(dimension.as_deref()),
    }
}
