//! CLI command definitions and handlers

mod analyze;
mod diff;
mod init;
mod trend;

use crate::models::Audit;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Adoptscope - adoption-risk analysis for product documentation
///
/// 100% LOCAL - No account needed. No data leaves your machine.
#[derive(Parser, Debug)]
#[command(name = "adoptscope")]
#[command(
    version,
    about = "Rank product features by adoption risk from release notes, docs, and FAQs",
    long_about = "Adoptscope extracts feature mentions from free-form product documentation \
and scores each feature on recency, visibility, and documentation density, producing a \
ranked, evidence-backed adoption-risk report.\n\n\
100% LOCAL — No account needed. No data leaves your machine.",
    after_help = "\
Examples:
  adoptscope analyze ./docs                         Analyze a documentation tree
  adoptscope analyze ./docs --format json -o a.json Persist the audit as JSON
  adoptscope diff a.json b.json                     Compare two persisted audits
  adoptscope trend a.json b.json c.json             Track risk across audits
  adoptscope init                                   Write an example adoptscope.toml"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze documentation and produce a ranked adoption-risk audit
    Analyze {
        /// File or directory of documentation to analyze
        path: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Compare two persisted audits feature-by-feature
    Diff {
        /// Baseline audit JSON (produced by `analyze --format json`)
        base: PathBuf,

        /// Audit JSON to compare against the baseline
        compare: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Track per-feature risk across a chronological sequence of audits
    Trend {
        /// Audit JSON files (any order; sorted by analysis time)
        #[arg(required = true, num_args = 2..)]
        audits: Vec<PathBuf>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Write an example adoptscope.toml config file
    Init,
}

/// Load a persisted audit from a JSON file.
pub(crate) fn load_audit(path: &Path) -> Result<Audit> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read audit file '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("'{}' is not a valid audit JSON file", path.display()))
}

/// Write rendered output to a file or stdout.
pub(crate) fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
        } => analyze::run(&path, &format, output.as_deref()),
        Commands::Diff {
            base,
            compare,
            format,
        } => diff::run(&base, &compare, &format),
        Commands::Trend { audits, format } => trend::run(&audits, &format),
        Commands::Init => init::run(),
    }
}
