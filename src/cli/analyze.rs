//! Analyze command — run the full pipeline over a documentation tree

use crate::config::load_scoring_config;
use crate::ingest::{collect_documents, ingest_file};
use crate::models::Artifact;
use crate::pipeline::run_audit;
use crate::reporters::{render_audit, OutputFormat};
use anyhow::{bail, Result};
use chrono::Utc;
use std::path::Path;
use tracing::warn;

pub fn run(path: &Path, format: &str, output: Option<&Path>) -> Result<()> {
    if !path.exists() {
        bail!("path '{}' does not exist", path.display());
    }

    let config_dir = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(Path::new("."))
    };
    let config = load_scoring_config(config_dir);

    // One clock for the whole run: ingestion timestamps and all recency math
    // agree on what "now" means
    let now = Utc::now();

    let files = collect_documents(path);
    if files.is_empty() {
        bail!(
            "no documentation files found under '{}' (looked for .md, .txt, .rst, .adoc, .html)",
            path.display()
        );
    }

    let mut artifacts: Vec<Artifact> = Vec::new();
    for file in &files {
        match ingest_file(file, now) {
            Ok(ingested) => {
                for warning in &ingested.warnings {
                    warn!("{warning}");
                }
                artifacts.push(ingested.artifact);
            }
            Err(e) => warn!("skipping '{}': {e}", file.display()),
        }
    }

    if artifacts.is_empty() {
        bail!("every document under '{}' was rejected at ingestion", path.display());
    }

    let audit = run_audit(&artifacts, &config, now);

    let format: OutputFormat = format.parse()?;
    let rendered = render_audit(&audit, format)?;
    super::emit(&rendered, output)
}
