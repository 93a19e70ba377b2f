//! Trend command — track feature risk across a sequence of audits

use crate::reporters::{render_trends, OutputFormat};
use crate::trend::track_trends;
use anyhow::Result;
use std::path::PathBuf;

pub fn run(paths: &[PathBuf], format: &str) -> Result<()> {
    let mut audits = paths
        .iter()
        .map(|p| super::load_audit(p))
        .collect::<Result<Vec<_>>>()?;

    // The trend engine expects oldest → newest
    audits.sort_by_key(|a| a.summary.analyzed_at);

    let trends = track_trends(&audits);

    let format: OutputFormat = format.parse()?;
    let rendered = render_trends(&trends, format)?;
    super::emit(&rendered, None)
}
