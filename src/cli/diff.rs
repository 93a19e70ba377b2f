//! Diff command — compare two persisted audits

use crate::diff::diff_audits;
use crate::reporters::{render_diff, OutputFormat};
use anyhow::Result;
use std::path::Path;

pub fn run(base: &Path, compare: &Path, format: &str) -> Result<()> {
    let base_audit = super::load_audit(base)?;
    let compare_audit = super::load_audit(compare)?;

    let diff = diff_audits(&base_audit, &compare_audit);

    let format: OutputFormat = format.parse()?;
    let rendered = render_diff(&diff, format)?;
    super::emit(&rendered, None)
}
