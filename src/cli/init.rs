//! Init command — write an example adoptscope.toml

use anyhow::{bail, Result};
use std::path::Path;

const EXAMPLE_CONFIG: &str = "\
# adoptscope configuration
#
# All keys are optional; missing keys use the defaults shown here.

[scoring]
# Days without a mention after which a feature counts as fully stale
staleness_window_days = 180

# Weights for combining the three sub-scores into adoption risk
recency_weight = 0.4
visibility_weight = 0.35
density_weight = 0.25
";

pub fn run() -> Result<()> {
    let path = Path::new("adoptscope.toml");
    if path.exists() {
        bail!("adoptscope.toml already exists; delete it first to regenerate");
    }
    std::fs::write(path, EXAMPLE_CONFIG)?;
    eprintln!("wrote adoptscope.toml");
    Ok(())
}
