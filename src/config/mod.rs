//! Configuration
//!
//! Loads per-project scoring configuration from an `adoptscope.toml` file in
//! the analyzed directory. Absent file or absent keys fall back to the
//! documented defaults; a malformed file is reported and ignored rather than
//! aborting the run.
//!
//! # Configuration Format
//!
//! ```toml
//! # adoptscope.toml
//!
//! [scoring]
//! staleness_window_days = 180
//! recency_weight = 0.4
//! visibility_weight = 0.35
//! density_weight = 0.25
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Days without a mention after which a feature counts as fully stale
pub const DEFAULT_STALENESS_WINDOW_DAYS: i64 = 180;
pub const DEFAULT_RECENCY_WEIGHT: f64 = 0.4;
pub const DEFAULT_VISIBILITY_WEIGHT: f64 = 0.35;
pub const DEFAULT_DENSITY_WEIGHT: f64 = 0.25;

const CONFIG_FILE_NAME: &str = "adoptscope.toml";

fn default_staleness_window_days() -> i64 {
    DEFAULT_STALENESS_WINDOW_DAYS
}
fn default_recency_weight() -> f64 {
    DEFAULT_RECENCY_WEIGHT
}
fn default_visibility_weight() -> f64 {
    DEFAULT_VISIBILITY_WEIGHT
}
fn default_density_weight() -> f64 {
    DEFAULT_DENSITY_WEIGHT
}

/// The only externally tunable input to the scoring core.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Staleness window in days for the recency decay
    #[serde(default = "default_staleness_window_days")]
    pub staleness_window_days: i64,

    /// Weight of the recency gap in the adoption-risk combination
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,

    /// Weight of the visibility gap in the adoption-risk combination
    #[serde(default = "default_visibility_weight")]
    pub visibility_weight: f64,

    /// Weight of the density gap in the adoption-risk combination
    #[serde(default = "default_density_weight")]
    pub density_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            staleness_window_days: DEFAULT_STALENESS_WINDOW_DAYS,
            recency_weight: DEFAULT_RECENCY_WEIGHT,
            visibility_weight: DEFAULT_VISIBILITY_WEIGHT,
            density_weight: DEFAULT_DENSITY_WEIGHT,
        }
    }
}

impl ScoringConfig {
    /// Sanity-check loaded values, warning on anything suspicious.
    /// Weights that do not sum to 1 still work (risk is clamped), but the
    /// report's percentages stop meaning what readers expect.
    fn validate(&self) {
        if self.staleness_window_days <= 0 {
            warn!(
                staleness_window_days = self.staleness_window_days,
                "staleness window must be positive; scoring will treat it as 1 day"
            );
        }
        let weight_sum = self.recency_weight + self.visibility_weight + self.density_weight;
        if (weight_sum - 1.0).abs() > 0.01 {
            warn!(
                weight_sum,
                "scoring weights do not sum to 1.0; risk scores remain clamped to [0,1]"
            );
        }
        for (name, weight) in [
            ("recency_weight", self.recency_weight),
            ("visibility_weight", self.visibility_weight),
            ("density_weight", self.density_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                warn!(weight, "{name} outside [0,1]");
            }
        }
    }
}

/// Wrapper matching the `[scoring]` table in adoptscope.toml
#[derive(Debug, Clone, Default, Deserialize)]
struct ProjectConfig {
    #[serde(default)]
    scoring: Option<ScoringConfig>,
}

/// Load scoring configuration from `<dir>/adoptscope.toml`.
///
/// Missing file → defaults. Malformed file → warning + defaults. Missing
/// keys → per-key defaults.
pub fn load_scoring_config(dir: &Path) -> ScoringConfig {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using default scoring config");
        return ScoringConfig::default();
    }

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read config; using defaults");
            return ScoringConfig::default();
        }
    };

    match toml::from_str::<ProjectConfig>(&raw) {
        Ok(project) => {
            let config = project.scoring.unwrap_or_default();
            config.validate();
            debug!(
                staleness_window_days = config.staleness_window_days,
                "loaded scoring config from {}",
                path.display()
            );
            config
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed config; using defaults");
            ScoringConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.staleness_window_days, 180);
        assert!((config.recency_weight - 0.4).abs() < 1e-9);
        assert!((config.visibility_weight - 0.35).abs() < 1e-9);
        assert!((config.density_weight - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = load_scoring_config(dir.path());
        assert_eq!(config.staleness_window_days, 180);
    }

    #[test]
    fn test_partial_file_uses_per_key_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join("adoptscope.toml"),
            "[scoring]\nstaleness_window_days = 90\n",
        )
        .expect("write config");

        let config = load_scoring_config(dir.path());
        assert_eq!(config.staleness_window_days, 90);
        assert!((config.recency_weight - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("adoptscope.toml"), "not [valid toml").expect("write");

        let config = load_scoring_config(dir.path());
        assert_eq!(config.staleness_window_days, 180);
    }
}
