//! Output reporters for audit results
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON (also the persistence format consumed by
//!   `diff` and `trend`)
//!
//! Reporters are strictly one-way: they render core records and never feed
//! anything back into scoring.

mod json;
mod text;

use crate::diff::AuditDiff;
use crate::models::Audit;
use crate::trend::FeatureTrend;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render an audit in the requested format.
pub fn render_audit(audit: &Audit, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_audit(audit)),
        OutputFormat::Json => json::render(audit),
    }
}

/// Render an audit diff in the requested format.
pub fn render_diff(diff: &AuditDiff, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_diff(diff)),
        OutputFormat::Json => json::render(diff),
    }
}

/// Render feature trends in the requested format.
pub fn render_trends(trends: &[FeatureTrend], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_trends(trends)),
        OutputFormat::Json => json::render(&trends),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("sarif").is_err());
    }
}
