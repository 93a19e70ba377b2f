//! JSON reporter
//!
//! Pretty-printed JSON for machine consumption, piping to jq, or persisting
//! for later `diff`/`trend` runs.

use anyhow::Result;
use serde::Serialize;

/// Render any serializable record as pretty-printed JSON
pub fn render<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::assemble_audit;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_empty_audit_renders_valid_json() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let audit = assemble_audit(vec![], 0, now);
        let rendered = render(&audit).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("parse JSON");
        assert_eq!(parsed["summary"]["total_features"], 0);
        assert!(parsed["features"].as_array().expect("features array").is_empty());
    }

    #[test]
    fn test_audit_round_trips() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let audit = assemble_audit(vec![], 3, now);
        let rendered = render(&audit).expect("render JSON");
        let back: crate::models::Audit = serde_json::from_str(&rendered).expect("deserialize");
        assert_eq!(back.summary.audit_id, audit.summary.audit_id);
        assert_eq!(back.summary.total_artifacts, 3);
    }
}
