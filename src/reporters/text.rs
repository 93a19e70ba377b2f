//! Text reporter
//!
//! Terminal output with colors via `console`. Meant for humans skimming a
//! report, not for parsing; use the JSON format for that.

use crate::diff::{AuditDiff, ChangeKind};
use crate::models::{Audit, RankedFeature, RiskLevel};
use crate::trend::{FeatureTrend, TrendDirection};
use console::style;

fn risk_label(level: RiskLevel) -> String {
    let label = level.to_string().to_uppercase();
    match level {
        RiskLevel::Critical => style(label).red().bold().to_string(),
        RiskLevel::High => style(label).red().to_string(),
        RiskLevel::Medium => style(label).yellow().to_string(),
        RiskLevel::Low => style(label).green().to_string(),
    }
}

fn feature_line(feature: &RankedFeature) -> String {
    let diagnosis = feature
        .primary_diagnosis
        .as_ref()
        .map(|d| format!(" — {}", d.title))
        .unwrap_or_default();
    format!(
        "{:>4}. [{}] {} (risk {:.2}, {} evidence){}",
        feature.rank,
        risk_label(feature.risk_level),
        style(&feature.feature.name).bold(),
        feature.combined_risk,
        feature.evidence.len(),
        diagnosis
    )
}

/// Render an audit as a terminal report.
pub fn render_audit(audit: &Audit) -> String {
    let mut out = Vec::new();
    let summary = &audit.summary;

    out.push(format!(
        "{} {}",
        style("Audit").bold(),
        style(&summary.audit_id).cyan()
    ));
    out.push(format!(
        "{} features from {} artifacts ({} evidence records)",
        summary.total_features, summary.total_artifacts, summary.total_evidence
    ));
    out.push(format!(
        "critical: {}  high: {}  medium: {}  low: {}",
        summary.by_risk_level.critical,
        summary.by_risk_level.high,
        summary.by_risk_level.medium,
        summary.by_risk_level.low
    ));

    if !summary.top_risk_factors.is_empty() {
        out.push(format!(
            "top risk factors: {}",
            summary.top_risk_factors.join(", ")
        ));
    }

    if audit.features.is_empty() {
        out.push(String::new());
        out.push("No features extracted. Nothing to rank.".to_string());
    } else {
        out.push(String::new());
        for feature in &audit.features {
            out.push(feature_line(feature));
        }
    }

    out.join("\n")
}

/// Render an audit diff as a terminal report.
pub fn render_diff(diff: &AuditDiff) -> String {
    let mut out = Vec::new();

    out.push(format!(
        "{} {} → {}",
        style("Diff").bold(),
        style(&diff.base_audit_id).cyan(),
        style(&diff.compare_audit_id).cyan()
    ));
    let s = &diff.summary;
    out.push(format!(
        "added: {}  removed: {}  risk up: {}  risk down: {}  diagnosis changed: {}  unchanged: {}",
        s.added, s.removed, s.risk_increased, s.risk_decreased, s.diagnosis_changed, s.unchanged
    ));
    out.push(format!(
        "new risks: {}  resolved risks: {}",
        style(s.new_risks).red(),
        style(s.resolved_risks).green()
    ));
    out.push(String::new());

    for change in &diff.changes {
        if change.change == ChangeKind::Unchanged {
            continue;
        }
        let movement = match (&change.base, &change.compare) {
            (Some(b), Some(c)) => format!("{} → {}", b.risk_level, c.risk_level),
            (None, Some(c)) => format!("→ {}", c.risk_level),
            (Some(b), None) => format!("{} →", b.risk_level),
            (None, None) => String::new(),
        };
        out.push(format!(
            "  {:<18} {} ({})",
            change.change.to_string(),
            style(&change.feature_name).bold(),
            movement
        ));
    }

    if diff.changes.iter().all(|c| c.change == ChangeKind::Unchanged) {
        out.push("  no changes".to_string());
    }

    out.join("\n")
}

/// Render feature trends as a terminal report.
pub fn render_trends(trends: &[FeatureTrend]) -> String {
    let mut out = Vec::new();
    out.push(format!("{} ({} features)", style("Trends").bold(), trends.len()));
    out.push(String::new());

    for trend in trends {
        let direction = match trend.direction {
            TrendDirection::Worsening => style("worsening").red().to_string(),
            TrendDirection::Improving => style("improving").green().to_string(),
            TrendDirection::Stable => style("stable").dim().to_string(),
        };
        let path = trend
            .points
            .iter()
            .map(|p| p.risk_level.to_string())
            .collect::<Vec<_>>()
            .join(" → ");
        out.push(format!(
            "  {} [{}] {} ({} level changes, {} diagnosis changes)",
            style(&trend.feature_name).bold(),
            direction,
            path,
            trend.risk_level_changes,
            trend.diagnosis_changes
        ));
    }

    if trends.is_empty() {
        out.push("  no feature history".to_string());
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::assemble_audit;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_empty_audit_text() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let audit = assemble_audit(vec![], 0, now);
        let rendered = render_audit(&audit);
        assert!(rendered.contains("0 features"));
        assert!(rendered.contains("No features extracted"));
    }

    #[test]
    fn test_empty_trends_text() {
        let rendered = render_trends(&[]);
        assert!(rendered.contains("no feature history"));
    }
}
