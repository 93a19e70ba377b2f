//! Audit-to-audit diffing
//!
//! Matches features across two audits by normalized name and classifies each
//! one as added, removed, risk_increased, risk_decreased, diagnosis_changed,
//! or unchanged. Classification is total and mutually exclusive; a feature
//! present in neither audit reaching the comparison is a programming defect,
//! not a runtime condition.

use crate::models::{normalize_name, Audit, DiagnosisType, RankedFeature, RiskLevel};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// How one feature changed between two audits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    RiskIncreased,
    RiskDecreased,
    DiagnosisChanged,
    Unchanged,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Removed => write!(f, "removed"),
            ChangeKind::RiskIncreased => write!(f, "risk_increased"),
            ChangeKind::RiskDecreased => write!(f, "risk_decreased"),
            ChangeKind::DiagnosisChanged => write!(f, "diagnosis_changed"),
            ChangeKind::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// One feature's state in one audit, as much as the diff needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureState {
    pub risk_level: RiskLevel,
    pub combined_risk: f64,
    pub primary_diagnosis: Option<DiagnosisType>,
    pub rank: usize,
}

impl FeatureState {
    fn of(feature: &RankedFeature) -> Self {
        Self {
            risk_level: feature.risk_level,
            combined_risk: feature.combined_risk,
            primary_diagnosis: feature.primary_diagnosis.as_ref().map(|d| d.diagnosis_type),
            rank: feature.rank,
        }
    }
}

/// Per-feature comparison of two audits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDiff {
    pub feature_name: String,
    pub change: ChangeKind,
    pub base: Option<FeatureState>,
    pub compare: Option<FeatureState>,
    /// Signed risk-level ordinal delta (compare − base); 0 when one side is absent
    pub risk_level_delta: i32,
}

/// Aggregate change counts for a diff
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub risk_increased: usize,
    pub risk_decreased: usize,
    pub diagnosis_changed: usize,
    pub unchanged: usize,
    /// Features that appeared in, or climbed into, high/critical risk
    pub new_risks: usize,
    /// Features that left high/critical risk, by removal or improvement
    pub resolved_risks: usize,
}

/// A structured comparison between two audits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditDiff {
    pub base_audit_id: String,
    pub compare_audit_id: String,
    pub summary: DiffSummary,
    /// Significance-ordered: additions and removals first, then by absolute
    /// risk-level movement
    pub changes: Vec<FeatureDiff>,
}

fn classify(base: Option<&RankedFeature>, compare: Option<&RankedFeature>) -> (ChangeKind, i32) {
    match (base, compare) {
        (None, Some(_)) => (ChangeKind::Added, 0),
        (Some(_), None) => (ChangeKind::Removed, 0),
        (Some(b), Some(c)) => {
            let delta = c.risk_level.ordinal() as i32 - b.risk_level.ordinal() as i32;
            if delta > 0 {
                (ChangeKind::RiskIncreased, delta)
            } else if delta < 0 {
                (ChangeKind::RiskDecreased, delta)
            } else {
                let base_diag = b.primary_diagnosis.as_ref().map(|d| d.diagnosis_type);
                let compare_diag = c.primary_diagnosis.as_ref().map(|d| d.diagnosis_type);
                if base_diag != compare_diag {
                    (ChangeKind::DiagnosisChanged, 0)
                } else {
                    (ChangeKind::Unchanged, 0)
                }
            }
        }
        // A name in the union is present in at least one audit
        (None, None) => unreachable!("feature name matched neither audit"),
    }
}

/// Compare two audits feature-by-feature.
pub fn diff_audits(base: &Audit, compare: &Audit) -> AuditDiff {
    let index = |audit: &Audit| -> FxHashMap<String, usize> {
        audit
            .features
            .iter()
            .enumerate()
            .map(|(i, f)| (normalize_name(&f.feature.name), i))
            .collect()
    };
    let base_index = index(base);
    let compare_index = index(compare);

    // Union of names, base order first, then compare-only names
    let mut names: Vec<String> = Vec::new();
    let mut seen: FxHashMap<String, ()> = FxHashMap::default();
    for feature in base.features.iter().chain(compare.features.iter()) {
        let key = normalize_name(&feature.feature.name);
        if seen.insert(key.clone(), ()).is_none() {
            names.push(key);
        }
    }

    let mut summary = DiffSummary::default();
    let mut changes: Vec<FeatureDiff> = Vec::new();

    for name in names {
        let base_feature = base_index.get(&name).map(|&i| &base.features[i]);
        let compare_feature = compare_index.get(&name).map(|&i| &compare.features[i]);
        let (change, delta) = classify(base_feature, compare_feature);

        match change {
            ChangeKind::Added => summary.added += 1,
            ChangeKind::Removed => summary.removed += 1,
            ChangeKind::RiskIncreased => summary.risk_increased += 1,
            ChangeKind::RiskDecreased => summary.risk_decreased += 1,
            ChangeKind::DiagnosisChanged => summary.diagnosis_changed += 1,
            ChangeKind::Unchanged => summary.unchanged += 1,
        }

        // New risk: appeared in, or climbed into, high/critical
        let compare_severe = compare_feature.is_some_and(|f| f.risk_level.is_severe());
        let base_severe = base_feature.is_some_and(|f| f.risk_level.is_severe());
        match change {
            ChangeKind::Added if compare_severe => summary.new_risks += 1,
            ChangeKind::RiskIncreased if compare_severe && !base_severe => summary.new_risks += 1,
            ChangeKind::Removed if base_severe => summary.resolved_risks += 1,
            ChangeKind::RiskDecreased if base_severe && !compare_severe => {
                summary.resolved_risks += 1
            }
            _ => {}
        }

        let display_name = compare_feature
            .or(base_feature)
            .map(|f| f.feature.name.clone())
            .unwrap_or(name);

        changes.push(FeatureDiff {
            feature_name: display_name,
            change,
            base: base_feature.map(FeatureState::of),
            compare: compare_feature.map(FeatureState::of),
            risk_level_delta: delta,
        });
    }

    // Additions/removals first, then descending absolute risk movement;
    // name as the final key keeps the order reproducible
    changes.sort_by(|a, b| {
        let structural = |c: &FeatureDiff| {
            matches!(c.change, ChangeKind::Added | ChangeKind::Removed)
        };
        structural(b)
            .cmp(&structural(a))
            .then_with(|| b.risk_level_delta.abs().cmp(&a.risk_level_delta.abs()))
            .then_with(|| a.feature_name.cmp(&b.feature_name))
    });

    AuditDiff {
        base_audit_id: base.summary.audit_id.clone(),
        compare_audit_id: compare.summary.audit_id.clone(),
        summary,
        changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{assemble_audit, ScoredFeature};
    use crate::models::{
        Diagnosis, Evidence, Feature, FeatureScore, ScoreBreakdown, ScoreFactor, Severity,
        SignalType,
    };
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn breakdown(score: f64) -> ScoreBreakdown {
        ScoreBreakdown {
            score,
            explanation: String::new(),
            factors: vec![ScoreFactor::new("only", score, 1.0, String::new())],
        }
    }

    fn audit_with(features: Vec<(&str, f64, Option<DiagnosisType>)>) -> Audit {
        let scored = features
            .into_iter()
            .map(|(name, risk, diag)| {
                let feature = Feature::new(name, "ART-a", now());
                let primary = diag.map(|dt| Diagnosis {
                    id: "DIAG-x".to_string(),
                    feature_id: feature.id.clone(),
                    diagnosis_type: dt,
                    title: dt.to_string(),
                    explanation: String::new(),
                    severity: Severity::Medium,
                    confidence: 0.5,
                    signals: vec![],
                    supporting_evidence: vec![],
                    generated_at: now(),
                });
                ScoredFeature {
                    evidence: vec![Evidence {
                        id: "EV-1".to_string(),
                        artifact_id: "ART-a".to_string(),
                        feature_id: feature.id.clone(),
                        excerpt: "e".to_string(),
                        signal: SignalType::Documentation,
                        location: None,
                        timestamp: now(),
                        confidence: Some(0.7),
                    }],
                    score: FeatureScore {
                        feature_id: feature.id.clone(),
                        recency: breakdown(0.5),
                        visibility: breakdown(0.5),
                        density: breakdown(0.5),
                        adoption_risk: breakdown(risk),
                    },
                    feature,
                    diagnoses: primary.clone().into_iter().collect(),
                    primary_diagnosis: primary,
                }
            })
            .collect();
        assemble_audit(scored, 1, now())
    }

    #[test]
    fn test_added_and_removed() {
        let base = audit_with(vec![("Old Feature", 0.2, None)]);
        let compare = audit_with(vec![("New Feature", 0.2, None)]);

        let diff = diff_audits(&base, &compare);
        assert_eq!(diff.summary.added, 1);
        assert_eq!(diff.summary.removed, 1);
        assert_eq!(diff.changes.len(), 2);
        assert!(diff
            .changes
            .iter()
            .all(|c| matches!(c.change, ChangeKind::Added | ChangeKind::Removed)));
    }

    #[test]
    fn test_low_to_critical_counts_as_new_risk() {
        let base = audit_with(vec![("Exports", 0.2, None)]);
        let compare = audit_with(vec![("Exports", 0.9, None)]);

        let diff = diff_audits(&base, &compare);
        let change = &diff.changes[0];
        assert_eq!(change.change, ChangeKind::RiskIncreased);
        assert_eq!(change.risk_level_delta, 3);
        assert_eq!(diff.summary.new_risks, 1);
        assert_eq!(diff.summary.risk_increased, 1);
    }

    #[test]
    fn test_decreased_out_of_severe_resolves_risk() {
        let base = audit_with(vec![("Exports", 0.9, None)]);
        let compare = audit_with(vec![("Exports", 0.2, None)]);

        let diff = diff_audits(&base, &compare);
        assert_eq!(diff.changes[0].change, ChangeKind::RiskDecreased);
        assert_eq!(diff.summary.resolved_risks, 1);
    }

    #[test]
    fn test_diagnosis_change_at_same_level() {
        let base = audit_with(vec![("Exports", 0.6, Some(DiagnosisType::LikelyInvisible))]);
        let compare = audit_with(vec![(
            "Exports",
            0.6,
            Some(DiagnosisType::DormantButDocumented),
        )]);

        let diff = diff_audits(&base, &compare);
        assert_eq!(diff.changes[0].change, ChangeKind::DiagnosisChanged);
        assert_eq!(diff.summary.diagnosis_changed, 1);
    }

    #[test]
    fn test_unchanged() {
        // Scores differ slightly but land in the same risk bucket
        let base = audit_with(vec![("Exports", 0.58, Some(DiagnosisType::LikelyInvisible))]);
        let compare = audit_with(vec![("Exports", 0.6, Some(DiagnosisType::LikelyInvisible))]);

        let diff = diff_audits(&base, &compare);
        assert_eq!(diff.changes[0].change, ChangeKind::Unchanged);
        assert_eq!(diff.summary.unchanged, 1);
    }

    #[test]
    fn test_classification_total_and_exclusive() {
        let base = audit_with(vec![
            ("A", 0.2, None),
            ("B", 0.9, None),
            ("C", 0.6, Some(DiagnosisType::LikelyInvisible)),
        ]);
        let compare = audit_with(vec![
            ("B", 0.1, None),
            ("C", 0.6, Some(DiagnosisType::Undiscoverable)),
            ("D", 0.8, None),
        ]);

        let diff = diff_audits(&base, &compare);
        assert_eq!(diff.changes.len(), 4);
        let total = diff.summary.added
            + diff.summary.removed
            + diff.summary.risk_increased
            + diff.summary.risk_decreased
            + diff.summary.diagnosis_changed
            + diff.summary.unchanged;
        assert_eq!(total, 4);
    }

    #[test]
    fn test_ordering_structural_then_magnitude() {
        let base = audit_with(vec![("Stays Same", 0.2, None), ("Jumps", 0.2, None)]);
        let compare = audit_with(vec![
            ("Stays Same", 0.2, None),
            ("Jumps", 0.9, None),
            ("Brand New", 0.5, None),
        ]);

        let diff = diff_audits(&base, &compare);
        assert_eq!(diff.changes[0].change, ChangeKind::Added);
        assert_eq!(diff.changes[1].feature_name, "Jumps");
        assert_eq!(diff.changes[2].change, ChangeKind::Unchanged);
    }

    #[test]
    fn test_name_matching_ignores_case_and_punctuation() {
        let base = audit_with(vec![("Real-Time Sync", 0.5, None)]);
        let compare = audit_with(vec![("real time sync", 0.5, None)]);

        let diff = diff_audits(&base, &compare);
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].change, ChangeKind::Unchanged);
    }
}
