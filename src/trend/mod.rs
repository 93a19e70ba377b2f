//! Cross-audit trend tracking
//!
//! Folds an ordered sequence of audits into a per-feature risk history.
//! Direction comes from comparing the first and last observations; transition
//! counts record how often the risk level or primary diagnosis flipped along
//! the way.

use crate::models::{normalize_name, Audit, DiagnosisType, RiskLevel};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Where a feature's risk is heading across audits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Worsening,
    Stable,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Improving => write!(f, "improving"),
            TrendDirection::Worsening => write!(f, "worsening"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

/// One observation of a feature in one audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub audit_id: String,
    pub analyzed_at: DateTime<Utc>,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub primary_diagnosis: Option<DiagnosisType>,
}

/// A feature's risk history across an ordered sequence of audits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTrend {
    pub feature_name: String,
    /// Observations, oldest first
    pub points: Vec<TrendPoint>,
    pub direction: TrendDirection,
    /// Primary-diagnosis flips between consecutive observations
    pub diagnosis_changes: usize,
    /// Risk-level flips between consecutive observations
    pub risk_level_changes: usize,
}

fn direction_of(points: &[TrendPoint]) -> TrendDirection {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => {
            let first_ord = first.risk_level.ordinal();
            let last_ord = last.risk_level.ordinal();
            if last_ord < first_ord {
                TrendDirection::Improving
            } else if last_ord > first_ord {
                TrendDirection::Worsening
            } else {
                TrendDirection::Stable
            }
        }
        // Single-point histories are always stable
        _ => TrendDirection::Stable,
    }
}

/// Fold audits (sorted oldest→newest by the caller) into per-feature trends.
///
/// Ordering of the result: severest current risk first; at equal risk level,
/// worsening features come before the rest.
pub fn track_trends(audits: &[Audit]) -> Vec<FeatureTrend> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: FxHashMap<String, (String, Vec<TrendPoint>)> = FxHashMap::default();

    for audit in audits {
        for feature in &audit.features {
            let key = normalize_name(&feature.feature.name);
            let point = TrendPoint {
                audit_id: audit.summary.audit_id.clone(),
                analyzed_at: audit.summary.analyzed_at,
                risk_level: feature.risk_level,
                risk_score: feature.combined_risk,
                primary_diagnosis: feature.primary_diagnosis.as_ref().map(|d| d.diagnosis_type),
            };
            match grouped.get_mut(&key) {
                Some((name, points)) => {
                    // Latest spelling wins for display
                    *name = feature.feature.name.clone();
                    points.push(point);
                }
                None => {
                    order.push(key.clone());
                    grouped.insert(key, (feature.feature.name.clone(), vec![point]));
                }
            }
        }
    }

    let mut trends: Vec<FeatureTrend> = order
        .into_iter()
        .map(|key| {
            let (feature_name, points) = grouped
                .remove(&key)
                .expect("grouped entry exists for every ordered key");
            let direction = direction_of(&points);
            let diagnosis_changes = points
                .windows(2)
                .filter(|pair| pair[0].primary_diagnosis != pair[1].primary_diagnosis)
                .count();
            let risk_level_changes = points
                .windows(2)
                .filter(|pair| pair[0].risk_level != pair[1].risk_level)
                .count();
            FeatureTrend {
                feature_name,
                points,
                direction,
                diagnosis_changes,
                risk_level_changes,
            }
        })
        .collect();

    trends.sort_by(|a, b| {
        let current = |t: &FeatureTrend| {
            t.points
                .last()
                .map(|p| p.risk_level.ordinal())
                .unwrap_or(0)
        };
        let worsening = |t: &FeatureTrend| t.direction == TrendDirection::Worsening;
        current(b)
            .cmp(&current(a))
            .then_with(|| worsening(b).cmp(&worsening(a)))
            .then_with(|| a.feature_name.cmp(&b.feature_name))
    });

    trends
}
