//! Audit assembly
//!
//! Merges scores, diagnoses, and evidence into ranked features, computes
//! summary statistics, and stamps the whole thing with a deterministic audit
//! identifier. The combined risk blends the raw adoption-risk score with
//! diagnosis confidence and adds a boost for features carrying several
//! severe diagnoses.

use crate::models::{
    audit_id, Audit, AuditSummary, Diagnosis, Evidence, Feature, FeatureScore, RankedFeature,
    RiskLevel, RiskLevelCounts, Severity,
};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use tracing::info;

/// Boost per high/critical diagnosis on top of the blended risk score
const SEVERITY_BOOST_STEP: f64 = 0.1;
/// Boost cap: two or more severe diagnoses saturate it
const SEVERITY_BOOST_CAP: f64 = 0.2;
/// Weight of the raw risk score in the confidence blend
const RAW_BLEND_WEIGHT: f64 = 0.8;
/// Weight of the confidence-scaled risk score in the blend
const CONFIDENCE_BLEND_WEIGHT: f64 = 0.2;
/// Combined scores closer than this are tied for ranking purposes
const RANK_TIE_EPSILON: f64 = 0.01;
/// Number of recurring factors reported in the summary
const TOP_FACTOR_COUNT: usize = 5;
/// A risk-gap factor above this value under-performed its weight share
const UNDERPERFORMING_FACTOR_THRESHOLD: f64 = 0.5;

/// One feature with everything the ranker needs, before ordering
#[derive(Debug, Clone)]
pub struct ScoredFeature {
    pub feature: Feature,
    pub score: FeatureScore,
    pub diagnoses: Vec<Diagnosis>,
    pub primary_diagnosis: Option<Diagnosis>,
    pub evidence: Vec<Evidence>,
}

fn severe_diagnosis_count(diagnoses: &[Diagnosis]) -> usize {
    diagnoses
        .iter()
        .filter(|d| matches!(d.severity, Severity::High | Severity::Critical))
        .count()
}

/// Combine the raw adoption-risk score with diagnosis confidence and the
/// severity boost: `clamp(0.8×risk + 0.2×risk×mean_confidence + boost)`.
///
/// A feature with no diagnoses keeps its raw score unchanged.
fn combined_risk(risk: f64, diagnoses: &[Diagnosis]) -> f64 {
    let blended = if diagnoses.is_empty() {
        risk
    } else {
        let mean_confidence =
            diagnoses.iter().map(|d| d.confidence).sum::<f64>() / diagnoses.len() as f64;
        RAW_BLEND_WEIGHT * risk + CONFIDENCE_BLEND_WEIGHT * risk * mean_confidence
    };
    let boost =
        (severe_diagnosis_count(diagnoses) as f64 * SEVERITY_BOOST_STEP).min(SEVERITY_BOOST_CAP);
    (blended + boost).clamp(0.0, 1.0)
}

/// Derive the most frequent risk factors across high/critical features:
/// scoring factors that under-performed their weight share, and recurring
/// primary-diagnosis titles.
fn top_risk_factors(features: &[RankedFeature]) -> Vec<String> {
    let mut counts: FxHashMap<String, usize> = FxHashMap::default();

    for ranked in features {
        if !ranked.risk_level.is_severe() {
            continue;
        }
        for factor in &ranked.score.adoption_risk.factors {
            if factor.value > UNDERPERFORMING_FACTOR_THRESHOLD {
                *counts.entry(factor.name.clone()).or_default() += 1;
            }
        }
        if let Some(primary) = &ranked.primary_diagnosis {
            *counts.entry(primary.title.clone()).or_default() += 1;
        }
    }

    let mut ordered: Vec<(String, usize)> = counts.into_iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ordered
        .into_iter()
        .take(TOP_FACTOR_COUNT)
        .map(|(name, _)| name)
        .collect()
}

/// Assemble a complete audit from scored features.
///
/// Empty input is valid: the result has zero features, zero counts, and a
/// well-formed audit id.
pub fn assemble_audit(
    scored: Vec<ScoredFeature>,
    total_artifacts: usize,
    now: DateTime<Utc>,
) -> Audit {
    let mut ranked: Vec<RankedFeature> = scored
        .into_iter()
        .map(|sf| {
            let combined = combined_risk(sf.score.adoption_risk.score, &sf.diagnoses);
            RankedFeature {
                risk_level: RiskLevel::from_score(combined),
                combined_risk: combined,
                feature: sf.feature,
                score: sf.score,
                diagnoses: sf.diagnoses,
                primary_diagnosis: sf.primary_diagnosis,
                evidence: sf.evidence,
                rank: 0,
            }
        })
        .collect();

    // Descending combined risk; scores within the tie epsilon fall back to
    // severe-diagnosis count, then evidence count, then name so the order is
    // total and reproducible.
    let quantize = |risk: f64| (risk / RANK_TIE_EPSILON).round() as i64;
    ranked.sort_by(|a, b| {
        quantize(b.combined_risk)
            .cmp(&quantize(a.combined_risk))
            .then_with(|| {
                severe_diagnosis_count(&b.diagnoses).cmp(&severe_diagnosis_count(&a.diagnoses))
            })
            .then_with(|| b.evidence.len().cmp(&a.evidence.len()))
            .then_with(|| a.feature.name.cmp(&b.feature.name))
    });
    for (i, feature) in ranked.iter_mut().enumerate() {
        feature.rank = i + 1;
    }

    let total_evidence: usize = ranked.iter().map(|f| f.evidence.len()).sum();
    let by_risk_level = RiskLevelCounts::from_features(&ranked);
    let summary = AuditSummary {
        audit_id: audit_id(ranked.len(), total_evidence, now.date_naive()),
        total_features: ranked.len(),
        by_risk_level,
        top_risk_factors: top_risk_factors(&ranked),
        total_artifacts,
        total_evidence,
        analyzed_at: now,
    };

    info!(
        audit_id = %summary.audit_id,
        features = summary.total_features,
        evidence = summary.total_evidence,
        critical = by_risk_level.critical,
        high = by_risk_level.high,
        "audit assembled"
    );

    Audit {
        summary,
        features: ranked,
    }
}
