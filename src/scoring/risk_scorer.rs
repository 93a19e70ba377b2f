//! Per-feature risk scorer
//!
//! Pure functions from (feature, evidence, context) to factor breakdowns.

use crate::config::ScoringConfig;
use crate::models::{
    Evidence, Feature, FeatureScore, ScoreBreakdown, ScoreFactor, SignalType,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Weight of linear staleness decay inside the recency sub-score
const STALENESS_DECAY_WEIGHT: f64 = 0.6;
/// Weight of the actively-maintained signal inside the recency sub-score
const ACTIVELY_MAINTAINED_WEIGHT: f64 = 0.4;
/// Mention span beyond which a feature counts as maintained over time (days)
const MAINTAINED_SPAN_DAYS: i64 = 30;
/// Most recent mention must be younger than this to count as active (days)
const MAINTAINED_RECENT_DAYS: i64 = 90;

const ONBOARDING_WEIGHT: f64 = 0.35;
const COVERAGE_WEIGHT: f64 = 0.3;
const PROMINENCE_WEIGHT: f64 = 0.2;
/// Features never mentioned in a heading still get this prominence floor
const PROMINENCE_FLOOR: f64 = 0.3;
const DOCUMENTATION_WEIGHT: f64 = 0.15;

const MENTION_VOLUME_WEIGHT: f64 = 0.5;
/// Evidence count at which the mention-volume factor saturates
const MENTION_SATURATION: f64 = 5.0;
const DIVERSITY_WEIGHT: f64 = 0.3;
/// Distinct signal types at which the diversity factor saturates
const DIVERSITY_SATURATION: f64 = 3.0;
const CONFIDENCE_WEIGHT: f64 = 0.2;

/// Inputs shared by every feature scored in one audit run.
///
/// `now` is captured once per audit so staleness is consistent across all
/// features; `total_artifacts` feeds the cross-artifact coverage ratio.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub config: &'a ScoringConfig,
    pub now: DateTime<Utc>,
    pub total_artifacts: usize,
}

/// Score one feature against its evidence.
pub fn score_feature(feature: &Feature, evidence: &[Evidence], ctx: &ScoringContext) -> FeatureScore {
    let recency = recency_breakdown(feature, ctx);
    let visibility = visibility_breakdown(feature, evidence, ctx);
    let density = density_breakdown(evidence);
    let adoption_risk = adoption_risk_breakdown(&recency, &visibility, &density, ctx.config);

    debug!(
        feature = %feature.name,
        recency = recency.score,
        visibility = visibility.score,
        density = density.score,
        risk = adoption_risk.score,
        "scored feature"
    );

    FeatureScore {
        feature_id: feature.id.clone(),
        recency,
        visibility,
        density,
        adoption_risk,
    }
}

/// How recently and steadily the feature has been mentioned.
fn recency_breakdown(feature: &Feature, ctx: &ScoringContext) -> ScoreBreakdown {
    let window = ctx.config.staleness_window_days.max(1);
    let days_since_last = (ctx.now - feature.last_seen).num_days().max(0);
    let decay = (1.0 - days_since_last as f64 / window as f64).max(0.0);

    let span_days = (feature.last_seen - feature.first_seen).num_days();
    let maintained = span_days > MAINTAINED_SPAN_DAYS && days_since_last < MAINTAINED_RECENT_DAYS;
    let maintained_value = if maintained { 1.0 } else { 0.0 };

    let factors = vec![
        ScoreFactor::new(
            "staleness_decay",
            decay,
            STALENESS_DECAY_WEIGHT,
            format!(
                "last mentioned {days_since_last} days ago against a {window}-day staleness window"
            ),
        ),
        ScoreFactor::new(
            "actively_maintained",
            maintained_value,
            ACTIVELY_MAINTAINED_WEIGHT,
            if maintained {
                format!("mention span of {span_days} days with a recent mention")
            } else {
                format!(
                    "mention span of {span_days} days; needs >{MAINTAINED_SPAN_DAYS} days of history and a mention in the last {MAINTAINED_RECENT_DAYS} days"
                )
            },
        ),
    ];

    let explanation = if days_since_last == 0 {
        "mentioned today".to_string()
    } else {
        format!("most recent mention is {days_since_last} days old")
    };
    ScoreBreakdown::from_factors(factors, explanation)
}

/// How discoverable the feature is across the documentation set.
fn visibility_breakdown(
    feature: &Feature,
    evidence: &[Evidence],
    ctx: &ScoringContext,
) -> ScoreBreakdown {
    let has_onboarding = evidence.iter().any(|e| e.signal == SignalType::Onboarding);
    let has_documentation = evidence.iter().any(|e| e.signal == SignalType::Documentation);
    let has_heading = evidence
        .iter()
        .any(|e| e.location.as_deref() == Some("heading"));

    let coverage = if ctx.total_artifacts == 0 {
        0.0
    } else {
        (feature.source_artifacts.len() as f64 / ctx.total_artifacts as f64).min(1.0)
    };

    let factors = vec![
        ScoreFactor::new(
            "onboarding_signal",
            if has_onboarding { 1.0 } else { 0.0 },
            ONBOARDING_WEIGHT,
            if has_onboarding {
                "appears in onboarding material".to_string()
            } else {
                "never appears in onboarding material".to_string()
            },
        ),
        ScoreFactor::new(
            "cross_artifact_coverage",
            coverage,
            COVERAGE_WEIGHT,
            format!(
                "mentioned in {} of {} artifacts",
                feature.source_artifacts.len(),
                ctx.total_artifacts
            ),
        ),
        ScoreFactor::new(
            "heading_prominence",
            if has_heading { 1.0 } else { PROMINENCE_FLOOR },
            PROMINENCE_WEIGHT,
            if has_heading {
                "named in at least one heading".to_string()
            } else {
                "never named in a heading".to_string()
            },
        ),
        ScoreFactor::new(
            "documentation_signal",
            if has_documentation { 1.0 } else { 0.0 },
            DOCUMENTATION_WEIGHT,
            if has_documentation {
                "has dedicated documentation".to_string()
            } else {
                "no dedicated documentation signal".to_string()
            },
        ),
    ];

    let explanation = format!(
        "visible in {} of {} artifacts",
        feature.source_artifacts.len(),
        ctx.total_artifacts
    );
    ScoreBreakdown::from_factors(factors, explanation)
}

/// How much documentation mass backs the feature.
fn density_breakdown(evidence: &[Evidence]) -> ScoreBreakdown {
    let volume = (evidence.len() as f64 / MENTION_SATURATION).min(1.0);

    let mut signals: Vec<SignalType> = evidence.iter().map(|e| e.signal).collect();
    signals.sort_by_key(|s| s.as_str());
    signals.dedup();
    let diversity = (signals.len() as f64 / DIVERSITY_SATURATION).min(1.0);

    let confidences: Vec<f64> = evidence.iter().filter_map(|e| e.confidence).collect();
    let mean_confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    let factors = vec![
        ScoreFactor::new(
            "mention_volume",
            volume,
            MENTION_VOLUME_WEIGHT,
            format!("{} evidence records (saturates at {MENTION_SATURATION})", evidence.len()),
        ),
        ScoreFactor::new(
            "signal_diversity",
            diversity,
            DIVERSITY_WEIGHT,
            format!(
                "{} distinct signal types (saturates at {DIVERSITY_SATURATION})",
                signals.len()
            ),
        ),
        ScoreFactor::new(
            "extraction_confidence",
            mean_confidence,
            CONFIDENCE_WEIGHT,
            format!("mean extraction confidence {mean_confidence:.2}"),
        ),
    ];

    let explanation = format!("{} evidence records across {} signal types", evidence.len(), signals.len());
    ScoreBreakdown::from_factors(factors, explanation)
}

/// Invert and combine the three sub-scores into adoption risk.
fn adoption_risk_breakdown(
    recency: &ScoreBreakdown,
    visibility: &ScoreBreakdown,
    density: &ScoreBreakdown,
    config: &ScoringConfig,
) -> ScoreBreakdown {
    let factors = vec![
        ScoreFactor::new(
            "recency_gap",
            1.0 - recency.score,
            config.recency_weight,
            format!("recency sub-score {:.2}", recency.score),
        ),
        ScoreFactor::new(
            "visibility_gap",
            1.0 - visibility.score,
            config.visibility_weight,
            format!("visibility sub-score {:.2}", visibility.score),
        ),
        ScoreFactor::new(
            "density_gap",
            1.0 - density.score,
            config.density_weight,
            format!("density sub-score {:.2}", density.score),
        ),
    ];

    let total: f64 = factors.iter().map(|f| f.contribution).sum::<f64>().clamp(0.0, 1.0);
    let explanation = if total > 0.7 {
        "high adoption risk: stale, hard to find, or thinly documented".to_string()
    } else if total > 0.4 {
        "moderate adoption risk: at least one weak signal worth attention".to_string()
    } else {
        "low adoption risk: fresh, visible, and well documented".to_string()
    };

    ScoreBreakdown::from_factors(factors, explanation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{evidence_id, Feature};
    use chrono::{Duration, TimeZone};

    fn test_config() -> ScoringConfig {
        ScoringConfig::default()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn make_feature(days_ago_first: i64, days_ago_last: i64) -> Feature {
        let mut feature = Feature::new("Dashboard", "ART-a", now() - Duration::days(days_ago_first));
        feature.absorb_mention("Dashboard", "ART-a", now() - Duration::days(days_ago_last));
        feature
    }

    fn make_evidence(feature: &Feature, signal: SignalType, location: Option<&str>, confidence: f64) -> Evidence {
        Evidence {
            id: evidence_id("ART-a", &feature.id, signal.as_str(), "excerpt"),
            artifact_id: "ART-a".to_string(),
            feature_id: feature.id.clone(),
            excerpt: "excerpt".to_string(),
            signal,
            location: location.map(str::to_string),
            timestamp: now(),
            confidence: Some(confidence),
        }
    }

    #[test]
    fn test_fresh_maintained_feature_scores_high_recency() {
        let config = test_config();
        let ctx = ScoringContext { config: &config, now: now(), total_artifacts: 1 };
        let feature = make_feature(120, 10);

        let breakdown = recency_breakdown(&feature, &ctx);
        // decay = 1 - 10/180 ≈ 0.944; maintained fires (span 110 > 30, last 10 < 90)
        assert!(breakdown.score > 0.9, "score = {}", breakdown.score);
        let sum: f64 = breakdown.factors.iter().map(|f| f.contribution).sum();
        assert!((breakdown.score - sum).abs() < 1e-9);
    }

    #[test]
    fn test_stale_feature_scores_zero_recency() {
        let config = test_config();
        let ctx = ScoringContext { config: &config, now: now(), total_artifacts: 1 };
        let feature = make_feature(500, 400);

        let breakdown = recency_breakdown(&feature, &ctx);
        assert_eq!(breakdown.score, 0.0);
    }

    #[test]
    fn test_visibility_floor_without_heading() {
        let config = test_config();
        let ctx = ScoringContext { config: &config, now: now(), total_artifacts: 2 };
        let feature = make_feature(10, 10);
        let evidence = vec![make_evidence(&feature, SignalType::ReleaseNote, Some("bullet"), 0.7)];

        let breakdown = visibility_breakdown(&feature, &evidence, &ctx);
        let prominence = breakdown
            .factors
            .iter()
            .find(|f| f.name == "heading_prominence")
            .expect("prominence factor");
        assert_eq!(prominence.value, 0.3);
    }

    #[test]
    fn test_density_saturation() {
        let feature = make_feature(10, 10);
        let evidence: Vec<Evidence> = (0..8)
            .map(|_| make_evidence(&feature, SignalType::Documentation, None, 0.8))
            .collect();

        let breakdown = density_breakdown(&evidence);
        let volume = breakdown
            .factors
            .iter()
            .find(|f| f.name == "mention_volume")
            .expect("volume factor");
        assert_eq!(volume.value, 1.0);
    }

    #[test]
    fn test_density_empty_evidence() {
        let breakdown = density_breakdown(&[]);
        assert_eq!(breakdown.score, 0.0);
    }

    #[test]
    fn test_adoption_risk_inversion_and_clamp() {
        let config = test_config();
        let ctx = ScoringContext { config: &config, now: now(), total_artifacts: 1 };
        let feature = make_feature(500, 400);

        let score = score_feature(&feature, &[], &ctx);
        // Everything weak: risk should be high and within bounds
        assert!(score.adoption_risk.score > 0.7, "risk = {}", score.adoption_risk.score);
        assert!(score.adoption_risk.score <= 1.0);
        assert!(score.adoption_risk.explanation.contains("high"));
    }

    #[test]
    fn test_risk_factors_sum_to_score() {
        let config = test_config();
        let ctx = ScoringContext { config: &config, now: now(), total_artifacts: 3 };
        let feature = make_feature(60, 5);
        let evidence = vec![
            make_evidence(&feature, SignalType::Documentation, Some("heading"), 0.85),
            make_evidence(&feature, SignalType::Update, Some("bullet"), 0.7),
        ];

        let score = score_feature(&feature, &evidence, &ctx);
        for breakdown in [
            &score.recency,
            &score.visibility,
            &score.density,
            &score.adoption_risk,
        ] {
            let sum: f64 = breakdown.factors.iter().map(|f| f.contribution).sum();
            assert!(
                (breakdown.score - sum.clamp(0.0, 1.0)).abs() < 1e-9,
                "{} != {}",
                breakdown.score,
                sum
            );
            assert!((0.0..=1.0).contains(&breakdown.score));
        }
    }

    #[test]
    fn test_determinism() {
        let config = test_config();
        let ctx = ScoringContext { config: &config, now: now(), total_artifacts: 2 };
        let feature = make_feature(45, 3);
        let evidence = vec![make_evidence(&feature, SignalType::Faq, None, 0.7)];

        let a = score_feature(&feature, &evidence, &ctx);
        let b = score_feature(&feature, &evidence, &ctx);
        assert_eq!(a.adoption_risk.score, b.adoption_risk.score);
        assert_eq!(a.recency.score, b.recency.score);
    }
}
