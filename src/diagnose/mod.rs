//! Rule-based diagnosis
//!
//! A fixed, ordered table of rules is evaluated against each feature's score
//! and evidence. Every rule whose predicate passes and whose computed
//! confidence clears the floor yields a typed diagnosis; "healthy" is
//! suppressed as soon as any non-healthy diagnosis is present. When no rule
//! fires but adoption risk is elevated, a generic moderate-risk diagnosis is
//! synthesized so downstream consumers never see a silent gap.
//!
//! The table is plain data — uniform records holding function pointers — so
//! adding a rule is appending a row, not growing a class hierarchy.

use crate::models::{
    diagnosis_id, Diagnosis, DiagnosisType, Evidence, Feature, FeatureScore, Severity, SignalType,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Diagnoses below this confidence are dropped
const MIN_RULE_CONFIDENCE: f64 = 0.3;
/// Cap on evidence records attached to one diagnosis
const MAX_SUPPORTING_EVIDENCE: usize = 3;
/// Adoption risk above which a silent feature still gets a generic diagnosis
const FALLBACK_RISK_THRESHOLD: f64 = 0.4;
const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Everything a rule may inspect for one feature
pub struct RuleContext<'a> {
    pub feature: &'a Feature,
    pub score: &'a FeatureScore,
    pub evidence: &'a [Evidence],
    pub now: DateTime<Utc>,
}

impl RuleContext<'_> {
    fn recency(&self) -> f64 {
        self.score.recency.score
    }
    fn visibility(&self) -> f64 {
        self.score.visibility.score
    }
    fn density(&self) -> f64 {
        self.score.density.score
    }
    fn risk(&self) -> f64 {
        self.score.adoption_risk.score
    }
    fn deprecation_count(&self) -> usize {
        self.evidence
            .iter()
            .filter(|e| e.signal == SignalType::Deprecation)
            .count()
    }
    fn has_heading_evidence(&self) -> bool {
        self.evidence
            .iter()
            .any(|e| e.location.as_deref() == Some("heading"))
    }
    fn has_onboarding_evidence(&self) -> bool {
        self.evidence.iter().any(|e| e.signal == SignalType::Onboarding)
    }
}

/// One row of the diagnosis rule table
struct DiagnosisRule {
    diagnosis_type: DiagnosisType,
    title: &'static str,
    predicate: fn(&RuleContext) -> bool,
    severity: fn(&RuleContext) -> Severity,
    confidence: fn(&RuleContext) -> f64,
    explanation: fn(&RuleContext) -> String,
    signals: fn(&RuleContext) -> Vec<String>,
}

/// The fixed rule table, in evaluation order. "healthy" must stay last so
/// suppression by earlier rules is a simple scan.
static RULES: &[DiagnosisRule] = &[
    DiagnosisRule {
        diagnosis_type: DiagnosisType::DormantButDocumented,
        title: "Dormant but documented",
        predicate: |ctx| !ctx.evidence.is_empty() && ctx.density() >= 0.5 && ctx.recency() <= 0.3,
        severity: |ctx| {
            if ctx.risk() > 0.7 {
                Severity::High
            } else {
                Severity::Medium
            }
        },
        confidence: |ctx| (0.45 + (ctx.density() - ctx.recency()) * 0.5).clamp(0.0, 0.95),
        explanation: |ctx| {
            format!(
                "'{}' has substantial documentation (density {:.2}) but no recent mentions (recency {:.2}); the docs may be describing something users stopped hearing about",
                ctx.feature.name,
                ctx.density(),
                ctx.recency()
            )
        },
        signals: |ctx| {
            vec![
                format!("documentation density {:.2}", ctx.density()),
                format!("recency {:.2}", ctx.recency()),
            ]
        },
    },
    DiagnosisRule {
        diagnosis_type: DiagnosisType::LikelyInvisible,
        title: "Likely invisible to users",
        predicate: |ctx| !ctx.evidence.is_empty() && ctx.visibility() <= 0.3 && ctx.recency() >= 0.4,
        severity: |ctx| {
            if ctx.visibility() <= 0.15 {
                Severity::High
            } else {
                Severity::Medium
            }
        },
        confidence: |ctx| (0.4 + (0.3 - ctx.visibility()) * 2.0).clamp(0.0, 0.9),
        explanation: |ctx| {
            format!(
                "'{}' is still being mentioned but is hard to discover (visibility {:.2}): no onboarding presence and little cross-document coverage",
                ctx.feature.name,
                ctx.visibility()
            )
        },
        signals: |ctx| {
            vec![
                format!("visibility {:.2}", ctx.visibility()),
                format!(
                    "mentioned in {} artifact(s)",
                    ctx.feature.source_artifacts.len()
                ),
            ]
        },
    },
    DiagnosisRule {
        diagnosis_type: DiagnosisType::OverReferencedButStale,
        title: "Over-referenced but stale",
        predicate: |ctx| ctx.evidence.len() >= 5 && ctx.recency() <= 0.4,
        severity: |_| Severity::High,
        confidence: |ctx| (0.4 + 0.05 * ctx.evidence.len() as f64).min(0.85),
        explanation: |ctx| {
            format!(
                "'{}' is referenced {} times across the documentation yet nothing recent mentions it; heavy references to a stale capability confuse new users",
                ctx.feature.name,
                ctx.evidence.len()
            )
        },
        signals: |ctx| {
            vec![
                format!("{} evidence records", ctx.evidence.len()),
                format!("recency {:.2}", ctx.recency()),
            ]
        },
    },
    DiagnosisRule {
        diagnosis_type: DiagnosisType::DeprecatedCandidate,
        title: "Deprecation candidate",
        predicate: |ctx| ctx.deprecation_count() > 0,
        severity: |ctx| {
            if ctx.deprecation_count() >= 2 {
                Severity::Critical
            } else {
                Severity::High
            }
        },
        confidence: |ctx| (0.6 + 0.15 * (ctx.deprecation_count() as f64 - 1.0)).clamp(0.3, 0.9),
        explanation: |ctx| {
            format!(
                "'{}' carries {} deprecation signal(s); users who adopt it now will be migrating soon",
                ctx.feature.name,
                ctx.deprecation_count()
            )
        },
        signals: |ctx| vec![format!("{} deprecation mention(s)", ctx.deprecation_count())],
    },
    DiagnosisRule {
        diagnosis_type: DiagnosisType::Undiscoverable,
        title: "Undiscoverable",
        predicate: |ctx| {
            !ctx.evidence.is_empty()
                && ctx.visibility() <= 0.2
                && !ctx.has_heading_evidence()
                && !ctx.has_onboarding_evidence()
        },
        severity: |_| Severity::High,
        confidence: |_| 0.7,
        explanation: |ctx| {
            format!(
                "'{}' never appears in a heading or onboarding flow; a user would have to already know it exists to find it",
                ctx.feature.name
            )
        },
        signals: |ctx| {
            vec![
                "no heading mentions".to_string(),
                "no onboarding mentions".to_string(),
                format!("visibility {:.2}", ctx.visibility()),
            ]
        },
    },
    DiagnosisRule {
        diagnosis_type: DiagnosisType::Healthy,
        title: "Healthy",
        predicate: |ctx| !ctx.evidence.is_empty() && ctx.risk() < 0.35,
        severity: |_| Severity::Low,
        confidence: |_| 0.8,
        explanation: |ctx| {
            format!(
                "'{}' is fresh, discoverable, and well documented (risk {:.2})",
                ctx.feature.name,
                ctx.risk()
            )
        },
        signals: |ctx| vec![format!("adoption risk {:.2}", ctx.risk())],
    },
];

/// Pick the evidence records cited by a diagnosis: deprecation diagnoses cite
/// their deprecation mentions, everything else cites the highest-confidence
/// excerpts.
fn supporting_evidence(ctx: &RuleContext, diagnosis_type: DiagnosisType) -> Vec<Evidence> {
    let mut candidates: Vec<&Evidence> = match diagnosis_type {
        DiagnosisType::DeprecatedCandidate => ctx
            .evidence
            .iter()
            .filter(|e| e.signal == SignalType::Deprecation)
            .collect(),
        _ => ctx.evidence.iter().collect(),
    };
    candidates.sort_by(|a, b| {
        b.confidence
            .unwrap_or(0.0)
            .partial_cmp(&a.confidence.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    candidates
        .into_iter()
        .take(MAX_SUPPORTING_EVIDENCE)
        .cloned()
        .collect()
}

/// Evaluate the rule table for one feature.
pub fn diagnose(
    feature: &Feature,
    score: &FeatureScore,
    evidence: &[Evidence],
    now: DateTime<Utc>,
) -> Vec<Diagnosis> {
    let ctx = RuleContext {
        feature,
        score,
        evidence,
        now,
    };

    let mut diagnoses: Vec<Diagnosis> = Vec::new();
    for rule in RULES {
        if !(rule.predicate)(&ctx) {
            continue;
        }
        let confidence = (rule.confidence)(&ctx);
        if confidence < MIN_RULE_CONFIDENCE {
            continue;
        }
        // Healthy never coexists with a real problem
        if rule.diagnosis_type == DiagnosisType::Healthy && !diagnoses.is_empty() {
            continue;
        }
        diagnoses.push(Diagnosis {
            id: diagnosis_id(&feature.id, rule.diagnosis_type.as_str()),
            feature_id: feature.id.clone(),
            diagnosis_type: rule.diagnosis_type,
            title: rule.title.to_string(),
            explanation: (rule.explanation)(&ctx),
            severity: (rule.severity)(&ctx),
            confidence,
            signals: (rule.signals)(&ctx),
            supporting_evidence: supporting_evidence(&ctx, rule.diagnosis_type),
            generated_at: now,
        });
    }

    if diagnoses.is_empty() && ctx.risk() > FALLBACK_RISK_THRESHOLD {
        diagnoses.push(Diagnosis {
            id: diagnosis_id(&feature.id, DiagnosisType::ModerateRisk.as_str()),
            feature_id: feature.id.clone(),
            diagnosis_type: DiagnosisType::ModerateRisk,
            title: "Moderate adoption risk".to_string(),
            explanation: format!(
                "'{}' scores {:.2} adoption risk without matching a specific pattern; worth a look",
                feature.name,
                ctx.risk()
            ),
            severity: Severity::Medium,
            confidence: FALLBACK_CONFIDENCE,
            signals: vec![format!("adoption risk {:.2}", ctx.risk())],
            supporting_evidence: supporting_evidence(&ctx, DiagnosisType::ModerateRisk),
            generated_at: now,
        });
    }

    debug!(
        feature = %feature.name,
        diagnoses = diagnoses.len(),
        "diagnosis complete"
    );

    diagnoses
}

/// Select the primary diagnosis: highest severity, tie-broken by confidence.
pub fn primary_diagnosis(diagnoses: &[Diagnosis]) -> Option<Diagnosis> {
    diagnoses
        .iter()
        .max_by(|a, b| {
            a.severity.cmp(&b.severity).then(
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
        })
        .cloned()
}
