//! Analysis pipeline
//!
//! Orchestrates the full audit over a set of ingested artifacts:
//! 1. Extract feature mentions from every artifact (parallel, per artifact)
//! 2. Merge extraction results across artifacts
//! 3. Score every feature against the audit-wide evidence
//! 4. Diagnose every feature through the rule table
//! 5. Rank and assemble the audit
//!
//! Every stage is a pure function; the only shared inputs are the scoring
//! config and a single "now" captured at the start of the run so all recency
//! math inside one audit agrees.

use crate::audit::{assemble_audit, ScoredFeature};
use crate::config::ScoringConfig;
use crate::diagnose::{diagnose, primary_diagnosis};
use crate::extract::{extract_from_artifact, merge_results, ExtractionResult};
use crate::models::{Artifact, Audit, Evidence};
use crate::scoring::{score_feature, ScoringContext};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

/// Run one complete audit over an artifact set.
///
/// Zero artifacts, or artifacts yielding zero features, produce a valid
/// empty audit rather than an error.
pub fn run_audit(artifacts: &[Artifact], config: &ScoringConfig, now: DateTime<Utc>) -> Audit {
    info!(artifacts = artifacts.len(), "starting audit");

    // Extraction is embarrassingly parallel across artifacts
    let per_artifact: Vec<ExtractionResult> = artifacts
        .par_iter()
        .map(extract_from_artifact)
        .collect();
    let merged = merge_results(per_artifact);

    for note in &merged.notes {
        debug!("extraction note: {note}");
    }

    // Scorer and diagnoser see audit-wide evidence per feature
    let mut evidence_by_feature: FxHashMap<String, Vec<Evidence>> = FxHashMap::default();
    for evidence in &merged.evidence {
        evidence_by_feature
            .entry(evidence.feature_id.clone())
            .or_default()
            .push(evidence.clone());
    }

    let ctx = ScoringContext {
        config,
        now,
        total_artifacts: artifacts.len(),
    };

    let scored: Vec<ScoredFeature> = merged
        .features
        .iter()
        .map(|feature| {
            let evidence = evidence_by_feature
                .remove(feature.id.as_str())
                .unwrap_or_default();
            let score = score_feature(feature, &evidence, &ctx);
            let diagnoses = diagnose(feature, &score, &evidence, now);
            ScoredFeature {
                primary_diagnosis: primary_diagnosis(&diagnoses),
                feature: feature.clone(),
                score,
                diagnoses,
                evidence,
            }
        })
        .collect();

    assemble_audit(scored, artifacts.len(), now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest_text;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn artifact(name: &str, content: &str) -> Artifact {
        ingest_text(name, content, now()).expect("ingest").artifact
    }

    #[test]
    fn test_empty_artifact_set_yields_empty_audit() {
        let audit = run_audit(&[], &ScoringConfig::default(), now());
        assert_eq!(audit.summary.total_features, 0);
        assert_eq!(audit.summary.total_artifacts, 0);
        assert!(audit.features.is_empty());
    }

    #[test]
    fn test_audit_over_real_documents() {
        let docs = vec![
            artifact(
                "release-notes.md",
                "# Release Notes\n\nReleased 2024-05-20\n\n\
                 - Added: Workflow Builder for automation\n\
                 - Exports: scheduled delivery now available\n\
                 - Deprecated: Legacy Importer will go away soon",
            ),
            artifact(
                "guide.md",
                "# Workflow Builder\n\nThe Workflow Builder chains steps into automations. \
                 Use Workflow Builder templates to start quickly.\n\n\
                 Updated 2024-05-25",
            ),
        ];

        let audit = run_audit(&docs, &ScoringConfig::default(), now());

        assert!(audit.summary.total_features > 0);
        assert_eq!(
            audit.summary.by_risk_level.total(),
            audit.summary.total_features
        );
        assert_eq!(audit.summary.total_artifacts, 2);

        // Workflow Builder appears in both documents
        let builder = audit
            .features
            .iter()
            .find(|f| f.feature.name == "Workflow Builder")
            .expect("Workflow Builder feature");
        assert_eq!(builder.feature.source_artifacts.len(), 2);
        assert!(builder.evidence.len() >= 2);

        // Ranks are 1-based and contiguous
        for (i, feature) in audit.features.iter().enumerate() {
            assert_eq!(feature.rank, i + 1);
        }
    }

    #[test]
    fn test_audit_is_deterministic() {
        let docs = vec![artifact(
            "notes.md",
            "# Smart Alerts\n\n- Added: Smart Alerts for thresholds\n\n\
             Configure Smart Alerts per channel. You can snooze Smart Alerts too.",
        )];

        let a = run_audit(&docs, &ScoringConfig::default(), now());
        let b = run_audit(&docs, &ScoringConfig::default(), now());

        assert_eq!(a.summary.audit_id, b.summary.audit_id);
        assert_eq!(a.features.len(), b.features.len());
        for (fa, fb) in a.features.iter().zip(b.features.iter()) {
            assert_eq!(fa.feature.name, fb.feature.name);
            assert_eq!(fa.combined_risk, fb.combined_risk);
            assert_eq!(fa.rank, fb.rank);
        }

        let ja = serde_json::to_string(&a).expect("serialize");
        let jb = serde_json::to_string(&b).expect("serialize");
        assert_eq!(ja, jb);
    }
}
