//! Feature extraction
//!
//! Runs three independent candidate-mention strategies over one artifact and
//! merges their output into Feature/Evidence pairs:
//!
//! - **headings** — non-generic document headings
//! - **bullets** — bullet and numbered-list items naming a capability
//! - **repetition** — capitalized phrases repeated throughout the body
//!   (disabled for code-like artifacts)
//!
//! Within a strategy, mentions are deduplicated by case-insensitive
//! normalized name keeping the highest-confidence variant. Each surviving
//! mention becomes one Feature (or merges into an existing one) and exactly
//! one Evidence record. Merging across artifacts unions alias and source sets
//! and widens the first/last-seen range; evidence is never dropped.

mod bullets;
mod headings;
mod repetition;

use crate::models::{
    evidence_id, normalize_name, Artifact, Evidence, Feature, SignalType,
};
use rustc_hash::FxHashMap;
use tracing::debug;

/// One candidate feature mention produced by a strategy
#[derive(Debug, Clone)]
pub(crate) struct Mention {
    pub name: String,
    pub excerpt: String,
    pub signal: SignalType,
    pub location: Option<&'static str>,
    pub confidence: f64,
}

/// Features and evidence extracted from one or more artifacts.
///
/// Zero extracted mentions is not an error: the result carries an
/// explanatory note and empty-but-valid lists.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub features: Vec<Feature>,
    pub evidence: Vec<Evidence>,
    pub notes: Vec<String>,
}

/// Deduplicate mentions by case-insensitive normalized name, keeping the
/// highest-confidence variant. First-occurrence order is preserved so output
/// is deterministic.
fn dedup_mentions(mentions: Vec<Mention>) -> Vec<Mention> {
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut kept: Vec<Mention> = Vec::new();

    for mention in mentions {
        let key = normalize_name(&mention.name);
        if key.is_empty() {
            continue;
        }
        match index.get(&key) {
            Some(&i) => {
                if mention.confidence > kept[i].confidence {
                    kept[i] = mention;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(mention);
            }
        }
    }

    kept
}

/// Run all applicable strategies over one artifact.
pub fn extract_from_artifact(artifact: &Artifact) -> ExtractionResult {
    let mut surviving: Vec<Mention> = Vec::new();

    surviving.extend(dedup_mentions(headings::mentions(artifact)));
    surviving.extend(dedup_mentions(bullets::mentions(artifact)));
    if artifact.is_code_like {
        debug!(
            artifact = %artifact.name,
            "repetition strategy disabled: artifact flagged code-like"
        );
    } else {
        surviving.extend(dedup_mentions(repetition::mentions(artifact)));
    }

    let mut result = ExtractionResult::default();
    if surviving.is_empty() {
        result.notes.push(format!(
            "no feature mentions recognized in '{}'; content may be unstructured or too short",
            artifact.name
        ));
        return result;
    }

    let seen = artifact.effective_timestamp();
    let mut feature_index: FxHashMap<String, usize> = FxHashMap::default();

    for mention in surviving {
        let fid = match feature_index.get(&normalize_name(&mention.name)) {
            Some(&i) => {
                result.features[i].absorb_mention(&mention.name, &artifact.id, seen);
                result.features[i].id.clone()
            }
            None => {
                let feature = Feature::new(mention.name.clone(), &artifact.id, seen);
                let fid = feature.id.clone();
                feature_index.insert(normalize_name(&mention.name), result.features.len());
                result.features.push(feature);
                fid
            }
        };

        result.evidence.push(Evidence {
            id: evidence_id(&artifact.id, &fid, mention.signal.as_str(), &mention.excerpt),
            artifact_id: artifact.id.clone(),
            feature_id: fid,
            excerpt: mention.excerpt,
            signal: mention.signal,
            location: mention.location.map(str::to_string),
            timestamp: seen,
            confidence: Some(mention.confidence),
        });
    }

    debug!(
        artifact = %artifact.name,
        features = result.features.len(),
        evidence = result.evidence.len(),
        "extraction complete"
    );

    result
}

/// Merge per-artifact extraction results into one.
///
/// Features with the same identity are absorbed into one record (alias and
/// source-set union, widened seen range); evidence lists concatenate.
pub fn merge_results(results: Vec<ExtractionResult>) -> ExtractionResult {
    let mut merged = ExtractionResult::default();
    let mut feature_index: FxHashMap<String, usize> = FxHashMap::default();

    for result in results {
        for feature in result.features {
            match feature_index.get(&feature.id) {
                Some(&i) => merged.features[i].absorb(&feature),
                None => {
                    feature_index.insert(feature.id.clone(), merged.features.len());
                    merged.features.push(feature);
                }
            }
        }
        merged.evidence.extend(result.evidence);
        merged.notes.extend(result.notes);
    }

    merged
}
