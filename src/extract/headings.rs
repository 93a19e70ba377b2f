//! Heading extraction strategy
//!
//! Every non-generic heading with at most six words becomes a feature
//! mention. Structural headings ("Overview", "FAQ", ...) carry no feature
//! signal and are filtered against a fixed stoplist.

use super::Mention;
use crate::models::{Artifact, SignalType};

/// Structural headings that never name a product feature
const GENERIC_HEADINGS: &[&str] = &[
    "overview",
    "introduction",
    "getting started",
    "quick start",
    "faq",
    "frequently asked questions",
    "table of contents",
    "contents",
    "summary",
    "conclusion",
    "references",
    "see also",
    "changelog",
    "release notes",
    "what's new",
    "about",
    "support",
    "contact",
    "contact us",
    "installation",
    "requirements",
    "prerequisites",
    "usage",
    "examples",
    "license",
    "appendix",
    "troubleshooting",
    "known issues",
    "notes",
    "miscellaneous",
    "other",
];

const MAX_HEADING_WORDS: usize = 6;
const HEADING_CONFIDENCE: f64 = 0.85;

pub(super) fn mentions(artifact: &Artifact) -> Vec<Mention> {
    artifact
        .headings
        .iter()
        .filter(|heading| {
            let lower = heading.trim().to_lowercase();
            !lower.is_empty()
                && !GENERIC_HEADINGS.contains(&lower.as_str())
                && heading.split_whitespace().count() <= MAX_HEADING_WORDS
        })
        .map(|heading| Mention {
            name: heading.trim().to_string(),
            excerpt: heading.trim().to_string(),
            signal: SignalType::Documentation,
            location: Some("heading"),
            confidence: HEADING_CONFIDENCE,
        })
        .collect()
}
