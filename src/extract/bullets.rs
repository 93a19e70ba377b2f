//! Bullet-list extraction strategy
//!
//! Lines using bullet or numbered-list syntax often name capabilities
//! ("- Exports: download any report as CSV"). Long lines and copula lines
//! ("X is ...", description rather than naming) are skipped; the leading
//! phrase before a colon or dash, or a short capitalized clause, becomes the
//! mention name.

use super::Mention;
use crate::models::{Artifact, ArtifactType, SignalType};
use regex::Regex;
use std::sync::OnceLock;

/// Lines longer than this describe rather than name
const MAX_BULLET_LINE_CHARS: usize = 100;
const MAX_PHRASE_WORDS: usize = 6;
const BULLET_CONFIDENCE: f64 = 0.7;

static BULLET_LINE: OnceLock<Regex> = OnceLock::new();
static COPULA: OnceLock<Regex> = OnceLock::new();
static UPDATE_KEYWORDS: OnceLock<Regex> = OnceLock::new();
static DEPRECATION_KEYWORDS: OnceLock<Regex> = OnceLock::new();
static CAPITALIZED_CLAUSE: OnceLock<Regex> = OnceLock::new();

fn bullet_line_regex() -> &'static Regex {
    BULLET_LINE.get_or_init(|| Regex::new(r"^\s*(?:[-*+•]|\d+[.)])\s+(.+)$").expect("valid regex"))
}

fn copula_regex() -> &'static Regex {
    COPULA.get_or_init(|| Regex::new(r"\b(?:is|are)\b").expect("valid regex"))
}

fn update_keywords_regex() -> &'static Regex {
    UPDATE_KEYWORDS
        .get_or_init(|| Regex::new(r"(?i)\b(?:new|added|introduc\w*|launch\w*)\b").expect("valid regex"))
}

fn deprecation_keywords_regex() -> &'static Regex {
    DEPRECATION_KEYWORDS.get_or_init(|| {
        Regex::new(r"(?i)\b(?:deprecat\w*|removed|removal|sunset\w*|discontinu\w*)\b")
            .expect("valid regex")
    })
}

fn capitalized_clause_regex() -> &'static Regex {
    // Leading run of capitalized words, allowing short connectives inside
    CAPITALIZED_CLAUSE.get_or_init(|| {
        Regex::new(r"^([A-Z][\w'&-]*(?:\s+(?:[A-Z][\w'&-]*|of|for|and|the))*)")
            .expect("valid regex")
    })
}

/// Infer the signal type for a bullet mention from keyword context, falling
/// back to the artifact type.
fn infer_signal(text: &str, artifact_type: ArtifactType) -> SignalType {
    if deprecation_keywords_regex().is_match(text) {
        SignalType::Deprecation
    } else if update_keywords_regex().is_match(text) {
        SignalType::Update
    } else {
        match artifact_type {
            ArtifactType::ReleaseNotes => SignalType::ReleaseNote,
            ArtifactType::Faq | ArtifactType::Support => SignalType::Faq,
            ArtifactType::Onboarding => SignalType::Onboarding,
            ArtifactType::Marketing => SignalType::Visibility,
            ArtifactType::Documentation | ArtifactType::Unknown => SignalType::Documentation,
        }
    }
}

/// Validate a candidate phrase: short, real words, carries letters.
fn accept_phrase(candidate: &str) -> Option<String> {
    let candidate = candidate.trim().trim_end_matches(['.', ',', ';']);
    let word_count = candidate.split_whitespace().count();
    if candidate.len() < 3
        || word_count == 0
        || word_count > MAX_PHRASE_WORDS
        || !candidate.chars().any(|c| c.is_alphabetic())
    {
        return None;
    }
    Some(candidate.to_string())
}

/// Leading capitalized clause of a text, if any ("Team Spaces let you..."
/// names "Team Spaces"). Trailing connectives are not part of the name.
fn capitalized_clause(text: &str) -> Option<String> {
    let matched = capitalized_clause_regex().captures(text)?.get(1)?;
    let mut words: Vec<&str> = matched.as_str().split_whitespace().collect();
    while matches!(words.last(), Some(&"of" | &"for" | &"and" | &"the")) {
        words.pop();
    }
    accept_phrase(&words.join(" "))
}

/// Pull the feature-naming phrase out of a bullet body.
fn extract_name(body: &str) -> Option<String> {
    if let Some(idx) = body.find(':') {
        let before = body[..idx].trim();
        let after = body[idx + 1..].trim();
        // "Added: Bulk Invite" names the thing after the colon, not "Added"
        if update_keywords_regex().is_match(before) || deprecation_keywords_regex().is_match(before)
        {
            return capitalized_clause(after).or_else(|| accept_phrase(after));
        }
        return accept_phrase(before);
    }

    if let Some(idx) = body
        .find(" - ")
        .or_else(|| body.find(" – "))
        .or_else(|| body.find(" — "))
    {
        return accept_phrase(&body[..idx]);
    }

    capitalized_clause(body)
}

pub(super) fn mentions(artifact: &Artifact) -> Vec<Mention> {
    let mut out = Vec::new();

    for line in artifact.normalized_content.lines() {
        let Some(caps) = bullet_line_regex().captures(line) else {
            continue;
        };
        let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if body.len() > MAX_BULLET_LINE_CHARS {
            continue;
        }
        if copula_regex().is_match(body) {
            continue;
        }
        let Some(name) = extract_name(body) else {
            continue;
        };

        out.push(Mention {
            name,
            excerpt: line.trim().to_string(),
            signal: infer_signal(body, artifact.artifact_type),
            location: Some("bullet"),
            confidence: BULLET_CONFIDENCE,
        });
    }

    out
}
