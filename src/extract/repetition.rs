//! Repeated-phrase extraction strategy
//!
//! A capitalized phrase that keeps coming back ("the Dashboard", "open the
//! Dashboard", "Dashboard filters") usually names a real capability. Phrases
//! of one to four capitalized words occurring at least three times become
//! mentions, at a confidence that grows with the repeat count.
//!
//! Disabled entirely for code-like artifacts: identifiers repeat constantly
//! in code and would drown real features. Individual occurrences flanked by
//! code syntax on both sides are skipped for the same reason.

use super::Mention;
use crate::models::{Artifact, SignalType};
use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

const MIN_OCCURRENCES: usize = 3;
const MAX_EXCERPT_WINDOWS: usize = 3;
/// Half-width of the excerpt window captured around an occurrence
const EXCERPT_RADIUS: usize = 40;

/// Common words that start sentences and never name features on their own
const COMMON_WORDS: &[&str] = &[
    "the", "this", "that", "these", "those", "a", "an", "it", "its", "we", "you", "your", "our",
    "they", "their", "he", "she", "if", "when", "then", "while", "and", "but", "or", "nor", "for",
    "with", "from", "into", "onto", "how", "what", "why", "where", "who", "which", "not", "all",
    "any", "also", "as", "at", "by", "in", "on", "to", "of", "is", "are", "was", "were", "be",
    "been", "can", "could", "will", "would", "may", "might", "should", "must", "do", "does",
    "please", "note", "see", "use", "using", "click", "open", "here", "more", "learn", "get",
    "set", "each", "per", "now", "yes", "no", "first", "next", "last", "before", "after",
];

/// Legal and code boilerplate phrases that repeat without naming features
const BOILERPLATE_TERMS: &[&str] = &[
    "copyright",
    "all rights reserved",
    "terms of service",
    "terms of use",
    "privacy policy",
    "cookie policy",
    "end user license agreement",
    "inc",
    "llc",
    "ltd",
    "corp",
    "gmbh",
    "license",
    "licensed",
    "trademark",
    "null",
    "undefined",
    "true",
    "false",
    "todo",
    "fixme",
    "readme",
    "note",
    "warning",
    "error",
];

/// Characters that read as code syntax when flanking a phrase
const CODE_FLANK_CHARS: &[char] = &[
    '{', '}', '(', ')', '[', ']', '<', '>', '=', ';', ':', '`', '"', '\'', '.', '_', '/', '\\',
    '$', '#',
];

static CAPITALIZED_PHRASE: OnceLock<Regex> = OnceLock::new();

fn capitalized_phrase_regex() -> &'static Regex {
    // 1-4 capitalized words
    CAPITALIZED_PHRASE.get_or_init(|| {
        Regex::new(r"\b[A-Z][A-Za-z0-9'&-]*(?: [A-Z][A-Za-z0-9'&-]*){0,3}\b").expect("valid regex")
    })
}

/// Phrase-level stoplist check: every word common, or the whole phrase a
/// boilerplate term.
fn is_stoplisted(phrase: &str) -> bool {
    let lower = phrase.to_lowercase();
    if BOILERPLATE_TERMS.contains(&lower.as_str()) {
        return true;
    }
    lower
        .split_whitespace()
        .all(|word| COMMON_WORDS.contains(&word))
}

/// An occurrence counts as code-embedded only when code syntax touches it on
/// both sides.
fn is_code_flanked(content: &str, start: usize, end: usize) -> bool {
    let before = content[..start].chars().next_back();
    let after = content[end..].chars().next();
    matches!(before, Some(c) if CODE_FLANK_CHARS.contains(&c))
        && matches!(after, Some(c) if CODE_FLANK_CHARS.contains(&c))
}

fn excerpt_window(content: &str, start: usize, end: usize) -> String {
    let mut from = start.saturating_sub(EXCERPT_RADIUS);
    while !content.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (end + EXCERPT_RADIUS).min(content.len());
    while !content.is_char_boundary(to) {
        to += 1;
    }
    content[from..to].replace('\n', " ").trim().to_string()
}

pub(super) fn mentions(artifact: &Artifact) -> Vec<Mention> {
    let content = &artifact.normalized_content;

    // Group occurrences by exact phrase text, preserving first-seen order
    let mut order: Vec<String> = Vec::new();
    let mut occurrences: FxHashMap<String, Vec<(usize, usize)>> = FxHashMap::default();

    for m in capitalized_phrase_regex().find_iter(content) {
        let phrase = m.as_str();
        if is_stoplisted(phrase) {
            continue;
        }
        if is_code_flanked(content, m.start(), m.end()) {
            continue;
        }
        if !occurrences.contains_key(phrase) {
            order.push(phrase.to_string());
        }
        occurrences
            .entry(phrase.to_string())
            .or_default()
            .push((m.start(), m.end()));
    }

    let mut out = Vec::new();
    for phrase in order {
        let spans = &occurrences[&phrase];
        if spans.len() < MIN_OCCURRENCES {
            continue;
        }

        let confidence = (0.6 + 0.05 * spans.len() as f64).min(0.8);
        let excerpt = spans
            .iter()
            .take(MAX_EXCERPT_WINDOWS)
            .map(|&(s, e)| excerpt_window(content, s, e))
            .collect::<Vec<_>>()
            .join(" … ");

        out.push(Mention {
            name: phrase,
            excerpt,
            signal: SignalType::Redundancy,
            location: None,
            confidence,
        });
    }

    out
}
