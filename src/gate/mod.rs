//! Content-quality gate
//!
//! Classifies raw input as natural-language documentation vs. code, HTML, or
//! minified noise. The verdict is attached to the artifact and consumed by
//! the extractor to disable noise-prone strategies; it never blocks
//! ingestion, only produces warnings.

use regex::Regex;
use std::sync::OnceLock;

/// Symbol ratio above which content reads as code rather than prose
const CODE_SYMBOL_RATIO_THRESHOLD: f64 = 0.15;
/// Code-idiom hits at or above this count mark content as code-like
const CODE_IDIOM_THRESHOLD: usize = 5;
/// Tag-like substrings at or above this count mark content as HTML-heavy
const HTML_TAG_THRESHOLD: usize = 10;
/// A single line longer than this is counted as excessively long
const LONG_LINE_CHARS: usize = 500;
/// Lines over [`LONG_LINE_CHARS`] at or above this count mark content as minified
const LONG_LINE_COUNT_THRESHOLD: usize = 3;
/// Average line length above this marks content as minified
const AVG_LINE_LENGTH_THRESHOLD: usize = 300;

/// Characters that read as code syntax rather than prose
const CODE_SYMBOLS: &[char] = &['{', '}', '(', ')', ';', '<', '>', '[', ']', '=', '&', '|', '$', '`', '\\'];

static HTML_TAG: OnceLock<Regex> = OnceLock::new();
static CODE_IDIOMS: OnceLock<Vec<Regex>> = OnceLock::new();

fn html_tag_regex() -> &'static Regex {
    HTML_TAG.get_or_init(|| Regex::new(r"</?[a-zA-Z][a-zA-Z0-9-]*(?:\s[^<>]*)?>").expect("valid regex"))
}

/// Fixed list of code-idiom patterns: script tags, declarations, module
/// syntax, and similar constructs that never appear in prose.
fn code_idiom_patterns() -> &'static [Regex] {
    CODE_IDIOMS.get_or_init(|| {
        [
            r"(?i)<script\b",
            r"\bfunction\s+\w+\s*\(",
            r"\b(?:const|let|var)\s+\w+\s*=",
            r"\bimport\s+.+\s+from\s+['\x22]",
            r"\brequire\s*\(",
            r"\bmodule\.exports\b",
            r"\bexport\s+(?:default|const|function|class)\b",
            r"\bclass\s+\w+\s*\{",
            r"\bdef\s+\w+\s*\(",
            r"#include\s*<",
            r"\b(?:pub\s+)?fn\s+\w+\s*\(",
            r"=>\s*\{",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid code idiom regex"))
        .collect()
    })
}

/// Verdict of the content-quality gate for one document
#[derive(Debug, Clone, Default)]
pub struct ContentQuality {
    pub is_code_like: bool,
    pub is_html_heavy: bool,
    pub is_minified: bool,
    /// Human-readable list of triggering reasons, for warnings
    pub reasons: Vec<String>,
    pub symbol_ratio: f64,
    pub html_tag_count: usize,
    pub long_line_count: usize,
    pub code_idiom_matches: usize,
}

impl ContentQuality {
    /// Whether noise-prone extraction strategies should be disabled for this
    /// content.
    pub fn gates_extraction(&self) -> bool {
        self.is_code_like || self.is_minified
    }

    /// Whether any quality flag fired at all.
    pub fn is_noisy(&self) -> bool {
        self.is_code_like || self.is_html_heavy || self.is_minified
    }
}

/// Classify raw content as documentation prose vs. code/HTML/minified noise.
pub fn classify(content: &str) -> ContentQuality {
    if content.is_empty() {
        return ContentQuality::default();
    }

    let total_chars = content.chars().count();
    let symbol_chars = content.chars().filter(|c| CODE_SYMBOLS.contains(c)).count();
    let symbol_ratio = symbol_chars as f64 / total_chars as f64;

    let html_tag_count = html_tag_regex().find_iter(content).count();

    let mut long_line_count = 0usize;
    let mut line_count = 0usize;
    for line in content.lines() {
        line_count += 1;
        if line.len() > LONG_LINE_CHARS {
            long_line_count += 1;
        }
    }
    let avg_line_length = if line_count == 0 {
        0
    } else {
        content.len() / line_count
    };

    let code_idiom_matches: usize = code_idiom_patterns()
        .iter()
        .map(|p| p.find_iter(content).count())
        .sum();

    let is_code_like =
        symbol_ratio > CODE_SYMBOL_RATIO_THRESHOLD || code_idiom_matches >= CODE_IDIOM_THRESHOLD;
    let is_html_heavy = html_tag_count >= HTML_TAG_THRESHOLD;
    let is_minified =
        long_line_count >= LONG_LINE_COUNT_THRESHOLD || avg_line_length > AVG_LINE_LENGTH_THRESHOLD;

    let mut reasons = Vec::new();
    if symbol_ratio > CODE_SYMBOL_RATIO_THRESHOLD {
        reasons.push(format!(
            "code-syntax characters make up {:.0}% of content (threshold {:.0}%)",
            symbol_ratio * 100.0,
            CODE_SYMBOL_RATIO_THRESHOLD * 100.0
        ));
    }
    if code_idiom_matches >= CODE_IDIOM_THRESHOLD {
        reasons.push(format!(
            "{code_idiom_matches} code idioms found (script tags, declarations, module syntax)"
        ));
    }
    if is_html_heavy {
        reasons.push(format!("{html_tag_count} HTML-like tags found"));
    }
    if long_line_count >= LONG_LINE_COUNT_THRESHOLD {
        reasons.push(format!(
            "{long_line_count} lines exceed {LONG_LINE_CHARS} characters"
        ));
    }
    if avg_line_length > AVG_LINE_LENGTH_THRESHOLD {
        reasons.push(format!(
            "average line length is {avg_line_length} characters"
        ));
    }

    ContentQuality {
        is_code_like,
        is_html_heavy,
        is_minified,
        reasons,
        symbol_ratio,
        html_tag_count,
        long_line_count,
        code_idiom_matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prose_passes_clean() {
        let content = "The Dashboard gives your team a live view of usage.\n\n\
                       Open the Exports page to download a CSV of any report.";
        let quality = classify(content);
        assert!(!quality.is_code_like);
        assert!(!quality.is_html_heavy);
        assert!(!quality.is_minified);
        assert!(quality.reasons.is_empty());
        assert!(!quality.gates_extraction());
    }

    #[test]
    fn test_javascript_flagged_code_like() {
        let content = "const dashboard = require('./dashboard');\n\
                       function render(props) { return props.widgets.map(w => { build(w); }); }\n\
                       module.exports = { render };\n\
                       let count = 0;\n\
                       export default render;";
        let quality = classify(content);
        assert!(quality.is_code_like, "reasons: {:?}", quality.reasons);
        assert!(quality.gates_extraction());
        assert!(!quality.reasons.is_empty());
    }

    #[test]
    fn test_html_flagged() {
        let tags = "<div><span><a href=\"x\"><b><i><p><ul><li><br><img src=\"y\">".to_string();
        let quality = classify(&format!("{tags} some words between tags"));
        assert!(quality.is_html_heavy);
        assert!(quality.html_tag_count >= 10);
    }

    #[test]
    fn test_minified_flagged() {
        let line = "a".repeat(600);
        let content = format!("{line}\n{line}\n{line}\n");
        let quality = classify(&content);
        assert!(quality.is_minified);
    }

    #[test]
    fn test_empty_content() {
        let quality = classify("");
        assert!(!quality.is_noisy());
        assert!(quality.reasons.is_empty());
    }
}
