//! Text normalization for ingested documents
//!
//! Strips recognized boilerplate (navigation, social, cookie banners,
//! footer/copyright lines), detects headings and embedded timestamps, and
//! splits content into paragraph-aligned chunks. Every function here is pure
//! and total: malformed input degrades to "nothing recognized", never to an
//! error.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::sync::OnceLock;

static BOILERPLATE_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static MARKDOWN_HEADING: OnceLock<Regex> = OnceLock::new();
static ISO_DATE: OnceLock<Regex> = OnceLock::new();
static LONG_DATE: OnceLock<Regex> = OnceLock::new();
static NUMERIC_DATE: OnceLock<Regex> = OnceLock::new();
static VERSION_DATE: OnceLock<Regex> = OnceLock::new();

/// Line-anchored boilerplate patterns: navigation menus, social chrome,
/// cookie/privacy notices, footer and copyright lines.
fn boilerplate_patterns() -> &'static [Regex] {
    BOILERPLATE_PATTERNS.get_or_init(|| {
        [
            // Navigation menus: short pipe/chevron-separated link rows
            r"(?im)^\s*(?:home|products?|pricing|docs|blog|about(?: us)?|contact(?: us)?|careers|sign in|log in|sign up)(?:\s*[|>»·/]\s*\w[\w ]*){1,8}\s*$",
            // Social chrome
            r"(?im)^\s*(?:follow us|share(?: this)?(?: on)?|tweet|like us)\b.*$",
            r"(?im)^\s*(?:facebook|twitter|linkedin|instagram|youtube)(?:\s*[|·]\s*(?:facebook|twitter|linkedin|instagram|youtube))+\s*$",
            // Cookie / privacy banners
            r"(?im)^\s*(?:this (?:site|website) uses cookies|we use cookies|by (?:continuing|using this site)).*$",
            r"(?im)^\s*(?:accept(?: all)? cookies|cookie (?:settings|preferences|policy)|manage cookies)\s*$",
            // Footer / copyright
            r"(?im)^\s*(?:©|\(c\)|copyright)\s+.*$",
            r"(?im)^\s*all rights reserved\.?\s*$",
            r"(?im)^\s*(?:terms of (?:service|use)|privacy policy)(?:\s*[|·]\s*(?:terms of (?:service|use)|privacy policy))*\s*$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid boilerplate regex"))
        .collect()
    })
}

fn markdown_heading_regex() -> &'static Regex {
    MARKDOWN_HEADING.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").expect("valid regex"))
}

fn iso_date_regex() -> &'static Regex {
    ISO_DATE.get_or_init(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("valid regex"))
}

fn long_date_regex() -> &'static Regex {
    LONG_DATE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b",
        )
        .expect("valid regex")
    })
}

fn numeric_date_regex() -> &'static Regex {
    NUMERIC_DATE.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{2,4})\b").expect("valid regex")
    })
}

fn version_date_regex() -> &'static Regex {
    // A version token directly followed by a parenthesized or dashed year,
    // e.g. "v2.4 (2024)" or "Version 1.0 - 2023"
    VERSION_DATE.get_or_init(|| {
        Regex::new(r"(?i)\bv(?:ersion)?\s*\d+(?:\.\d+)+\s*[-–(:\s]+(\d{4})\b")
            .expect("valid regex")
    })
}

/// Strip boilerplate lines and collapse excess blank space.
///
/// Recognized boilerplate lines are removed wholesale; runs of 3+ blank lines
/// collapse to 2; the result is trimmed.
pub fn normalize(content: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for line in content.lines() {
        let is_boilerplate = boilerplate_patterns().iter().any(|p| p.is_match(line));
        if !is_boilerplate {
            kept.push(line);
        }
    }

    // Collapse 3+ consecutive blank lines down to 2
    let mut out = String::with_capacity(content.len());
    let mut blank_run = 0usize;
    for line in &kept {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 2 {
                continue;
            }
            out.push('\n');
        } else {
            blank_run = 0;
            out.push_str(line);
            out.push('\n');
        }
    }
    out.trim().to_string()
}

/// Extract heading text in document order, duplicates included.
///
/// Recognizes three conventions: `#`-prefixed markdown headings, and setext
/// underlines (`===` for level 1, `---` for level 2).
pub fn extract_headings(content: &str) -> Vec<String> {
    let lines: Vec<&str> = content.lines().collect();
    let mut headings = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = markdown_heading_regex().captures(line) {
            if let Some(text) = caps.get(2) {
                headings.push(text.as_str().trim().to_string());
            }
            continue;
        }

        // Setext underline on the following line promotes this one
        if let Some(next) = lines.get(i + 1) {
            let underline = next.trim();
            let is_underline = underline.len() >= 3
                && (underline.chars().all(|c| c == '=') || underline.chars().all(|c| c == '-'));
            if is_underline && !line.trim().is_empty() && !markdown_heading_regex().is_match(line) {
                headings.push(line.trim().to_string());
            }
        }
    }

    headings
}

/// Search for an embedded content timestamp.
///
/// Priority order: ISO date, long-form month-day-year, numeric date,
/// version-adjacent year. Returns the first candidate that parses to a real
/// calendar date, or `None`.
pub fn detect_timestamp(content: &str) -> Option<DateTime<Utc>> {
    for caps in iso_date_regex().captures_iter(content) {
        if let Some(date) = parse_ymd(&caps[1], &caps[2], &caps[3]) {
            return Some(date);
        }
    }

    for caps in long_date_regex().captures_iter(content) {
        let month = month_number(&caps[1]);
        if let Some(date) = parse_ymd(&caps[3], &month.to_string(), &caps[2]) {
            return Some(date);
        }
    }

    for caps in numeric_date_regex().captures_iter(content) {
        // US convention: month/day/year; 2-digit years are 2000-based
        let year_raw = &caps[3];
        let year = if year_raw.len() == 2 {
            format!("20{year_raw}")
        } else {
            year_raw.to_string()
        };
        if let Some(date) = parse_ymd(&year, &caps[1], &caps[2]) {
            return Some(date);
        }
    }

    for caps in version_date_regex().captures_iter(content) {
        if let Some(date) = parse_ymd(&caps[1], "1", "1") {
            return Some(date);
        }
    }

    None
}

fn parse_ymd(year: &str, month: &str, day: &str) -> Option<DateTime<Utc>> {
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(DateTime::from_naive_utc_and_offset(
        date.and_hms_opt(0, 0, 0)?,
        Utc,
    ))
}

fn month_number(name: &str) -> u32 {
    match name.to_lowercase().as_str() {
        "january" => 1,
        "february" => 2,
        "march" => 3,
        "april" => 4,
        "may" => 5,
        "june" => 6,
        "july" => 7,
        "august" => 8,
        "september" => 9,
        "october" => 10,
        "november" => 11,
        "december" => 12,
        _ => 0,
    }
}

/// Split content into blank-line-delimited paragraphs and pack them into
/// chunks not exceeding `max_chunk_size` characters.
///
/// A paragraph is never split: one longer than the limit becomes its own
/// oversized chunk.
pub fn chunk_content(content: &str, max_chunk_size: usize) -> Vec<String> {
    let paragraphs: Vec<&str> = content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in paragraphs {
        if current.is_empty() {
            current.push_str(paragraph);
        } else if current.len() + 2 + paragraph.len() <= max_chunk_size {
            current.push_str("\n\n");
            current.push_str(paragraph);
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(paragraph);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
