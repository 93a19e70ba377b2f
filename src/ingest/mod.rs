//! Artifact ingestion
//!
//! Builds [`Artifact`] records from files or raw strings: rejects empty
//! content with a typed error, classifies the document type from filename and
//! content cues, runs normalization and the content-quality gate, and
//! collects soft warnings (noisy content, very short content, unrecognized
//! extensions). Warnings never block processing.

use crate::models::{artifact_id, Artifact, ArtifactType};
use crate::{gate, normalize};
use chrono::{DateTime, Utc};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Documents shorter than this (in words) get a quality warning
const SHORT_CONTENT_WORDS: usize = 20;

/// File extensions treated as documentation without a warning
const KNOWN_EXTENSIONS: &[&str] = &["md", "markdown", "txt", "rst", "adoc", "html", "htm"];

/// Input-validation failures: these reject the document before it reaches
/// the analysis core.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("artifact '{0}' is empty or whitespace-only")]
    EmptyContent(String),
    #[error("failed to read '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An artifact plus the soft warnings collected while building it
#[derive(Debug, Clone)]
pub struct IngestedArtifact {
    pub artifact: Artifact,
    pub warnings: Vec<String>,
}

/// Classify a document from its filename and leading content.
pub fn classify_artifact_type(name: &str, content: &str) -> ArtifactType {
    let name_lower = name.to_lowercase();
    let head: String = content.chars().take(400).collect::<String>().to_lowercase();

    let matches_any =
        |haystacks: &[&str], cues: &[&str]| haystacks.iter().any(|h| cues.iter().any(|c| h.contains(c)));

    let sources = [name_lower.as_str(), head.as_str()];
    if matches_any(&sources, &["release note", "changelog", "change log", "what's new", "whatsnew", "release-notes", "releases"]) {
        ArtifactType::ReleaseNotes
    } else if matches_any(&sources, &["faq", "frequently asked"]) {
        ArtifactType::Faq
    } else if matches_any(&sources, &["onboarding", "getting started", "getting-started", "quickstart", "quick start", "welcome"]) {
        ArtifactType::Onboarding
    } else if matches_any(&sources, &["marketing", "landing", "announcement", "launch post"]) {
        ArtifactType::Marketing
    } else if matches_any(&sources, &["support", "help center", "troubleshoot"]) {
        ArtifactType::Support
    } else if matches_any(&[name_lower.as_str()], &[".md", ".markdown", ".rst", ".adoc", "docs"]) {
        ArtifactType::Documentation
    } else {
        ArtifactType::Unknown
    }
}

/// Build an artifact from raw text.
///
/// `uploaded_at` is captured once per run by the caller so every artifact in
/// one audit shares a consistent clock.
pub fn ingest_text(
    name: &str,
    raw_content: &str,
    uploaded_at: DateTime<Utc>,
) -> Result<IngestedArtifact, IngestError> {
    if raw_content.trim().is_empty() {
        return Err(IngestError::EmptyContent(name.to_string()));
    }

    let mut warnings = Vec::new();

    let quality = gate::classify(raw_content);
    for reason in &quality.reasons {
        warnings.push(format!("'{name}': {reason}"));
    }

    let normalized = normalize::normalize(raw_content);
    let headings = normalize::extract_headings(&normalized);
    let content_timestamp = normalize::detect_timestamp(&normalized);
    let word_count = normalized.split_whitespace().count();

    if word_count < SHORT_CONTENT_WORDS {
        warnings.push(format!(
            "'{name}': only {word_count} words after normalization; extraction may find little"
        ));
    }

    if let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) {
        if !KNOWN_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
            warnings.push(format!("'{name}': unrecognized extension '.{ext}'"));
        }
    }

    let artifact = Artifact {
        id: artifact_id(name, raw_content),
        name: name.to_string(),
        artifact_type: classify_artifact_type(name, raw_content),
        raw_content: raw_content.to_string(),
        normalized_content: normalized,
        content_timestamp,
        uploaded_at,
        word_count,
        headings,
        is_code_like: quality.gates_extraction(),
    };

    debug!(
        artifact = %artifact.name,
        artifact_type = %artifact.artifact_type,
        words = artifact.word_count,
        code_like = artifact.is_code_like,
        "ingested artifact"
    );

    Ok(IngestedArtifact { artifact, warnings })
}

/// Read and ingest one file.
pub fn ingest_file(path: &Path, uploaded_at: DateTime<Utc>) -> Result<IngestedArtifact, IngestError> {
    let raw = std::fs::read_to_string(path).map_err(|source| IngestError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    ingest_text(&name, &raw, uploaded_at)
}

/// Collect documentation files under a path, honoring .gitignore.
///
/// A file path is returned as-is; a directory is walked for known
/// documentation extensions.
pub fn collect_documents(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkBuilder::new(path)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| KNOWN_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_content_rejected() {
        assert!(matches!(
            ingest_text("empty.md", "   \n\t  ", now()),
            Err(IngestError::EmptyContent(_))
        ));
    }

    #[test]
    fn test_basic_ingestion_populates_fields() {
        let content = "# Dashboard\n\nReleased 2024-03-15. The Dashboard shows usage per team \
                       member, with filters and exports available on every view.";
        let ingested = ingest_text("guide.md", content, now()).expect("ingest");
        let artifact = &ingested.artifact;

        assert_eq!(artifact.headings, vec!["Dashboard"]);
        assert!(artifact.content_timestamp.is_some());
        assert!(artifact.word_count > 10);
        assert!(!artifact.is_code_like);
        assert!(artifact.id.starts_with("ART-"));
    }

    #[test]
    fn test_type_classification() {
        assert_eq!(
            classify_artifact_type("CHANGELOG.md", "## 2.0"),
            ArtifactType::ReleaseNotes
        );
        assert_eq!(classify_artifact_type("faq.md", "Q&A"), ArtifactType::Faq);
        assert_eq!(
            classify_artifact_type("getting-started.md", "welcome"),
            ArtifactType::Onboarding
        );
        assert_eq!(
            classify_artifact_type("api-reference.md", "endpoints"),
            ArtifactType::Documentation
        );
        assert_eq!(
            classify_artifact_type("data.bin", "something else"),
            ArtifactType::Unknown
        );
    }

    #[test]
    fn test_content_cues_override_generic_name() {
        assert_eq!(
            classify_artifact_type("doc1.txt", "Release Notes for 2.0\n\n- fixes"),
            ArtifactType::ReleaseNotes
        );
    }

    #[test]
    fn test_short_content_warns_but_passes() {
        let ingested = ingest_text("tiny.md", "A few words only.", now()).expect("ingest");
        assert!(ingested
            .warnings
            .iter()
            .any(|w| w.contains("words after normalization")));
    }

    #[test]
    fn test_code_content_warns_and_flags() {
        let content = "const x = require('y');\nfunction f(a) { return a.map(b => { g(b); }); }\n\
                       module.exports = f;\nlet z = 1;\nexport default f;";
        let ingested = ingest_text("bundle.js", content, now()).expect("ingest");
        assert!(ingested.artifact.is_code_like);
        assert!(!ingested.warnings.is_empty());
    }

    #[test]
    fn test_unrecognized_extension_warns() {
        let ingested = ingest_text(
            "notes.xyz",
            "Plenty of words in this perfectly ordinary document about the product features here.",
            now(),
        )
        .expect("ingest");
        assert!(ingested.warnings.iter().any(|w| w.contains(".xyz")));
    }

    #[test]
    fn test_collect_documents_walks_and_filters() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("a.md"), "# A").expect("write");
        std::fs::write(dir.path().join("b.txt"), "B").expect("write");
        std::fs::write(dir.path().join("c.bin"), "C").expect("write");

        let files = collect_documents(dir.path());
        let names: Vec<String> = files
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect();
        assert_eq!(names, vec!["a.md", "b.txt"]);
    }
}
