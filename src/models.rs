//! Core data models for Adoptscope
//!
//! These models are used throughout the codebase for representing
//! ingested artifacts, extracted features, evidence, and audit results.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hash a list of parts into a lowercase hex digest.
///
/// Parts are separated by a NUL byte so that ("ab", "c") and ("a", "bc")
/// hash differently.
fn content_hash(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

/// Generate a deterministic artifact ID from its display name and raw content.
///
/// Stable IDs enable tracking the same document across runs, reliable
/// deduplication, and suppression by ID in config files.
pub fn artifact_id(name: &str, raw_content: &str) -> String {
    format!("ART-{}", &content_hash(&[name, raw_content])[..12])
}

/// Generate a deterministic feature ID from its normalized name.
pub fn feature_id(normalized_name: &str) -> String {
    format!("FEAT-{}", &content_hash(&[normalized_name])[..12])
}

/// Generate a deterministic evidence ID.
pub fn evidence_id(artifact_id: &str, feature_id: &str, signal: &str, excerpt: &str) -> String {
    format!(
        "EV-{}",
        &content_hash(&[artifact_id, feature_id, signal, excerpt])[..12]
    )
}

/// Generate a deterministic diagnosis ID.
pub fn diagnosis_id(feature_id: &str, diagnosis_type: &str) -> String {
    format!("DIAG-{}", &content_hash(&[feature_id, diagnosis_type])[..12])
}

/// Generate a deterministic audit ID from feature count, evidence count,
/// and the analysis date: `AUD-` followed by 6 uppercase hex digits.
///
/// Two runs over the same inputs on the same day produce the same ID.
pub fn audit_id(feature_count: usize, evidence_count: usize, date: NaiveDate) -> String {
    let features = feature_count.to_string();
    let evidence = evidence_count.to_string();
    let date = date.format("%Y-%m-%d").to_string();
    let digest = content_hash(&[features.as_str(), evidence.as_str(), date.as_str()]);
    format!("AUD-{}", digest[..6].to_uppercase())
}

/// Normalize a feature name for identity comparison: lowercase, punctuation
/// stripped, whitespace collapsed.
///
/// This is the single normalization used by extraction dedup, cross-artifact
/// merging, audit diffing, and trend grouping, so the same spelling always
/// lands on the same feature.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_space = true;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Classified type of an ingested document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    ReleaseNotes,
    Documentation,
    Faq,
    Onboarding,
    Marketing,
    Support,
    #[default]
    Unknown,
}

impl std::fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactType::ReleaseNotes => write!(f, "release_notes"),
            ArtifactType::Documentation => write!(f, "documentation"),
            ArtifactType::Faq => write!(f, "faq"),
            ArtifactType::Onboarding => write!(f, "onboarding"),
            ArtifactType::Marketing => write!(f, "marketing"),
            ArtifactType::Support => write!(f, "support"),
            ArtifactType::Unknown => write!(f, "unknown"),
        }
    }
}

/// What kind of textual context produced a piece of evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    Recency,
    Visibility,
    Onboarding,
    Deprecation,
    Update,
    Documentation,
    Faq,
    ReleaseNote,
    Redundancy,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Recency => "recency",
            SignalType::Visibility => "visibility",
            SignalType::Onboarding => "onboarding",
            SignalType::Deprecation => "deprecation",
            SignalType::Update => "update",
            SignalType::Documentation => "documentation",
            SignalType::Faq => "faq",
            SignalType::ReleaseNote => "release_note",
            SignalType::Redundancy => "redundancy",
        }
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity levels for diagnoses
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Risk-level bucket for a scored feature
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Bucket a risk score in [0,1] into a level.
    ///
    /// Thresholds are fixed and applied everywhere a score is bucketed:
    /// >= 0.75 critical, >= 0.55 high, >= 0.35 medium, else low.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.75 {
            RiskLevel::Critical
        } else if score >= 0.55 {
            RiskLevel::High
        } else if score >= 0.35 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Position on the low..critical scale, for delta arithmetic in diffs
    /// and trends.
    pub fn ordinal(&self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
            RiskLevel::Critical => 3,
        }
    }

    pub fn is_severe(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Fixed set of diagnosis types the rule table can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisType {
    DormantButDocumented,
    LikelyInvisible,
    OverReferencedButStale,
    DeprecatedCandidate,
    Undiscoverable,
    Healthy,
    /// Synthesized when no rule fires but adoption risk is elevated
    ModerateRisk,
}

impl DiagnosisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosisType::DormantButDocumented => "dormant_but_documented",
            DiagnosisType::LikelyInvisible => "likely_invisible",
            DiagnosisType::OverReferencedButStale => "over_referenced_but_stale",
            DiagnosisType::DeprecatedCandidate => "deprecated_candidate",
            DiagnosisType::Undiscoverable => "undiscoverable",
            DiagnosisType::Healthy => "healthy",
            DiagnosisType::ModerateRisk => "moderate_risk",
        }
    }
}

impl std::fmt::Display for DiagnosisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ingested document.
///
/// Immutable once created; the ingestion layer populates `normalized_content`,
/// `headings`, `content_timestamp`, and `is_code_like` before the artifact
/// reaches the extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub name: String,
    pub artifact_type: ArtifactType,
    pub raw_content: String,
    pub normalized_content: String,
    /// Timestamp detected inside the content, if any
    pub content_timestamp: Option<DateTime<Utc>>,
    pub uploaded_at: DateTime<Utc>,
    pub word_count: usize,
    pub headings: Vec<String>,
    /// Gates noise-prone extraction strategies
    pub is_code_like: bool,
}

impl Artifact {
    /// Best available timestamp for recency purposes: the detected content
    /// timestamp, falling back to the upload time.
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        self.content_timestamp.unwrap_or(self.uploaded_at)
    }
}

/// A candidate product capability inferred from text.
///
/// Created on first extraction; later mentions only extend the timestamp
/// range, alias set, and source-artifact set via [`Feature::absorb_mention`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub source_artifacts: Vec<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Feature {
    /// Create a feature from its first mention.
    pub fn new(name: impl Into<String>, source_artifact: &str, seen: DateTime<Utc>) -> Self {
        let name = name.into();
        Self {
            id: feature_id(&normalize_name(&name)),
            name,
            aliases: Vec::new(),
            source_artifacts: vec![source_artifact.to_string()],
            first_seen: seen,
            last_seen: seen,
        }
    }

    /// Merge a later mention into this feature: widen the seen range, record
    /// a new alias spelling, and add the source artifact. Never removes
    /// anything.
    pub fn absorb_mention(&mut self, spelling: &str, source_artifact: &str, seen: DateTime<Utc>) {
        if spelling != self.name && !self.aliases.iter().any(|a| a == spelling) {
            self.aliases.push(spelling.to_string());
        }
        if !self.source_artifacts.iter().any(|a| a == source_artifact) {
            self.source_artifacts.push(source_artifact.to_string());
        }
        if seen < self.first_seen {
            self.first_seen = seen;
        }
        if seen > self.last_seen {
            self.last_seen = seen;
        }
    }

    /// Merge another record for the same feature (cross-artifact merge).
    pub fn absorb(&mut self, other: &Feature) {
        for alias in std::iter::once(&other.name).chain(other.aliases.iter()) {
            if *alias != self.name && !self.aliases.iter().any(|a| a == alias) {
                self.aliases.push(alias.clone());
            }
        }
        for artifact in &other.source_artifacts {
            if !self.source_artifacts.iter().any(|a| a == artifact) {
                self.source_artifacts.push(artifact.clone());
            }
        }
        self.first_seen = self.first_seen.min(other.first_seen);
        self.last_seen = self.last_seen.max(other.last_seen);
    }
}

/// One verbatim excerpt linking a feature to an artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    pub artifact_id: String,
    pub feature_id: String,
    pub excerpt: String,
    pub signal: SignalType,
    /// Where in the document the excerpt came from (e.g. "heading", "bullet")
    pub location: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Extraction confidence in [0,1], when the strategy reports one
    pub confidence: Option<f64>,
}

/// One named factor inside a score breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub name: String,
    /// Raw factor value in [0,1]
    pub value: f64,
    pub weight: f64,
    /// value × weight
    pub contribution: f64,
    pub explanation: String,
}

impl ScoreFactor {
    pub fn new(name: &str, value: f64, weight: f64, explanation: String) -> Self {
        Self {
            name: name.to_string(),
            value,
            weight,
            contribution: value * weight,
            explanation,
        }
    }
}

/// A score in [0,1] decomposed into named, weighted factors.
///
/// Invariant: `score` equals the sum of factor contributions (clamped
/// to [0,1]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub score: f64,
    pub explanation: String,
    pub factors: Vec<ScoreFactor>,
}

impl ScoreBreakdown {
    /// Assemble a breakdown from factors; the score is the clamped sum of
    /// contributions.
    pub fn from_factors(factors: Vec<ScoreFactor>, explanation: String) -> Self {
        let score: f64 = factors.iter().map(|f| f.contribution).sum();
        Self {
            score: score.clamp(0.0, 1.0),
            explanation,
            factors,
        }
    }
}

/// The complete scoring output for one feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureScore {
    pub feature_id: String,
    pub recency: ScoreBreakdown,
    pub visibility: ScoreBreakdown,
    pub density: ScoreBreakdown,
    pub adoption_risk: ScoreBreakdown,
}

/// A typed, evidenced judgment about a feature's adoption risk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnosis {
    pub id: String,
    pub feature_id: String,
    pub diagnosis_type: DiagnosisType,
    pub title: String,
    pub explanation: String,
    pub severity: Severity,
    /// Confidence in [0,1]
    pub confidence: f64,
    /// Signal descriptions that triggered the rule
    pub signals: Vec<String>,
    pub supporting_evidence: Vec<Evidence>,
    pub generated_at: DateTime<Utc>,
}

/// A feature joined with its score, diagnoses, evidence, and rank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedFeature {
    pub feature: Feature,
    pub score: FeatureScore,
    pub diagnoses: Vec<Diagnosis>,
    /// Highest-severity diagnosis, tie-broken by confidence
    pub primary_diagnosis: Option<Diagnosis>,
    pub evidence: Vec<Evidence>,
    pub combined_risk: f64,
    pub risk_level: RiskLevel,
    /// 1-based position after global sorting
    pub rank: usize,
}

/// Feature counts by risk level
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RiskLevelCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskLevelCounts {
    pub fn from_features(features: &[RankedFeature]) -> Self {
        let mut counts = Self::default();
        for f in features {
            match f.risk_level {
                RiskLevel::Critical => counts.critical += 1,
                RiskLevel::High => counts.high += 1,
                RiskLevel::Medium => counts.medium += 1,
                RiskLevel::Low => counts.low += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Summary statistics for one audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSummary {
    pub audit_id: String,
    pub total_features: usize,
    pub by_risk_level: RiskLevelCounts,
    /// Most frequent under-performing factors and recurring diagnoses among
    /// high/critical features
    pub top_risk_factors: Vec<String>,
    pub total_artifacts: usize,
    pub total_evidence: usize,
    pub analyzed_at: DateTime<Utc>,
}

/// The complete output of one analysis run over an artifact set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audit {
    pub summary: AuditSummary,
    pub features: Vec<RankedFeature>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Dashboard"), "dashboard");
        assert_eq!(normalize_name("  Real-Time  Sync!  "), "real time sync");
        assert_eq!(normalize_name("API v2 (beta)"), "api v2 beta");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_feature_id_stable_across_spellings() {
        assert_eq!(
            feature_id(&normalize_name("Real-Time Sync")),
            feature_id(&normalize_name("real time  sync"))
        );
    }

    #[test]
    fn test_audit_id_format_and_determinism() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date");
        let a = audit_id(10, 42, date);
        let b = audit_id(10, 42, date);
        assert_eq!(a, b);
        assert!(a.starts_with("AUD-"));
        let digits = &a[4..];
        assert_eq!(digits.len(), 6);
        assert!(digits.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));

        // Different inputs produce a different id
        assert_ne!(a, audit_id(11, 42, date));
    }

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0.75), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(0.74), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.55), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.54), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.35), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.34), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_feature_absorb_mention_widens_range() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut feature = Feature::new("Dashboard", "ART-a", late);

        feature.absorb_mention("dashboard", "ART-b", early);

        assert_eq!(feature.first_seen, early);
        assert_eq!(feature.last_seen, late);
        assert_eq!(feature.aliases, vec!["dashboard".to_string()]);
        assert_eq!(feature.source_artifacts.len(), 2);

        // Absorbing the same spelling/artifact again changes nothing
        feature.absorb_mention("dashboard", "ART-b", early);
        assert_eq!(feature.aliases.len(), 1);
        assert_eq!(feature.source_artifacts.len(), 2);
    }

    #[test]
    fn test_score_breakdown_contributions_sum() {
        let factors = vec![
            ScoreFactor::new("a", 0.5, 0.6, "half".to_string()),
            ScoreFactor::new("b", 1.0, 0.4, "full".to_string()),
        ];
        let breakdown = ScoreBreakdown::from_factors(factors, "test".to_string());
        let sum: f64 = breakdown.factors.iter().map(|f| f.contribution).sum();
        assert!((breakdown.score - sum).abs() < 1e-9);
        assert!((breakdown.score - 0.7).abs() < 1e-9);
    }
}
