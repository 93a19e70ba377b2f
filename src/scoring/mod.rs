//! Adoption-risk scoring
//!
//! Computes three explainable sub-scores per feature and combines them into
//! one adoption-risk score. Every sub-score decomposes into named factors so
//! a reader can see exactly why a feature scored the way it did.
//!
//! # Scoring Formula
//!
//! ```text
//! recency    = 0.6 × staleness_decay + 0.4 × actively_maintained
//! visibility = 0.35 × onboarding + 0.3 × coverage + 0.2 × prominence + 0.15 × documentation
//! density    = 0.5 × mention_volume + 0.3 × signal_diversity + 0.2 × mean_confidence
//!
//! risk = clamp(Wr × (1 − recency) + Wv × (1 − visibility) + Wd × (1 − density), 0, 1)
//! ```
//!
//! Default weights: Wr = 0.4, Wv = 0.35, Wd = 0.25; staleness window
//! 180 days. All four are configurable through [`crate::config::ScoringConfig`].
//!
//! Sub-scores are audit-wide aggregates (coverage divides by the audit's
//! artifact count), so the scorer must see all of an audit's evidence at
//! once. The "now" used for staleness is captured once per audit run and
//! passed in explicitly, keeping every score in one audit consistent.

mod risk_scorer;

pub use risk_scorer::{score_feature, ScoringContext};
