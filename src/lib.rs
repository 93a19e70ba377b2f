//! Adoptscope - adoption-risk analysis for product documentation
//!
//! Ingests free-form product-documentation text (release notes, FAQs, help
//! articles) and produces a ranked, evidence-backed report of which product
//! features are at risk of poor user adoption. Every output is traceable to
//! literal excerpts from the input text and is fully reproducible given the
//! same input.
//!
//! The analysis core is a chain of pure functions:
//!
//! ```text
//! raw text → normalize → gate → extract → scoring → diagnose → audit
//!                                 (two audits) → diff
//!                           (ordered audit set) → trend
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod diagnose;
pub mod diff;
pub mod extract;
pub mod gate;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod reporters;
pub mod scoring;
pub mod trend;
