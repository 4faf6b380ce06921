//! Core domain models for veil
//!
//! This crate contains:
//! - Redaction models (Category, Finding, RedactionResult)
//! - Threat-intel models (IndicatorKind, SourceVerdict, CombinedVerdict, BatchResult)
//! - Error types shared across the workspace

pub mod error;
pub mod finding;
pub mod verdict;

pub use error::{CoreError, Result};
pub use finding::{Category, ContextTag, Finding, RedactionResult, RedactionStats};
pub use verdict::{
    BatchResult, BatchSummary, CombinedVerdict, IndicatorKind, SourceDetail, SourceVerdict,
    ThreatStatus,
};
