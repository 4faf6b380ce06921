//! Source adapter trait

use async_trait::async_trait;
use veil_core::{IndicatorKind, SourceVerdict};

/// Result of asking one provider about one indicator.
///
/// Modeled explicitly so the aggregator's "always produce a verdict"
/// guarantee is carried by the type system: a source is either usable, not
/// configured, or broken, and none of those aborts a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Verdict(SourceVerdict),
    /// Credential missing; the source was skipped without a network call.
    Unavailable,
    /// Transport failure, timeout or unexpected provider response.
    Failed(String),
}

/// One external reputation provider.
#[async_trait]
pub trait IntelSource: Send + Sync {
    /// Provider name as it appears in combined verdicts.
    fn name(&self) -> &'static str;

    /// Whether this provider can be asked about the given indicator kind.
    fn supports(&self, kind: IndicatorKind) -> bool;

    /// Ask the provider about a single validated indicator.
    async fn query(&self, value: &str, kind: IndicatorKind) -> QueryOutcome;
}
