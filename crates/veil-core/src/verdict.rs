use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of observable indicator accepted by the verification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Ip,
    Url,
    Hash,
}

impl IndicatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Ip => "ip",
            IndicatorKind::Url => "url",
            IndicatorKind::Hash => "hash",
        }
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reputation judgment. Ordering encodes severity, so the worst case across
/// sources is simply the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatStatus {
    Clean,
    Suspicious,
    Malicious,
}

impl ThreatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatStatus::Clean => "clean",
            ThreatStatus::Suspicious => "suspicious",
            ThreatStatus::Malicious => "malicious",
        }
    }
}

/// One provider's opinion about a single indicator. Built fresh per query,
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceVerdict {
    pub value: String,
    pub status: ThreatStatus,
    /// 0-100. For clean verdicts this is "confidence of badness", so lower
    /// numbers mean a stronger clean signal.
    pub confidence: u8,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// A provider's raw detail payload, tagged with the provider name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDetail {
    pub source: String,
    pub data: Value,
}

/// Reconciliation of 1..N source verdicts for the same value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedVerdict {
    pub value: String,
    pub status: ThreatStatus,
    pub confidence: u8,
    /// Comma-joined contributing source names, in query order.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<SourceDetail>,
    /// Set when the verdict was served from the memoization layer.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cached: bool,
}

impl From<SourceVerdict> for CombinedVerdict {
    fn from(v: SourceVerdict) -> Self {
        let details = v
            .details
            .map(|data| {
                vec![SourceDetail {
                    source: v.source.clone(),
                    data,
                }]
            })
            .unwrap_or_default();

        CombinedVerdict {
            value: v.value,
            status: v.status,
            confidence: v.confidence,
            source: v.source,
            detections: v.detections,
            country: v.country,
            last_seen: v.last_seen,
            details,
            cached: false,
        }
    }
}

/// Outcome of verifying one batch of indicators.
///
/// Invariant: `malicious + suspicious + clean == total == items.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub total: usize,
    pub malicious: usize,
    pub suspicious: usize,
    pub clean: usize,
    pub items: Vec<CombinedVerdict>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub processing_time_seconds: f64,
}

impl BatchResult {
    /// Roll results up into the outward report shape.
    pub fn summary(&self, sources: Vec<String>) -> BatchSummary {
        BatchSummary {
            total_scanned: self.total,
            processing_time: format!("{:.1}s", self.processing_time_seconds),
            sources,
            errors: if self.errors.is_empty() {
                None
            } else {
                Some(self.errors.clone())
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_scanned: usize,
    pub processing_time: String,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}
