//! Multi-source verdict reconciliation and batch verification

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde_json::Value;
use veil_cache::{Cache, THREAT_TTL};
use veil_core::{
    BatchResult, CombinedVerdict, IndicatorKind, SourceDetail, SourceVerdict, ThreatStatus,
};

use crate::abuseipdb::AbuseIpDbClient;
use crate::config::IntelConfig;
use crate::source::{IntelSource, QueryOutcome};
use crate::validator::ensure_valid;
use crate::virustotal::VirusTotalClient;

/// Fans one indicator out to every source that supports it and reconciles
/// the answers. Verdicts are memoized per (kind, value) so repeated batches
/// do not burn provider quota.
pub struct ThreatAggregator {
    sources: Vec<Box<dyn IntelSource>>,
    cache: Arc<dyn Cache>,
    pause: Duration,
}

impl ThreatAggregator {
    pub fn from_config(config: &IntelConfig, cache: Arc<dyn Cache>) -> Self {
        let timeout = config.request_timeout();
        let sources: Vec<Box<dyn IntelSource>> = vec![
            Box::new(VirusTotalClient::new(
                config.virustotal_api_key.clone(),
                timeout,
            )),
            Box::new(AbuseIpDbClient::new(
                config.abuseipdb_api_key.clone(),
                timeout,
            )),
        ];
        Self {
            sources,
            cache,
            pause: config.item_pause(),
        }
    }

    /// Build with an explicit source set. Used by tests.
    pub fn with_sources(
        sources: Vec<Box<dyn IntelSource>>,
        cache: Arc<dyn Cache>,
        pause: Duration,
    ) -> Self {
        Self {
            sources,
            cache,
            pause,
        }
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    fn cache_key(kind: IndicatorKind, value: &str) -> String {
        format!("threat-{}-{}", kind, blake3::hash(value.as_bytes()).to_hex())
    }

    /// Query every applicable source concurrently and reconcile.
    ///
    /// Always produces a verdict: unavailable sources are skipped, failed
    /// ones are logged, and with nothing left the fallback is a weak clean.
    pub async fn check_indicator(&self, value: &str, kind: IndicatorKind) -> CombinedVerdict {
        let applicable: Vec<&dyn IntelSource> = self
            .sources
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| s.supports(kind))
            .collect();

        let outcomes = join_all(applicable.iter().map(|s| s.query(value, kind))).await;

        let mut verdicts = Vec::new();
        for (source, outcome) in applicable.iter().zip(outcomes) {
            match outcome {
                QueryOutcome::Verdict(v) => verdicts.push(v),
                QueryOutcome::Unavailable => {
                    tracing::debug!(source = source.name(), value, "source not configured");
                }
                QueryOutcome::Failed(reason) => {
                    tracing::warn!(source = source.name(), value, %reason, "source query failed");
                }
            }
        }

        Self::combine(value, verdicts)
    }

    fn combine(value: &str, verdicts: Vec<SourceVerdict>) -> CombinedVerdict {
        if verdicts.is_empty() {
            return Self::no_sources_verdict(value);
        }
        if verdicts.len() == 1 {
            return verdicts.into_iter().next().unwrap().into();
        }

        let status = verdicts
            .iter()
            .map(|v| v.status)
            .max()
            .unwrap_or(ThreatStatus::Clean);
        // Confidence tracks the sources that agree with the winning status.
        let confidence = verdicts
            .iter()
            .filter(|v| v.status == status)
            .map(|v| v.confidence)
            .max()
            .unwrap_or(0);

        let source = verdicts
            .iter()
            .map(|v| v.source.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let detections = verdicts.iter().filter_map(|v| v.detections).max();
        let country = verdicts.iter().find_map(|v| v.country.clone());
        let last_seen = verdicts.iter().find_map(|v| v.last_seen.clone());
        let details = verdicts
            .iter()
            .map(|v| SourceDetail {
                source: v.source.clone(),
                data: v.details.clone().unwrap_or(Value::Null),
            })
            .collect();

        CombinedVerdict {
            value: value.to_string(),
            status,
            confidence,
            source,
            detections,
            country,
            last_seen,
            details,
            cached: false,
        }
    }

    fn no_sources_verdict(value: &str) -> CombinedVerdict {
        CombinedVerdict {
            value: value.to_string(),
            status: ThreatStatus::Clean,
            confidence: 50,
            source: "No APIs available".to_string(),
            detections: None,
            country: None,
            last_seen: None,
            details: vec![SourceDetail {
                source: "No APIs available".to_string(),
                data: Value::String("No threat intelligence APIs configured".to_string()),
            }],
            cached: false,
        }
    }

    /// Verify a batch of same-kind indicators.
    ///
    /// Blank entries are skipped, malformed ones become per-item errors, and
    /// everything else yields exactly one [`CombinedVerdict`]. Network-bound
    /// lookups are spaced by the configured pause to stay under provider
    /// rate limits; cache hits cost nothing and are not throttled.
    pub async fn verify_batch(&self, items: &[String], kind: IndicatorKind) -> BatchResult {
        let started = Instant::now();
        let mut results: Vec<CombinedVerdict> = Vec::new();
        let mut errors: Vec<String> = Vec::new();
        let mut queried_any = false;

        for raw in items {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }

            let key = Self::cache_key(kind, value);
            if let Some(hit) = self.cache.get(&key) {
                match serde_json::from_value::<CombinedVerdict>(hit) {
                    Ok(mut verdict) => {
                        verdict.cached = true;
                        tracing::debug!(value, %kind, "verdict served from cache");
                        results.push(verdict);
                        continue;
                    }
                    Err(err) => {
                        // Undecodable entries are evicted and re-fetched.
                        tracing::warn!(value, %err, "dropping corrupt cache entry");
                        self.cache.delete(&key);
                    }
                }
            }

            if let Err(err) = ensure_valid(value, kind) {
                errors.push(err.to_string());
                continue;
            }

            if queried_any {
                tokio::time::sleep(self.pause).await;
            }
            queried_any = true;

            let verdict = self.check_indicator(value, kind).await;
            match serde_json::to_value(&verdict) {
                Ok(json) => self.cache.set(&key, json, THREAT_TTL),
                Err(err) => tracing::warn!(value, %err, "verdict not cacheable"),
            }
            results.push(verdict);
        }

        let mut malicious = 0;
        let mut suspicious = 0;
        let mut clean = 0;
        for verdict in &results {
            match verdict.status {
                ThreatStatus::Malicious => malicious += 1,
                ThreatStatus::Suspicious => suspicious += 1,
                ThreatStatus::Clean => clean += 1,
            }
        }

        BatchResult {
            total: results.len(),
            malicious,
            suspicious,
            clean,
            items: results,
            errors,
            processing_time_seconds: started.elapsed().as_secs_f64(),
        }
    }
}
