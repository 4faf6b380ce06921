//! VirusTotal source client

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use veil_core::{IndicatorKind, SourceVerdict, ThreatStatus};

use crate::source::{IntelSource, QueryOutcome};

const DEFAULT_BASE_URL: &str = "https://www.virustotal.com";

pub struct VirusTotalClient {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
}

impl VirusTotalClient {
    pub const NAME: &'static str = "VirusTotal";

    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self::with_base_url(api_key, timeout, DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different host. Used by tests.
    pub fn with_base_url(api_key: Option<String>, timeout: Duration, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            timeout,
        }
    }

    fn endpoint(&self, value: &str, kind: IndicatorKind) -> String {
        match kind {
            IndicatorKind::Ip => format!("{}/api/v3/ip_addresses/{}", self.base_url, value),
            // URLs are keyed by their unpadded base64 form in the path.
            IndicatorKind::Url => format!(
                "{}/api/v3/urls/{}",
                self.base_url,
                URL_SAFE_NO_PAD.encode(value)
            ),
            IndicatorKind::Hash => format!("{}/api/v3/files/{}", self.base_url, value),
        }
    }

    fn not_found_verdict(value: &str) -> SourceVerdict {
        SourceVerdict {
            value: value.to_string(),
            status: ThreatStatus::Clean,
            confidence: 50,
            source: Self::NAME.to_string(),
            detections: None,
            country: None,
            last_seen: None,
            details: Some(json!("Not found in database")),
        }
    }

    fn parse_verdict(value: &str, body: &Value) -> SourceVerdict {
        let attributes = &body["data"]["attributes"];
        let stats = &attributes["last_analysis_stats"];
        let malicious = stats["malicious"].as_u64().unwrap_or(0);
        let suspicious = stats["suspicious"].as_u64().unwrap_or(0);
        let harmless = stats["harmless"].as_u64().unwrap_or(0);
        let undetected = stats["undetected"].as_u64().unwrap_or(0);
        let total = malicious + suspicious + harmless + undetected;

        let (status, confidence) = if total == 0 {
            (ThreatStatus::Clean, 50.0)
        } else if malicious > 0 {
            let ratio = malicious as f64 / total as f64;
            (ThreatStatus::Malicious, (60.0 + ratio * 35.0).min(95.0))
        } else if suspicious > 0 {
            let ratio = suspicious as f64 / total as f64;
            (ThreatStatus::Suspicious, (40.0 + ratio * 40.0).min(80.0))
        } else {
            // Inverse scale: the more harmless votes, the lower the
            // confidence-of-badness, floored at 10.
            let harmless_ratio = harmless as f64 / total as f64;
            (ThreatStatus::Clean, (100.0 - harmless_ratio * 100.0).max(10.0))
        };

        SourceVerdict {
            value: value.to_string(),
            status,
            confidence: confidence.round() as u8,
            source: Self::NAME.to_string(),
            detections: Some((malicious + suspicious) as u32),
            country: attributes["country"].as_str().map(str::to_string),
            last_seen: attributes
                .get("last_seen")
                .and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_i64().map(|n| n.to_string()))),
            details: if stats.is_object() {
                Some(stats.clone())
            } else {
                None
            },
        }
    }
}

#[async_trait]
impl IntelSource for VirusTotalClient {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn supports(&self, _kind: IndicatorKind) -> bool {
        true
    }

    async fn query(&self, value: &str, kind: IndicatorKind) -> QueryOutcome {
        let Some(api_key) = &self.api_key else {
            return QueryOutcome::Unavailable;
        };

        let client = match reqwest::Client::builder()
            .user_agent("veil/0.1 (threat intel)")
            .timeout(self.timeout)
            .build()
        {
            Ok(client) => client,
            Err(err) => return QueryOutcome::Failed(format!("failed to create HTTP client: {err}")),
        };

        let response = match client
            .get(self.endpoint(value, kind))
            .header("x-apikey", api_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return QueryOutcome::Failed(err.to_string()),
        };

        // Unknown indicators are a weak clean signal, not an error.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return QueryOutcome::Verdict(Self::not_found_verdict(value));
        }
        if !response.status().is_success() {
            return QueryOutcome::Failed(format!("HTTP {}", response.status().as_u16()));
        }

        match response.json::<Value>().await {
            Ok(body) => QueryOutcome::Verdict(Self::parse_verdict(value, &body)),
            Err(err) => QueryOutcome::Failed(format!("invalid response body: {err}")),
        }
    }
}
