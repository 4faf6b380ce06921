//! AbuseIPDB source client (IP reputation only)

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use veil_core::{IndicatorKind, SourceVerdict, ThreatStatus};

use crate::source::{IntelSource, QueryOutcome};

const DEFAULT_BASE_URL: &str = "https://api.abuseipdb.com";
/// Lookback window for abuse reports.
const MAX_AGE_DAYS: &str = "90";

pub struct AbuseIpDbClient {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
}

impl AbuseIpDbClient {
    pub const NAME: &'static str = "AbuseIPDB";

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

    fn parse_verdict(value: &str, body: &Value) -> SourceVerdict {
        let data = &body["data"];
        let score = data["abuseConfidenceScore"].as_u64().unwrap_or(0).min(100);

        let status = if score >= 75 {
            ThreatStatus::Malicious
        } else if score >= 25 {
            ThreatStatus::Suspicious
        } else {
            ThreatStatus::Clean
        };

        SourceVerdict {
            value: value.to_string(),
            status,
            confidence: score as u8,
            source: Self::NAME.to_string(),
            detections: None,
            country: data["countryCode"].as_str().map(str::to_string),
            last_seen: data["lastReportedAt"].as_str().map(str::to_string),
            details: Some(json!({
                "abuseConfidence": score,
                "totalReports": data["totalReports"].as_u64().unwrap_or(0),
                "isPublic": data["isPublic"].as_bool().unwrap_or(false),
            })),
        }
    }
}

#[async_trait]
impl IntelSource for AbuseIpDbClient {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn supports(&self, kind: IndicatorKind) -> bool {
        kind == IndicatorKind::Ip
    }

    async fn query(&self, value: &str, _kind: IndicatorKind) -> QueryOutcome {
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
            .get(format!("{}/api/v2/check", self.base_url))
            .query(&[
                ("ipAddress", value),
                ("maxAgeInDays", MAX_AGE_DAYS),
                ("verbose", ""),
            ])
            .header("Key", api_key)
            .header("Accept", "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return QueryOutcome::Failed(err.to_string()),
        };

        if !response.status().is_success() {
            return QueryOutcome::Failed(format!("HTTP {}", response.status().as_u16()));
        }

        match response.json::<Value>().await {
            Ok(body) => QueryOutcome::Verdict(Self::parse_verdict(value, &body)),
            Err(err) => QueryOutcome::Failed(format!("invalid response body: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(score: u64) -> Value {
        json!({
            "data": {
                "abuseConfidenceScore": score,
                "countryCode": "CN",
                "lastReportedAt": "2025-06-01T12:00:00+00:00",
                "totalReports": 17,
                "isPublic": true,
            }
        })
    }

    #[test]
    fn score_thresholds_map_to_status() {
        assert_eq!(
            AbuseIpDbClient::parse_verdict("1.2.3.4", &body(90)).status,
            ThreatStatus::Malicious
        );
        assert_eq!(
            AbuseIpDbClient::parse_verdict("1.2.3.4", &body(75)).status,
            ThreatStatus::Malicious
        );
        assert_eq!(
            AbuseIpDbClient::parse_verdict("1.2.3.4", &body(40)).status,
            ThreatStatus::Suspicious
        );
        assert_eq!(
            AbuseIpDbClient::parse_verdict("1.2.3.4", &body(10)).status,
            ThreatStatus::Clean
        );
    }

    #[test]
    fn confidence_is_the_abuse_score_itself() {
        let verdict = AbuseIpDbClient::parse_verdict("1.2.3.4", &body(40));
        assert_eq!(verdict.confidence, 40);
        assert_eq!(verdict.country.as_deref(), Some("CN"));
        assert_eq!(verdict.details.unwrap()["totalReports"], 17);
    }

    #[test]
    fn only_ip_indicators_are_supported() {
        let client = AbuseIpDbClient::new(None, Duration::from_secs(5));
        assert!(client.supports(IndicatorKind::Ip));
        assert!(!client.supports(IndicatorKind::Url));
        assert!(!client.supports(IndicatorKind::Hash));
    }

    #[tokio::test]
    async fn missing_key_is_unavailable() {
        let client = AbuseIpDbClient::new(None, Duration::from_secs(5));
        assert_eq!(
            client.query("8.8.8.8", IndicatorKind::Ip).await,
            QueryOutcome::Unavailable
        );
    }

    #[tokio::test]
    async fn lookup_includes_lookback_window() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/check")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("ipAddress".into(), "8.8.8.8".into()),
                mockito::Matcher::UrlEncoded("maxAgeInDays".into(), "90".into()),
            ]))
            .match_header("Key", "secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body(80).to_string())
            .create_async()
            .await;

        let client = AbuseIpDbClient::with_base_url(
            Some("secret".into()),
            Duration::from_secs(5),
            server.url(),
        );
        let outcome = client.query("8.8.8.8", IndicatorKind::Ip).await;
        mock.assert_async().await;

        match outcome {
            QueryOutcome::Verdict(v) => {
                assert_eq!(v.status, ThreatStatus::Malicious);
                assert_eq!(v.confidence, 80);
            }
            other => panic!("expected verdict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limited_response_is_failed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/check")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let client = AbuseIpDbClient::with_base_url(
            Some("secret".into()),
            Duration::from_secs(5),
            server.url(),
        );
        assert!(matches!(
            client.query("8.8.8.8", IndicatorKind::Ip).await,
            QueryOutcome::Failed(_)
        ));
    }
}
