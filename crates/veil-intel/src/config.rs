//! Environment-driven configuration for the intel clients

use std::time::Duration;

/// Credentials and knobs for the source clients and the aggregator.
///
/// Both API keys are optional; a missing key turns that source into a no-op
/// (`QueryOutcome::Unavailable`) instead of an error.
#[derive(Debug, Clone, Default)]
pub struct IntelConfig {
    pub virustotal_api_key: Option<String>,
    pub abuseipdb_api_key: Option<String>,
    pub request_timeout: Option<Duration>,
    pub item_pause: Option<Duration>,
}

impl IntelConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_PAUSE: Duration = Duration::from_millis(100);

    pub fn from_env() -> Self {
        Self {
            virustotal_api_key: non_empty(std::env::var("VIRUSTOTAL_API_KEY").ok()),
            abuseipdb_api_key: non_empty(std::env::var("ABUSEIPDB_API_KEY").ok()),
            request_timeout: None,
            item_pause: None,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout.unwrap_or(Self::DEFAULT_TIMEOUT)
    }

    pub fn item_pause(&self) -> Duration {
        self.item_pause.unwrap_or(Self::DEFAULT_PAUSE)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = IntelConfig::default();
        assert_eq!(config.request_timeout(), IntelConfig::DEFAULT_TIMEOUT);
        assert_eq!(config.item_pause(), IntelConfig::DEFAULT_PAUSE);
        assert!(config.virustotal_api_key.is_none());
    }

    #[test]
    fn blank_keys_are_treated_as_absent() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("k".to_string())), Some("k".to_string()));
    }
}
