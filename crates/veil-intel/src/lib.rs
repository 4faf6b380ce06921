//! Threat-intelligence aggregation
//!
//! Indicators (IPs, URLs, file hashes) are format-checked, looked up in the
//! memoization cache, queried against every configured reputation source and
//! reconciled into one [`veil_core::CombinedVerdict`] per item.

pub mod abuseipdb;
pub mod aggregator;
pub mod config;
pub mod source;
pub mod validator;
pub mod virustotal;

pub use abuseipdb::AbuseIpDbClient;
pub use aggregator::ThreatAggregator;
pub use config::IntelConfig;
pub use source::{IntelSource, QueryOutcome};
pub use validator::{ensure_valid, validate};
pub use virustotal::VirusTotalClient;
