//! Indicator format validation
//!
//! Invalid input never reaches a source client; it is reported as a per-item
//! error string and the batch moves on.

use lazy_static::lazy_static;
use regex::Regex;
use veil_core::{CoreError, IndicatorKind};

lazy_static! {
    /// Strict IPv4, each octet 0-255.
    static ref IPV4: Regex = Regex::new(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$"
    )
    .unwrap();

    /// Full, uncompressed 8-group IPv6.
    static ref IPV6: Regex = Regex::new(r"^(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}$").unwrap();

    /// MD5 / SHA1 / SHA256 lengths.
    static ref HASH: Regex =
        Regex::new(r"^[a-fA-F0-9]{32}$|^[a-fA-F0-9]{40}$|^[a-fA-F0-9]{64}$").unwrap();
}

/// Check whether `value` is well-formed for the declared indicator kind.
pub fn validate(value: &str, kind: IndicatorKind) -> bool {
    match kind {
        IndicatorKind::Ip => IPV4.is_match(value) || IPV6.is_match(value),
        IndicatorKind::Url => match reqwest::Url::parse(value) {
            Ok(url) => url.has_host(),
            Err(_) => false,
        },
        IndicatorKind::Hash => HASH.is_match(value),
    }
}

/// [`validate`], lifted into the shared error type for callers that report
/// per-item failures.
pub fn ensure_valid(value: &str, kind: IndicatorKind) -> veil_core::Result<()> {
    if validate(value, kind) {
        Ok(())
    } else {
        Err(CoreError::InvalidIndicator {
            kind: kind.to_string(),
            value: value.to_string(),
        })
    }
}
