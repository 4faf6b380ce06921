use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Closed set of sensitive-data categories the redactor recognizes.
///
/// Variant order is the catalog order; it drives both the `BTreeMap`
/// ordering of findings and the precedence of replacements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Ip,
    User,
    Email,
    Domain,
    Hash,
    Session,
    Password,
    Token,
    CreditCard,
    PhoneNumber,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ip => "ip",
            Category::User => "user",
            Category::Email => "email",
            Category::Domain => "domain",
            Category::Hash => "hash",
            Category::Session => "session",
            Category::Password => "password",
            Category::Token => "token",
            Category::CreditCard => "creditCard",
            Category::PhoneNumber => "phoneNumber",
        }
    }
}

/// Where a detected value sits relative to the trust boundary.
///
/// Derived at match time from the value itself, never stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextTag {
    Internal,
    Loopback,
    System,
    External,
}

/// One detected occurrence of sensitive data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub category: Category,
    pub raw_value: String,
    pub context: ContextTag,
}

/// Tallies for one redaction pass.
///
/// Invariant: `masked_count + preserved_count == total_detected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionStats {
    pub total_detected: usize,
    pub masked_count: usize,
    pub preserved_count: usize,
    pub context_preserved: bool,
}

/// Output of one redaction pass over a block of log text.
///
/// `findings` keeps, per category, the unique raw values in first-seen
/// order. `redacted_text` contains no masked value as a literal substring;
/// preserved values stay verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionResult {
    #[serde(rename = "obfuscatedText")]
    pub redacted_text: String,
    #[serde(rename = "detectedData")]
    pub findings: BTreeMap<Category, Vec<String>>,
    #[serde(rename = "obfuscationStats")]
    pub stats: RedactionStats,
}

impl RedactionResult {
    /// Unique values detected for one category, empty when none.
    pub fn values(&self, category: Category) -> &[String] {
        self.findings.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_camel_case() {
        assert_eq!(
            serde_json::to_string(&Category::CreditCard).unwrap(),
            "\"creditCard\""
        );
        assert_eq!(serde_json::to_string(&Category::Ip).unwrap(), "\"ip\"");
    }

    #[test]
    fn findings_map_keeps_category_order() {
        let mut findings: BTreeMap<Category, Vec<String>> = BTreeMap::new();
        findings.insert(Category::Password, vec!["x".into()]);
        findings.insert(Category::Ip, vec!["1.2.3.4".into()]);

        let keys: Vec<_> = findings.keys().copied().collect();
        assert_eq!(keys, vec![Category::Ip, Category::Password]);
    }
}
