//! Redaction engine
//!
//! Matches are collected over the original, immutable text in catalog order,
//! deduplicated per category by raw value, and only then rewritten: one
//! left-to-right pass for structured clause rewrites, followed by a literal
//! global substitution per masked value. Rescanning text that earlier rules
//! already mutated is what produced double-substitution bugs in the previous
//! generation of this engine.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use veil_core::{Category, ContextTag, Finding, RedactionResult, RedactionStats};

use crate::catalog::{self, Policy, Rule, RuleKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedactOptions {
    pub preserve_context: bool,
    /// Values containing any of these substrings are preserved verbatim.
    pub whitelist_domains: Vec<String>,
    /// Case-insensitive substrings marking test/dummy values to preserve.
    pub blacklist_patterns: Vec<String>,
}

impl Default for RedactOptions {
    fn default() -> Self {
        Self {
            preserve_context: true,
            whitelist_domains: vec![
                "localhost".to_string(),
                "127.0.0.1".to_string(),
                "0.0.0.0".to_string(),
            ],
            blacklist_patterns: vec![
                "test".to_string(),
                "example".to_string(),
                "dummy".to_string(),
                "fake".to_string(),
            ],
        }
    }
}

/// What happens to one unique finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    /// Left verbatim, counted preserved.
    Preserve,
    /// Every literal occurrence replaced by `placeholder`. `keeps_context`
    /// marks internal-network rewrites that count as preserved because the
    /// placeholder retains the context the analyst needs.
    Substitute {
        placeholder: &'static str,
        keeps_context: bool,
    },
}

struct ClauseRewrite {
    start: usize,
    end: usize,
    category: Category,
    value: String,
    template: &'static str,
}

pub struct Redactor {
    rules: &'static [Rule],
}

impl Redactor {
    pub fn new() -> Self {
        Self {
            rules: catalog::catalog(),
        }
    }

    /// Scan `text`, classify every match and rewrite masked values.
    pub fn redact(&self, text: &str, options: &RedactOptions) -> RedactionResult {
        let mut findings: BTreeMap<Category, Vec<String>> = BTreeMap::new();
        let mut seen: HashSet<(Category, String)> = HashSet::new();
        let mut clause_rewrites: Vec<ClauseRewrite> = Vec::new();

        for rule in self.rules {
            for caps in rule.regex.captures_iter(text) {
                let whole = caps.get(0).expect("match has a whole-match group");
                let value = match rule.kind {
                    RuleKind::Bare => whole.as_str(),
                    _ => match caps.get(1) {
                        Some(m) => m.as_str(),
                        None => continue,
                    },
                };
                let value = value.trim();
                if value.is_empty() || value.contains('[') {
                    // Bracketed values are placeholders from an earlier pass.
                    continue;
                }
                if rule.category == Category::User
                    && matches!(rule.kind, RuleKind::Keyword)
                    && is_user_noise(value)
                {
                    continue;
                }

                let key = (rule.category, value.to_string());
                if seen.insert(key) {
                    findings
                        .entry(rule.category)
                        .or_default()
                        .push(value.to_string());
                }
                if let RuleKind::Structured { template } = rule.kind {
                    clause_rewrites.push(ClauseRewrite {
                        start: whole.start(),
                        end: whole.end(),
                        category: rule.category,
                        value: value.to_string(),
                        template,
                    });
                }
            }
        }

        // Policy pass: one disposition per unique (category, value).
        let mut dispositions: HashMap<(Category, String), Disposition> = HashMap::new();
        let mut stats = RedactionStats {
            context_preserved: options.preserve_context,
            ..Default::default()
        };
        for (category, values) in &findings {
            for value in values {
                let finding = Finding {
                    category: *category,
                    raw_value: value.clone(),
                    context: classify(*category, value),
                };
                let disposition = decide(&finding, options);
                match disposition {
                    Disposition::Preserve => stats.preserved_count += 1,
                    Disposition::Substitute {
                        keeps_context: true,
                        ..
                    } => stats.preserved_count += 1,
                    Disposition::Substitute { .. } => stats.masked_count += 1,
                }
                stats.total_detected += 1;
                dispositions.insert((*category, value.clone()), disposition);
            }
        }

        // Rewrite structured clauses whole, label kept, in a single pass.
        let mut rewrites: Vec<(usize, usize, String)> = clause_rewrites
            .iter()
            .filter_map(|c| {
                match dispositions.get(&(c.category, c.value.clone()))? {
                    Disposition::Substitute { placeholder, .. } => {
                        Some((c.start, c.end, c.template.replacen("{}", placeholder, 1)))
                    }
                    Disposition::Preserve => None,
                }
            })
            .collect();
        rewrites.sort_by_key(|r| (r.0, r.1));

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for (start, end, replacement) in rewrites {
            if start < cursor {
                // Overlap: an earlier (higher-precedence) rule already
                // rewrote this region.
                continue;
            }
            out.push_str(&text[cursor..start]);
            out.push_str(&replacement);
            cursor = end;
        }
        out.push_str(&text[cursor..]);

        // Replace every remaining literal occurrence of each masked value.
        for (category, values) in &findings {
            for value in values {
                if let Some(Disposition::Substitute { placeholder, .. }) =
                    dispositions.get(&(*category, value.clone()))
                {
                    if out.contains(value.as_str()) {
                        out = out.replace(value.as_str(), placeholder);
                    }
                }
            }
        }

        RedactionResult {
            redacted_text: out,
            findings,
            stats,
        }
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the context tag from the value itself.
fn classify(category: Category, value: &str) -> ContextTag {
    match category {
        Category::Ip => {
            if value == "127.0.0.1" || value.eq_ignore_ascii_case("localhost") {
                ContextTag::Loopback
            } else if value.starts_with("10.")
                || value.starts_with("192.168.")
                || value.starts_with("172.")
            {
                ContextTag::Internal
            } else {
                ContextTag::External
            }
        }
        Category::User => {
            let lower = value.to_ascii_lowercase();
            if matches!(lower.as_str(), "root" | "admin" | "system" | "service") {
                ContextTag::System
            } else {
                ContextTag::External
            }
        }
        _ => ContextTag::External,
    }
}

fn decide(finding: &Finding, options: &RedactOptions) -> Disposition {
    let masked = Disposition::Substitute {
        placeholder: catalog::placeholder(finding.category, finding.context),
        keeps_context: false,
    };
    match catalog::policy(finding.category) {
        Policy::AlwaysMask => masked,
        Policy::DetectOnly => Disposition::Preserve,
        Policy::Conditional => {
            if !options.preserve_context {
                return masked;
            }
            let value = finding.raw_value.as_str();
            if whitelist_hit(value, options) || blacklist_hit(value, options) {
                return Disposition::Preserve;
            }
            match (finding.category, finding.context) {
                // LAN addresses stay verbatim; other private ranges keep
                // their context through the placeholder.
                (Category::Ip, ContextTag::Loopback) => Disposition::Preserve,
                (Category::Ip, ContextTag::Internal) if value.starts_with("192.168.") => {
                    Disposition::Preserve
                }
                (Category::Ip, ContextTag::Internal) => Disposition::Substitute {
                    placeholder: catalog::placeholder(finding.category, finding.context),
                    keeps_context: true,
                },
                _ => masked,
            }
        }
    }
}

fn whitelist_hit(value: &str, options: &RedactOptions) -> bool {
    options
        .whitelist_domains
        .iter()
        .any(|entry| value.contains(entry.as_str()))
}

fn blacklist_hit(value: &str, options: &RedactOptions) -> bool {
    let lower = value.to_lowercase();
    options
        .blacklist_patterns
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

/// Generic keyword rules misfire on domain- and IP-shaped tokens, and on
/// one- or two-character fragments.
fn is_user_noise(value: &str) -> bool {
    value.len() < 3 || value.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redact(text: &str) -> RedactionResult {
        Redactor::new().redact(text, &RedactOptions::default())
    }

    #[test]
    fn masks_public_ipv4_once_in_findings() {
        let result = redact("Connection from 203.0.113.7 denied");
        assert!(!result.redacted_text.contains("203.0.113.7"));
        assert!(result.redacted_text.contains("[IP_OFUSCADO]"));
        assert_eq!(result.values(Category::Ip), ["203.0.113.7"]);
    }

    #[test]
    fn replaces_every_occurrence_of_a_masked_value() {
        let result = redact("first 203.0.113.7 then 203.0.113.7 again");
        assert!(!result.redacted_text.contains("203.0.113.7"));
        assert_eq!(result.redacted_text.matches("[IP_OFUSCADO]").count(), 2);
        // Deduplicated in findings.
        assert_eq!(result.values(Category::Ip).len(), 1);
    }

    #[test]
    fn lan_ip_stays_verbatim_with_context_preservation() {
        let result = redact("src=192.168.1.100 dst=192.168.1.100");
        assert!(result.redacted_text.contains("192.168.1.100"));
        assert_eq!(result.values(Category::Ip), ["192.168.1.100"]);
        assert_eq!(result.stats.masked_count, 0);
        assert_eq!(result.stats.preserved_count, 1);
    }

    #[test]
    fn loopback_stays_verbatim() {
        let result = redact("ping 127.0.0.1");
        assert!(result.redacted_text.contains("127.0.0.1"));
        assert_eq!(result.stats.masked_count, 0);
    }

    #[test]
    fn login_line_scenario() {
        let result = redact("Login from 10.0.0.5 user: alice password: Secr3t!");
        let text = &result.redacted_text;
        assert!(text.contains("[IP_INTERNO]"));
        assert!(text.contains("[USUARIO_OFUSCADO]"));
        assert!(text.contains("[SENHA_OFUSCADA]"));
        assert!(!text.contains("10.0.0.5"));
        assert!(!text.contains("alice"));
        assert!(!text.contains("Secr3t!"));
        assert!(result.stats.preserved_count >= 1);
    }

    #[test]
    fn stats_invariant_holds() {
        let result = redact(
            "User admin@company.com from 192.168.1.100 attempted login\n\
             Password: mySecretPassword123\n\
             Session: abc123def456\n\
             Hash: d41d8cd98f00b204e9800998ecf8427e\n\
             Card: 4111111111111111",
        );
        let total: usize = result.findings.values().map(Vec::len).sum();
        assert_eq!(result.stats.total_detected, total);
        assert_eq!(
            result.stats.masked_count + result.stats.preserved_count,
            total
        );
    }

    #[test]
    fn second_pass_finds_no_always_mask_categories() {
        let first = redact(
            "password=hunter2 token=abcd1234efgh card 4111111111111111 call 555-123-4567",
        );
        let second = redact(&first.redacted_text);
        for category in [
            Category::Password,
            Category::Token,
            Category::CreditCard,
            Category::PhoneNumber,
        ] {
            assert!(
                second.values(category).is_empty(),
                "{:?} re-detected in {:?}",
                category,
                second.redacted_text
            );
        }
    }

    #[test]
    fn system_user_gets_system_placeholder() {
        let result = redact("login: admin attempted sudo");
        assert!(result.redacted_text.contains("[USUARIO_SISTEMA]"));
        assert!(!result.redacted_text.contains("admin"));
    }

    #[test]
    fn detect_only_values_are_recorded_but_kept() {
        let result = redact(
            "contact john@corp.com hash d41d8cd98f00b204e9800998ecf8427e session: abc123def",
        );
        assert!(result.redacted_text.contains("john@corp.com"));
        assert!(result
            .redacted_text
            .contains("d41d8cd98f00b204e9800998ecf8427e"));
        assert!(result.redacted_text.contains("abc123def"));
        assert_eq!(result.values(Category::Email), ["john@corp.com"]);
        assert_eq!(
            result.values(Category::Hash),
            ["d41d8cd98f00b204e9800998ecf8427e"]
        );
        assert_eq!(result.values(Category::Session), ["abc123def"]);
    }

    #[test]
    fn structured_report_field_rewritten_as_whole_clause() {
        let result = redact("Evidências:\nUsuário de Origem: jsilva\nAção: Block");
        assert!(result
            .redacted_text
            .contains("Usuário de Origem: [USUARIO_OFUSCADO]"));
        assert!(!result.redacted_text.contains("jsilva"));
    }

    #[test]
    fn internal_host_field_keeps_context_placeholder() {
        let result = redact("IP/Host de Origem: 10.1.2.3");
        assert!(result
            .redacted_text
            .contains("IP/Host de Origem: [IP_INTERNO]"));
        assert!(!result.redacted_text.contains("10.1.2.3"));
        assert_eq!(result.stats.masked_count, 0);
        assert!(result.stats.preserved_count >= 1);
    }

    #[test]
    fn sysmon_xml_attributes_rewritten() {
        let result = redact("<Data Name='User'>jdoe</Data> UserID='S-1-5-21-1004'");
        assert!(result
            .redacted_text
            .contains("<Data Name='User'>[USUARIO_OFUSCADO]</Data>"));
        assert!(result.redacted_text.contains("UserID='[USUARIO_OFUSCADO]'"));
        assert!(!result.redacted_text.contains("jdoe"));
    }

    #[test]
    fn computer_xml_is_detect_only() {
        let result = redact("<Computer>ws01.corp.local</Computer>");
        assert!(result.redacted_text.contains("ws01.corp.local"));
        assert!(result
            .values(Category::Domain)
            .contains(&"ws01.corp.local".to_string()));
    }

    #[test]
    fn noisy_usernames_are_rejected() {
        let result = redact("user: ab login: 10.0.0.1 account: corp.example.com");
        assert!(result.values(Category::User).is_empty());
        // The IP-shaped token is still picked up by the bare IPv4 rule.
        assert_eq!(result.values(Category::Ip), ["10.0.0.1"]);
    }

    #[test]
    fn version_string_is_treated_as_ip() {
        let result = redact("agent version 1.2.3.4 deployed");
        assert_eq!(result.values(Category::Ip), ["1.2.3.4"]);
        assert!(!result.redacted_text.contains("1.2.3.4"));
    }

    #[test]
    fn disabling_context_preservation_masks_lan_addresses() {
        let options = RedactOptions {
            preserve_context: false,
            ..RedactOptions::default()
        };
        let result = Redactor::new().redact("src=192.168.1.5", &options);
        assert!(!result.redacted_text.contains("192.168.1.5"));
        assert!(result.redacted_text.contains("[IP_INTERNO]"));
        assert_eq!(result.stats.masked_count, 1);
        assert_eq!(result.stats.preserved_count, 0);
    }

    #[test]
    fn whitelisted_user_is_preserved() {
        let options = RedactOptions {
            whitelist_domains: vec!["svc_backup".to_string()],
            ..RedactOptions::default()
        };
        let result = Redactor::new().redact("user: svc_backup ran job", &options);
        assert!(result.redacted_text.contains("svc_backup"));
        assert_eq!(result.stats.preserved_count, 1);
    }

    #[test]
    fn blacklisted_test_user_is_preserved() {
        let result = redact("user: testrunner finished");
        assert!(result.redacted_text.contains("testrunner"));
        assert_eq!(result.stats.masked_count, 0);
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let result = redact("");
        assert!(result.redacted_text.is_empty());
        assert!(result.findings.is_empty());
        assert_eq!(result.stats.total_detected, 0);
    }

    #[test]
    fn credit_card_and_phone_always_masked() {
        let result = redact("card 4111111111111111 phone +1-555-123-4567");
        assert!(result.redacted_text.contains("[CARTAO_OFUSCADO]"));
        assert!(result.redacted_text.contains("[TELEFONE_OFUSCADO]"));
        assert!(!result.redacted_text.contains("4111111111111111"));
        assert!(!result.redacted_text.contains("555-123-4567"));
    }
}
