//! Fixed recognizer table for the redaction engine
//!
//! One category can carry several rules because the same entity shows up in
//! several surface forms in real logs: inline keywords (`user: alice`),
//! structured report fields (`Usuário de Origem: alice`) and Sysmon XML
//! attributes (`UserID='alice'`). Structured rules are declared first so a
//! whole clause is rewritten with its label intact instead of leaving a
//! dangling label next to a placeholder.

use lazy_static::lazy_static;
use regex::Regex;
use veil_core::{Category, ContextTag};

/// How a rule turns a regex match into a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// The whole match is the finding.
    Bare,
    /// A label plus delimiter; capture group 1 is the finding.
    Keyword,
    /// Capture group 1 is the finding; on masking, the whole matched clause
    /// is rewritten from `template` with `{}` replaced by the placeholder.
    Structured { template: &'static str },
}

/// Masking policy a category carries by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Masked regardless of options.
    AlwaysMask,
    /// Recorded in findings, never substituted.
    DetectOnly,
    /// Decided at match time from the value's context and the caller's
    /// whitelist/blacklist.
    Conditional,
}

pub struct Rule {
    pub category: Category,
    pub kind: RuleKind,
    pub regex: Regex,
}

impl Rule {
    fn bare(category: Category, pattern: &str) -> Self {
        Rule {
            category,
            kind: RuleKind::Bare,
            regex: Regex::new(pattern).expect("invalid catalog pattern"),
        }
    }

    fn keyword(category: Category, pattern: &str) -> Self {
        Rule {
            category,
            kind: RuleKind::Keyword,
            regex: Regex::new(pattern).expect("invalid catalog pattern"),
        }
    }

    fn structured(category: Category, pattern: &str, template: &'static str) -> Self {
        Rule {
            category,
            kind: RuleKind::Structured { template },
            regex: Regex::new(pattern).expect("invalid catalog pattern"),
        }
    }
}

/// Default policy per category.
pub fn policy(category: Category) -> Policy {
    match category {
        Category::Password | Category::Token | Category::CreditCard | Category::PhoneNumber => {
            Policy::AlwaysMask
        }
        Category::Email | Category::Domain | Category::Hash | Category::Session => {
            Policy::DetectOnly
        }
        Category::Ip | Category::User => Policy::Conditional,
    }
}

/// Placeholder token for a masked value, picked by category and context.
pub fn placeholder(category: Category, context: ContextTag) -> &'static str {
    match category {
        Category::Ip => match context {
            ContextTag::Internal | ContextTag::Loopback => "[IP_INTERNO]",
            _ => "[IP_OFUSCADO]",
        },
        Category::User => match context {
            ContextTag::System => "[USUARIO_SISTEMA]",
            _ => "[USUARIO_OFUSCADO]",
        },
        Category::Email => "[EMAIL_OFUSCADO]",
        Category::Domain => "[HOSTNAME_OFUSCADO]",
        Category::Hash => "[HASH_OFUSCADO]",
        Category::Session => "[SESSAO_OFUSCADA]",
        Category::Password => "[SENHA_OFUSCADA]",
        Category::Token => "[TOKEN_OFUSCADO]",
        Category::CreditCard => "[CARTAO_OFUSCADO]",
        Category::PhoneNumber => "[TELEFONE_OFUSCADO]",
    }
}

lazy_static! {
    static ref CATALOG: Vec<Rule> = build_catalog();
}

/// The ordered rule table. Structured rules first, then keyword rules, then
/// bare patterns; within a tier, declaration order decides precedence.
pub fn catalog() -> &'static [Rule] {
    &CATALOG
}

fn build_catalog() -> Vec<Rule> {
    vec![
        // Structured report fields emitted by analyst tooling.
        Rule::structured(
            Category::User,
            r"(?i)Usuário de Origem:[ \t]*([^\n\r]+)",
            "Usuário de Origem: {}",
        ),
        Rule::structured(
            Category::User,
            r"(?i)Usuário Afetado:[ \t]*([^\n\r]+)",
            "Usuário Afetado: {}",
        ),
        Rule::structured(
            Category::Ip,
            r"(?i)IP/Host de Origem:[ \t]*([^\n\r]+)",
            "IP/Host de Origem: {}",
        ),
        Rule::structured(
            Category::Ip,
            r"(?i)IP/Host Afetado:[ \t]*([^\n\r]+)",
            "IP/Host Afetado: {}",
        ),
        // Sysmon XML forms.
        Rule::structured(
            Category::User,
            r#"(?i)UserID=['"]([^'"]+)['"]"#,
            "UserID='{}'",
        ),
        Rule::structured(
            Category::User,
            r"(?i)<Data Name='User'>([^<]+)</Data>",
            "<Data Name='User'>{}</Data>",
        ),
        Rule::structured(
            Category::User,
            r"(?i)<Data Name='ParentUser'>([^<]+)</Data>",
            "<Data Name='ParentUser'>{}</Data>",
        ),
        Rule::structured(
            Category::Domain,
            r"(?i)<Computer>([^<]+)</Computer>",
            "<Computer>{}</Computer>",
        ),
        // Labeled fields.
        Rule::keyword(
            Category::User,
            r"(?i)(?:Usuário de Origem|Usuário Afetado|User|Username)[\s:]+([A-Za-z0-9._\-]+)",
        ),
        Rule::keyword(
            Category::Domain,
            r"(?i)(?:IP/Host de Origem|Hostname|Computer|Server)[\s:]+([A-Za-z0-9._\-]+(?:\.[A-Za-z0-9._\-]+)*)",
        ),
        // Generic keyword rules.
        Rule::keyword(
            Category::User,
            r"(?i)\b(?:user|username|account|login|logon|uid|userid)[\s:=]+([A-Za-z0-9._\-]+)",
        ),
        Rule::keyword(
            Category::Password,
            r"(?i)\b(?:password|passwd|pwd|secret)[\s:=]+([^\s\[\]]+)",
        ),
        Rule::keyword(
            Category::Token,
            r"(?i)\b(?:token|jwt|apikey|auth)[\s:=]+([A-Za-z0-9._\-]+)",
        ),
        Rule::keyword(
            Category::Session,
            r"(?i)\b(?:session|sess|sid|jsessionid|phpsessid)[\s:=]+([A-Za-z0-9._\-]+)",
        ),
        Rule::keyword(
            Category::Domain,
            r"(?i)\b(?:host|hostname|computer|server)[\s:=]+([A-Za-z0-9._\-]+)",
        ),
        // Bare patterns; the whole match is the finding.
        Rule::bare(
            Category::Ip,
            r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b",
        ),
        Rule::bare(Category::Ip, r"\b(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}\b"),
        Rule::bare(
            Category::Email,
            r"\b[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}\b",
        ),
        // MD5 / SHA1 / SHA256 / SHA512 lengths.
        Rule::bare(
            Category::Hash,
            r"\b[a-fA-F0-9]{32}\b|\b[a-fA-F0-9]{40}\b|\b[a-fA-F0-9]{64}\b|\b[a-fA-F0-9]{128}\b",
        ),
        Rule::bare(
            Category::CreditCard,
            r"\b(?:4[0-9]{12}(?:[0-9]{3})?|5[1-5][0-9]{14}|3[47][0-9]{13}|3(?:0[0-5]|[68][0-9])[0-9]{11}|6(?:011|5[0-9]{2})[0-9]{12}|(?:2131|1800|35[0-9]{3})[0-9]{11})\b",
        ),
        Rule::bare(
            Category::PhoneNumber,
            r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b",
        ),
        Rule::bare(
            Category::Domain,
            r"\b[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?\.[A-Za-z]{2,}\b",
        ),
    ]
}
