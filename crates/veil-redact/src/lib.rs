//! Sensitive-data detection and redaction for security-event logs
//!
//! The [`catalog`] module holds the fixed recognizer table (one or more
//! rules per [`veil_core::Category`] plus that category's masking policy);
//! [`redactor`] runs the table over raw log text and rewrites every
//! occurrence of a masked value with its placeholder token.

pub mod catalog;
pub mod redactor;

pub use catalog::{Policy, Rule, RuleKind};
pub use redactor::{RedactOptions, Redactor};
