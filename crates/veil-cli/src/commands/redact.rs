//! Redact command - sanitize log text

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use veil_cache::{Cache, MemoryCache, DEFAULT_TTL};
use veil_redact::{RedactOptions, Redactor};

pub async fn handle(
    file: Option<PathBuf>,
    no_preserve_context: bool,
    whitelist: Vec<String>,
    blacklist: Vec<String>,
    cache: Arc<MemoryCache>,
) -> Result<()> {
    let text = super::read_input(file.as_ref())?;

    let mut options = RedactOptions {
        preserve_context: !no_preserve_context,
        ..Default::default()
    };
    options.whitelist_domains.extend(whitelist);
    options.blacklist_patterns.extend(blacklist);

    let result = run_cached(&Redactor::new(), cache.as_ref(), &text, &options)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Redact through the memoization layer: identical input text with identical
/// options is served from cache instead of being rescanned.
fn run_cached(
    redactor: &Redactor,
    cache: &dyn Cache,
    text: &str,
    options: &RedactOptions,
) -> Result<serde_json::Value> {
    let key = analysis_key(text, options)?;
    if let Some(hit) = cache.get(&key) {
        tracing::debug!(key, "analysis served from cache");
        return Ok(hit);
    }

    let result = serde_json::to_value(redactor.redact(text, options))?;
    cache.set(&key, result.clone(), DEFAULT_TTL);
    Ok(result)
}

fn analysis_key(text: &str, options: &RedactOptions) -> Result<String> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(text.as_bytes());
    hasher.update(serde_json::to_string(options)?.as_bytes());
    Ok(format!("analysis-{}", hasher.finalize().to_hex()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_and_options_share_a_key() {
        let options = RedactOptions::default();
        let a = analysis_key("Login from 203.0.113.9", &options).unwrap();
        let b = analysis_key("Login from 203.0.113.9", &options).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("analysis-"));
    }

    #[test]
    fn options_change_the_key() {
        let default = RedactOptions::default();
        let masked = RedactOptions {
            preserve_context: false,
            ..Default::default()
        };
        let a = analysis_key("same text", &default).unwrap();
        let b = analysis_key("same text", &masked).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn cache_hit_skips_the_rescan() {
        let cache = MemoryCache::new();
        let redactor = Redactor::new();
        let options = RedactOptions::default();

        let first = run_cached(&redactor, &cache, "User: jsilva", &options).unwrap();
        assert_eq!(cache.len(), 1);
        let second = run_cached(&redactor, &cache, "User: jsilva", &options).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }
}
