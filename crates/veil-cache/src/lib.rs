//! TTL key-value memoization layer
//!
//! Both engines memoize their outputs through the [`Cache`] trait so the
//! aggregator and the redaction caller can be exercised against an in-memory
//! fake in tests. [`MemoryCache`] is the default implementation: a concurrent
//! map with best-effort, lazily evaluated TTL eviction. Per-key atomicity
//! only; stale-but-valid reads are acceptable.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

/// Default expiry for redaction/analysis results.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);
/// Expiry for combined threat verdicts.
pub const THREAT_TTL: Duration = Duration::from_secs(14400);

/// Keyed memoization contract shared by both engines' callers.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value, ttl: Duration);
    fn delete(&self, key: &str) -> bool;
    /// Remove every entry whose key starts with `prefix`, returning the count.
    fn delete_prefix(&self, prefix: &str) -> usize;
    fn flush_all(&self);
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// In-memory [`Cache`] backed by a `DashMap`.
///
/// Expired entries are dropped on read; there is no background sweeper.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if entry.expires_at > Instant::now() {
                    return Some(entry.value.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(key);
            tracing::debug!(key, "cache entry expired");
        }
        None
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn delete_prefix(&self, prefix: &str) -> usize {
        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect();
        let count = keys.len();
        for key in keys {
            self.entries.remove(&key);
        }
        count
    }

    fn flush_all(&self) {
        self.entries.clear();
    }
}
