//! Response Cache (component G): fingerprint → reply map with TTL and hit-rate stats.
//!
//! Stores the raw JSON of a Dialect A response rather than a typed value, so this
//! crate stays independent of the wire types living in `llm`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use mini_moka::sync::Cache;
use serde::Serialize;
use serde_json::Value;

/// Default time-to-live for a cached entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct ResponseCache {
    entries: Cache<String, Value>,
    lookups: Arc<AtomicU64>,
    hits: Arc<AtomicU64>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().time_to_live(ttl).build(),
            lookups: Arc::new(AtomicU64::new(0)),
            hits: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Look up `fingerprint`. Counts toward the hit-rate stats regardless of outcome.
    pub fn get(&self, fingerprint: &str) -> Option<Value> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let hit = self.entries.get(fingerprint);
        if hit.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    /// Insert a completed response under `fingerprint`. Entries are immutable once
    /// inserted; a later insert under the same key simply replaces it.
    pub fn insert(&self, fingerprint: String, response: Value) {
        self.entries.insert(fingerprint, response);
    }

    pub fn stats(&self) -> CacheStats {
        let lookups = self.lookups.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed);
        CacheStats { lookups, hits, misses: lookups - hits }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CacheStats {
    pub lookups: u64,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 { 0.0 } else { self.hits as f64 / self.lookups as f64 }
    }
}

/// MD5 fingerprint of the canonical JSON encoding of `value`.
///
/// `serde_json::Value`'s default map representation is a `BTreeMap`, so two
/// structurally identical requests serialise to byte-identical JSON regardless of the
/// key order the client sent them in.
pub fn fingerprint(value: &Value) -> String {
    let canonical = serde_json::to_vec(value).expect("serde_json::Value always serialises");
    format!("{:x}", md5::compute(canonical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fingerprint_is_stable_across_key_order() {
        let a = json!({"model": "gemini-2.0-flash", "messages": []});
        let b = json!({"messages": [], "model": "gemini-2.0-flash"});
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn i7_second_identical_lookup_is_a_hit_with_same_body() {
        let cache = ResponseCache::new(DEFAULT_TTL);
        let key = fingerprint(&json!({"model": "m"}));
        assert!(cache.get(&key).is_none());

        cache.insert(key.clone(), json!({"id": "msg_1"}));
        let hit = cache.get(&key).unwrap();
        assert_eq!(hit, json!({"id": "msg_1"}));

        let stats = cache.stats();
        assert_eq!(stats.lookups, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn expired_entry_reads_as_a_miss() {
        let cache = ResponseCache::new(Duration::from_millis(10));
        let key = "k".to_string();
        cache.insert(key.clone(), json!({"id": "msg_1"}));
        std::thread::sleep(Duration::from_millis(50));
        cache.entries.run_pending_tasks();
        assert!(cache.get(&key).is_none());
    }
}
