use std::time::Duration;

use dashmap::DashMap;
use tracing::debug;

use crate::entry::CacheEntry;

/// A single namespace's TTL cache (§4.2).
///
/// Cache miss is never an error — `get` returns `None` both for an absent
/// key and for an expired one (lazily evicted on read).
pub struct TypedCache<V: Clone> {
    name: &'static str,
    default_ttl: Duration,
    entries: DashMap<String, CacheEntry<V>>,
}

impl<V: Clone> TypedCache<V> {
    pub fn new(name: &'static str, default_ttl: Duration) -> Self {
        Self {
            name,
            default_ttl,
            entries: DashMap::new(),
        }
    }

    /// `Get(ns, key) -> value?` (§4.2).
    pub fn get(&self, key: &str) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Some(entry.value.clone());
            }
        }
        // Lazily evict the stale entry so the map doesn't grow unbounded
        // with dead keys under steady churn.
        if self.entries.remove(key).is_some() {
            debug!(ns = self.name, key, "cache entry expired, evicted on read");
        }
        None
    }

    /// `Set(ns, key, value, ttl)` (§4.2). Writer-wins last-write semantics —
    /// a concurrent writer simply overwrites the map entry (§5).
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>, tag: Option<String>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key.into(), CacheEntry::new(value, ttl, tag));
    }

    /// `Invalidate(ns, tag)` (§4.2) — removes every entry tagged with `tag`.
    pub fn invalidate_tag(&self, tag: &str) {
        self.entries.retain(|_, entry| entry.tag.as_deref() != Some(tag));
    }

    /// Remove a single key directly (used for exact-key invalidation, e.g.
    /// write-through on `Save`).
    pub fn invalidate_key(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn miss_then_hit() {
        let cache: TypedCache<String> = TypedCache::new("test", Duration::from_secs(60));
        assert!(cache.get("k").is_none());
        cache.set("k", "v".to_string(), None, None);
        assert_eq!(cache.get("k").unwrap(), "v");
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let cache: TypedCache<String> = TypedCache::new("test", Duration::from_millis(1));
        cache.set("k", "v".to_string(), Some(Duration::from_millis(1)), None);
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn invalidate_by_tag_removes_only_tagged() {
        let cache: TypedCache<String> = TypedCache::new("test", Duration::from_secs(60));
        cache.set("a", "1".to_string(), None, Some("session-1".to_string()));
        cache.set("b", "2".to_string(), None, Some("session-2".to_string()));
        cache.invalidate_tag("session-1");
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b").unwrap(), "2");
    }
}
