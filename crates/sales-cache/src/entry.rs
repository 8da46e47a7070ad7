use std::time::{Duration, Instant};

/// A cached value plus its expiry and an optional invalidation tag.
///
/// TTL is a ceiling, not a guarantee (§4.2: "eviction may be earlier under
/// memory pressure") — we only need to honor "not cached past this point",
/// which lazy expiry-on-read gives us without a background sweep.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
    pub tag: Option<String>,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, ttl: Duration, tag: Option<String>) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
            tag,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}
