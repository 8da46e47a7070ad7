use std::time::Duration;

use sales_core::config::CacheConfig;
use serde_json::Value;

use crate::typed::TypedCache;

/// The five cache namespaces from §4.2, each with its own default TTL.
/// `CacheLayer` owns one `TypedCache` per namespace so callers don't juggle
/// a namespace enum at every call site.
pub struct CacheLayer {
    pub session: TypedCache<Value>,
    pub tier_decision: TypedCache<Value>,
    pub prediction: TypedCache<Value>,
    pub empathy_fragment: TypedCache<Value>,
    pub static_knowledge: TypedCache<Value>,
}

impl CacheLayer {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            session: TypedCache::new(
                "session",
                ttl_or(config.session_ttl_s, 30 * 60),
            ),
            tier_decision: TypedCache::new(
                "tier_decision",
                ttl_or(config.tier_decision_ttl_s, 30 * 60),
            ),
            prediction: TypedCache::new(
                "prediction",
                ttl_or(config.prediction_ttl_s, 5 * 60),
            ),
            empathy_fragment: TypedCache::new(
                "empathy_fragment",
                ttl_or(config.empathy_fragment_ttl_s, 2 * 60 * 60),
            ),
            static_knowledge: TypedCache::new(
                "static_knowledge",
                ttl_or(config.static_knowledge_ttl_s, 24 * 60 * 60),
            ),
        }
    }
}

fn ttl_or(override_s: Option<u64>, default_s: u64) -> Duration {
    Duration::from_secs(override_s.unwrap_or(default_s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let layer = CacheLayer::new(&CacheConfig::default());
        // Spot-check a couple of entries round-trip through each namespace.
        layer.prediction.set("k1", serde_json::json!({"p": 1}), None, None);
        assert!(layer.prediction.get("k1").is_some());
        assert!(layer.static_knowledge.get("missing").is_none());
    }
}
