use std::collections::HashMap;
use std::sync::Arc;

use sales_core::config::BreakerConfig as BreakerConfigOverrides;

use crate::breaker::CircuitBreaker;
use crate::types::BreakerConfig;

/// The fixed set of dependencies wrapped by a breaker (§4.3's table).
pub const DEPENDENCIES: &[&str] = &["llm", "voice", "persistence", "cache"];

/// Holds one `CircuitBreaker` per named dependency, analogous to the
/// teacher's `ChannelManager` holding one adapter per channel name.
pub struct BreakerRegistry {
    breakers: HashMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    /// Build a breaker for every entry in `DEPENDENCIES`, applying any
    /// config overrides on top of the §4.3 hardcoded defaults.
    pub fn new(config: &BreakerConfigOverrides) -> Self {
        let mut breakers = HashMap::new();
        for &dep in DEPENDENCIES {
            let mut cfg = BreakerConfig::defaults_for(dep);
            if let Some(o) = config.overrides.get(dep) {
                cfg = cfg.with_override(o);
            }
            breakers.insert(dep.to_string(), Arc::new(CircuitBreaker::new(dep, cfg)));
        }
        Self { breakers }
    }

    pub fn get(&self, dependency: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(dependency).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_breaker_per_dependency() {
        let registry = BreakerRegistry::new(&BreakerConfigOverrides::default());
        for dep in DEPENDENCIES {
            assert!(registry.get(dep).is_some());
        }
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn override_changes_threshold() {
        let mut overrides = BreakerConfigOverrides::default();
        overrides.overrides.insert(
            "llm".to_string(),
            sales_core::config::BreakerOverride {
                threshold: Some(1),
                window_s: None,
                recovery_s: None,
                max_retries: None,
            },
        );
        let registry = BreakerRegistry::new(&overrides);
        assert_eq!(registry.get("llm").unwrap().config().threshold, 1);
    }
}
