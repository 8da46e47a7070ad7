use std::collections::HashMap;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// Orchestrator defaults (§6, §4.9).
pub const DEFAULT_REQUEST_DEADLINE_MS: u64 = 8_000;
pub const DEFAULT_STAGE_DEADLINE_MS: u64 = 2_000;
pub const DEFAULT_FANIN_BARRIER_MS: u64 = 2_500;
pub const DEFAULT_MAX_IN_FLIGHT: usize = 512;
pub const DEFAULT_IDEMPOTENCY_RETRIES: u32 = 3;

/// Top-level config (`sales.toml` + `SALES_*` env overrides), mirroring the
/// teacher's `figment`-backed `SkynetConfig::load`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub breaker: BreakerConfig,
    #[serde(default)]
    pub bandit: BanditConfig,
    #[serde(default)]
    pub drift: DriftConfig,
    #[serde(default)]
    pub predictor: PredictorConfig,
    #[serde(default)]
    pub tier: TierConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorConfig::default(),
            cache: CacheConfig::default(),
            breaker: BreakerConfig::default(),
            bandit: BanditConfig::default(),
            drift: DriftConfig::default(),
            predictor: PredictorConfig::default(),
            tier: TierConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Load config from a TOML file with `SALES_*` env var overrides.
    ///
    /// Checks, in order: explicit path argument, then `~/.sales/sales.toml`.
    /// Missing files are not an error — callers fall back to `Default`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: CoreConfig = Figment::from(figment::providers::Serialized::defaults(
            CoreConfig::default(),
        ))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("SALES_").split("_"))
        .extract()
        .map_err(|e| CoreError::Internal(format!("config load failed: {e}")))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.sales/sales.toml", home)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default = "default_request_deadline_ms")]
    pub request_deadline_ms: u64,
    #[serde(default = "default_stage_deadline_ms")]
    pub stage_deadline_ms: u64,
    #[serde(default = "default_fanin_barrier_ms")]
    pub fanin_barrier_ms: u64,
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    #[serde(default = "default_idempotency_retries")]
    pub idempotency_retries: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            request_deadline_ms: DEFAULT_REQUEST_DEADLINE_MS,
            stage_deadline_ms: DEFAULT_STAGE_DEADLINE_MS,
            fanin_barrier_ms: DEFAULT_FANIN_BARRIER_MS,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            idempotency_retries: DEFAULT_IDEMPOTENCY_RETRIES,
        }
    }
}

fn default_request_deadline_ms() -> u64 {
    DEFAULT_REQUEST_DEADLINE_MS
}
fn default_stage_deadline_ms() -> u64 {
    DEFAULT_STAGE_DEADLINE_MS
}
fn default_fanin_barrier_ms() -> u64 {
    DEFAULT_FANIN_BARRIER_MS
}
fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}
fn default_idempotency_retries() -> u32 {
    DEFAULT_IDEMPOTENCY_RETRIES
}

/// Per-namespace TTL overrides (§4.2). Seconds; `None` means "use the
/// namespace's built-in default".
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    #[serde(default)]
    pub session_ttl_s: Option<u64>,
    #[serde(default)]
    pub tier_decision_ttl_s: Option<u64>,
    #[serde(default)]
    pub prediction_ttl_s: Option<u64>,
    #[serde(default)]
    pub empathy_fragment_ttl_s: Option<u64>,
    #[serde(default)]
    pub static_knowledge_ttl_s: Option<u64>,
}

/// Per-dependency breaker overrides (§4.3). Dependencies not present here
/// fall back to the hardcoded defaults table in `sales-breaker`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BreakerConfig {
    #[serde(default)]
    pub overrides: HashMap<String, BreakerOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerOverride {
    pub threshold: Option<u32>,
    pub window_s: Option<u64>,
    pub recovery_s: Option<u64>,
    pub max_retries: Option<u32>,
}

/// Per-experiment bandit overrides (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BanditConfig {
    #[serde(default)]
    pub overrides: HashMap<String, BanditOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanditOverride {
    pub min_sample_size: Option<u64>,
    pub confidence_level: Option<f64>,
    pub auto_deploy: Option<bool>,
}

/// Drift detection thresholds (§4.10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftConfig {
    #[serde(default = "default_drift_window_hours")]
    pub window_hours: u64,
    #[serde(default = "default_psi_threshold")]
    pub psi_threshold: f64,
    #[serde(default = "default_accuracy_drop_pp")]
    pub accuracy_drop_pp: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            window_hours: default_drift_window_hours(),
            psi_threshold: default_psi_threshold(),
            accuracy_drop_pp: default_accuracy_drop_pp(),
        }
    }
}

fn default_drift_window_hours() -> u64 {
    24
}
fn default_psi_threshold() -> f64 {
    0.25
}
fn default_accuracy_drop_pp() -> f64 {
    10.0
}

/// Per-model enable switch (§6 `predictor.<model>.enabled`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PredictorConfig {
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl PredictorConfig {
    pub fn is_enabled(&self, model_id: &str) -> bool {
        !self.disabled.iter().any(|m| m == model_id)
    }
}

/// Per-tier scoring weights (§4.5's "exact weights as tunable
/// configuration" resolution). Every tier gets one linear weight vector
/// over the same four normalized features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierWeights {
    pub budget: f64,
    pub urgency: f64,
    pub engagement: f64,
    pub age: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierConfig {
    pub essential: TierWeights,
    pub pro: TierWeights,
    pub elite: TierWeights,
    pub premium: TierWeights,
    /// Confidence-ratio cutoff used to break ties toward the higher tier
    /// (§4.5: "higher_tier_if_confidence_ratio < 1.10 else lower_tier").
    #[serde(default = "default_tier_tie_ratio")]
    pub tie_ratio: f64,
}

fn default_tier_tie_ratio() -> f64 {
    1.10
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            essential: TierWeights { budget: 0.2, urgency: 0.1, engagement: 0.2, age: 0.1 },
            pro: TierWeights { budget: 0.4, urgency: 0.3, engagement: 0.4, age: 0.2 },
            elite: TierWeights { budget: 0.7, urgency: 0.5, engagement: 0.6, age: 0.3 },
            premium: TierWeights { budget: 1.0, urgency: 0.6, engagement: 0.7, age: 0.3 },
            tie_ratio: default_tier_tie_ratio(),
        }
    }
}
