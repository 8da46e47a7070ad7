use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::watch;
use tracing::{info, warn};

use sales_bandit::{ExperimentDefinition, Experimenter};
use sales_breaker::{Breaker, BreakerRegistry};
use sales_cache::CacheLayer;
use sales_core::config::CoreConfig;
use sales_empathy::TemplateCatalogue;
use sales_llm::{CannedFallbackProvider, HttpLlmGateway, LlmGateway};
use sales_ml::{
    DriftDetector, InMemoryTrackingSink, MlPipeline, ModelWindow, RetrainQueue, TrackingSink,
    WindowSource,
};
use sales_orchestrator::Orchestrator;
use sales_predictors::PredictorRegistry;
use sales_sessions::SessionManager;

/// Supplies the drift pipeline's rolling windows from whatever the
/// tracking sink has observed. A production deployment swaps this for a
/// real aggregator over persisted predictions; this one only proves the
/// wiring end to end, the same role `InMemoryTrackingSink` plays for the
/// sink itself.
struct EmptyWindowSource;

#[async_trait]
impl WindowSource for EmptyWindowSource {
    async fn snapshot(&self) -> Vec<ModelWindow> {
        Vec::new()
    }
}

fn default_experiments() -> Vec<ExperimentDefinition> {
    vec![
        ExperimentDefinition {
            experiment_id: "greeting".into(),
            control: "A".into(),
            variants: vec!["A".into(), "B".into()],
            min_sample_size: 200,
            confidence_level: 0.95,
        },
        ExperimentDefinition {
            experiment_id: "price_objection".into(),
            control: "A".into(),
            variants: vec!["A".into(), "B".into()],
            min_sample_size: 200,
            confidence_level: 0.95,
        },
    ]
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.sales/sales.db", home)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_server=info,sales_orchestrator=info".into()),
        )
        .init();

    let config_path = std::env::var("SALES_CONFIG").ok();
    let config = CoreConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("config load failed ({}), using defaults", e);
        CoreConfig::default()
    });

    let db_path = std::env::var("SALES_DB_PATH").unwrap_or_else(|_| default_db_path());
    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(&db_path)?;
    sales_sessions::db::init_db(&conn)?;
    let sessions = Arc::new(SessionManager::new(conn));

    let cache = Arc::new(CacheLayer::new(&config.cache));
    let breakers = Arc::new(BreakerRegistry::new(&config.breaker));
    let predictors = Arc::new(PredictorRegistry::new());
    let experimenter = Arc::new(Experimenter::new(default_experiments()));
    let catalogue = Arc::new(TemplateCatalogue::load());

    let llm_breaker: Arc<dyn Breaker> = breakers
        .get("llm")
        .expect("llm breaker always registered");
    let llm_base_url = std::env::var("SALES_LLM_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:8090".to_string());
    let llm_api_key = std::env::var("SALES_LLM_API_KEY").unwrap_or_default();
    let llm: Arc<dyn LlmGateway> = Arc::new(HttpLlmGateway::new(llm_base_url, llm_api_key, llm_breaker));
    let fallback_llm: Arc<dyn LlmGateway> = Arc::new(CannedFallbackProvider::new());

    let tracking: Arc<dyn TrackingSink> = Arc::new(InMemoryTrackingSink::new());

    let orchestrator = Arc::new(Orchestrator::new(
        sessions,
        cache,
        breakers,
        predictors,
        experimenter,
        catalogue,
        llm,
        fallback_llm,
        tracking,
        config.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (retrain_queue, _retrain_rx) = RetrainQueue::new(64);
    let ml_pipeline = MlPipeline::new(
        DriftDetector::new(config.drift.psi_threshold, config.drift.accuracy_drop_pp),
        retrain_queue,
        Arc::new(EmptyWindowSource),
    );
    let drift_poll = Duration::from_secs(config.drift.window_hours * 3600);
    let ml_task = tokio::spawn(ml_pipeline.run(drift_poll, shutdown_rx));

    info!(
        max_in_flight = config.orchestrator.max_in_flight,
        "sales-server ready: Orchestrator wired, no transport attached"
    );

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
    let _ = ml_task.await;
    drop(orchestrator);

    Ok(())
}
