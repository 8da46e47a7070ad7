use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{error, info};

use crate::drift::{BaselineDistribution, DriftDetector, DriftReport};
use crate::retrain::{RetrainQueue, RetrainRequest};

pub struct ModelWindow {
    pub baseline: BaselineDistribution,
    pub current_samples: Vec<f64>,
    pub current_accuracy: f64,
}

/// Supplies the rolling window to evaluate each tick. The orchestrator's
/// telemetry aggregation is the real implementation; tests provide a
/// fixed snapshot.
#[async_trait]
pub trait WindowSource: Send + Sync {
    async fn snapshot(&self) -> Vec<ModelWindow>;
}

/// Periodically re-evaluates drift for every tracked model and forwards
/// requires-retraining results to the retrain queue (§4.10). Tick-loop
/// shape directly modeled on `SchedulerEngine::run`/`tick`: poll on a
/// fixed interval, select against a shutdown signal, never let one tick's
/// error stop the loop.
pub struct MlPipeline {
    detector: DriftDetector,
    retrain_queue: RetrainQueue,
    window_source: Arc<dyn WindowSource>,
}

impl MlPipeline {
    pub fn new(detector: DriftDetector, retrain_queue: RetrainQueue, window_source: Arc<dyn WindowSource>) -> Self {
        Self { detector, retrain_queue, window_source }
    }

    /// Evaluate every tracked model once, enqueueing retrain requests for
    /// any model whose severity crosses the high/critical threshold.
    pub async fn tick(&self) -> Vec<DriftReport> {
        let windows = self.window_source.snapshot().await;
        let mut reports = Vec::with_capacity(windows.len());
        let generated_at = chrono::Utc::now().to_rfc3339();
        for window in windows {
            let report = self.detector.evaluate(&window.baseline, &window.current_samples, window.current_accuracy, &generated_at);
            if report.requires_retraining() {
                self.retrain_queue.enqueue(RetrainRequest {
                    model_id: report.model_id.clone(),
                    severity: report.severity,
                    reason: format!("psi={:.3} accuracy_drop_pp={:.1}", report.psi, report.accuracy_drop_pp),
                });
            }
            reports.push(report);
        }
        reports
    }

    pub async fn run(self, poll_every: Duration, mut shutdown: watch::Receiver<bool>) {
        info!("ml pipeline started");
        let mut interval = tokio::time::interval(poll_every);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let reports = self.tick().await;
                    if reports.iter().any(|r| r.requires_retraining()) {
                        error!(count = reports.len(), "drift detected in at least one tracked model");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("ml pipeline shutting down");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedWindowSource(Vec<ModelWindow>);

    #[async_trait]
    impl WindowSource for FixedWindowSource {
        async fn snapshot(&self) -> Vec<ModelWindow> {
            self.0
                .iter()
                .map(|w| ModelWindow {
                    baseline: w.baseline.clone(),
                    current_samples: w.current_samples.clone(),
                    current_accuracy: w.current_accuracy,
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn tick_enqueues_retrain_request_on_drift() {
        let (queue, mut rx) = RetrainQueue::new(4);
        let source = Arc::new(FixedWindowSource(vec![ModelWindow {
            baseline: BaselineDistribution {
                model_id: "conversion-v1".to_string(),
                feature_name: "confidence".to_string(),
                feature_samples: vec![0.5; 20],
                accuracy: 0.9,
            },
            current_samples: vec![0.5; 20],
            current_accuracy: 0.5,
        }]));
        let pipeline = MlPipeline::new(DriftDetector::new(0.25, 10.0), queue, source);
        let reports = pipeline.tick().await;
        assert!(reports[0].requires_retraining());
        let request = rx.try_recv().expect("retrain request enqueued");
        assert_eq!(request.model_id, "conversion-v1");
    }
}
