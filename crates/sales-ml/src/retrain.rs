use tokio::sync::mpsc;
use tracing::warn;

use crate::severity::DriftSeverity;

#[derive(Debug, Clone)]
pub struct RetrainRequest {
    pub model_id: String,
    pub severity: DriftSeverity,
    pub reason: String,
}

/// Bounded queue of retrain requests. `enqueue` never blocks the caller —
/// a full or closed queue just drops the request and logs a warning.
pub struct RetrainQueue {
    tx: mpsc::Sender<RetrainRequest>,
}

impl RetrainQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<RetrainRequest>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    pub fn enqueue(&self, request: RetrainRequest) {
        let model_id = request.model_id.clone();
        if self.tx.try_send(request).is_err() {
            warn!(model_id, "retrain queue full or closed — request dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enqueued_request_is_received() {
        let (queue, mut rx) = RetrainQueue::new(4);
        queue.enqueue(RetrainRequest {
            model_id: "conversion-v1".to_string(),
            severity: DriftSeverity::Critical,
            reason: "psi".to_string(),
        });
        let received = rx.recv().await.unwrap();
        assert_eq!(received.model_id, "conversion-v1");
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let (queue, _rx) = RetrainQueue::new(1);
        queue.enqueue(RetrainRequest {
            model_id: "a".to_string(),
            severity: DriftSeverity::High,
            reason: "r".to_string(),
        });
        // Second enqueue would block on a bounded channel at capacity;
        // try_send must drop it instead of hanging the test.
        queue.enqueue(RetrainRequest {
            model_id: "b".to_string(),
            severity: DriftSeverity::High,
            reason: "r".to_string(),
        });
    }
}
