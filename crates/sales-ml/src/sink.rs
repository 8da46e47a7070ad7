use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::types::TrackingEvent;

/// Append-only event ingestion boundary (§4.10). Delivery is
/// at-least-once; implementations other than the in-memory test double
/// are expected to dedupe on `(session_id, event_seq)` themselves, the
/// same contract callers rely on.
#[async_trait]
pub trait TrackingSink: Send + Sync {
    async fn record(&self, event: TrackingEvent) -> Result<()>;
}

/// In-memory sink for tests, deduping on `(session_id, event_seq)` so
/// duplicate at-least-once deliveries don't double-count.
#[derive(Default)]
pub struct InMemoryTrackingSink {
    events: Mutex<Vec<TrackingEvent>>,
    seen: Mutex<HashSet<(String, u64)>>,
}

impl InMemoryTrackingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TrackingEvent> {
        self.events.lock().expect("events poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("events poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TrackingSink for InMemoryTrackingSink {
    async fn record(&self, event: TrackingEvent) -> Result<()> {
        let key = event.dedupe_key();
        let mut seen = self.seen.lock().expect("seen poisoned");
        if !seen.insert(key) {
            debug!("dropped duplicate tracking event");
            return Ok(());
        }
        self.events.lock().expect("events poisoned").push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_core::types::Phase;
    use std::collections::HashMap;

    fn sample(seq: u64) -> TrackingEvent {
        TrackingEvent::MessageExchange(crate::types::MessageExchangeEvent {
            session_id: "s1".to_string(),
            event_seq: seq,
            variants_used: HashMap::new(),
            predictions: vec![],
            empathy_score: 7.0,
            phase: Phase::Discovery,
            latency_ms_per_stage: HashMap::new(),
            ts: "t".to_string(),
        })
    }

    #[tokio::test]
    async fn duplicate_events_are_deduped() {
        let sink = InMemoryTrackingSink::new();
        sink.record(sample(1)).await.unwrap();
        sink.record(sample(1)).await.unwrap();
        sink.record(sample(2)).await.unwrap();
        assert_eq!(sink.len(), 2);
    }
}
