//! In-memory `EventSink`: buffers published events for inspection by tests
//! or a future fan-out layer (e.g. a WebSocket broadcaster).

use async_trait::async_trait;
use std::sync::Mutex;

use crate::traits::{EventSink, SignalEvent};

#[derive(Default)]
pub struct InMemoryEventSink {
    events: Mutex<Vec<SignalEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<SignalEvent> {
        let mut guard = self.events.lock().expect("event sink lock poisoned");
        std::mem::take(&mut guard)
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn publish(&self, event: SignalEvent) {
        self.events.lock().expect("event sink lock poisoned").push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::EventKind;
    use chrono::Utc;
    use marketpulse_core::domain::{Action, Levels, MarketRegime, Signal, SignalId, SignalStatus, Strength, Timeframe};

    #[tokio::test]
    async fn publish_then_drain_returns_event_and_empties() {
        let sink = InMemoryEventSink::new();
        let signal = Signal {
            id: SignalId::for_signal("NIFTY50", "15m", 0),
            symbol: "NIFTY50".to_string(),
            timeframe: Timeframe::M15,
            timestamp: Utc::now(),
            current_price: 100.0,
            action: Action::Hold,
            confidence: 0.0,
            strength: Strength::VeryWeak,
            levels: Levels { entry: 100.0, stop_loss: 99.0, target1: 101.0, target2: 102.0, target3: 103.0, risk_reward_ratio: 1.0 },
            category_scores: vec![],
            total_score: 0.0,
            normalized_score: 0.0,
            market_regime: MarketRegime::unknown(),
            dynamic_weights: Default::default(),
            reasoning: vec![],
            alerts: vec![],
            status: SignalStatus::Active,
            performance: None,
            created_at: Utc::now(),
            expires_at: Utc::now(),
        };
        sink.publish(SignalEvent { kind: EventKind::Created, signal }).await;
        assert_eq!(sink.drain().len(), 1);
        assert_eq!(sink.drain().len(), 0);
    }
}
