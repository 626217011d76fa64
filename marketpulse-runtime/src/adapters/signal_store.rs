//! In-memory `SignalStore`: per-signal linearizability via a mutex keyed by
//! signal id (§5), enforced here with a single mutex over the whole map —
//! correct for the modest signal counts this system operates at.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use marketpulse_core::domain::{Signal, SignalId, SignalStatus};

use crate::error::StoreError;
use crate::traits::{SignalStore, TerminalFields};

#[derive(Default)]
pub struct InMemorySignalStore {
    signals: Mutex<HashMap<SignalId, Signal>>,
}

impl InMemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignalStore for InMemorySignalStore {
    async fn upsert_signal(&self, signal: &Signal) -> Result<(), StoreError> {
        let mut guard = self.signals.lock().map_err(|_| StoreError::Backend("poisoned lock".into()))?;
        guard.insert(signal.id, signal.clone());
        Ok(())
    }

    async fn find_active(&self) -> Result<Vec<Signal>, StoreError> {
        let guard = self.signals.lock().map_err(|_| StoreError::Backend("poisoned lock".into()))?;
        Ok(guard.values().filter(|s| s.status == SignalStatus::Active).cloned().collect())
    }

    async fn update_status(&self, id: SignalId, terminal: TerminalFields) -> Result<(), StoreError> {
        let mut guard = self.signals.lock().map_err(|_| StoreError::Backend("poisoned lock".into()))?;
        let signal = guard.get_mut(&id).ok_or_else(|| StoreError::NotFound(format!("{id:?}")))?;
        signal.status = terminal.status;
        signal.performance = Some(terminal.performance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use marketpulse_core::domain::{Action, Levels, MarketRegime, Strength};

    fn sample_signal() -> Signal {
        Signal {
            id: SignalId::for_signal("NIFTY50", "15m", 0),
            symbol: "NIFTY50".to_string(),
            timeframe: marketpulse_core::domain::Timeframe::M15,
            timestamp: Utc::now(),
            current_price: 100.0,
            action: Action::Hold,
            confidence: 10.0,
            strength: Strength::Weak,
            levels: Levels {
                entry: 100.0,
                stop_loss: 99.0,
                target1: 101.0,
                target2: 102.0,
                target3: 103.0,
                risk_reward_ratio: 1.0,
            },
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
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_id() {
        let store = InMemorySignalStore::new();
        let signal = sample_signal();
        store.upsert_signal(&signal).await.unwrap();
        store.upsert_signal(&signal).await.unwrap();
        let active = store.find_active().await.unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn update_status_moves_signal_out_of_active() {
        let store = InMemorySignalStore::new();
        let signal = sample_signal();
        let id = signal.id;
        store.upsert_signal(&signal).await.unwrap();

        let terminal = TerminalFields {
            status: SignalStatus::Expired,
            performance: marketpulse_core::domain::Performance::pending(),
        };
        store.update_status(id, terminal).await.unwrap();
        assert!(store.find_active().await.unwrap().is_empty());
    }
}
