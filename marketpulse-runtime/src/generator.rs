//! Generator Loop (C5): per-(symbol, timeframe) slot state machine, driven
//! on a `tokio::time::interval`. Dispatch across symbols is bounded by a
//! semaphore-backed worker pool (§5).

use std::time::{Duration, Instant};

use chrono::Utc;
use marketpulse_core::domain::{Signal, Timeframe};
use marketpulse_core::engine::{self, EngineConfig};
use marketpulse_core::registry::Registry;
use rand::Rng;
use tracing::{info, instrument, warn};

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;
use crate::traits::{CandleSource, EventKind, EventSink, SignalEvent, SignalStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Idle,
    Fetching,
    Evaluating,
    Persisting,
    Cooldown,
}

/// One (symbol, timeframe) generator slot. Actions within a slot are
/// strictly serialized — if a tick overruns, the next is skipped and
/// `overrun_count` increments (§5).
pub struct GeneratorSlot {
    pub symbol: String,
    pub timeframe: Timeframe,
    state: SlotState,
    last_tick_at: Option<Instant>,
    overrun_count: u64,
    /// Set on fetch failure/timeout; ticks are skipped until this elapses, so
    /// many symbols failing against the same unreachable source don't all
    /// retry in lockstep.
    backoff_until: Option<Instant>,
}

impl GeneratorSlot {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            state: SlotState::Idle,
            last_tick_at: None,
            overrun_count: 0,
            backoff_until: None,
        }
    }

    fn is_backing_off(&self) -> bool {
        self.backoff_until.is_some_and(|until| Instant::now() < until)
    }

    fn enter_backoff(&mut self, base: Duration) {
        let jitter_ms = rand::thread_rng().gen_range(0..=base.as_millis() as u64 / 2 + 1);
        self.backoff_until = Some(Instant::now() + base + Duration::from_millis(jitter_ms));
    }
}

/// One tick of the generator loop for a single slot. Returns `Some(Signal)`
/// if a new signal was produced and persisted, `None` if the tick produced
/// no signal (insufficient data, fetch failure, below dedup threshold, or
/// below `min_confidence_to_emit`).
#[instrument(skip(slot, source, store, sink, registry, config), fields(symbol = %slot.symbol, timeframe = %slot.timeframe))]
pub async fn tick<S, T, E>(
    slot: &mut GeneratorSlot,
    source: &S,
    store: &T,
    sink: &E,
    registry: &Registry,
    config: &RuntimeConfig,
) -> Option<Signal>
where
    S: CandleSource,
    T: SignalStore,
    E: EventSink,
{
    // COOLDOWN is a resting state between ticks, not in-flight work — the
    // next timer firing simply resumes the slot. Only FETCHING/EVALUATING/
    // PERSISTING indicate the previous tick hasn't finished yet.
    match slot.state {
        SlotState::Idle | SlotState::Cooldown => {}
        SlotState::Fetching | SlotState::Evaluating | SlotState::Persisting => {
            slot.overrun_count += 1;
            warn!(overrun_count = slot.overrun_count, "generator tick overrun, previous tick still in flight");
            return None;
        }
    }

    if slot.is_backing_off() {
        info!("slot still backing off after a recent fetch failure, skipping tick");
        return None;
    }

    slot.state = SlotState::Fetching;
    slot.last_tick_at = Some(Instant::now());

    let fetch = tokio::time::timeout(
        config.fetch_timeout(),
        source.fetch(&slot.symbol, slot.timeframe, None, Some(engine::MIN_CANDLES * 2)),
    )
    .await;

    let candles = match fetch {
        Ok(Ok(candles)) => candles,
        Ok(Err(e)) => {
            warn!(error = %e, "candle fetch failed, slot entering cooldown");
            slot.state = SlotState::Cooldown;
            slot.enter_backoff(config.fetch_timeout());
            return None;
        }
        Err(_) => {
            warn!(timeout_secs = config.fetch_timeout_seconds, "candle fetch timed out, slot entering cooldown");
            slot.state = SlotState::Cooldown;
            slot.enter_backoff(config.fetch_timeout());
            return None;
        }
    };

    if candles.len() < config.min_candles_required {
        info!(count = candles.len(), "insufficient candles, skipping tick");
        slot.state = SlotState::Idle;
        return None;
    }

    slot.state = SlotState::Evaluating;
    let engine_config = EngineConfig {
        levels: marketpulse_core::levels::LevelsConfig {
            stop_multiplier: config.stop_multiplier,
            min_stop_percent: config.min_stop_percent,
            ..Default::default()
        },
        signal_ttl: chrono::Duration::seconds(config.expiry_seconds as i64),
    };

    let signal = match engine::evaluate(registry, &candles, Utc::now(), &engine_config) {
        Some(s) => s,
        None => {
            slot.state = SlotState::Idle;
            return None;
        }
    };

    if signal.confidence < config.min_confidence_to_emit {
        info!(confidence = signal.confidence, "below minimum confidence to emit, skipping persistence");
        slot.state = SlotState::Idle;
        return None;
    }

    if !signal.levels_are_monotone() {
        let err = RuntimeError::InvariantViolation("entry/stop/target levels are not monotone for this action".to_string());
        warn!(error = %err, "refusing to persist a signal with malformed levels");
        slot.state = SlotState::Idle;
        return None;
    }

    if should_dedup(store, &signal, config).await {
        info!("duplicate of recent active signal, skipping persistence");
        slot.state = SlotState::Idle;
        return None;
    }

    slot.state = SlotState::Persisting;
    if let Err(e) = store.upsert_signal(&signal).await {
        warn!(error = %e, "failed to persist signal");
        slot.state = SlotState::Cooldown;
        return None;
    }

    sink.publish(SignalEvent { kind: EventKind::Created, signal: signal.clone() }).await;

    slot.state = SlotState::Idle;
    Some(signal)
}

/// Dedup rule (§4.5): skip persistence if the most recent ACTIVE signal for
/// this symbol/timeframe is younger than the refresh interval, has the same
/// action, and is within an epsilon confidence band.
async fn should_dedup<T: SignalStore>(store: &T, candidate: &Signal, config: &RuntimeConfig) -> bool {
    const CONFIDENCE_EPSILON: f64 = 2.0;

    let active = match store.find_active().await {
        Ok(active) => active,
        Err(_) => return false,
    };

    active.iter().any(|existing| {
        existing.symbol == candidate.symbol
            && existing.timeframe == candidate.timeframe
            && existing.action == candidate.action
            && (existing.confidence - candidate.confidence).abs() < CONFIDENCE_EPSILON
            && (candidate.timestamp - existing.timestamp).num_seconds() < config.refresh_interval_seconds as i64
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_slot_starts_idle() {
        let slot = GeneratorSlot::new("NIFTY50", Timeframe::M15);
        assert_eq!(slot.state, SlotState::Idle);
        assert_eq!(slot.overrun_count, 0);
    }
}
