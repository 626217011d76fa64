//! Signal Tracker (C6): fixed-cadence sweep over every ACTIVE signal,
//! resolving terminal conditions in strict priority order.

use marketpulse_core::domain::{Candle, Outcome, Performance, Signal, SignalStatus, TargetHit};
use tracing::{info, instrument, warn};

use crate::config::{RuntimeConfig, StopVsTargetTieBreak};
use crate::error::RuntimeError;
use crate::traits::{CandleSource, Clock, EventKind, EventSink, SignalEvent, SignalStore, TerminalFields};

/// Outcome of evaluating one signal's terminal conditions against its latest
/// candle. `None` means the signal remains ACTIVE this tick.
#[derive(Debug, Clone)]
struct Resolution {
    status: SignalStatus,
    target_hit: TargetHit,
    exit_price: f64,
}

/// One tracker tick: advance every active signal that has a terminal
/// condition, leave the rest untouched. Two signals for the same symbol may
/// be advanced concurrently; a single signal is only advanced once per tick
/// by construction (each is visited once here).
#[instrument(skip_all)]
pub async fn tick<T, C, E, S>(store: &T, clock: &C, sink: &E, source: &S, config: &RuntimeConfig)
where
    T: SignalStore,
    C: Clock,
    E: EventSink,
    S: CandleSource,
{
    let active = match store.find_active().await {
        Ok(signals) => signals,
        Err(e) => {
            warn!(error = %e, "failed to load active signals for tracker tick");
            return;
        }
    };

    for signal in active {
        let latest = source.fetch(&signal.symbol, signal.timeframe, None, Some(1)).await;
        let latest_candle = match latest {
            Ok(candles) => match candles.last() {
                Some(c) => c.clone(),
                None => continue,
            },
            Err(e) => {
                warn!(error = %e, symbol = %signal.symbol, "tracker could not fetch latest candle");
                continue;
            }
        };
        advance_signal(&signal, &latest_candle, store, clock, sink, config).await;
    }
}

/// Evaluate one signal's terminal conditions against its latest candle and,
/// if terminal, persist the transition and publish the event. Exposed
/// separately from `tick` so callers can supply the latest candle per
/// symbol without this crate owning a candle cache.
pub async fn advance_signal<T, C, E>(
    signal: &Signal,
    latest_candle: &Candle,
    store: &T,
    clock: &C,
    sink: &E,
    config: &RuntimeConfig,
) -> Option<SignalStatus>
where
    T: SignalStore,
    C: Clock,
    E: EventSink,
{
    let resolution = resolve_terminal_condition(signal, latest_candle, clock, config)?;

    let direction_sign = signal.action.direction_sign();
    let profit_loss = (resolution.exit_price - signal.levels.entry) * direction_sign;
    let profit_loss_percent = if signal.levels.entry != 0.0 {
        profit_loss / signal.levels.entry * 100.0
    } else {
        0.0
    };

    let outcome = match resolution.status {
        SignalStatus::HitTarget => Outcome::Win,
        SignalStatus::HitSl => Outcome::Loss,
        SignalStatus::ClosedProfit => Outcome::Win,
        SignalStatus::ClosedLoss => Outcome::Loss,
        SignalStatus::Expired => Outcome::Pending,
        SignalStatus::Active => unreachable!("resolve_terminal_condition only returns terminal statuses"),
    };

    let performance = Performance {
        outcome,
        exit_price: Some(resolution.exit_price),
        exit_time: Some(latest_candle.timestamp),
        target_hit: resolution.target_hit,
        profit_loss: Some(profit_loss),
        profit_loss_percent: Some(profit_loss_percent),
        remarks: Some(remarks_for(resolution.status, resolution.target_hit)),
    };

    if let Err(e) = store
        .update_status(signal.id, TerminalFields { status: resolution.status, performance: performance.clone() })
        .await
    {
        warn!(error = %e, symbol = %signal.symbol, "failed to persist terminal transition");
        return None;
    }

    let mut terminal_signal = signal.clone();
    terminal_signal.status = resolution.status;
    terminal_signal.performance = Some(performance);
    let event_kind = if resolution.status == SignalStatus::Expired {
        EventKind::Expired
    } else {
        EventKind::Terminated
    };
    sink.publish(SignalEvent { kind: event_kind, signal: terminal_signal }).await;

    info!(symbol = %signal.symbol, status = ?resolution.status, "signal reached terminal state");
    Some(resolution.status)
}

fn remarks_for(status: SignalStatus, target_hit: TargetHit) -> String {
    match status {
        SignalStatus::HitSl => "stop-loss hit".to_string(),
        SignalStatus::HitTarget => format!("{target_hit:?} reached"),
        SignalStatus::ClosedProfit => "closed profitable at market close".to_string(),
        SignalStatus::ClosedLoss => "closed at a loss at market close".to_string(),
        SignalStatus::Expired => "expired before reaching a terminal price level".to_string(),
        SignalStatus::Active => unreachable!(),
    }
}

/// Priority order (§4.6): stop-loss, then target (T3 > T2 > T1), then market
/// close, then timeout. Returns `None` if the signal stays ACTIVE.
fn resolve_terminal_condition(signal: &Signal, candle: &Candle, clock: &dyn Clock, config: &RuntimeConfig) -> Option<Resolution> {
    if !signal.action.is_buy_family() && !signal.action.is_sell_family() {
        return resolve_non_directional(signal, candle, clock, config);
    }

    let is_buy = signal.action.is_buy_family();
    let levels = &signal.levels;

    let sl_hit = if is_buy { candle.low <= levels.stop_loss } else { candle.high >= levels.stop_loss };
    let t3_hit = if is_buy { candle.high >= levels.target3 } else { candle.low <= levels.target3 };
    let t2_hit = if is_buy { candle.high >= levels.target2 } else { candle.low <= levels.target2 };
    let t1_hit = if is_buy { candle.high >= levels.target1 } else { candle.low <= levels.target1 };

    if sl_hit && (t1_hit || t2_hit || t3_hit) {
        match config.stop_vs_target_tie_break {
            StopVsTargetTieBreak::Conservative => {
                return Some(Resolution { status: SignalStatus::HitSl, target_hit: TargetHit::StopLoss, exit_price: levels.stop_loss });
            }
            StopVsTargetTieBreak::Aggressive => {
                return Some(target_resolution(levels, t1_hit, t2_hit, t3_hit));
            }
            StopVsTargetTieBreak::TimestampOrder => {
                let close_favored_target = if is_buy { candle.close > levels.entry } else { candle.close < levels.entry };
                return Some(if close_favored_target {
                    target_resolution(levels, t1_hit, t2_hit, t3_hit)
                } else {
                    Resolution { status: SignalStatus::HitSl, target_hit: TargetHit::StopLoss, exit_price: levels.stop_loss }
                });
            }
        }
    }

    if sl_hit {
        return Some(Resolution { status: SignalStatus::HitSl, target_hit: TargetHit::StopLoss, exit_price: levels.stop_loss });
    }
    if t1_hit || t2_hit || t3_hit {
        return Some(target_resolution(levels, t1_hit, t2_hit, t3_hit));
    }

    resolve_non_directional(signal, candle, clock, config)
}

fn target_resolution(levels: &marketpulse_core::domain::Levels, t1: bool, t2: bool, t3: bool) -> Resolution {
    if t3 {
        Resolution { status: SignalStatus::HitTarget, target_hit: TargetHit::Target3, exit_price: levels.target3 }
    } else if t2 {
        Resolution { status: SignalStatus::HitTarget, target_hit: TargetHit::Target2, exit_price: levels.target2 }
    } else {
        debug_assert!(t1);
        Resolution { status: SignalStatus::HitTarget, target_hit: TargetHit::Target1, exit_price: levels.target1 }
    }
}

fn resolve_non_directional(signal: &Signal, candle: &Candle, clock: &dyn Clock, config: &RuntimeConfig) -> Option<Resolution> {
    match clock.is_session_open(&signal.symbol, candle.timestamp) {
        Some(false) => {
            let direction_sign = signal.action.direction_sign();
            let pnl_sign = (candle.close - signal.levels.entry) * direction_sign;
            let status = if pnl_sign >= 0.0 { SignalStatus::ClosedProfit } else { SignalStatus::ClosedLoss };
            Some(Resolution { status, target_hit: TargetHit::MarketClose, exit_price: candle.close })
        }
        Some(true) => {
            let age_seconds = (candle.timestamp - signal.created_at).num_seconds().max(0) as u64;
            if age_seconds > config.expiry_seconds {
                Some(Resolution { status: SignalStatus::Expired, target_hit: TargetHit::None, exit_price: candle.close })
            } else {
                None
            }
        }
        None => {
            let err = RuntimeError::ClockUnknown { symbol: signal.symbol.clone() };
            warn!(error = %err, "holding signal without a close/expire decision this tick");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedSessionClock, InMemoryEventSink, InMemorySignalStore};
    use crate::config::SessionWindow;
    use chrono::Utc;
    use marketpulse_core::domain::{Action, Levels, MarketRegime, SignalId, Strength, Timeframe};
    use std::collections::HashMap;

    fn sample_signal(action: Action) -> Signal {
        Signal {
            id: SignalId::for_signal("NIFTY50", "15m", 0),
            symbol: "NIFTY50".to_string(),
            timeframe: Timeframe::M15,
            timestamp: Utc::now(),
            current_price: 100.0,
            action,
            confidence: 80.0,
            strength: Strength::Strong,
            levels: Levels { entry: 100.0, stop_loss: 95.0, target1: 105.0, target2: 110.0, target3: 115.0, risk_reward_ratio: 1.0 },
            category_scores: vec![],
            total_score: 80.0,
            normalized_score: 80.0,
            market_regime: MarketRegime::unknown(),
            dynamic_weights: Default::default(),
            reasoning: vec![],
            alerts: vec![],
            status: SignalStatus::Active,
            performance: None,
            created_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::hours(4),
        }
    }

    fn candle_at(close: f64, high: f64, low: f64) -> Candle {
        Candle { symbol: "NIFTY50".to_string(), timeframe: Timeframe::M15, timestamp: Utc::now(), open: close, high, low, close, volume: 1000.0 }
    }

    #[tokio::test]
    async fn stop_loss_wins_tie_with_target_under_conservative_policy() {
        let signal = sample_signal(Action::Buy);
        let candle = candle_at(102.0, 106.0, 93.0); // covers both SL (95) and T1 (105)
        let store = InMemorySignalStore::new();
        store.upsert_signal(&signal).await.unwrap();
        let mut sessions = HashMap::new();
        sessions.insert("NIFTY50".to_string(), SessionWindow { open_minute: 0, close_minute: 24 * 60 });
        let clock = FixedSessionClock::new(sessions);
        let sink = InMemoryEventSink::new();
        let config = RuntimeConfig::default();

        let status = advance_signal(&signal, &candle, &store, &clock, &sink, &config).await;
        assert_eq!(status, Some(SignalStatus::HitSl));
    }

    #[tokio::test]
    async fn target3_credited_over_target1_and_target2() {
        let signal = sample_signal(Action::Buy);
        let candle = candle_at(116.0, 120.0, 99.0);
        let store = InMemorySignalStore::new();
        store.upsert_signal(&signal).await.unwrap();
        let mut sessions = HashMap::new();
        sessions.insert("NIFTY50".to_string(), SessionWindow { open_minute: 0, close_minute: 24 * 60 });
        let clock = FixedSessionClock::new(sessions);
        let sink = InMemoryEventSink::new();
        let config = RuntimeConfig::default();

        let status = advance_signal(&signal, &candle, &store, &clock, &sink, &config).await;
        assert_eq!(status, Some(SignalStatus::HitTarget));

        let events = sink.drain();
        assert_eq!(events.len(), 1);
        let performance = events[0].signal.performance.as_ref().expect("terminal signal carries performance");
        assert_eq!(performance.target_hit, TargetHit::Target3);
    }

    #[tokio::test]
    async fn clock_unknown_holds_without_deciding() {
        let signal = sample_signal(Action::Buy);
        let candle = candle_at(101.0, 102.0, 99.0);
        let store = InMemorySignalStore::new();
        store.upsert_signal(&signal).await.unwrap();
        let clock = FixedSessionClock::new(HashMap::new());
        let sink = InMemoryEventSink::new();
        let config = RuntimeConfig::default();

        let status = advance_signal(&signal, &candle, &store, &clock, &sink, &config).await;
        assert_eq!(status, None);
    }
}
