//! Orchestrates C1 → C2 → C3 → C4 into a single `Signal`. This is the pure,
//! synchronous core the generator loop (outside this crate) drives on a timer.

use chrono::{DateTime, Duration, Utc};

use crate::combiner::{self, CombinerOutput};
use crate::domain::{Candle, MarketRegime, Signal, SignalId, SignalStatus};
use crate::indicators::volatility as vol_indicators;
use crate::levels::{self, LevelsConfig};
use crate::registry::Registry;
use crate::regime_detector;

const ATR_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub levels: LevelsConfig,
    /// How long a freshly generated signal stays ACTIVE before the tracker
    /// expires it absent a terminal condition.
    pub signal_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            levels: LevelsConfig::default(),
            signal_ttl: Duration::hours(24),
        }
    }
}

/// Minimum candles the engine needs before it will attempt an evaluation —
/// the larger of the regime detector's window and a sane ATR warmup.
pub const MIN_CANDLES: usize = 50;

/// Run the full evaluation pipeline for one (symbol, timeframe) candle window
/// and produce a `Signal`. `candles` must be ordered ascending by time and
/// end at the bar being evaluated.
pub fn evaluate(registry: &Registry, candles: &[Candle], now: DateTime<Utc>, config: &EngineConfig) -> Option<Signal> {
    let last = candles.last()?;
    if candles.len() < MIN_CANDLES {
        return None;
    }

    let regime = regime_detector::detect(candles);
    let results = registry.evaluate_all(candles);
    let combined = combiner::combine(&results, &regime, registry);
    let atr = vol_indicators::atr(candles, ATR_PERIOD).last().copied().unwrap_or(0.0);
    let atr = if atr.is_nan() { 0.0 } else { atr };

    let (computed_levels, effective_action, level_alert) =
        levels::compute_levels(last.close, combined.action, atr, &config.levels);

    let mut alerts = combined.alerts;
    if let Some(a) = level_alert {
        alerts.push(a);
    }

    Some(build_signal(last, &regime, combined, effective_action, computed_levels, alerts, now, config))
}

fn build_signal(
    last: &Candle,
    regime: &MarketRegime,
    combined: CombinerOutput,
    effective_action: crate::domain::Action,
    computed_levels: crate::domain::Levels,
    alerts: Vec<String>,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Signal {
    let strength = crate::domain::Strength::from_magnitude(combined.total_score.abs());
    let dynamic_weights = combined
        .dynamic_weights
        .into_iter()
        .map(|(c, w)| (format!("{c:?}").to_lowercase(), w))
        .collect();

    Signal {
        id: SignalId::for_signal(&last.symbol, last.timeframe.as_str(), last.timestamp.timestamp_millis()),
        symbol: last.symbol.clone(),
        timeframe: last.timeframe,
        timestamp: last.timestamp,
        current_price: last.close,
        action: effective_action,
        confidence: combined.confidence,
        strength,
        levels: computed_levels,
        category_scores: combined.category_scores,
        total_score: combined.total_score,
        normalized_score: combined.confidence,
        market_regime: regime.clone(),
        dynamic_weights,
        reasoning: combined.reasoning,
        alerts,
        status: SignalStatus::Active,
        performance: None,
        created_at: now,
        expires_at: now + config.signal_ttl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::make_candles;

    #[test]
    fn evaluate_returns_none_below_min_candles() {
        let registry = Registry::with_defaults();
        let candles = make_candles(&[100.0, 101.0]);
        assert!(evaluate(&registry, &candles, Utc::now(), &EngineConfig::default()).is_none());
    }

    #[test]
    fn evaluate_produces_monotone_levels_for_directional_action() {
        let registry = Registry::with_defaults();
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64 * 1.2).collect();
        let candles = make_candles(&closes);
        let signal = evaluate(&registry, &candles, Utc::now(), &EngineConfig::default()).unwrap();
        assert!(signal.levels_are_monotone());
        assert!(signal.confidence >= 0.0 && signal.confidence <= 100.0);
    }
}
