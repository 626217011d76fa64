//! Regime detector (C2): classifies trend strength and volatility band from
//! a single candle window in one O(n) pass (§4.2).

use crate::domain::{Candle, MarketRegime, Regime, Volatility};
use crate::indicators::{helpers, trend, volatility as vol_indicators};

const ADX_PERIOD: usize = 14;
const CHOPPINESS_PERIOD: usize = 14;
const MIN_WINDOW: usize = 30;
const VOLATILITY_WINDOW: usize = 50;

/// Classify the market regime and volatility band for the trailing window.
/// Returns `MarketRegime::unknown()` when fewer than `MIN_WINDOW` candles are
/// available.
pub fn detect(candles: &[Candle]) -> MarketRegime {
    if candles.len() < MIN_WINDOW {
        return MarketRegime::unknown();
    }

    let (_, _, adx_series) = trend::adx_system(candles, ADX_PERIOD);
    let choppiness_series = vol_indicators::choppiness_index(candles, CHOPPINESS_PERIOD);

    let adx = match helpers::last_valid(&adx_series) {
        Some(v) => v,
        None => return MarketRegime::unknown(),
    };
    let choppiness = match helpers::last_valid(&choppiness_series) {
        Some(v) => v,
        None => return MarketRegime::unknown(),
    };

    let (regime, confidence) = classify_regime(adx, choppiness);
    let volatility = classify_volatility(candles);

    let interpretation = format!(
        "{regime:?} regime (ADX {adx:.1}, choppiness {choppiness:.1}), volatility {volatility:?}"
    );

    MarketRegime {
        regime,
        volatility,
        adx,
        choppiness_index: choppiness,
        confidence,
        interpretation,
    }
}

fn classify_regime(adx: f64, choppiness: f64) -> (Regime, f64) {
    if adx >= 30.0 && choppiness < 50.0 {
        let depth = ((adx - 30.0) / 30.0).min(1.0) + ((50.0 - choppiness) / 50.0).min(1.0);
        (Regime::StrongTrending, (50.0 + 25.0 * depth).min(100.0))
    } else if (20.0..30.0).contains(&adx) || (50.0..61.8).contains(&choppiness) {
        (Regime::WeakTrending, 55.0)
    } else if adx < 20.0 && choppiness >= 61.8 {
        let depth = ((20.0 - adx) / 20.0).min(1.0) + ((choppiness - 61.8) / 38.2).min(1.0);
        (Regime::Ranging, (50.0 + 25.0 * depth).min(100.0))
    } else {
        (Regime::WeakTrending, 35.0)
    }
}

fn classify_volatility(candles: &[Candle]) -> Volatility {
    let atr_period = 14;
    let atr_series = vol_indicators::atr(candles, atr_period);
    let valid: Vec<f64> = atr_series.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.len() < VOLATILITY_WINDOW.min(valid.len()) || valid.is_empty() {
        return Volatility::Unknown;
    }
    let window = &valid[valid.len().saturating_sub(VOLATILITY_WINDOW)..];
    let mut sorted = window.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let current = *valid.last().unwrap();
    let percentile = percentile_rank(&sorted, current);

    match percentile {
        p if p >= 0.90 => Volatility::VeryHigh,
        p if p >= 0.70 => Volatility::High,
        p if p >= 0.55 => Volatility::Elevated,
        p if p >= 0.30 => Volatility::Normal,
        p if p >= 0.10 => Volatility::Low,
        _ => Volatility::VeryLow,
    }
}

fn percentile_rank(sorted: &[f64], value: f64) -> f64 {
    if sorted.is_empty() {
        return 0.5;
    }
    let below = sorted.iter().filter(|v| **v <= value).count();
    below as f64 / sorted.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::make_candles;

    #[test]
    fn unknown_when_window_too_short() {
        let candles = make_candles(&[100.0, 101.0, 102.0]);
        let regime = detect(&candles);
        assert_eq!(regime.regime, Regime::Unknown);
        assert_eq!(regime.confidence, 0.0);
    }

    #[test]
    fn strong_trend_detected_in_persistent_uptrend() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64 * 3.0).collect();
        let candles = make_candles(&closes);
        let regime = detect(&candles);
        assert_ne!(regime.regime, Regime::Unknown);
        assert!(regime.confidence > 0.0);
    }

    #[test]
    fn ranging_detected_in_oscillating_series() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.9).sin() * 2.0).collect();
        let candles = make_candles(&closes);
        let regime = detect(&candles);
        assert_ne!(regime.regime, Regime::Unknown);
    }
}
