//! Support/resistance-family numeric engines: classic pivot points, rolling
//! swing zones, Fibonacci retracements, and previous-session high/low.

use crate::domain::Candle;

#[derive(Debug, Clone, Copy)]
pub struct PivotLevels {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

/// Classic floor-trader pivot points from the prior completed candle.
pub fn pivot_points(prev: &Candle) -> PivotLevels {
    let pivot = (prev.high + prev.low + prev.close) / 3.0;
    let r1 = 2.0 * pivot - prev.low;
    let s1 = 2.0 * pivot - prev.high;
    let r2 = pivot + (prev.high - prev.low);
    let s2 = pivot - (prev.high - prev.low);
    let r3 = prev.high + 2.0 * (pivot - prev.low);
    let s3 = prev.low - 2.0 * (prev.high - pivot);
    PivotLevels { pivot, r1, r2, r3, s1, s2, s3 }
}

#[derive(Debug, Clone, Copy)]
pub struct FibonacciLevels {
    pub level_0: f64,
    pub level_236: f64,
    pub level_382: f64,
    pub level_5: f64,
    pub level_618: f64,
    pub level_786: f64,
    pub level_1: f64,
}

/// Fibonacci retracement levels between a swing low and swing high.
pub fn fibonacci_retracement(swing_low: f64, swing_high: f64) -> FibonacciLevels {
    let range = swing_high - swing_low;
    FibonacciLevels {
        level_0: swing_high,
        level_236: swing_high - 0.236 * range,
        level_382: swing_high - 0.382 * range,
        level_5: swing_high - 0.5 * range,
        level_618: swing_high - 0.618 * range,
        level_786: swing_high - 0.786 * range,
        level_1: swing_low,
    }
}

/// Highest high / lowest low over the trailing `lookback` candles — the
/// rolling swing zone a breakout/bounce evaluator compares price against.
pub fn swing_zone(candles: &[Candle], lookback: usize) -> Option<(f64, f64)> {
    if candles.len() < lookback || lookback == 0 {
        return None;
    }
    let window = &candles[candles.len() - lookback..];
    let high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    Some((low, high))
}

/// High/low of the previous completed session, identified as the last
/// calendar-day boundary crossed in `candles`. Returns `None` when the
/// window holds only one session.
pub fn previous_session_high_low(candles: &[Candle]) -> Option<(f64, f64)> {
    if candles.len() < 2 {
        return None;
    }
    let last_day = candles.last()?.timestamp.date_naive();
    let prev_session: Vec<&Candle> = candles
        .iter()
        .filter(|c| c.timestamp.date_naive() != last_day)
        .collect();
    let last_prev_day = prev_session.last()?.timestamp.date_naive();
    let session_candles: Vec<&&Candle> = prev_session
        .iter()
        .filter(|c| c.timestamp.date_naive() == last_prev_day)
        .collect();
    if session_candles.is_empty() {
        return None;
    }
    let high = session_candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = session_candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    Some((low, high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::make_candles;

    #[test]
    fn pivot_points_r1_above_pivot_above_s1() {
        let prev = &make_candles(&[100.0, 105.0])[1];
        let levels = pivot_points(prev);
        assert!(levels.r1 > levels.pivot);
        assert!(levels.pivot > levels.s1);
    }

    #[test]
    fn fibonacci_levels_are_monotone() {
        let levels = fibonacci_retracement(90.0, 110.0);
        assert!(levels.level_0 > levels.level_236);
        assert!(levels.level_236 > levels.level_5);
        assert!(levels.level_5 > levels.level_1);
    }

    #[test]
    fn swing_zone_none_when_window_too_short() {
        let candles = make_candles(&[100.0, 101.0]);
        assert!(swing_zone(&candles, 10).is_none());
    }
}
