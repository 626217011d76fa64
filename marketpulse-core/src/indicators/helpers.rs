//! Shared numeric primitives reused across indicator families.
//!
//! Every function here takes a candle window (oldest first) and returns a
//! `Vec<f64>` series of the same length, with `f64::NAN` marking the warmup
//! region — the same convention the scalar-returning functions in the
//! `indicators` submodules build on.

use crate::domain::Candle;

/// True Range: max(high-low, |high-prev_close|, |low-prev_close|). TR[0] has
/// no previous close and is left as plain high-low range.
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let n = candles.len();
    let mut tr = vec![f64::NAN; n];
    if n == 0 {
        return tr;
    }
    tr[0] = candles[0].high - candles[0].low;
    for i in 1..n {
        let h = candles[i].high;
        let l = candles[i].low;
        let pc = candles[i - 1].close;
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }
    tr
}

/// Wilder smoothing (EMA with alpha = 1/period). Seed is the mean of the
/// first `period` values starting at index 0.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    if values[..period].iter().any(|v| v.is_nan()) {
        return result;
    }
    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = seed;
    let alpha = 1.0 / period as f64;
    let mut prev = seed;
    for i in period..n {
        if values[i].is_nan() {
            return result;
        }
        let smoothed = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = smoothed;
        prev = smoothed;
    }
    result
}

/// Simple moving average series. First `period - 1` entries are NaN.
pub fn sma_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }
    let mut window_sum: f64 = values[..period].iter().sum();
    out[period - 1] = window_sum / period as f64;
    for i in period..n {
        window_sum += values[i] - values[i - period];
        out[i] = window_sum / period as f64;
    }
    out
}

/// Exponential moving average series, seeded with the SMA of the first window.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }
    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = seed;
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = seed;
    for (i, out_slot) in out.iter_mut().enumerate().skip(period) {
        let smoothed = alpha * values[i] + (1.0 - alpha) * prev;
        *out_slot = smoothed;
        prev = smoothed;
    }
    out
}

/// Rolling population standard deviation.
pub fn stddev_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
        out[i] = var.sqrt();
    }
    out
}

/// Rolling max/min over a trailing window.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(values, period, f64::max, f64::MIN)
}

pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(values, period, f64::min, f64::MAX)
}

fn rolling_extreme(values: &[f64], period: usize, op: fn(f64, f64) -> f64, identity: f64) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        out[i] = window.iter().fold(identity, |acc, &v| op(acc, v));
    }
    out
}

pub fn highs(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.high).collect()
}

pub fn lows(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.low).collect()
}

pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

pub fn volumes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.volume).collect()
}

pub fn typical_prices(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .map(|c| (c.high + c.low + c.close) / 3.0)
        .collect()
}

/// Last non-NaN value in a series, if any.
pub fn last_valid(series: &[f64]) -> Option<f64> {
    series.iter().rev().copied().find(|v| !v.is_nan())
}
