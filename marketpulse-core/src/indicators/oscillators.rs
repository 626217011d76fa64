//! Momentum/oscillator-family numeric engines: RSI, stochastic, CCI,
//! Williams %R, MFI, TSI, ROC, raw momentum.

use super::helpers::{closes, ema_series, highs, lows, rolling_max, rolling_min, typical_prices, volumes};
use crate::domain::Candle;

/// Classic Wilder RSI. Seed window is the first `period` price changes.
pub fn rsi(candles: &[Candle], period: usize) -> Vec<f64> {
    let c = closes(candles);
    let n = c.len();
    let mut result = vec![f64::NAN; n];
    if n < period + 1 {
        return result;
    }
    let mut changes = vec![0.0; n];
    for i in 1..n {
        changes[i] = c[i] - c[i - 1];
    }
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for &ch in &changes[1..=period] {
        if ch > 0.0 {
            avg_gain += ch;
        } else {
            avg_loss -= ch;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    result[period] = rsi_from_averages(avg_gain, avg_loss);
    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        let gain = changes[i].max(0.0);
        let loss = (-changes[i]).max(0.0);
        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
        result[i] = rsi_from_averages(avg_gain, avg_loss);
    }
    result
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain == 0.0 && avg_loss == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Stochastic %K and %D (smoothed with a `d_period`-length simple average).
pub fn stochastic(candles: &[Candle], k_period: usize, d_period: usize) -> (Vec<f64>, Vec<f64>) {
    let h = highs(candles);
    let l = lows(candles);
    let c = closes(candles);
    let hh = rolling_max(&h, k_period);
    let ll = rolling_min(&l, k_period);
    let n = c.len();
    let mut pct_k = vec![f64::NAN; n];
    for i in 0..n {
        if hh[i].is_nan() || ll[i].is_nan() {
            continue;
        }
        let range = hh[i] - ll[i];
        pct_k[i] = if range == 0.0 { 50.0 } else { 100.0 * (c[i] - ll[i]) / range };
    }
    let pct_d = super::helpers::sma_series(&pct_k.iter().map(|v| if v.is_nan() { 0.0 } else { *v }).collect::<Vec<_>>(), d_period);
    let pct_d: Vec<f64> = pct_d
        .iter()
        .zip(pct_k.iter())
        .map(|(d, k)| if k.is_nan() { f64::NAN } else { *d })
        .collect();
    (pct_k, pct_d)
}

/// Commodity Channel Index. Constant 0.015 per Lambert's original formula.
pub fn cci(candles: &[Candle], period: usize) -> Vec<f64> {
    let tp = typical_prices(candles);
    let sma = super::helpers::sma_series(&tp, period);
    let n = tp.len();
    let mut out = vec![f64::NAN; n];
    if n < period {
        return out;
    }
    for i in (period - 1)..n {
        if sma[i].is_nan() {
            continue;
        }
        let window = &tp[i + 1 - period..=i];
        let mean_dev = window.iter().map(|v| (v - sma[i]).abs()).sum::<f64>() / period as f64;
        out[i] = if mean_dev == 0.0 { 0.0 } else { (tp[i] - sma[i]) / (0.015 * mean_dev) };
    }
    out
}

/// Williams %R, in [-100, 0].
pub fn williams_r(candles: &[Candle], period: usize) -> Vec<f64> {
    let h = highs(candles);
    let l = lows(candles);
    let c = closes(candles);
    let hh = rolling_max(&h, period);
    let ll = rolling_min(&l, period);
    c.iter()
        .enumerate()
        .map(|(i, close)| {
            if hh[i].is_nan() || ll[i].is_nan() {
                f64::NAN
            } else {
                let range = hh[i] - ll[i];
                if range == 0.0 {
                    -50.0
                } else {
                    -100.0 * (hh[i] - close) / range
                }
            }
        })
        .collect()
}

/// Money Flow Index: volume-weighted RSI analogue over typical price.
pub fn mfi(candles: &[Candle], period: usize) -> Vec<f64> {
    let tp = typical_prices(candles);
    let vol = volumes(candles);
    let n = tp.len();
    let mut raw_flow = vec![0.0; n];
    for i in 0..n {
        raw_flow[i] = tp[i] * vol[i];
    }
    let mut out = vec![f64::NAN; n];
    if n < period + 1 {
        return out;
    }
    for i in period..n {
        let mut pos = 0.0;
        let mut neg = 0.0;
        for j in (i - period + 1)..=i {
            if tp[j] > tp[j - 1] {
                pos += raw_flow[j];
            } else if tp[j] < tp[j - 1] {
                neg += raw_flow[j];
            }
        }
        out[i] = if neg == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + pos / neg)
        };
    }
    out
}

/// True Strength Index: double-smoothed momentum divided by double-smoothed
/// absolute momentum, in roughly [-100, 100].
pub fn tsi(candles: &[Candle], long: usize, short: usize) -> Vec<f64> {
    let c = closes(candles);
    let n = c.len();
    let mut momentum = vec![0.0; n];
    let mut abs_momentum = vec![0.0; n];
    for i in 1..n {
        let delta = c[i] - c[i - 1];
        momentum[i] = delta;
        abs_momentum[i] = delta.abs();
    }
    let smoothed_momentum = ema_series(&ema_series(&momentum, long), short);
    let smoothed_abs = ema_series(&ema_series(&abs_momentum, long), short);
    smoothed_momentum
        .iter()
        .zip(smoothed_abs.iter())
        .map(|(m, a)| {
            if m.is_nan() || a.is_nan() || *a == 0.0 {
                f64::NAN
            } else {
                100.0 * m / a
            }
        })
        .collect()
}

/// Rate of change, as a percentage of the price `period` bars ago.
pub fn roc(candles: &[Candle], period: usize) -> Vec<f64> {
    let c = closes(candles);
    let n = c.len();
    let mut out = vec![f64::NAN; n];
    for i in period..n {
        if c[i - period] != 0.0 {
            out[i] = 100.0 * (c[i] - c[i - period]) / c[i - period];
        }
    }
    out
}

/// Raw price momentum: close[t] - close[t - period].
pub fn momentum(candles: &[Candle], period: usize) -> Vec<f64> {
    let c = closes(candles);
    let n = c.len();
    let mut out = vec![f64::NAN; n];
    for i in period..n {
        out[i] = c[i] - c[i - period];
    }
    out
}
