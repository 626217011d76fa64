//! Volatility-family numeric engines: ATR/NATR, Bollinger, Keltner, Donchian,
//! historical volatility, choppiness index, mass index, Ulcer index.

use super::helpers::{closes, ema_series, highs, lows, rolling_max, rolling_min, sma_series, stddev_series, true_range, wilder_smooth};
use crate::domain::Candle;

pub fn atr(candles: &[Candle], period: usize) -> Vec<f64> {
    wilder_smooth(&true_range(candles), period)
}

/// ATR expressed as a percentage of closing price.
pub fn natr(candles: &[Candle], period: usize) -> Vec<f64> {
    let a = atr(candles, period);
    let c = closes(candles);
    a.iter()
        .zip(c.iter())
        .map(|(v, close)| if v.is_nan() || *close == 0.0 { f64::NAN } else { 100.0 * v / close })
        .collect()
}

/// Bollinger bands: (middle, upper, lower) at `num_std` standard deviations.
pub fn bollinger(candles: &[Candle], period: usize, num_std: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let c = closes(candles);
    let mid = sma_series(&c, period);
    let sd = stddev_series(&c, period);
    let upper: Vec<f64> = mid.iter().zip(sd.iter()).map(|(m, s)| m + num_std * s).collect();
    let lower: Vec<f64> = mid.iter().zip(sd.iter()).map(|(m, s)| m - num_std * s).collect();
    (mid, upper, lower)
}

/// Keltner channels: EMA midline +/- `multiplier` * ATR.
pub fn keltner(candles: &[Candle], ema_period: usize, atr_period: usize, multiplier: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mid = ema_series(&closes(candles), ema_period);
    let a = atr(candles, atr_period);
    let upper: Vec<f64> = mid.iter().zip(a.iter()).map(|(m, v)| m + multiplier * v).collect();
    let lower: Vec<f64> = mid.iter().zip(a.iter()).map(|(m, v)| m - multiplier * v).collect();
    (mid, upper, lower)
}

/// Donchian channels: rolling high/low band and their midpoint.
pub fn donchian(candles: &[Candle], period: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let upper = rolling_max(&highs(candles), period);
    let lower = rolling_min(&lows(candles), period);
    let mid: Vec<f64> = upper.iter().zip(lower.iter()).map(|(u, l)| (u + l) / 2.0).collect();
    (mid, upper, lower)
}

/// Annualized historical volatility from log returns (assumes `bars_per_year`
/// trading bars, e.g. 252 for daily data).
pub fn historical_volatility(candles: &[Candle], period: usize, bars_per_year: f64) -> Vec<f64> {
    let c = closes(candles);
    let n = c.len();
    let mut log_returns = vec![0.0; n];
    for i in 1..n {
        if c[i - 1] > 0.0 && c[i] > 0.0 {
            log_returns[i] = (c[i] / c[i - 1]).ln();
        }
    }
    let sd = stddev_series(&log_returns, period);
    sd.iter().map(|v| v * bars_per_year.sqrt() * 100.0).collect()
}

/// Choppiness index, in [0, 100]: high values mean range-bound, low values trend.
pub fn choppiness_index(candles: &[Candle], period: usize) -> Vec<f64> {
    let tr = true_range(candles);
    let h = highs(candles);
    let l = lows(candles);
    let n = candles.len();
    let mut out = vec![f64::NAN; n];
    if n < period {
        return out;
    }
    for i in (period - 1)..n {
        let tr_sum: f64 = tr[i + 1 - period..=i].iter().sum();
        let hh = h[i + 1 - period..=i].iter().cloned().fold(f64::MIN, f64::max);
        let ll = l[i + 1 - period..=i].iter().cloned().fold(f64::MAX, f64::min);
        let range = hh - ll;
        if range <= 0.0 || tr_sum <= 0.0 {
            continue;
        }
        out[i] = 100.0 * (tr_sum / range).log10() / (period as f64).log10();
    }
    out
}

/// Mass index: ratio of EMA9(high-low) to its double-EMA, summed over `period`.
pub fn mass_index(candles: &[Candle], period: usize) -> Vec<f64> {
    let ranges: Vec<f64> = candles.iter().map(|c| c.high - c.low).collect();
    let ema1 = ema_series(&ranges, 9);
    let filled: Vec<f64> = ema1.iter().map(|v| if v.is_nan() { 0.0 } else { *v }).collect();
    let ema2 = ema_series(&filled, 9);
    let ratio: Vec<f64> = ema1
        .iter()
        .zip(ema2.iter())
        .map(|(a, b)| if a.is_nan() || b.is_nan() || *b == 0.0 { f64::NAN } else { a / b })
        .collect();
    let n = ratio.len();
    let mut out = vec![f64::NAN; n];
    if n < period {
        return out;
    }
    for i in (period - 1)..n {
        let window = &ratio[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = window.iter().sum();
    }
    out
}

/// Ulcer index: RMS of percentage drawdowns from the rolling `period` high.
pub fn ulcer_index(candles: &[Candle], period: usize) -> Vec<f64> {
    let c = closes(candles);
    let highest = rolling_max(&c, period);
    let n = c.len();
    let mut drawdown_sq = vec![f64::NAN; n];
    for i in 0..n {
        if highest[i].is_nan() || highest[i] == 0.0 {
            continue;
        }
        let pct_dd = 100.0 * (c[i] - highest[i]) / highest[i];
        drawdown_sq[i] = pct_dd * pct_dd;
    }
    let mut out = vec![f64::NAN; n];
    if n < period {
        return out;
    }
    for i in (period - 1)..n {
        let window = &drawdown_sq[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = (window.iter().sum::<f64>() / period as f64).sqrt();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::make_candles;

    #[test]
    fn bollinger_upper_above_lower() {
        let candles = make_candles(&[100.0, 102.0, 98.0, 104.0, 96.0, 106.0, 94.0, 108.0]);
        let (mid, upper, lower) = bollinger(&candles, 5, 2.0);
        for i in 0..candles.len() {
            if !mid[i].is_nan() {
                assert!(upper[i] >= mid[i] && mid[i] >= lower[i]);
            }
        }
    }

    #[test]
    fn choppiness_index_bounded() {
        let candles = make_candles(&[100.0, 101.0, 99.0, 102.0, 98.0, 103.0, 97.0, 104.0, 96.0, 105.0]);
        let out = choppiness_index(&candles, 5);
        for v in out.iter() {
            if !v.is_nan() {
                assert!(*v >= 0.0 && *v <= 100.0);
            }
        }
    }

    #[test]
    fn donchian_band_contains_midpoint() {
        let candles = make_candles(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0]);
        let (mid, upper, lower) = donchian(&candles, 3);
        for i in 0..candles.len() {
            if !upper[i].is_nan() {
                assert!(upper[i] >= lower[i]);
                assert!((mid[i] - (upper[i] + lower[i]) / 2.0).abs() < 1e-9);
            }
        }
    }
}
