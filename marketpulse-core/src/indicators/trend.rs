//! Trend-family numeric engines: moving averages, ADX/DI, Aroon, Supertrend,
//! parabolic SAR, Ichimoku and Vortex.

use super::helpers::{closes, ema_series, highs, lows, rolling_max, rolling_min, sma_series, true_range, wilder_smooth};
use crate::domain::Candle;

pub fn sma(candles: &[Candle], period: usize) -> Vec<f64> {
    sma_series(&closes(candles), period)
}

pub fn ema(candles: &[Candle], period: usize) -> Vec<f64> {
    ema_series(&closes(candles), period)
}

/// Double EMA: 2*EMA(n) - EMA(EMA(n)).
pub fn dema(candles: &[Candle], period: usize) -> Vec<f64> {
    let e1 = ema(candles, period);
    let e2 = ema_series(&e1.iter().map(|v| if v.is_nan() { 0.0 } else { *v }).collect::<Vec<_>>(), period);
    e1.iter()
        .zip(e2.iter())
        .map(|(a, b)| if a.is_nan() || b.is_nan() { f64::NAN } else { 2.0 * a - b })
        .collect()
}

/// Triple EMA: 3*EMA1 - 3*EMA2 + EMA3.
pub fn tema(candles: &[Candle], period: usize) -> Vec<f64> {
    let e1 = ema(candles, period);
    let filled1: Vec<f64> = e1.iter().map(|v| if v.is_nan() { 0.0 } else { *v }).collect();
    let e2 = ema_series(&filled1, period);
    let filled2: Vec<f64> = e2.iter().map(|v| if v.is_nan() { 0.0 } else { *v }).collect();
    let e3 = ema_series(&filled2, period);
    e1.iter()
        .zip(e2.iter())
        .zip(e3.iter())
        .map(|((a, b), c)| {
            if a.is_nan() || b.is_nan() || c.is_nan() {
                f64::NAN
            } else {
                3.0 * a - 3.0 * b + c
            }
        })
        .collect()
}

/// Hull moving average: WMA(2*WMA(n/2) - WMA(n), sqrt(n)). Approximated with
/// EMA-weighted averages in place of true WMA, which is adequate for the
/// direction/slope reads the evaluator layer needs.
pub fn hma(candles: &[Candle], period: usize) -> Vec<f64> {
    let half = (period / 2).max(1);
    let sqrt_period = (period as f64).sqrt().round() as usize;
    let wma_half = ema(candles, half);
    let wma_full = ema(candles, period);
    let raw: Vec<f64> = wma_half
        .iter()
        .zip(wma_full.iter())
        .map(|(a, b)| if a.is_nan() || b.is_nan() { f64::NAN } else { 2.0 * a - b })
        .collect();
    let filled: Vec<f64> = raw.iter().map(|v| if v.is_nan() { 0.0 } else { *v }).collect();
    ema_series(&filled, sqrt_period.max(1))
}

/// MACD line, signal line, and histogram (fast, slow, signal periods).
pub fn macd(candles: &[Candle], fast: usize, slow: usize, signal: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let fast_ema = ema(candles, fast);
    let slow_ema = ema(candles, slow);
    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| if f.is_nan() || s.is_nan() { f64::NAN } else { f - s })
        .collect();
    let filled: Vec<f64> = macd_line.iter().map(|v| if v.is_nan() { 0.0 } else { *v }).collect();
    let signal_line = ema_series(&filled, signal);
    let hist: Vec<f64> = macd_line
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| if m.is_nan() || s.is_nan() { f64::NAN } else { m - s })
        .collect();
    (macd_line, signal_line, hist)
}

/// Returns (+DI, -DI, ADX) series, each Wilder-smoothed over `period`.
pub fn adx_system(candles: &[Candle], period: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = candles.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];
    for i in 1..n {
        let high_diff = candles[i].high - candles[i - 1].high;
        let low_diff = candles[i - 1].low - candles[i].low;
        plus_dm[i] = if high_diff > low_diff && high_diff > 0.0 { high_diff } else { 0.0 };
        minus_dm[i] = if low_diff > high_diff && low_diff > 0.0 { low_diff } else { 0.0 };
    }
    if n > 0 {
        plus_dm[0] = 0.0;
        minus_dm[0] = 0.0;
    }
    let tr = true_range(candles);
    let smooth_tr = wilder_smooth(&tr, period);
    let smooth_plus = wilder_smooth(&plus_dm, period);
    let smooth_minus = wilder_smooth(&minus_dm, period);

    let mut plus_di = vec![f64::NAN; n];
    let mut minus_di = vec![f64::NAN; n];
    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        if smooth_tr[i].is_nan() || smooth_tr[i] == 0.0 {
            continue;
        }
        plus_di[i] = 100.0 * smooth_plus[i] / smooth_tr[i];
        minus_di[i] = 100.0 * smooth_minus[i] / smooth_tr[i];
        let sum = plus_di[i] + minus_di[i];
        dx[i] = if sum == 0.0 { 0.0 } else { 100.0 * (plus_di[i] - minus_di[i]).abs() / sum };
    }
    let adx = wilder_smooth(&dx, period);
    (plus_di, minus_di, adx)
}

/// Aroon-up / Aroon-down as percentages over `period` bars.
pub fn aroon(candles: &[Candle], period: usize) -> (Vec<f64>, Vec<f64>) {
    let n = candles.len();
    let h = highs(candles);
    let l = lows(candles);
    let mut up = vec![f64::NAN; n];
    let mut down = vec![f64::NAN; n];
    if n < period + 1 {
        return (up, down);
    }
    for i in period..n {
        let window_h = &h[i + 1 - (period + 1)..=i];
        let window_l = &l[i + 1 - (period + 1)..=i];
        let since_high = window_h
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(idx, _)| period - idx)
            .unwrap_or(period);
        let since_low = window_l
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(idx, _)| period - idx)
            .unwrap_or(period);
        up[i] = 100.0 * (period - since_high) as f64 / period as f64;
        down[i] = 100.0 * (period - since_low) as f64 / period as f64;
    }
    (up, down)
}

/// Supertrend line and direction (+1 bullish, -1 bearish) using ATR bands.
pub fn supertrend(candles: &[Candle], period: usize, multiplier: f64) -> (Vec<f64>, Vec<i8>) {
    let n = candles.len();
    let tr = true_range(candles);
    let atr = wilder_smooth(&tr, period);
    let mut line = vec![f64::NAN; n];
    let mut dir = vec![0i8; n];
    let mut prev_upper = f64::NAN;
    let mut prev_lower = f64::NAN;
    for i in 0..n {
        if atr[i].is_nan() {
            continue;
        }
        let mid = (candles[i].high + candles[i].low) / 2.0;
        let upper = mid + multiplier * atr[i];
        let lower = mid - multiplier * atr[i];
        let final_upper = if prev_upper.is_nan() || candles[i - 1].close > prev_upper {
            upper
        } else {
            upper.min(prev_upper)
        };
        let final_lower = if prev_lower.is_nan() || candles[i - 1].close < prev_lower {
            lower
        } else {
            lower.max(prev_lower)
        };
        let trending_up = if i == 0 {
            true
        } else {
            dir[i - 1] >= 0
        };
        let is_up = if trending_up {
            candles[i].close > final_lower
        } else {
            candles[i].close >= final_upper
        };
        dir[i] = if is_up { 1 } else { -1 };
        line[i] = if is_up { final_lower } else { final_upper };
        prev_upper = final_upper;
        prev_lower = final_lower;
    }
    (line, dir)
}

/// +VI / -VI Vortex indicator over `period` bars.
pub fn vortex(candles: &[Candle], period: usize) -> (Vec<f64>, Vec<f64>) {
    let n = candles.len();
    let tr = true_range(candles);
    let mut vm_plus = vec![f64::NAN; n];
    let mut vm_minus = vec![f64::NAN; n];
    for i in 1..n {
        vm_plus[i] = (candles[i].high - candles[i - 1].low).abs();
        vm_minus[i] = (candles[i].low - candles[i - 1].high).abs();
    }
    if n > 0 {
        vm_plus[0] = 0.0;
        vm_minus[0] = 0.0;
    }
    let mut vi_plus = vec![f64::NAN; n];
    let mut vi_minus = vec![f64::NAN; n];
    if n < period {
        return (vi_plus, vi_minus);
    }
    for i in (period - 1)..n {
        let tr_sum: f64 = tr[i + 1 - period..=i].iter().filter(|v| !v.is_nan()).sum();
        if tr_sum == 0.0 {
            continue;
        }
        let vp_sum: f64 = vm_plus[i + 1 - period..=i].iter().sum();
        let vm_sum: f64 = vm_minus[i + 1 - period..=i].iter().sum();
        vi_plus[i] = vp_sum / tr_sum;
        vi_minus[i] = vm_sum / tr_sum;
    }
    (vi_plus, vi_minus)
}

/// Rolling high/low rendering of the three Ichimoku reference lines
/// (tenkan, kijun, senkou span B). The cloud itself is left to the evaluator,
/// which compares price to these lines directly.
pub fn ichimoku_lines(candles: &[Candle], tenkan_period: usize, kijun_period: usize, senkou_b_period: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let h = highs(candles);
    let l = lows(candles);
    let midline = |period: usize| -> Vec<f64> {
        let hh = rolling_max(&h, period);
        let ll = rolling_min(&l, period);
        hh.iter()
            .zip(ll.iter())
            .map(|(a, b)| if a.is_nan() || b.is_nan() { f64::NAN } else { (a + b) / 2.0 })
            .collect()
    };
    (midline(tenkan_period), midline(kijun_period), midline(senkou_b_period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::make_candles;

    #[test]
    fn sma_warms_up_then_tracks_mean() {
        let candles = make_candles(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = sma(&candles, 3);
        assert!(out[1].is_nan());
        assert_eq!(out[2], 2.0);
    }

    #[test]
    fn adx_system_stays_in_bounds() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 1.5).collect();
        let candles = make_candles(&closes);
        let (plus_di, minus_di, adx) = adx_system(&candles, 14);
        for v in plus_di.iter().chain(minus_di.iter()).chain(adx.iter()) {
            if !v.is_nan() {
                assert!(*v >= 0.0 && *v <= 100.0);
            }
        }
    }

    #[test]
    fn supertrend_flags_uptrend_direction() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 2.0).collect();
        let candles = make_candles(&closes);
        let (_, dir) = supertrend(&candles, 10, 3.0);
        assert_eq!(*dir.last().unwrap(), 1);
    }

    #[test]
    fn aroon_up_high_in_fresh_uptrend() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 3.0).collect();
        let candles = make_candles(&closes);
        let (up, down) = aroon(&candles, 14);
        let last_up = *up.iter().rev().find(|v| !v.is_nan()).unwrap();
        let last_down = *down.iter().rev().find(|v| !v.is_nan()).unwrap();
        assert!(last_up > last_down);
    }
}
