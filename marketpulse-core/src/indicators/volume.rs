//! Volume-family numeric engines: OBV, A/D, CMF, VWAP, Klinger, PVT, NVI/PVI,
//! Chaikin oscillator, force index, ease of movement, volume oscillator.

use super::helpers::{closes, ema_series, sma_series, typical_prices, volumes};
use crate::domain::Candle;

/// On-Balance Volume: cumulative volume signed by the direction of the close.
pub fn obv(candles: &[Candle]) -> Vec<f64> {
    let c = closes(candles);
    let v = volumes(candles);
    let n = c.len();
    let mut out = vec![0.0; n];
    for i in 1..n {
        out[i] = out[i - 1]
            + if c[i] > c[i - 1] {
                v[i]
            } else if c[i] < c[i - 1] {
                -v[i]
            } else {
                0.0
            };
    }
    out
}

/// Accumulation/Distribution line.
pub fn accumulation_distribution(candles: &[Candle]) -> Vec<f64> {
    let n = candles.len();
    let mut out = vec![0.0; n];
    let mut cumulative = 0.0;
    for (i, c) in candles.iter().enumerate() {
        let range = c.high - c.low;
        let mfm = if range == 0.0 {
            0.0
        } else {
            ((c.close - c.low) - (c.high - c.close)) / range
        };
        cumulative += mfm * c.volume;
        out[i] = cumulative;
    }
    out
}

/// Chaikin Money Flow: `period`-bar sum of money-flow-volume over volume.
pub fn chaikin_money_flow(candles: &[Candle], period: usize) -> Vec<f64> {
    let n = candles.len();
    let mut mfv = vec![0.0; n];
    let v = volumes(candles);
    for (i, c) in candles.iter().enumerate() {
        let range = c.high - c.low;
        let mfm = if range == 0.0 {
            0.0
        } else {
            ((c.close - c.low) - (c.high - c.close)) / range
        };
        mfv[i] = mfm * v[i];
    }
    let mut out = vec![f64::NAN; n];
    if n < period {
        return out;
    }
    for i in (period - 1)..n {
        let vol_sum: f64 = v[i + 1 - period..=i].iter().sum();
        if vol_sum == 0.0 {
            continue;
        }
        out[i] = mfv[i + 1 - period..=i].iter().sum::<f64>() / vol_sum;
    }
    out
}

/// Session-to-date volume-weighted average price, reset at the first candle
/// (callers pass in only the current session's candles).
pub fn vwap(candles: &[Candle]) -> Vec<f64> {
    let tp = typical_prices(candles);
    let v = volumes(candles);
    let mut cum_pv = 0.0;
    let mut cum_v = 0.0;
    tp.iter()
        .zip(v.iter())
        .map(|(price, vol)| {
            cum_pv += price * vol;
            cum_v += vol;
            if cum_v == 0.0 { f64::NAN } else { cum_pv / cum_v }
        })
        .collect()
}

/// Klinger volume oscillator: EMA(34) - EMA(55) of signed volume force.
pub fn klinger(candles: &[Candle]) -> Vec<f64> {
    let n = candles.len();
    let tp = typical_prices(candles);
    let mut force = vec![0.0; n];
    for i in 1..n {
        let trend = if tp[i] > tp[i - 1] { 1.0 } else { -1.0 };
        force[i] = trend * candles[i].volume;
    }
    let fast = ema_series(&force, 34.min(n.max(1)));
    let slow = ema_series(&force, 55.min(n.max(1)));
    fast.iter()
        .zip(slow.iter())
        .map(|(f, s)| if f.is_nan() || s.is_nan() { f64::NAN } else { f - s })
        .collect()
}

/// Price-Volume Trend: cumulative volume weighted by percentage price change.
pub fn price_volume_trend(candles: &[Candle]) -> Vec<f64> {
    let c = closes(candles);
    let v = volumes(candles);
    let n = c.len();
    let mut out = vec![0.0; n];
    for i in 1..n {
        if c[i - 1] != 0.0 {
            out[i] = out[i - 1] + v[i] * (c[i] - c[i - 1]) / c[i - 1];
        } else {
            out[i] = out[i - 1];
        }
    }
    out
}

/// Negative Volume Index and Positive Volume Index, each starting at 1000.
pub fn nvi_pvi(candles: &[Candle]) -> (Vec<f64>, Vec<f64>) {
    let c = closes(candles);
    let v = volumes(candles);
    let n = c.len();
    let mut nvi = vec![1000.0; n];
    let mut pvi = vec![1000.0; n];
    for i in 1..n {
        let pct_change = if c[i - 1] != 0.0 { (c[i] - c[i - 1]) / c[i - 1] } else { 0.0 };
        nvi[i] = if v[i] < v[i - 1] { nvi[i - 1] * (1.0 + pct_change) } else { nvi[i - 1] };
        pvi[i] = if v[i] > v[i - 1] { pvi[i - 1] * (1.0 + pct_change) } else { pvi[i - 1] };
    }
    (nvi, pvi)
}

/// Chaikin oscillator: EMA(3) - EMA(10) of the A/D line.
pub fn chaikin_oscillator(candles: &[Candle]) -> Vec<f64> {
    let ad = accumulation_distribution(candles);
    let fast = ema_series(&ad, 3.min(ad.len().max(1)));
    let slow = ema_series(&ad, 10.min(ad.len().max(1)));
    fast.iter()
        .zip(slow.iter())
        .map(|(f, s)| if f.is_nan() || s.is_nan() { f64::NAN } else { f - s })
        .collect()
}

/// Force index: volume * price change, smoothed with an EMA of `period`.
pub fn force_index(candles: &[Candle], period: usize) -> Vec<f64> {
    let c = closes(candles);
    let v = volumes(candles);
    let n = c.len();
    let mut raw = vec![0.0; n];
    for i in 1..n {
        raw[i] = (c[i] - c[i - 1]) * v[i];
    }
    ema_series(&raw, period)
}

/// Ease of movement, smoothed over `period` with a simple average.
pub fn ease_of_movement(candles: &[Candle], period: usize) -> Vec<f64> {
    let n = candles.len();
    let mut raw = vec![f64::NAN; n];
    for i in 1..n {
        let mid_move = (candles[i].high + candles[i].low) / 2.0 - (candles[i - 1].high + candles[i - 1].low) / 2.0;
        let range = candles[i].high - candles[i].low;
        let volume = candles[i].volume;
        if range == 0.0 || volume == 0.0 {
            raw[i] = 0.0;
            continue;
        }
        let box_ratio = (volume / 1_000_000.0) / range;
        raw[i] = if box_ratio == 0.0 { 0.0 } else { mid_move / box_ratio };
    }
    sma_series(&raw.iter().map(|v| if v.is_nan() { 0.0 } else { *v }).collect::<Vec<_>>(), period)
}

/// Volume oscillator: percentage difference between a fast and slow SMA of volume.
pub fn volume_oscillator(candles: &[Candle], fast: usize, slow: usize) -> Vec<f64> {
    let v = volumes(candles);
    let fast_sma = sma_series(&v, fast);
    let slow_sma = sma_series(&v, slow);
    fast_sma
        .iter()
        .zip(slow_sma.iter())
        .map(|(f, s)| if f.is_nan() || s.is_nan() || *s == 0.0 { f64::NAN } else { 100.0 * (f - s) / s })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::make_candles;

    #[test]
    fn obv_accumulates_on_up_closes() {
        let candles = make_candles(&[100.0, 101.0, 102.0, 101.5, 103.0]);
        let out = obv(&candles);
        assert!(out[1] > out[0]);
        assert!(out[2] > out[1]);
    }

    #[test]
    fn vwap_is_between_session_low_and_high() {
        let candles = make_candles(&[100.0, 102.0, 98.0, 104.0]);
        let out = vwap(&candles);
        for (i, v) in out.iter().enumerate() {
            let lo = candles[..=i].iter().map(|c| c.low).fold(f64::MAX, f64::min);
            let hi = candles[..=i].iter().map(|c| c.high).fold(f64::MIN, f64::max);
            assert!(*v >= lo - 1e-9 && *v <= hi + 1e-9);
        }
    }

    #[test]
    fn nvi_pvi_start_at_1000() {
        let candles = make_candles(&[100.0, 101.0, 99.0]);
        let (nvi, pvi) = nvi_pvi(&candles);
        assert_eq!(nvi[0], 1000.0);
        assert_eq!(pvi[0], 1000.0);
    }
}
