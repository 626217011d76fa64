//! Trend-category evaluators (§4.1 "Trend followers").
//!
//! ADX plays a distinct role here: it does not emit its own directional score
//! into the combiner at all — it amplifies the other trend evaluators via
//! [`adx_amplifier`], consumed by the registry before indicators run.

use serde_json::json;

use crate::components::IndicatorEvaluator;
use crate::domain::{Candle, Category, IndicatorResult, IndicatorSpec};
use crate::indicators::{helpers, trend};
use crate::rules::{crossover_sign, slope_score};

/// ADX-based amplification multiplier in [0.8, 1.3] applied to trend-family
/// scores: high ADX means "trust the trend signal more".
pub fn adx_amplifier(candles: &[Candle], period: usize) -> f64 {
    let (_, _, adx) = trend::adx_system(candles, period);
    match helpers::last_valid(&adx) {
        Some(v) if v >= 30.0 => 1.3,
        Some(v) if v >= 20.0 => 1.1,
        Some(_) => 0.9,
        None => 1.0,
    }
}

fn price_vs_line_score(price: f64, line: f64, amplitude: f64) -> f64 {
    if line == 0.0 {
        return 0.0;
    }
    let pct = (price - line) / line * 100.0;
    (pct * 10.0).clamp(-amplitude, amplitude)
}

pub struct EmaTrendEvaluator {
    spec: IndicatorSpec,
    period: usize,
}

impl EmaTrendEvaluator {
    pub fn new(period: usize) -> Self {
        Self {
            spec: IndicatorSpec::new(Box::leak(format!("ema_{period}").into_boxed_str()), Category::Trend, period),
            period,
        }
    }
}

impl IndicatorEvaluator for EmaTrendEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let series = trend::ema(candles, self.period);
        let last = series.last().copied().unwrap_or(f64::NAN);
        let prev = series.get(series.len().wrapping_sub(2)).copied().unwrap_or(f64::NAN);
        if last.is_nan() {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let price = candles.last().unwrap().close;
        let position = price_vs_line_score(price, last, 60.0);
        let slope = slope_score(prev, last, 20.0);
        let amp = adx_amplifier(candles, 14.min(self.period));
        let score = (position + slope) * amp;
        let confidence = (55.0 + (position + slope).abs() / 3.0).min(95.0);
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "ema": last }), score, confidence)
    }
}

pub struct MacdEvaluator {
    spec: IndicatorSpec,
    fast: usize,
    slow: usize,
    signal: usize,
}

impl MacdEvaluator {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("macd_12_26_9", Category::Trend, slow + signal).with_importance(1.05),
            fast,
            slow,
            signal,
        }
    }
}

impl IndicatorEvaluator for MacdEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let (macd_line, signal_line, hist) = trend::macd(candles, self.fast, self.slow, self.signal);
        let n = macd_line.len();
        if n < 2 || macd_line[n - 1].is_nan() || signal_line[n - 1].is_nan() {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let cross = crossover_sign(macd_line[n - 2], signal_line[n - 2], macd_line[n - 1], signal_line[n - 1]);
        let hist_score = hist[n - 1].clamp(-50.0, 50.0) * 1.5;
        let cross_score = cross as f64 * 40.0;
        let score = hist_score + cross_score;
        let confidence = if cross != 0 { 80.0 } else { 55.0 + hist[n - 1].abs().min(40.0) };
        IndicatorResult::from_score(
            self.spec.name,
            self.spec.category,
            json!({ "macd": macd_line[n - 1], "signal": signal_line[n - 1], "hist": hist[n - 1] }),
            score,
            confidence,
        )
    }
}

pub struct AroonEvaluator {
    spec: IndicatorSpec,
    period: usize,
}

impl AroonEvaluator {
    pub fn new(period: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("aroon_14", Category::Trend, period + 1),
            period,
        }
    }
}

impl IndicatorEvaluator for AroonEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let (up, down) = trend::aroon(candles, self.period);
        let last_up = up.last().copied().unwrap_or(f64::NAN);
        let last_down = down.last().copied().unwrap_or(f64::NAN);
        if last_up.is_nan() || last_down.is_nan() {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let score = (last_up - last_down).clamp(-100.0, 100.0);
        let confidence = (50.0 + score.abs() / 2.0).min(95.0);
        IndicatorResult::from_score(
            self.spec.name,
            self.spec.category,
            json!({ "aroon_up": last_up, "aroon_down": last_down }),
            score,
            confidence,
        )
    }
}

pub struct SupertrendEvaluator {
    spec: IndicatorSpec,
    period: usize,
    multiplier: f64,
}

impl SupertrendEvaluator {
    pub fn new(period: usize, multiplier: f64) -> Self {
        Self {
            spec: IndicatorSpec::new("supertrend_10_3", Category::Trend, period + 1).with_importance(1.1),
            period,
            multiplier,
        }
    }
}

impl IndicatorEvaluator for SupertrendEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let (line, dir) = trend::supertrend(candles, self.period, self.multiplier);
        let last_line = line.last().copied().unwrap_or(f64::NAN);
        let last_dir = *dir.last().unwrap_or(&0);
        if last_line.is_nan() || last_dir == 0 {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let flipped = dir.len() >= 2 && dir[dir.len() - 2] != last_dir;
        let score = last_dir as f64 * if flipped { 75.0 } else { 55.0 };
        let confidence = if flipped { 85.0 } else { 65.0 };
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "line": last_line, "direction": last_dir }), score, confidence)
    }
}

pub struct VortexEvaluator {
    spec: IndicatorSpec,
    period: usize,
}

impl VortexEvaluator {
    pub fn new(period: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("vortex_14", Category::Trend, period + 1),
            period,
        }
    }
}

impl IndicatorEvaluator for VortexEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let (vi_plus, vi_minus) = trend::vortex(candles, self.period);
        let last_plus = vi_plus.last().copied().unwrap_or(f64::NAN);
        let last_minus = vi_minus.last().copied().unwrap_or(f64::NAN);
        if last_plus.is_nan() || last_minus.is_nan() {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let score = ((last_plus - last_minus) * 100.0).clamp(-100.0, 100.0);
        let confidence = (50.0 + score.abs() / 2.0).min(90.0);
        IndicatorResult::from_score(
            self.spec.name,
            self.spec.category,
            json!({ "vi_plus": last_plus, "vi_minus": last_minus }),
            score,
            confidence,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::make_candles;

    #[test]
    fn ema_evaluator_bullish_in_uptrend() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 2.0).collect();
        let candles = make_candles(&closes);
        let eval = EmaTrendEvaluator::new(20);
        let result = eval.evaluate(&candles);
        assert!(result.score > 0.0);
    }

    #[test]
    fn supertrend_insufficient_data_short_window() {
        let candles = make_candles(&[100.0, 101.0]);
        let eval = SupertrendEvaluator::new(10, 3.0);
        let result = eval.evaluate(&candles);
        assert!(!result.is_usable());
    }
}
