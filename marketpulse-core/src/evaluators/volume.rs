//! Volume-category evaluators (§4.1 "Volume").

use serde_json::json;

use crate::components::IndicatorEvaluator;
use crate::domain::{Candle, Category, IndicatorResult, IndicatorSpec};
use crate::indicators::{helpers, volume};
use crate::rules::slope_score;

pub struct ObvEvaluator {
    spec: IndicatorSpec,
}

impl ObvEvaluator {
    pub fn new(min_candles: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("obv", Category::Volume, min_candles),
        }
    }
}

impl IndicatorEvaluator for ObvEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let series = volume::obv(candles);
        let window = 10.min(series.len());
        if window < 3 {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let recent = &series[series.len() - window..];
        let slope = slope_score(recent[0], *recent.last().unwrap(), 60.0);
        let confidence = 55.0 + slope.abs() / 3.0;
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "obv": series.last() }), slope, confidence)
    }
}

pub struct ChaikinMoneyFlowEvaluator {
    spec: IndicatorSpec,
    period: usize,
}

impl ChaikinMoneyFlowEvaluator {
    pub fn new(period: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("cmf_20", Category::Volume, period),
            period,
        }
    }
}

impl IndicatorEvaluator for ChaikinMoneyFlowEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let series = volume::chaikin_money_flow(candles, self.period);
        let last = series.last().copied().unwrap_or(f64::NAN);
        if last.is_nan() {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let score = (last * 150.0).clamp(-100.0, 100.0);
        let confidence = (50.0 + last.abs() * 80.0).min(95.0);
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "cmf": last }), score, confidence)
    }
}

pub struct VwapEvaluator {
    spec: IndicatorSpec,
}

impl VwapEvaluator {
    pub fn new(min_candles: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("vwap", Category::Volume, min_candles),
        }
    }
}

impl IndicatorEvaluator for VwapEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let series = volume::vwap(candles);
        let last = series.last().copied().unwrap_or(f64::NAN);
        if last.is_nan() || last == 0.0 {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let price = candles.last().unwrap().close;
        let pct = (price - last) / last * 100.0;
        let score = (pct * 15.0).clamp(-100.0, 100.0);
        let confidence = (50.0 + pct.abs() * 5.0).min(90.0);
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "vwap": last, "price": price }), score, confidence)
    }
}

pub struct ForceIndexEvaluator {
    spec: IndicatorSpec,
    period: usize,
}

impl ForceIndexEvaluator {
    pub fn new(period: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("force_index_13", Category::Volume, period + 1),
            period,
        }
    }
}

impl IndicatorEvaluator for ForceIndexEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let series = volume::force_index(candles, self.period);
        let last = helpers::last_valid(&series);
        let last = match last {
            Some(v) => v,
            None => return IndicatorResult::insufficient_data(self.spec.name, self.spec.category),
        };
        let sign = if last > 0.0 { 1.0 } else if last < 0.0 { -1.0 } else { 0.0 };
        let score = sign * 45.0;
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "force_index": last }), score, 60.0)
    }
}

pub struct VolumeOscillatorEvaluator {
    spec: IndicatorSpec,
    fast: usize,
    slow: usize,
}

impl VolumeOscillatorEvaluator {
    pub fn new(fast: usize, slow: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("volume_osc_5_20", Category::Volume, slow),
            fast,
            slow,
        }
    }
}

impl IndicatorEvaluator for VolumeOscillatorEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let series = volume::volume_oscillator(candles, self.fast, self.slow);
        let last = series.last().copied().unwrap_or(f64::NAN);
        if last.is_nan() {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        // Rising volume confirms the prevailing price direction; it carries no
        // directional opinion of its own, so score only on price direction.
        let price_dir = if candles.last().unwrap().close >= candles[candles.len() - 2].close { 1.0 } else { -1.0 };
        let score = if last > 0.0 { price_dir * 30.0 } else { 0.0 };
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "volume_osc": last }), score, 55.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::make_candles;

    #[test]
    fn obv_evaluator_bullish_on_rising_volume_flow() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let candles = make_candles(&closes);
        let eval = ObvEvaluator::new(12);
        let result = eval.evaluate(&candles);
        assert!(result.score > 0.0);
    }
}
