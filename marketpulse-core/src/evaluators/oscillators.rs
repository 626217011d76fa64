//! Momentum-category evaluators: bounded oscillators (§4.1 "Bounded oscillators").

use serde_json::json;

use crate::components::IndicatorEvaluator;
use crate::domain::{Candle, Category, IndicatorResult, IndicatorSpec};
use crate::indicators::{helpers, oscillators};
use crate::rules::{divergence_multiplier, zone_score};

pub struct RsiEvaluator {
    spec: IndicatorSpec,
    period: usize,
}

impl RsiEvaluator {
    pub fn new(period: usize) -> Self {
        Self {
            spec: IndicatorSpec::new(
                Box::leak(format!("rsi_{period}").into_boxed_str()),
                Category::Momentum,
                period + 1,
            )
            .with_importance(1.0),
            period,
        }
    }
}

impl IndicatorEvaluator for RsiEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let series = oscillators::rsi(candles, self.period);
        let closes = helpers::closes(candles);
        let last = series.last().copied().unwrap_or(f64::NAN);
        if last.is_nan() {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let mut score = zone_score(last, 30.0, 70.0, 50.0);

        let window = 10.min(series.len());
        if window >= 3 {
            let price_window = &closes[closes.len() - window..];
            let osc_window: Vec<f64> = series[series.len() - window..].to_vec();
            let mult = divergence_multiplier(price_window, &osc_window);
            score *= mult;
        }
        let confidence = 50.0 + (last - 50.0).abs() / 2.0;
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "rsi": last }), score, confidence)
    }
}

pub struct StochasticEvaluator {
    spec: IndicatorSpec,
    k_period: usize,
    d_period: usize,
}

impl StochasticEvaluator {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("stochastic_14_3", Category::Momentum, k_period + d_period),
            k_period,
            d_period,
        }
    }
}

impl IndicatorEvaluator for StochasticEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let (k, d) = oscillators::stochastic(candles, self.k_period, self.d_period);
        let last_k = k.last().copied().unwrap_or(f64::NAN);
        let last_d = d.last().copied().unwrap_or(f64::NAN);
        if last_k.is_nan() || last_d.is_nan() {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let zone = zone_score(last_k, 20.0, 80.0, 50.0);
        let cross_bias = if last_k > last_d { 10.0 } else if last_k < last_d { -10.0 } else { 0.0 };
        let score = zone + cross_bias;
        let confidence = 55.0 + (last_k - last_d).abs().min(20.0);
        IndicatorResult::from_score(
            self.spec.name,
            self.spec.category,
            json!({ "k": last_k, "d": last_d }),
            score,
            confidence,
        )
    }
}

pub struct CciEvaluator {
    spec: IndicatorSpec,
    period: usize,
}

impl CciEvaluator {
    pub fn new(period: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("cci_20", Category::Momentum, period),
            period,
        }
    }
}

impl IndicatorEvaluator for CciEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let series = oscillators::cci(candles, self.period);
        let last = series.last().copied().unwrap_or(f64::NAN);
        if last.is_nan() {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let score = zone_score(-last, -100.0, 100.0, 0.0) * -1.0;
        let confidence = (40.0 + last.abs() / 4.0).min(95.0);
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "cci": last }), score, confidence)
    }
}

pub struct WilliamsREvaluator {
    spec: IndicatorSpec,
    period: usize,
}

impl WilliamsREvaluator {
    pub fn new(period: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("williams_r_14", Category::Momentum, period),
            period,
        }
    }
}

impl IndicatorEvaluator for WilliamsREvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let series = oscillators::williams_r(candles, self.period);
        let last = series.last().copied().unwrap_or(f64::NAN);
        if last.is_nan() {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        // Williams %R lives in [-100, 0]; rescale to RSI-style [0,100] before zone-testing.
        let rescaled = last + 100.0;
        let score = zone_score(rescaled, 20.0, 80.0, 50.0);
        let confidence = 50.0 + (rescaled - 50.0).abs() / 2.0;
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "williams_r": last }), score, confidence)
    }
}

pub struct MfiEvaluator {
    spec: IndicatorSpec,
    period: usize,
}

impl MfiEvaluator {
    pub fn new(period: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("mfi_14", Category::Momentum, period + 1),
            period,
        }
    }
}

impl IndicatorEvaluator for MfiEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let series = oscillators::mfi(candles, self.period);
        let last = series.last().copied().unwrap_or(f64::NAN);
        if last.is_nan() {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let score = zone_score(last, 20.0, 80.0, 50.0);
        let confidence = 50.0 + (last - 50.0).abs() / 2.0;
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "mfi": last }), score, confidence)
    }
}

pub struct TsiEvaluator {
    spec: IndicatorSpec,
    long: usize,
    short: usize,
}

impl TsiEvaluator {
    pub fn new(long: usize, short: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("tsi_25_13", Category::Momentum, long + short),
            long,
            short,
        }
    }
}

impl IndicatorEvaluator for TsiEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let series = oscillators::tsi(candles, self.long, self.short);
        let last = series.last().copied().unwrap_or(f64::NAN);
        let prev = series.get(series.len().wrapping_sub(2)).copied().unwrap_or(f64::NAN);
        if last.is_nan() {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let zone = zone_score(last + 50.0, 25.0, 75.0, 50.0);
        let slope = crate::rules::slope_score(prev, last, 15.0);
        let score = zone + slope;
        let confidence = (50.0 + last.abs() / 2.0).min(95.0);
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "tsi": last }), score, confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::make_candles;

    #[test]
    fn rsi_evaluator_signals_buy_on_oversold_bounce() {
        let closes: Vec<f64> = (0..20).map(|i| 120.0 - i as f64 * 3.0).chain([65.0, 70.0, 75.0]).collect();
        let candles = make_candles(&closes);
        let eval = RsiEvaluator::new(14);
        let result = eval.evaluate(&candles);
        assert!(result.is_usable());
    }

    #[test]
    fn rsi_evaluator_insufficient_data() {
        let candles = make_candles(&[100.0, 101.0]);
        let eval = RsiEvaluator::new(14);
        let result = eval.evaluate(&candles);
        assert!(!result.is_usable());
    }

    #[test]
    fn stochastic_in_score_domain() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i as f64 * 0.7).sin() * 10.0).collect();
        let candles = make_candles(&closes);
        let eval = StochasticEvaluator::new(14, 3);
        let result = eval.evaluate(&candles);
        assert!(result.score >= -100.0 && result.score <= 100.0);
    }
}
