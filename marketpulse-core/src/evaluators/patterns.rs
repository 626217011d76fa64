//! Pattern-category evaluators (§4.1 "Patterns"): candlestick reversal and
//! continuation shapes, amplified by relative bar size.

use serde_json::json;

use crate::components::IndicatorEvaluator;
use crate::domain::{Candle, Category, IndicatorResult, IndicatorSpec};
use crate::indicators::patterns::{self, CandlePattern};

pub struct CandlestickPatternEvaluator {
    spec: IndicatorSpec,
    avg_range_window: usize,
}

impl CandlestickPatternEvaluator {
    pub fn new(avg_range_window: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("candlestick_patterns", Category::Patterns, avg_range_window + 1),
            avg_range_window,
        }
    }
}

impl IndicatorEvaluator for CandlestickPatternEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let i = candles.len() - 1;
        let pattern = patterns::classify(candles, i);
        if pattern == CandlePattern::None {
            return IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "pattern": "none" }), 0.0, 25.0);
        }

        let window = &candles[i + 1 - self.avg_range_window..=i];
        let avg_range = window.iter().map(|c| c.high - c.low).sum::<f64>() / window.len() as f64;
        let current_range = candles[i].high - candles[i].low;
        let size_multiplier = if avg_range > 0.0 { (current_range / avg_range).clamp(0.5, 2.0) } else { 1.0 };

        let (base_score, bias_name) = match pattern {
            CandlePattern::BullishEngulfing => (60.0, "bullish_engulfing"),
            CandlePattern::BearishEngulfing => (-60.0, "bearish_engulfing"),
            CandlePattern::Hammer => (50.0, "hammer"),
            CandlePattern::ShootingStar => (-50.0, "shooting_star"),
            CandlePattern::Doji => (0.0, "doji"),
            CandlePattern::None => unreachable!(),
        };
        let score = base_score * size_multiplier;
        let confidence = (55.0 + score.abs() / 3.0).min(90.0);
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "pattern": bias_name }), score, confidence)
    }
}

pub struct FairValueGapEvaluator {
    spec: IndicatorSpec,
}

impl FairValueGapEvaluator {
    pub fn new() -> Self {
        Self {
            spec: IndicatorSpec::new("fair_value_gap", Category::Patterns, 3),
        }
    }
}

impl IndicatorEvaluator for FairValueGapEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let gaps = patterns::fair_value_gaps(candles);
        let latest = gaps.iter().filter(|g| g.index >= candles.len().saturating_sub(3)).last();
        match latest {
            Some(gap) => {
                let score = if gap.bullish { 45.0 } else { -45.0 };
                IndicatorResult::from_score(
                    self.spec.name,
                    self.spec.category,
                    json!({ "bullish": gap.bullish, "top": gap.top, "bottom": gap.bottom }),
                    score,
                    65.0,
                )
            }
            None => IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "gap": "none" }), 0.0, 20.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::make_candles;

    #[test]
    fn candlestick_evaluator_neutral_on_plain_series() {
        let candles = make_candles(&[100.0, 100.5, 101.0, 101.5, 102.0, 102.5]);
        let eval = CandlestickPatternEvaluator::new(5);
        let result = eval.evaluate(&candles);
        assert!(result.is_usable());
    }
}
