//! Support/resistance-category evaluators (§4.1 "Support/Resistance").

use serde_json::json;

use crate::components::IndicatorEvaluator;
use crate::domain::{Candle, Category, IndicatorResult, IndicatorSpec};
use crate::indicators::{patterns, support_resistance};

/// Proximity-to-level scoring: bullish near a support floor, bearish near a
/// resistance ceiling, scaled by how close price sits to the nearer level.
fn proximity_score(price: f64, support: f64, resistance: f64) -> f64 {
    let range = (resistance - support).abs().max(1e-9);
    let dist_to_support = (price - support).abs() / range;
    let dist_to_resistance = (resistance - price).abs() / range;
    if dist_to_support < dist_to_resistance {
        (1.0 - dist_to_support).clamp(0.0, 1.0) * 70.0
    } else {
        -(1.0 - dist_to_resistance).clamp(0.0, 1.0) * 70.0
    }
}

pub struct PivotPointEvaluator {
    spec: IndicatorSpec,
}

impl PivotPointEvaluator {
    pub fn new() -> Self {
        Self {
            spec: IndicatorSpec::new("pivot_points", Category::SupportResistance, 2),
        }
    }
}

impl IndicatorEvaluator for PivotPointEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        let prev = &candles[candles.len() - 2];
        let levels = support_resistance::pivot_points(prev);
        let price = candles.last().unwrap().close;
        let score = proximity_score(price, levels.s1, levels.r1);
        let confidence = 55.0 + score.abs() / 4.0;
        IndicatorResult::from_score(
            self.spec.name,
            self.spec.category,
            json!({ "pivot": levels.pivot, "r1": levels.r1, "s1": levels.s1 }),
            score,
            confidence.min(90.0),
        )
    }
}

pub struct SwingZoneEvaluator {
    spec: IndicatorSpec,
    lookback: usize,
}

impl SwingZoneEvaluator {
    pub fn new(lookback: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("swing_zone_20", Category::SupportResistance, lookback),
            lookback,
        }
    }
}

impl IndicatorEvaluator for SwingZoneEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        let zone = support_resistance::swing_zone(candles, self.lookback);
        let (low, high) = match zone {
            Some(z) => z,
            None => return IndicatorResult::insufficient_data(self.spec.name, self.spec.category),
        };
        let price = candles.last().unwrap().close;
        let score = proximity_score(price, low, high);
        IndicatorResult::from_score(
            self.spec.name,
            self.spec.category,
            json!({ "swing_low": low, "swing_high": high }),
            score,
            60.0 + score.abs() / 4.0,
        )
    }
}

pub struct FibonacciEvaluator {
    spec: IndicatorSpec,
    lookback: usize,
}

impl FibonacciEvaluator {
    pub fn new(lookback: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("fibonacci_retracement", Category::SupportResistance, lookback),
            lookback,
        }
    }
}

impl IndicatorEvaluator for FibonacciEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        let zone = support_resistance::swing_zone(candles, self.lookback);
        let (low, high) = match zone {
            Some(z) => z,
            None => return IndicatorResult::insufficient_data(self.spec.name, self.spec.category),
        };
        let levels = support_resistance::fibonacci_retracement(low, high);
        let price = candles.last().unwrap().close;
        let score = proximity_score(price, levels.level_618, levels.level_236);
        IndicatorResult::from_score(
            self.spec.name,
            self.spec.category,
            json!({ "level_382": levels.level_382, "level_618": levels.level_618 }),
            score,
            55.0 + score.abs() / 4.0,
        )
    }
}

pub struct StructureBreakEvaluator {
    spec: IndicatorSpec,
    lookback: usize,
}

impl StructureBreakEvaluator {
    pub fn new(lookback: usize) -> Self {
        Self {
            spec: IndicatorSpec::new("structure_break", Category::SupportResistance, lookback + 1).with_importance(1.05),
            lookback,
        }
    }
}

impl IndicatorEvaluator for StructureBreakEvaluator {
    fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult {
        if candles.len() < self.spec.min_candles {
            return IndicatorResult::insufficient_data(self.spec.name, self.spec.category);
        }
        use patterns::StructureEvent;
        let event = patterns::structure_event(candles, self.lookback);
        let last = candles.last().unwrap();
        let bullish = last.close >= candles[candles.len() - 2].close;
        let (score, confidence) = match event {
            StructureEvent::BreakOfStructure => (if bullish { 65.0 } else { -65.0 }, 75.0),
            StructureEvent::ChangeOfCharacter => (if bullish { 80.0 } else { -80.0 }, 85.0),
            StructureEvent::None => (0.0, 35.0),
        };
        IndicatorResult::from_score(self.spec.name, self.spec.category, json!({ "event": format!("{event:?}") }), score, confidence)
    }
}
