//! The indicator registry (C1): owns the evaluator set and exposes the
//! category-aware evaluation API the combiner builds on.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::components::IndicatorEvaluator;
use crate::domain::{Candle, Category, IndicatorResult};
use crate::evaluators::{oscillators, patterns, support_resistance, trend, volatility, volume};

/// Owns every registered evaluator and answers the registry's three queries:
/// `evaluate_all`, `evaluate_category`, `lookup_importance` (§4.1).
pub struct Registry {
    evaluators: Vec<Box<dyn IndicatorEvaluator>>,
    importance: HashMap<String, f64>,
}

impl Registry {
    /// Build a registry pre-populated with the baseline evaluator set across
    /// every category. Adding a new indicator is a one-line push here.
    pub fn with_defaults() -> Self {
        let evaluators: Vec<Box<dyn IndicatorEvaluator>> = vec![
            Box::new(oscillators::RsiEvaluator::new(14)),
            Box::new(oscillators::StochasticEvaluator::new(14, 3)),
            Box::new(oscillators::CciEvaluator::new(20)),
            Box::new(oscillators::WilliamsREvaluator::new(14)),
            Box::new(oscillators::MfiEvaluator::new(14)),
            Box::new(oscillators::TsiEvaluator::new(25, 13)),
            Box::new(trend::EmaTrendEvaluator::new(20)),
            Box::new(trend::EmaTrendEvaluator::new(50)),
            Box::new(trend::MacdEvaluator::new(12, 26, 9)),
            Box::new(trend::AroonEvaluator::new(14)),
            Box::new(trend::SupertrendEvaluator::new(10, 3.0)),
            Box::new(trend::VortexEvaluator::new(14)),
            Box::new(volume::ObvEvaluator::new(15)),
            Box::new(volume::ChaikinMoneyFlowEvaluator::new(20)),
            Box::new(volume::VwapEvaluator::new(5)),
            Box::new(volume::ForceIndexEvaluator::new(13)),
            Box::new(volume::VolumeOscillatorEvaluator::new(5, 20)),
            Box::new(volatility::BollingerEvaluator::new(20, 2.0)),
            Box::new(volatility::KeltnerEvaluator::new(20, 10, 2.0)),
            Box::new(volatility::DonchianEvaluator::new(20)),
            Box::new(volatility::MassIndexEvaluator::new(25)),
            Box::new(support_resistance::PivotPointEvaluator::new()),
            Box::new(support_resistance::SwingZoneEvaluator::new(20)),
            Box::new(support_resistance::FibonacciEvaluator::new(34)),
            Box::new(support_resistance::StructureBreakEvaluator::new(20)),
            Box::new(patterns::CandlestickPatternEvaluator::new(10)),
            Box::new(patterns::FairValueGapEvaluator::new()),
        ];
        let importance = evaluators
            .iter()
            .map(|e| (e.spec().name.to_string(), e.spec().importance_weight))
            .collect();
        Self { evaluators, importance }
    }

    /// Evaluate every registered indicator against the candle window, in parallel.
    pub fn evaluate_all(&self, candles: &[Candle]) -> Vec<IndicatorResult> {
        self.evaluators.par_iter().map(|e| e.evaluate(candles)).collect()
    }

    /// Evaluate only the indicators belonging to `category`, in parallel.
    pub fn evaluate_category(&self, category: Category, candles: &[Candle]) -> Vec<IndicatorResult> {
        self.evaluators
            .par_iter()
            .filter(|e| e.spec().category.baseline() == category.baseline())
            .map(|e| e.evaluate(candles))
            .collect()
    }

    /// Importance weight for a named indicator, or the system default (0.85)
    /// if the name is not registered.
    pub fn lookup_importance(&self, name: &str) -> f64 {
        self.importance.get(name).copied().unwrap_or(0.85)
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{make_candles, make_noisy_candles};

    #[test]
    fn evaluate_all_covers_every_registered_evaluator() {
        let registry = Registry::with_defaults();
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.5).collect();
        let candles = make_candles(&closes);
        let results = registry.evaluate_all(&candles);
        assert_eq!(results.len(), registry.len());
    }

    #[test]
    fn evaluate_category_filters_by_baseline() {
        let registry = Registry::with_defaults();
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.4).collect();
        let candles = make_candles(&closes);
        let results = registry.evaluate_category(Category::Momentum, &candles);
        assert!(results.iter().all(|r| r.category.baseline() == Category::Momentum));
        assert!(!results.is_empty());
    }

    #[test]
    fn lookup_importance_falls_back_to_default() {
        let registry = Registry::with_defaults();
        assert_eq!(registry.lookup_importance("nonexistent_indicator"), 0.85);
        assert!(registry.lookup_importance("rsi_14") >= 0.5);
    }

    #[test]
    fn evaluate_all_is_stable_on_noisy_but_seeded_data() {
        let registry = Registry::with_defaults();
        let candles = make_noisy_candles(80, 100.0, 0.3, 2.0, 42);
        let first = registry.evaluate_all(&candles);
        let second = registry.evaluate_all(&candles);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.score, b.score, "{} should be deterministic on the same input", a.name);
        }
    }
}
