//! The decision-layer contract every evaluator implements (§4.1).
//!
//! Where `indicators::*` computes raw numeric series, `IndicatorEvaluator`
//! interprets the tail of that series into the uniform `IndicatorResult` the
//! registry and combiner depend on. Adding an indicator to the system means
//! adding one of these, plus a numeric primitive if one doesn't exist yet —
//! nothing about the registry or the combiner changes.

use crate::domain::{Candle, IndicatorResult, IndicatorSpec};

pub trait IndicatorEvaluator: Send + Sync {
    /// Static description used by the registry for gating and importance lookup.
    fn spec(&self) -> &IndicatorSpec;

    /// Evaluate the indicator against the trailing candle window.
    ///
    /// Implementations must check `candles.len() >= self.spec().min_candles`
    /// themselves and return `IndicatorResult::insufficient_data` otherwise —
    /// the registry does not pre-filter on their behalf, since the minimum
    /// varies per indicator and parameterization.
    fn evaluate(&self, candles: &[Candle]) -> IndicatorResult;
}
