//! The uniform indicator evaluation contract (§4.1).
//!
//! Every indicator — no matter its internal numeric machinery — emits exactly
//! one `IndicatorResult` per evaluation. Duck-typed, ad-hoc signal shapes are
//! deliberately not representable here.

use serde::{Deserialize, Serialize};

use super::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strength {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl Strength {
    /// Bucket a score magnitude (0..=100) into a strength tier. Ordinal, not calibrated
    /// to any particular source's numeric constants (see SPEC_FULL.md §9).
    pub fn from_magnitude(abs_score: f64) -> Self {
        match abs_score {
            x if x >= 80.0 => Strength::VeryStrong,
            x if x >= 60.0 => Strength::Strong,
            x if x >= 35.0 => Strength::Moderate,
            x if x >= 15.0 => Strength::Weak,
            _ => Strength::VeryWeak,
        }
    }
}

/// Why an indicator could not produce a normal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InsufficientData,
}

/// Static description of an indicator, used by the registry for importance
/// lookup and minimum-candle gating.
#[derive(Debug, Clone)]
pub struct IndicatorSpec {
    pub name: &'static str,
    pub category: Category,
    pub min_candles: usize,
    pub importance_weight: f64,
}

impl IndicatorSpec {
    pub fn new(name: &'static str, category: Category, min_candles: usize) -> Self {
        Self {
            name,
            category,
            min_candles,
            importance_weight: 0.85,
        }
    }

    pub fn with_importance(mut self, weight: f64) -> Self {
        assert!(
            (0.5..=1.2).contains(&weight),
            "importance_weight must be within [0.5, 1.2]"
        );
        self.importance_weight = weight;
        self
    }
}

/// One indicator's opinion, produced per evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub name: String,
    pub category: Category,
    /// Opaque numeric state (e.g. `{"rsi": 28.4}`), useful for display/debugging.
    pub raw_value: serde_json::Value,
    pub direction: Direction,
    /// In [-100, 100]. Positive is bullish.
    pub score: f64,
    pub strength: Strength,
    /// In [0, 100].
    pub confidence: f64,
    pub error_kind: Option<ErrorKind>,
}

impl IndicatorResult {
    /// Construct the standard absorbed-failure result (§4.1 precondition failure).
    pub fn insufficient_data(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            raw_value: serde_json::Value::Null,
            direction: Direction::Neutral,
            score: 0.0,
            strength: Strength::VeryWeak,
            confidence: 0.0,
            error_kind: Some(ErrorKind::InsufficientData),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.error_kind.is_none()
    }

    /// Build a normal (non-error) result from a signed score, clamping to the
    /// documented domain and deriving direction/strength from its sign/magnitude.
    pub fn from_score(
        name: impl Into<String>,
        category: Category,
        raw_value: serde_json::Value,
        score: f64,
        confidence: f64,
    ) -> Self {
        let score = score.clamp(-100.0, 100.0);
        let confidence = confidence.clamp(0.0, 100.0);
        let direction = if score > 1e-9 {
            Direction::Buy
        } else if score < -1e-9 {
            Direction::Sell
        } else {
            Direction::Neutral
        };
        Self {
            name: name.into(),
            category,
            raw_value,
            direction,
            score,
            strength: Strength::from_magnitude(score.abs()),
            confidence,
            error_kind: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_is_absorbed_shape() {
        let r = IndicatorResult::insufficient_data("rsi_14", Category::Momentum);
        assert_eq!(r.direction, Direction::Neutral);
        assert_eq!(r.score, 0.0);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.error_kind, Some(ErrorKind::InsufficientData));
        assert!(!r.is_usable());
    }

    #[test]
    fn from_score_derives_direction() {
        let buy = IndicatorResult::from_score("x", Category::Trend, serde_json::Value::Null, 42.0, 70.0);
        assert_eq!(buy.direction, Direction::Buy);
        let sell = IndicatorResult::from_score("x", Category::Trend, serde_json::Value::Null, -42.0, 70.0);
        assert_eq!(sell.direction, Direction::Sell);
        let neutral = IndicatorResult::from_score("x", Category::Trend, serde_json::Value::Null, 0.0, 70.0);
        assert_eq!(neutral.direction, Direction::Neutral);
    }

    #[test]
    fn from_score_clamps_domain() {
        let r = IndicatorResult::from_score("x", Category::Trend, serde_json::Value::Null, 500.0, 500.0);
        assert_eq!(r.score, 100.0);
        assert_eq!(r.confidence, 100.0);
    }

    #[test]
    fn strength_tiers_are_ordinal() {
        assert_eq!(Strength::from_magnitude(95.0), Strength::VeryStrong);
        assert_eq!(Strength::from_magnitude(65.0), Strength::Strong);
        assert_eq!(Strength::from_magnitude(40.0), Strength::Moderate);
        assert_eq!(Strength::from_magnitude(20.0), Strength::Weak);
        assert_eq!(Strength::from_magnitude(5.0), Strength::VeryWeak);
        assert!(Strength::VeryStrong > Strength::Strong);
    }

    #[test]
    fn importance_weight_bounds_enforced() {
        let spec = IndicatorSpec::new("rsi_14", Category::Momentum, 15).with_importance(1.0);
        assert_eq!(spec.importance_weight, 1.0);
    }

    #[test]
    #[should_panic(expected = "importance_weight")]
    fn importance_weight_out_of_range_panics() {
        IndicatorSpec::new("x", Category::Momentum, 1).with_importance(2.0);
    }
}
