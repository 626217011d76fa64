//! Market regime classification types (§3, §4.2).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    StrongTrending,
    WeakTrending,
    Ranging,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Volatility {
    VeryHigh,
    High,
    Elevated,
    Normal,
    Low,
    VeryLow,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketRegime {
    pub regime: Regime,
    pub volatility: Volatility,
    pub adx: f64,
    pub choppiness_index: f64,
    /// In [0, 100].
    pub confidence: f64,
    pub interpretation: String,
}

impl MarketRegime {
    pub fn unknown() -> Self {
        Self {
            regime: Regime::Unknown,
            volatility: Volatility::Unknown,
            adx: f64::NAN,
            choppiness_index: f64::NAN,
            confidence: 0.0,
            interpretation: "insufficient candle window for regime classification".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_regime_has_zero_confidence() {
        let r = MarketRegime::unknown();
        assert_eq!(r.regime, Regime::Unknown);
        assert_eq!(r.confidence, 0.0);
    }
}
