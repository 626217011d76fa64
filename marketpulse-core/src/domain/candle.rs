//! Candle — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single symbol on a single timeframe bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Basic OHLCV sanity check: high >= max(open,close,low), low <= min(open,close), positive prices.
    pub fn is_sane(&self) -> bool {
        if [self.open, self.high, self.low, self.close]
            .iter()
            .any(|v| v.is_nan() || !v.is_finite())
        {
            return false;
        }
        self.open > 0.0
            && self.close > 0.0
            && self.high >= self.open
            && self.high >= self.close
            && self.high >= self.low
            && self.low <= self.open
            && self.low <= self.close
    }

    /// True when open, high, low, and close are all equal (and volume is irrelevant) —
    /// the degenerate "flat" candle the candlestick pattern classifier treats as a
    /// neutral doji rather than feeding it into the body/wick ratio checks.
    pub fn is_flat(&self) -> bool {
        self.open == self.high && self.high == self.low && self.low == self.close
    }
}

/// Candle timeframe. Modeled as an enum rather than a free string so the generator
/// and tracker can reason about bar duration without parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    D1,
}

impl Timeframe {
    pub fn duration(&self) -> chrono::Duration {
        match self {
            Timeframe::M1 => chrono::Duration::minutes(1),
            Timeframe::M5 => chrono::Duration::minutes(5),
            Timeframe::M15 => chrono::Duration::minutes(15),
            Timeframe::M30 => chrono::Duration::minutes(30),
            Timeframe::H1 => chrono::Duration::hours(1),
            Timeframe::D1 => chrono::Duration::days(1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::D1 => "1d",
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            symbol: "NIFTY50".into(),
            timeframe: Timeframe::M5,
            timestamp: Utc::now(),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample(100.0, 105.0, 98.0, 103.0).is_sane());
    }

    #[test]
    fn candle_detects_insane_high_low() {
        assert!(!sample(100.0, 97.0, 98.0, 103.0).is_sane());
    }

    #[test]
    fn candle_detects_nan() {
        assert!(!sample(f64::NAN, 105.0, 98.0, 103.0).is_sane());
    }

    #[test]
    fn candle_flat_detection() {
        assert!(sample(100.0, 100.0, 100.0, 100.0).is_flat());
        assert!(!sample(100.0, 105.0, 98.0, 103.0).is_flat());
    }

    #[test]
    fn timeframe_duration() {
        assert_eq!(Timeframe::M1.duration(), chrono::Duration::minutes(1));
        assert_eq!(Timeframe::D1.duration(), chrono::Duration::days(1));
    }

    #[test]
    fn candle_serialization_roundtrip() {
        let candle = sample(100.0, 105.0, 98.0, 103.0);
        let json = serde_json::to_string(&candle).unwrap();
        let deser: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(candle.symbol, deser.symbol);
        assert_eq!(candle.close, deser.close);
    }
}
