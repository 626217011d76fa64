//! Pattern-family numeric detectors: single/two-candle patterns and
//! market-structure events (fair value gaps, break/change of structure).

use crate::domain::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandlePattern {
    BullishEngulfing,
    BearishEngulfing,
    Hammer,
    ShootingStar,
    Doji,
    None,
}

fn body(c: &Candle) -> f64 {
    (c.close - c.open).abs()
}

fn range(c: &Candle) -> f64 {
    c.high - c.low
}

/// Classify the two-candle pattern ending at `candles[i]`, or `None` if `i == 0`
/// or no recognized pattern applies.
pub fn classify(candles: &[Candle], i: usize) -> CandlePattern {
    if i == 0 || i >= candles.len() {
        return CandlePattern::None;
    }
    let prev = &candles[i - 1];
    let curr = &candles[i];

    // A zero-range candle carries no directional information; treat it the
    // same as the degenerate small-body case rather than falling through to
    // the engulfing/wick checks below, which would otherwise see body == 0.
    if curr.is_flat() || body(curr) / range(curr) < 0.1 {
        return CandlePattern::Doji;
    }

    let curr_bullish = curr.close > curr.open;
    let prev_bullish = prev.close > prev.open;
    if curr_bullish && !prev_bullish && curr.close > prev.open && curr.open < prev.close {
        return CandlePattern::BullishEngulfing;
    }
    if !curr_bullish && prev_bullish && curr.open > prev.close && curr.close < prev.open {
        return CandlePattern::BearishEngulfing;
    }

    let upper_wick = curr.high - curr.open.max(curr.close);
    let lower_wick = curr.open.min(curr.close) - curr.low;
    if !curr.is_flat() {
        if lower_wick > 2.0 * body(curr) && upper_wick < body(curr) {
            return CandlePattern::Hammer;
        }
        if upper_wick > 2.0 * body(curr) && lower_wick < body(curr) {
            return CandlePattern::ShootingStar;
        }
    }

    CandlePattern::None
}

/// A bullish or bearish price gap that the market has not yet filled.
#[derive(Debug, Clone, Copy)]
pub struct FairValueGap {
    pub bullish: bool,
    pub top: f64,
    pub bottom: f64,
    pub index: usize,
}

/// Detect three-candle fair-value gaps: candle[i-2].high < candle[i].low (bullish)
/// or candle[i-2].low > candle[i].high (bearish), with candle[i-1] as the
/// displacement candle.
pub fn fair_value_gaps(candles: &[Candle]) -> Vec<FairValueGap> {
    let mut gaps = Vec::new();
    if candles.len() < 3 {
        return gaps;
    }
    for i in 2..candles.len() {
        let left = &candles[i - 2];
        let right = &candles[i];
        if right.low > left.high {
            gaps.push(FairValueGap { bullish: true, top: right.low, bottom: left.high, index: i });
        } else if right.high < left.low {
            gaps.push(FairValueGap { bullish: false, top: left.low, bottom: right.high, index: i });
        }
    }
    gaps
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureEvent {
    BreakOfStructure,
    ChangeOfCharacter,
    None,
}

/// Structural break detection: compares the latest close against the most
/// recent confirmed swing high/low over `lookback` candles. A break in the
/// direction of the prevailing trend (tracked via simple higher-high/
/// lower-low bookkeeping) is a break of structure (continuation); a break
/// against it is a change of character (reversal warning).
pub fn structure_event(candles: &[Candle], lookback: usize) -> StructureEvent {
    if candles.len() < lookback + 1 || lookback < 2 {
        return StructureEvent::None;
    }
    let window = &candles[candles.len() - lookback - 1..candles.len() - 1];
    let swing_high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let swing_low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let latest = candles.last().unwrap();
    let prior_trend_up = window.last().unwrap().close >= window.first().unwrap().close;

    if latest.close > swing_high {
        return if prior_trend_up { StructureEvent::BreakOfStructure } else { StructureEvent::ChangeOfCharacter };
    }
    if latest.close < swing_low {
        return if !prior_trend_up { StructureEvent::BreakOfStructure } else { StructureEvent::ChangeOfCharacter };
    }
    StructureEvent::None
}
