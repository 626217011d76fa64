//! Shared decision-rule helpers reused by every evaluator family (§4.1, §4.3).
//!
//! These are small, composable building blocks — zone tests, slope checks,
//! crossover detection — rather than one monolithic scoring function, so each
//! evaluator can combine the pieces its family's rule actually calls for.

/// Map a bounded oscillator reading (already in its native domain, e.g. RSI's
/// [0,100]) into a [-100,100] score via linear zone tests against oversold/
/// overbought thresholds. Values between the thresholds scale linearly
/// through the neutral midpoint.
pub fn zone_score(value: f64, oversold: f64, overbought: f64, midpoint: f64) -> f64 {
    if value <= oversold {
        let depth = (oversold - value).max(0.0);
        (40.0 + depth * 2.0).min(100.0)
    } else if value >= overbought {
        let depth = (value - overbought).max(0.0);
        -(40.0 + depth * 2.0).max(-100.0)
    } else if value >= midpoint {
        -100.0 * (value - midpoint) / (overbought - midpoint)
    } else {
        100.0 * (midpoint - value) / (midpoint - oversold)
    }
}

/// Slope sign between the last two valid values of a series, scaled into a
/// [-amplitude, amplitude] contribution.
pub fn slope_score(prev: f64, curr: f64, amplitude: f64) -> f64 {
    if prev.is_nan() || curr.is_nan() || prev == curr {
        return 0.0;
    }
    if curr > prev {
        amplitude
    } else {
        -amplitude
    }
}

/// Crossover detection: did `fast` cross above/below `slow` between the
/// previous and current reading? Returns +1 bullish cross, -1 bearish cross,
/// 0 none.
pub fn crossover_sign(prev_fast: f64, prev_slow: f64, curr_fast: f64, curr_slow: f64) -> i8 {
    if [prev_fast, prev_slow, curr_fast, curr_slow].iter().any(|v| v.is_nan()) {
        return 0;
    }
    if prev_fast <= prev_slow && curr_fast > curr_slow {
        1
    } else if prev_fast >= prev_slow && curr_fast < curr_slow {
        -1
    } else {
        0
    }
}

/// Simple divergence check over a trailing window: price made a new extreme
/// in one direction while the oscillator moved the other way. Returns an
/// amplification multiplier (1.0 = no divergence, >1.0 = divergence detected).
pub fn divergence_multiplier(price_window: &[f64], osc_window: &[f64]) -> f64 {
    if price_window.len() < 2 || price_window.len() != osc_window.len() {
        return 1.0;
    }
    let price_rising = price_window.last().unwrap() > price_window.first().unwrap();
    let osc_rising = osc_window.last().unwrap() > osc_window.first().unwrap();
    if price_rising != osc_rising {
        1.4
    } else {
        1.0
    }
}

/// Per-indicator power multiplier in [0.5, 1.0] (§4.3).
pub fn power(confidence: f64, strength: crate::domain::Strength, abs_score: f64) -> f64 {
    use crate::domain::Strength;
    let mut p = 0.5;
    p += if confidence >= 80.0 {
        0.3
    } else if confidence >= 60.0 {
        0.2
    } else if confidence >= 50.0 {
        0.1
    } else {
        0.0
    };
    p += match strength {
        Strength::VeryStrong => 0.2,
        Strength::Strong => 0.1,
        _ => 0.0,
    };
    p += if abs_score >= 60.0 { 0.1 } else { 0.0 };
    p.clamp(0.5, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Strength;

    #[test]
    fn zone_score_oversold_is_bullish() {
        assert!(zone_score(20.0, 30.0, 70.0, 50.0) > 0.0);
    }

    #[test]
    fn zone_score_overbought_is_bearish() {
        assert!(zone_score(85.0, 30.0, 70.0, 50.0) < 0.0);
    }

    #[test]
    fn crossover_detects_bullish_cross() {
        assert_eq!(crossover_sign(9.0, 10.0, 11.0, 10.5), 1);
    }

    #[test]
    fn crossover_detects_bearish_cross() {
        assert_eq!(crossover_sign(11.0, 10.0, 9.0, 10.0), -1);
    }

    #[test]
    fn power_clamped_to_bounds() {
        assert_eq!(power(0.0, Strength::VeryWeak, 0.0), 0.5);
        assert_eq!(power(90.0, Strength::VeryStrong, 90.0), 1.0);
    }
}
