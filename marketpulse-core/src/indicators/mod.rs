//! Numeric indicator engines.
//!
//! These are the pure-computation layer: candle window in, numeric series
//! out, with `f64::NAN` marking the warmup region. They carry no notion of
//! direction, score, or confidence — that decision layer lives in
//! [`crate::evaluators`], which calls into these functions and interprets
//! their output per the category's decision rules.

pub mod helpers;
pub mod oscillators;
pub mod patterns;
pub mod support_resistance;
pub mod trend;
pub mod volatility;
pub mod volume;

#[cfg(test)]
pub mod test_support {
    use crate::domain::{Candle, Timeframe};
    use chrono::{TimeZone, Utc};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Synthetic OHLCV candles from a close-price series: open = prev close,
    /// high/low padded by 1.0, volume fixed at 1000.
    pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let open = if i == 0 { close } else { closes[i - 1] };
                let high = open.max(close) + 1.0;
                let low = open.min(close) - 1.0;
                Candle {
                    symbol: "TEST".to_string(),
                    timeframe: Timeframe::D1,
                    timestamp: base + chrono::Duration::days(i as i64),
                    open,
                    high,
                    low,
                    close,
                    volume: 1000.0,
                }
            })
            .collect()
    }

    /// Same as `make_candles` but with a seeded-random wiggle added to each
    /// close, for tests that want to exercise noisy-but-reproducible series
    /// instead of a hand-built trend.
    pub fn make_noisy_candles(n: usize, base_close: f64, drift_per_bar: f64, noise_amplitude: f64, seed: u64) -> Vec<Candle> {
        let mut rng = StdRng::seed_from_u64(seed);
        let closes: Vec<f64> = (0..n)
            .map(|i| base_close + drift_per_bar * i as f64 + rng.gen_range(-noise_amplitude..=noise_amplitude))
            .collect();
        make_candles(&closes)
    }
}
