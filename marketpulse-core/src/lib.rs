//! Pure computational core: candle/domain types, indicator numeric engines,
//! the decision-layer evaluators built on them, the regime detector, the
//! signal combiner, the levels calculator, and the engine that wires C1–C4
//! together into a `Signal`. No I/O, no async, no persistence — that's
//! `marketpulse-runtime`.

pub mod combiner;
pub mod components;
pub mod domain;
pub mod engine;
pub mod evaluators;
pub mod indicators;
pub mod levels;
pub mod regime_detector;
pub mod registry;
pub mod rules;

#[cfg(test)]
mod architecture_tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn core_types_are_send_sync() {
        assert_send_sync::<domain::Candle>();
        assert_send_sync::<domain::Signal>();
        assert_send_sync::<registry::Registry>();
    }
}
