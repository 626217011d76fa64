//! Decision-layer evaluators, one submodule per indicator category (§4.1).
//!
//! Each evaluator wraps one or more `indicators::*` numeric primitives and
//! applies its family's decision rule to emit a single `IndicatorResult`.

pub mod oscillators;
pub mod patterns;
pub mod support_resistance;
pub mod trend;
pub mod volatility;
pub mod volume;
