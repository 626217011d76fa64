//! Layered error taxonomy (§4.7, §7): one enum per concern, composed into a
//! crate-level error via `#[from]`, in the same `DataError`/`FactoryError`
//! style used elsewhere in this workspace.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("fetch timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },
    #[error("malformed candle from source: {0}")]
    MalformedCandle(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("signal not found: {0}")]
    NotFound(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("symbol set must not be empty")]
    EmptySymbolSet,
    #[error("failed to parse configuration file: {0}")]
    ParseError(String),
}

/// Errors that can surface to the generator/tracker loop supervisor at
/// runtime. Indicator-level failures never reach this type — they are
/// absorbed as `IndicatorResult::insufficient_data` inside the core.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("signal invariant violated: {0}")]
    InvariantViolation(String),
    #[error("session clock state unknown for {symbol}")]
    ClockUnknown { symbol: String },
}
