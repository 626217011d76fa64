//! External-interface traits (§6): async boundaries the loops drive through.
//! Implementations handle the specifics of fetching candles, persisting
//! signals, reading the clock, and publishing events — the core loops don't
//! know about any particular backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marketpulse_core::domain::{Candle, Signal, SignalId, SignalStatus, Timeframe};

use crate::error::{DataError, StoreError};

/// Source of OHLCV candles for a symbol/timeframe.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch candles in ascending time order. Implementations must
    /// deduplicate identical timestamps (or the caller retains the last
    /// occurrence); gaps are tolerated.
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from_ts: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>, DataError>;
}

/// Terminal fields written by the tracker on a status transition.
#[derive(Debug, Clone)]
pub struct TerminalFields {
    pub status: SignalStatus,
    pub performance: marketpulse_core::domain::Performance,
}

/// Persistence boundary for signals. `upsert_signal` is idempotent on
/// `(symbol, timeframe, timestamp)`.
#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn upsert_signal(&self, signal: &Signal) -> Result<(), StoreError>;
    async fn find_active(&self) -> Result<Vec<Signal>, StoreError>;
    async fn update_status(&self, id: SignalId, terminal: TerminalFields) -> Result<(), StoreError>;
}

/// Monotonic + wall clock, plus the venue session predicate the tracker
/// needs for market-close detection.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// `None` means the session state for this symbol cannot be determined
    /// (§7 CLOCK_UNKNOWN) — the tracker must hold rather than guess.
    fn is_session_open(&self, symbol: &str, at: DateTime<Utc>) -> Option<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Created,
    Terminated,
    Expired,
}

#[derive(Debug, Clone)]
pub struct SignalEvent {
    pub kind: EventKind,
    pub signal: Signal,
}

/// Fan-out sink for signal lifecycle events (e.g. WebSocket listeners).
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: SignalEvent);
}
