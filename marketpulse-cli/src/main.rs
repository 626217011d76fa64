//! marketpulse CLI — run the generator/tracker loops, or evaluate one
//! symbol/timeframe once and print the resulting signal.
//!
//! Commands:
//! - `run` — start the generator and tracker loops against the in-memory
//!   reference adapters and a config file
//! - `once` — evaluate a single symbol/timeframe synchronously and print the
//!   resulting `Signal` as JSON

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use marketpulse_core::engine::{self, EngineConfig};
use marketpulse_core::registry::Registry;
use marketpulse_runtime::adapters::{FixedSessionClock, InMemoryEventSink, InMemorySignalStore};
use marketpulse_runtime::supervisor;
use marketpulse_runtime::RuntimeConfig;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(name = "marketpulse", about = "Real-time technical-analysis signal engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Optional TOML config file; compiled defaults apply if omitted.
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the generator and tracker loops against in-memory adapters.
    Run,
    /// Evaluate one symbol/timeframe synchronously and print the signal.
    Once {
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value = "15m")]
        timeframe: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = RuntimeConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Run => run(config).await,
        Command::Once { symbol, timeframe } => once(&config, &symbol, &timeframe),
    }
}

async fn run(config: RuntimeConfig) -> anyhow::Result<()> {
    let config = Arc::new(config);
    let registry = Arc::new(Registry::with_defaults());
    let store = Arc::new(InMemorySignalStore::new());
    let sink = Arc::new(InMemoryEventSink::new());
    let clock = Arc::new(FixedSessionClock::new(config.venue_sessions.clone()));
    let source = Arc::new(demo_source::DemoCandleSource::default());
    let cancel = CancellationToken::new();

    let slots = supervisor::build_slots(&config);
    info!(slot_count = slots.len(), symbols = ?config.symbols, "starting generator and tracker loops");

    let generator = tokio::spawn(supervisor::run_generator_loop(
        slots,
        source.clone(),
        store.clone(),
        sink.clone(),
        registry,
        config.clone(),
        cancel.clone(),
    ));
    let tracker = tokio::spawn(supervisor::run_tracker_loop(store, clock, sink, source, config, cancel.clone()));

    tokio::signal::ctrl_c().await.ok();
    info!("shutdown signal received, cancelling loops");
    cancel.cancel();
    let _ = tokio::join!(generator, tracker);
    Ok(())
}

fn once(config: &RuntimeConfig, symbol: &str, timeframe: &str) -> anyhow::Result<()> {
    info!(symbol, timeframe, "evaluating single symbol/timeframe");
    let registry = Registry::with_defaults();
    let candles = demo_source::synthetic_candles(symbol, timeframe, engine::MIN_CANDLES * 2)
        .context("failed to build synthetic candle window")?;

    let engine_config = EngineConfig {
        levels: marketpulse_core::levels::LevelsConfig {
            stop_multiplier: config.stop_multiplier,
            min_stop_percent: config.min_stop_percent,
            ..Default::default()
        },
        signal_ttl: chrono::Duration::seconds(config.expiry_seconds as i64),
    };

    match engine::evaluate(&registry, &candles, chrono::Utc::now(), &engine_config) {
        Some(signal) => {
            info!(action = ?signal.action, confidence = signal.confidence, "signal produced");
            println!("{}", serde_json::to_string_pretty(&signal)?);
            Ok(())
        }
        None => anyhow::bail!("insufficient candles for {symbol} {timeframe}"),
    }
}

/// In-process synthetic candle source used by both CLI subcommands, since no
/// HTTP client or database driver is part of this system. Real deployments
/// supply their own `CandleSource` implementation.
mod demo_source {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use marketpulse_core::domain::{Candle, Timeframe};
    use marketpulse_runtime::error::DataError;

    #[derive(Default)]
    pub struct DemoCandleSource;

    #[async_trait]
    impl marketpulse_runtime::traits::CandleSource for DemoCandleSource {
        async fn fetch(
            &self,
            symbol: &str,
            timeframe: Timeframe,
            _from_ts: Option<DateTime<Utc>>,
            limit: Option<usize>,
        ) -> Result<Vec<Candle>, DataError> {
            Ok(synthetic_candles(symbol, timeframe.as_str(), limit.unwrap_or(120))
                .map_err(|e| DataError::MalformedCandle(e.to_string()))?)
        }
    }

    /// Deterministic mild-uptrend candle series for offline demonstration.
    pub fn synthetic_candles(symbol: &str, timeframe: &str, count: usize) -> anyhow::Result<Vec<Candle>> {
        let timeframe = match timeframe {
            "1m" => Timeframe::M1,
            "5m" => Timeframe::M5,
            "15m" => Timeframe::M15,
            "30m" => Timeframe::M30,
            "1h" => Timeframe::H1,
            "1d" => Timeframe::D1,
            other => anyhow::bail!("unknown timeframe: {other}"),
        };
        let step = timeframe.duration();
        let start = Utc::now() - step * count as i32;

        let candles = (0..count)
            .map(|i| {
                let close = 100.0 + (i as f64) * 0.35 + (i as f64 * 0.3).sin() * 1.5;
                let open = close - 0.2;
                Candle {
                    symbol: symbol.to_string(),
                    timeframe,
                    timestamp: start + step * i as i32,
                    open,
                    high: close.max(open) + 0.5,
                    low: close.min(open) - 0.5,
                    close,
                    volume: 10_000.0,
                }
            })
            .collect();
        Ok(candles)
    }
}
