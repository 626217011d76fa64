//! Owns the Generator and Tracker loops as independent periodic tasks and
//! the bounded worker pool that dispatches per-symbol generator work (§5).

use std::sync::Arc;

use marketpulse_core::domain::Timeframe;
use marketpulse_core::registry::Registry;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::RuntimeConfig;
use crate::generator::{self, GeneratorSlot};
use crate::traits::{CandleSource, Clock, EventSink, SignalStore};

/// Runs the Generator loop until `cancel` fires. Every `generator_period`,
/// each (symbol, timeframe) slot is dispatched through a semaphore-bounded
/// pool sized `min(num_cpus, num_symbols)` (here, `config.resolve_worker_pool_size()`).
pub async fn run_generator_loop<S, T, E>(
    slots: Vec<GeneratorSlot>,
    source: Arc<S>,
    store: Arc<T>,
    sink: Arc<E>,
    registry: Arc<Registry>,
    config: Arc<RuntimeConfig>,
    cancel: CancellationToken,
) where
    S: CandleSource + 'static,
    T: SignalStore + 'static,
    E: EventSink + 'static,
{
    let pool = Arc::new(Semaphore::new(config.resolve_worker_pool_size()));
    let mut slots = slots;
    let mut interval = tokio::time::interval(config.generator_period());

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("generator loop cancelled, shutting down at safe point");
                break;
            }
            _ = interval.tick() => {
                dispatch_tick(&mut slots, &pool, &source, &store, &sink, &registry, &config).await;
            }
        }
    }
}

async fn dispatch_tick<S, T, E>(
    slots: &mut [GeneratorSlot],
    pool: &Arc<Semaphore>,
    source: &Arc<S>,
    store: &Arc<T>,
    sink: &Arc<E>,
    registry: &Arc<Registry>,
    config: &Arc<RuntimeConfig>,
) where
    S: CandleSource + 'static,
    T: SignalStore + 'static,
    E: EventSink + 'static,
{
    // Indicator math fans out internally via rayon inside `registry.evaluate_all`;
    // this pool bounds how many symbols fetch/persist concurrently, not CPU work.
    for slot in slots.iter_mut() {
        let permit = match pool.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!(symbol = %slot.symbol, "worker pool saturated, slot skipped this tick");
                continue;
            }
        };
        let signal = generator::tick(slot, source.as_ref(), store.as_ref(), sink.as_ref(), registry, config).await;
        drop(permit);
        if let Some(signal) = signal {
            info!(symbol = %signal.symbol, action = ?signal.action, confidence = signal.confidence, "signal generated");
        }
    }
}

/// Runs the Tracker loop until `cancel` fires.
pub async fn run_tracker_loop<T, C, E, S>(store: Arc<T>, clock: Arc<C>, sink: Arc<E>, source: Arc<S>, config: Arc<RuntimeConfig>, cancel: CancellationToken)
where
    T: SignalStore + 'static,
    C: Clock + 'static,
    E: EventSink + 'static,
    S: CandleSource + 'static,
{
    let mut interval = tokio::time::interval(config.tracker_period());

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("tracker loop cancelled, shutting down at safe point");
                break;
            }
            _ = interval.tick() => {
                crate::tracker::tick(store.as_ref(), clock.as_ref(), sink.as_ref(), source.as_ref(), &config).await;
            }
        }
    }
}

/// Builds one generator slot per (symbol, timeframe) pair in the config.
pub fn build_slots(config: &RuntimeConfig) -> Vec<GeneratorSlot> {
    config
        .symbols
        .iter()
        .flat_map(|symbol| config.timeframes.iter().map(move |tf| (symbol.clone(), tf.clone())))
        .filter_map(|(symbol, tf)| parse_timeframe(&tf).map(|t| GeneratorSlot::new(symbol, t)))
        .collect()
}

fn parse_timeframe(s: &str) -> Option<Timeframe> {
    match s {
        "1m" => Some(Timeframe::M1),
        "5m" => Some(Timeframe::M5),
        "15m" => Some(Timeframe::M15),
        "30m" => Some(Timeframe::M30),
        "1h" => Some(Timeframe::H1),
        "1d" => Some(Timeframe::D1),
        _ => None,
    }
}
