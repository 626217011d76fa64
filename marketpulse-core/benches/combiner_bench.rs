//! Criterion benchmarks for the signal-synthesis hot path.
//!
//! Benchmarks:
//! 1. Registry evaluation (all indicators, rayon fan-out) across candle counts
//! 2. Regime detection
//! 3. Combiner aggregation (C3) given pre-computed indicator results
//! 4. Full engine pipeline (C1 → C4) end to end

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use marketpulse_core::combiner;
use marketpulse_core::domain::{Candle, Timeframe};
use marketpulse_core::engine::{self, EngineConfig};
use marketpulse_core::regime_detector;
use marketpulse_core::registry::Registry;

fn make_candles(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.07).sin() * 8.0 + i as f64 * 0.05;
            let open = close - 0.2;
            Candle {
                symbol: "BENCH".to_string(),
                timeframe: Timeframe::M15,
                timestamp: chrono::Utc::now() + chrono::Duration::minutes(15 * i as i64),
                open,
                high: close.max(open) + 1.2,
                low: close.min(open) - 1.2,
                close,
                volume: 1_000_000.0 + (i as f64 % 500_000.0),
            }
        })
        .collect()
}

fn bench_registry_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_evaluate_all");
    let registry = Registry::with_defaults();

    for &bar_count in &[60, 250, 1000] {
        let candles = make_candles(bar_count);
        group.bench_with_input(BenchmarkId::new("evaluate_all", bar_count), &bar_count, |b, _| {
            b.iter(|| registry.evaluate_all(black_box(&candles)));
        });
    }

    group.finish();
}

fn bench_regime_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("regime_detect");
    let candles = make_candles(250);

    group.bench_function("detect_250_bars", |b| {
        b.iter(|| regime_detector::detect(black_box(&candles)));
    });

    group.finish();
}

fn bench_combiner(c: &mut Criterion) {
    let mut group = c.benchmark_group("combiner_combine");
    let registry = Registry::with_defaults();
    let candles = make_candles(250);
    let regime = regime_detector::detect(&candles);
    let results = registry.evaluate_all(&candles);

    group.bench_function("combine_250_bars", |b| {
        b.iter(|| combiner::combine(black_box(&results), black_box(&regime), black_box(&registry)));
    });

    group.finish();
}

fn bench_full_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_evaluate");
    let registry = Registry::with_defaults();
    let config = EngineConfig::default();

    for &bar_count in &[60, 250, 1000] {
        let candles = make_candles(bar_count);
        group.bench_with_input(BenchmarkId::new("evaluate", bar_count), &bar_count, |b, _| {
            b.iter(|| engine::evaluate(black_box(&registry), black_box(&candles), chrono::Utc::now(), black_box(&config)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_registry_evaluation, bench_regime_detection, bench_combiner, bench_full_engine);
criterion_main!(benches);
