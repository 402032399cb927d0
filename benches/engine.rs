//! Benchmarks for pattern scanning and indicator computation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use chartlab::prelude::*;

/// Deterministic pseudo-random walk
fn generate_bars(n: usize) -> Vec<Bar> {
  let mut bars = Vec::with_capacity(n);
  let mut price = 100.0;

  for i in 0..n {
    let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0;
    let volatility = 2.0 + ((i * 3) % 10) as f64 / 5.0;

    let o = price;
    let c = (price + change).max(1.0);
    let h = o.max(c) + volatility * 0.5;
    let l = o.min(c) - volatility * 0.5;

    bars.push(Bar::new(i as i64 * 60, o, h, l, c, 1000.0));
    price = c;
  }

  bars
}

fn bench_single_pattern(c: &mut Criterion) {
  let bars = generate_bars(1000);

  let engine = EngineBuilder::new()
    .add(CandleDetector::Doji(DojiDetector))
    .chart_patterns(false)
    .harmonics(false)
    .build()
    .unwrap();

  c.bench_function("scan_doji_1000_bars", |b| {
    b.iter(|| {
      let _ = black_box(engine.scan(black_box(&bars)));
    })
  });
}

fn bench_full_scan(c: &mut Criterion) {
  let bars = generate_bars(1000);

  let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

  c.bench_function("scan_all_1000_bars", |b| {
    b.iter(|| {
      let _ = black_box(engine.scan(black_box(&bars)));
    })
  });
}

fn bench_scaling(c: &mut Criterion) {
  let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

  let mut group = c.benchmark_group("scaling");

  for size in [100, 1000, 10000].iter() {
    let bars = generate_bars(*size);

    group.bench_with_input(BenchmarkId::new("scan", size), size, |b, _| {
      b.iter(|| {
        let _ = black_box(engine.scan(black_box(&bars)));
      })
    });
  }

  group.finish();
}

fn bench_parallel_scan(c: &mut Criterion) {
  let bars1 = generate_bars(1000);
  let bars2 = generate_bars(1000);
  let bars3 = generate_bars(1000);
  let bars4 = generate_bars(1000);

  let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

  let instruments: Vec<(&str, &[Bar])> =
    vec![("SYM1", &bars1), ("SYM2", &bars2), ("SYM3", &bars3), ("SYM4", &bars4)];

  c.bench_function("parallel_scan_4_instruments", |b| {
    b.iter(|| {
      let _ = black_box(scan_parallel(black_box(&engine), black_box(instruments.clone())));
    })
  });
}

fn bench_indicators(c: &mut Criterion) {
  let bars = generate_bars(5000);
  let registry = IndicatorRegistry::with_builtins();

  let mut group = c.benchmark_group("indicators");

  for name in registry.names() {
    let Some(template) = registry.get(name) else { continue };
    group.bench_function(name, |b| {
      b.iter(|| {
        let _ = black_box(template.compute(black_box(&bars), &template.default_params));
      })
    });
  }

  group.finish();
}

criterion_group!(
  benches,
  bench_single_pattern,
  bench_full_scan,
  bench_scaling,
  bench_parallel_scan,
  bench_indicators,
);

criterion_main!(benches);
