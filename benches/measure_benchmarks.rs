//! Benchmarks for the measurement overhead of the engine.
//!
//! A no-op client is used so only timing, metric construction and batch
//! joining are measured:
//! - Single synchronous unit
//! - Single asynchronous unit
//! - Best-effort and fail-fast batches of various sizes

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use telemetry_metrics::error::TelemetryResult;
use telemetry_metrics::{Metric, MetricRequest, MetricsService, TelemetryClient};
use tokio::runtime::Runtime;

struct NoopClient;

impl TelemetryClient for NoopClient {
    fn track_metric(&self, metric: Metric) {
        black_box(metric);
    }

    fn flush(&self) -> TelemetryResult<()> {
        Ok(())
    }
}

fn metric() -> MetricRequest {
    MetricRequest::new("bench").with_property("suite", "criterion")
}

fn bench_execute(c: &mut Criterion) {
    let mut service = MetricsService::with_client(NoopClient);
    let metric = metric();

    c.bench_function("execute_sync", |b| {
        b.iter(|| {
            let measured = service
                .execute(|| Ok::<_, String>(black_box(42)), &metric, None)
                .unwrap();
            black_box(measured)
        });
    });
}

fn bench_execute_async(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let metric = metric();

    c.bench_function("execute_async", |b| {
        b.to_async(&rt).iter(|| async {
            let mut service = MetricsService::with_client(NoopClient);
            let measured = service
                .execute_async(|| async { Ok::<_, String>(black_box(42)) }, &metric, None)
                .await
                .unwrap();
            black_box(measured)
        });
    });
}

fn bench_batches(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let metric = metric();
    let mut group = c.benchmark_group("batch");

    for size in [1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::new("best_effort", size), &size, |b, &size| {
            b.to_async(&rt).iter(|| async {
                let mut service = MetricsService::with_client(NoopClient);
                let units = (0..size).map(|i| move || async move { Ok::<_, String>(i) });
                let outcome = service.execute_all_async(units, &metric, None).await.unwrap();
                black_box(outcome)
            });
        });

        group.bench_with_input(BenchmarkId::new("fail_fast", size), &size, |b, &size| {
            b.to_async(&rt).iter(|| async {
                let mut service = MetricsService::with_client(NoopClient);
                let units = (0..size).map(|i| move || async move { Ok::<_, String>(i) });
                let outcome = service
                    .execute_all_fail_fast_async(units, &metric, None)
                    .await
                    .unwrap();
                black_box(outcome)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_execute, bench_execute_async, bench_batches);
criterion_main!(benches);
