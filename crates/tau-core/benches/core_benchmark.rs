use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tau_core::stats::{weighted_covariance, weighted_quantile};

fn make_population(n: usize, dim: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    // Deterministic pseudo-spread so runs are stable across machines.
    let rows = (0..n)
        .map(|i| (0..dim).map(|j| ((i * 31 + j * 17) % 97) as f64 * 0.1).collect())
        .collect();
    let weights = (0..n).map(|i| 1.0 + (i % 7) as f64).collect();
    (rows, weights)
}

fn bench_weighted_quantile(c: &mut Criterion) {
    let mut group = c.benchmark_group("core_stats/weighted_quantile");
    for n in [100usize, 1_000, 10_000] {
        let (rows, w) = make_population(n, 1);
        let col: Vec<f64> = rows.iter().map(|r| r[0]).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(weighted_quantile(black_box(&col), black_box(&w), 0.975)));
        });
    }
    group.finish();
}

fn bench_weighted_covariance(c: &mut Criterion) {
    let mut group = c.benchmark_group("core_stats/weighted_covariance");
    for dim in [1usize, 3, 8] {
        let (rows, w) = make_population(1_000, dim);
        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |b, _| {
            b.iter(|| black_box(weighted_covariance(black_box(&rows), black_box(&w)).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_weighted_quantile, bench_weighted_covariance);
criterion_main!(benches);
