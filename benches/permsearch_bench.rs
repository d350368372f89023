//! Criterion benchmarks for u-permsearch.
//!
//! Uses random QAP instances and random objective streams to measure the
//! local search, the memetic loop, and archive insertion throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_permsearch::memetic::{MemeticConfig, MemeticRunner};
use u_permsearch::objective::{Objective, Qap};
use u_permsearch::tabu::{SearchContext, TabuConfig, TabuLocalSearch};
use u_permsearch::{EvaluationBudget, NoOpMonitor, ParetoArchive, Permutation};

// ===========================================================================
// Instances
// ===========================================================================

fn random_qap(n: usize, seed: u64) -> Qap {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = (0..n * n).map(|_| rng.random_range(0..100)).collect();
    let b = (0..n * n).map(|_| rng.random_range(0..100)).collect();
    Qap::new(n, a, b).expect("square matrices")
}

fn random_vectors(count: usize, dimensions: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..dimensions).map(|_| rng.random::<f64>()).collect())
        .collect()
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_archive_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("archive_insert");
    group.sample_size(10);

    let mut rng = StdRng::seed_from_u64(7);
    let solutions: Vec<Permutation> = (0..5_000).map(|_| Permutation::random(16, &mut rng)).collect();
    for &dimensions in &[2usize, 3, 5] {
        let vectors = random_vectors(5_000, dimensions, 42);
        group.bench_with_input(
            BenchmarkId::from_parameter(dimensions),
            &vectors,
            |b, vectors| {
                b.iter(|| {
                    let mut archive = ParetoArchive::new(dimensions);
                    for (s, v) in solutions.iter().zip(vectors) {
                        black_box(archive.insert(s, v).ok());
                    }
                    black_box(archive.len())
                })
            },
        );
    }
    group.finish();
}

fn bench_local_search_qap(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_search_qap");
    group.sample_size(10);

    for &n in &[12usize, 25, 50] {
        let qap = random_qap(n, 7);
        let search = TabuLocalSearch::new(TabuConfig::default()).expect("valid tabu config");
        group.bench_with_input(BenchmarkId::from_parameter(n), &qap, |b, qap| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(42);
                let mut budget = EvaluationBudget::new(u64::MAX);
                let start = Permutation::random(n, &mut rng);
                let value = qap.evaluate(start.as_slice());
                let mut monitor = NoOpMonitor;
                let mut ctx = SearchContext::new(&mut budget, &mut monitor, &mut rng);
                black_box(search.search(start, value, 1_000, qap, &mut ctx))
            })
        });
    }
    group.finish();
}

fn bench_memetic_qap(c: &mut Criterion) {
    let mut group = c.benchmark_group("memetic_qap");
    group.sample_size(10);

    for &n in &[12usize, 25] {
        let objectives = [random_qap(n, 11)];
        let config = MemeticConfig::tuned().with_seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(objectives, config),
            |b, (o, c)| {
                b.iter(|| {
                    let result = MemeticRunner::run(black_box(o), 200_000, black_box(c));
                    black_box(result.ok())
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_archive_insert,
    bench_local_search_qap,
    bench_memetic_qap
);
criterion_main!(benches);
