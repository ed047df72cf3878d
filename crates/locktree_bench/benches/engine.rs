//! Engine benchmarks: acquire/release cycles.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use locktree_bench::utils::{populate, random_path};
use locktree_core::LockEngine;

/// Benchmark an uncontended exclusive acquire followed by release.
fn bench_uncontended_cycle(c: &mut Criterion) {
    let engine = LockEngine::new();
    let path = random_path(3, 8);

    c.bench_function("uncontended_cycle", |b| {
        b.iter(|| {
            if let Ok(Ok(lock)) = engine.acquire("bench", path.clone(), true).try_take() {
                engine.release(black_box(&lock));
            }
        });
    });
}

/// Benchmark a cycle that leaves one waiter behind and grants it on release.
fn bench_handoff_cycle(c: &mut Criterion) {
    let engine = LockEngine::new();

    c.bench_function("handoff_cycle", |b| {
        b.iter(|| {
            let Ok(Ok(first)) = engine.acquire("bench", ["hot"], true).try_take() else {
                return;
            };
            let waiter = engine.acquire("bench", ["hot", "child"], true);
            engine.release(&first);
            if let Ok(Ok(second)) = waiter.try_take() {
                engine.release(&second);
            }
        });
    });
}

/// Benchmark acquiring in a crowded tree.
fn bench_crowded_acquire(c: &mut Criterion) {
    let engine = LockEngine::new();
    let _locks = populate(&engine, 1000, 4, 8);

    c.bench_function("crowded_acquire", |b| {
        b.iter(|| {
            let future = engine.acquire("other", random_path(4, 8), false);
            if let Ok(Ok(lock)) = future.try_take() {
                engine.release(&lock);
            }
        });
    });
}

criterion_group!(benches, bench_uncontended_cycle, bench_handoff_cycle, bench_crowded_acquire);
criterion_main!(benches);
