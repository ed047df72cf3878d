//! Lock tree benchmarks: conflict checks and path copies.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use locktree_bench::utils::{populate, random_path};
use locktree_core::{deep_copy_locks_tree_path, is_lock_available, LockEngine, Segment};

/// Benchmark availability checks against trees of growing size.
fn bench_is_lock_available(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_lock_available");

    for count in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let engine = LockEngine::new();
            let _locks = populate(&engine, count, 4, 8);
            let state = engine.snapshot();
            let path = random_path(2, 8);

            b.iter(|| {
                black_box(is_lock_available(
                    state.tree(),
                    black_box("bench"),
                    black_box(&path),
                    true,
                ))
            });
        });
    }

    group.finish();
}

/// Benchmark copying one path out of a populated tree.
fn bench_deep_copy_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_copy_locks_tree_path");

    for depth in [1, 4, 8].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &depth| {
            let engine = LockEngine::new();
            let _locks = populate(&engine, 500, depth, 8);
            let state = engine.snapshot();
            let path: Vec<Segment> = std::iter::once(Segment::from("bench"))
                .chain(random_path(depth, 8))
                .collect();

            b.iter(|| black_box(deep_copy_locks_tree_path(state.tree(), black_box(&path))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_is_lock_available, bench_deep_copy_path);
criterion_main!(benches);
