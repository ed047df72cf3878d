//! Benchmark utilities.

use locktree_core::{Lock, LockEngine, Segment};
use rand::Rng;

/// Generates a random path of `depth` segments drawn from `fanout` names.
pub fn random_path(depth: usize, fanout: u32) -> Vec<Segment> {
    let mut rng = rand::thread_rng();
    (0..depth)
        .map(|_| Segment::from(rng.gen_range(0..fanout)))
        .collect()
}

/// Fills an engine with shared locks on `count` random paths.
///
/// Returns the granted locks; requests that had to wait are dropped.
pub fn populate(engine: &LockEngine, count: usize, depth: usize, fanout: u32) -> Vec<Lock> {
    (0..count)
        .filter_map(|_| {
            engine
                .acquire("bench", random_path(depth, fanout), false)
                .try_take()
                .ok()
                .and_then(Result::ok)
        })
        .collect()
}
