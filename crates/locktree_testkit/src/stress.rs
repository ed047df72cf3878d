//! Stress tests for the lock engine.
//!
//! Many threads hammer one engine with random requests over a small tree.
//! Each thread holds at most one lock at a time, so runs always finish.

use crate::fixtures::init_tracing;
use crate::generators::{segment, store_key};
use crate::oracle::find_violation;
use locktree_core::LockEngine;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Locks acquired and released.
    pub total_ops: usize,
    /// Snapshots that showed incompatible locks held together.
    pub violations: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(total_ops: usize, violations: usize, duration: Duration) -> Self {
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total_ops as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops,
            violations,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Violations: {}", self.violations);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent threads.
    pub threads: usize,
    /// Acquire/release cycles per thread.
    pub iterations: usize,
    /// Maximum path depth below the store key.
    pub max_depth: usize,
    /// Fraction of requests that are exclusive, in `0.0..=1.0`.
    pub exclusive_ratio: f64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            iterations: 500,
            max_depth: 3,
            exclusive_ratio: 0.5,
        }
    }
}

/// Runs random acquire/check/release cycles from several threads.
///
/// While holding its lock, each thread checks the engine's current holders
/// against the oracle and counts violations.
///
/// # Panics
///
/// Panics if a worker thread panics, e.g. when `exclusive_ratio` is outside
/// `0.0..=1.0`.
pub fn stress_random_paths(engine: &LockEngine, config: &StressConfig) -> StressTestResult {
    init_tracing();
    let violations = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|_| {
            let engine = engine.clone();
            let config = config.clone();
            let violations = Arc::clone(&violations);
            let completed = Arc::clone(&completed);

            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for _ in 0..config.iterations {
                    let store = store_key(rng.gen_range(0..2));
                    let depth = rng.gen_range(0..=config.max_depth);
                    let path: Vec<_> = (0..depth).map(|_| segment(rng.gen_range(0..3))).collect();
                    let exclusive = rng.gen_bool(config.exclusive_ratio);

                    let Ok(lock) = engine.acquire(store, path, exclusive).wait() else {
                        return;
                    };
                    if find_violation(&engine.snapshot().held_locks()).is_some() {
                        violations.fetch_add(1, Ordering::Relaxed);
                    }
                    engine.release(&lock);
                    completed.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("stress worker panicked");
    }

    StressTestResult::new(
        completed.load(Ordering::Relaxed),
        violations.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Repeatedly locks one hot path with exclusive requests from all threads.
///
/// Counts how often two threads were inside the critical section at once.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn stress_hot_path(engine: &LockEngine, config: &StressConfig) -> StressTestResult {
    init_tracing();
    let inside = Arc::new(AtomicUsize::new(0));
    let violations = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let engine = engine.clone();
            let iterations = config.iterations;
            let inside = Arc::clone(&inside);
            let violations = Arc::clone(&violations);
            let completed = Arc::clone(&completed);

            thread::spawn(move || {
                // odd threads lock below the hot node
                let path: Vec<&str> = if t % 2 == 0 { vec!["hot"] } else { vec!["hot", "child"] };
                for _ in 0..iterations {
                    let Ok(lock) = engine.acquire("store", path.clone(), true).wait() else {
                        return;
                    };
                    if inside.fetch_add(1, Ordering::SeqCst) != 0 {
                        violations.fetch_add(1, Ordering::Relaxed);
                    }
                    inside.fetch_sub(1, Ordering::SeqCst);
                    engine.release(&lock);
                    completed.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("stress worker panicked");
    }

    StressTestResult::new(
        completed.load(Ordering::Relaxed),
        violations.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> StressConfig {
        StressConfig {
            threads: 4,
            iterations: 100,
            ..StressConfig::default()
        }
    }

    #[test]
    fn random_paths_never_violate_exclusion() {
        let engine = LockEngine::new();
        let result = stress_random_paths(&engine, &small());
        assert_eq!(result.violations, 0);
        assert_eq!(result.total_ops, 400);
        assert!(engine.snapshot().tree().is_empty());
    }

    #[test]
    fn hot_path_is_serialized() {
        let engine = LockEngine::new();
        let result = stress_hot_path(&engine, &small());
        assert_eq!(result.violations, 0);
        assert_eq!(result.total_ops, 400);
        assert_eq!(engine.stats().held_locks(), 0);
    }

    #[test]
    #[should_panic(expected = "stress worker panicked")]
    fn worker_panic_reaches_caller() {
        let config = StressConfig {
            exclusive_ratio: 2.0,
            ..small()
        };
        stress_random_paths(&LockEngine::new(), &config);
    }
}
