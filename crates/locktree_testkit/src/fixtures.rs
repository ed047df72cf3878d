//! Test fixtures and engine helpers.
//!
//! [`OpHarness`] drives an engine synchronously from a list of
//! [`LockOp`]s and cross-checks it against the oracle after every step.

use crate::generators::{store_key, LockOp};
use crate::oracle::{expected_available, find_violation};
use locktree_core::{EngineState, Lock, LockEngine, LockFuture};
use std::collections::HashSet;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`, e.g. `RUST_LOG=locktree_core=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Takes the lock out of a future that must already be resolved.
///
/// # Panics
///
/// Panics if the request is still pending or failed.
pub fn expect_granted(future: LockFuture) -> Lock {
    match future.try_take() {
        Ok(Ok(lock)) => lock,
        Ok(Err(err)) => panic!("lock request failed: {err}"),
        Err(_) => panic!("lock request is still pending"),
    }
}

/// Returns a future that must still be pending.
///
/// # Panics
///
/// Panics if the request was already resolved.
pub fn expect_pending(future: LockFuture) -> LockFuture {
    match future.try_take() {
        Err(future) => future,
        Ok(outcome) => panic!("expected a pending request, got {outcome:?}"),
    }
}

/// Dumps a state's tree as JSON, for debugging and golden comparisons.
#[must_use]
pub fn tree_json(state: &EngineState) -> serde_json::Value {
    serde_json::to_value(state.tree().as_ref()).unwrap_or(serde_json::Value::Null)
}

/// Drives an engine step by step, tracking what callers hold.
#[derive(Debug)]
pub struct OpHarness {
    /// Engine under test.
    pub engine: LockEngine,
    /// Futures not yet resolved, in issue order.
    pub pending: Vec<LockFuture>,
    /// Locks handed to callers and not yet released.
    pub held: Vec<Lock>,
}

impl OpHarness {
    /// Wraps `engine`, installing the test subscriber on first use.
    #[must_use]
    pub fn new(engine: LockEngine) -> Self {
        init_tracing();
        Self {
            engine,
            pending: Vec::new(),
            held: Vec::new(),
        }
    }

    /// Applies one step, then collects newly granted locks.
    pub fn apply(&mut self, op: &LockOp) {
        match op {
            LockOp::Acquire {
                store,
                path,
                exclusive,
            } => {
                let future = self
                    .engine
                    .acquire(store_key(*store), LockOp::segments(path), *exclusive);
                self.pending.push(future);
            }
            LockOp::Release { index } => {
                if !self.held.is_empty() {
                    let lock = self.held.swap_remove(index % self.held.len());
                    self.engine.release(&lock);
                }
            }
            LockOp::Abandon { index } => {
                if !self.pending.is_empty() {
                    let future = self.pending.remove(index % self.pending.len());
                    drop(future);
                }
            }
        }
        self.collect();
    }

    /// Moves resolved futures into `held`.
    pub fn collect(&mut self) {
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for future in self.pending.drain(..) {
            match future.try_take() {
                Ok(Ok(lock)) => self.held.push(lock),
                Ok(Err(err)) => panic!("lock request failed: {err}"),
                Err(future) => still_pending.push(future),
            }
        }
        self.pending = still_pending;
    }

    /// Checks the engine against the oracle.
    ///
    /// # Panics
    ///
    /// Panics on the first inconsistency found.
    pub fn assert_consistent(&self) {
        let state = self.engine.snapshot();

        if let Some(violation) = find_violation(&self.held) {
            panic!("incompatible locks held together: {violation:?}");
        }

        let in_tree: HashSet<_> = state.held_locks().into_iter().collect();
        let handed_out: HashSet<_> = self.held.iter().cloned().collect();
        assert_eq!(in_tree, handed_out, "tree and callers disagree on held locks");

        // dropped futures linger in the queue until the next pass
        assert!(state.requests().len() >= self.pending.len());

        for request in state.requests() {
            let available = state.is_lock_available(
                request.store_key().as_str(),
                request.path(),
                request.is_exclusive(),
            );
            let expected = expected_available(
                &self.held,
                request.store_key().as_str(),
                request.path(),
                request.is_exclusive(),
            );
            assert_eq!(
                available, expected,
                "conflict checker disagrees with oracle for {request:?}"
            );
        }
    }

    /// Releases everything until no request is left waiting.
    ///
    /// Returns the number of release rounds it took.
    ///
    /// # Panics
    ///
    /// Panics if requests are still pending with nothing left to release.
    pub fn drain(&mut self) -> usize {
        let mut rounds = 0;
        while !self.pending.is_empty() {
            assert!(!self.held.is_empty(), "pending requests with no lock held");
            for lock in std::mem::take(&mut self.held) {
                self.engine.release(&lock);
            }
            self.collect();
            rounds += 1;
        }
        for lock in std::mem::take(&mut self.held) {
            self.engine.release(&lock);
        }
        rounds
    }
}
