//! Lock engine.

use super::{LockFuture, LockGuard, Resolver};
use crate::config::{LockConfig, SchedulingPolicy};
use crate::error::{LockError, LockResult};
use crate::state::{copy_path_with, reduce, Action, EngineState, Lock, LockRequest};
use crate::stats::{LockStats, StatsSnapshot};
use crate::tree::{is_lock_available, LockTreeNode};
use crate::types::{lock_path, LockId, RequestId, Segment};
use parking_lot::Mutex;
use std::iter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Grants lock requests over one lock tree.
///
/// The engine owns the request queue and the tree. Every transition goes
/// through [`reduce`] and publishes a new [`EngineState`]; transitions are
/// serialized by a single mutex and never run in parallel.
///
/// `LockEngine` is a cheap handle: clones share the same state.
///
/// ## Scheduling
///
/// Each `acquire` and `release` runs one forward pass over the queue as it
/// stood when the pass began. Every request available against the current
/// tree is granted on the spot, so later requests in the same pass see it.
/// A request passed over is looked at again on the next call only.
///
/// Futures are resolved after the state mutex is released, so code woken by
/// a grant may call back into the engine.
#[derive(Clone)]
pub struct LockEngine {
    inner: Arc<EngineInner>,
}

pub(crate) struct EngineInner {
    config: LockConfig,
    state: Mutex<Arc<EngineState>>,
    next_lock_id: AtomicU64,
    next_request_id: AtomicU64,
    stats: LockStats,
}

/// Locks granted during one pass, paired with the requests they satisfy.
type Grants = Vec<(Arc<LockRequest>, Lock)>;

impl LockEngine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LockConfig::default())
    }

    /// Creates an engine with `config`.
    #[must_use]
    pub fn with_config(config: LockConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                config,
                state: Mutex::new(Arc::new(EngineState::new())),
                next_lock_id: AtomicU64::new(1),
                next_request_id: AtomicU64::new(1),
                stats: LockStats::new(),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<EngineInner>) -> Self {
        Self { inner }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &LockConfig {
        &self.inner.config
    }

    /// Requests a lock at `(store_key, path)`.
    ///
    /// The returned future may already be resolved. There is no failure
    /// path and no timeout: a request that stays blocked waits until the
    /// conflicting locks are released.
    pub fn acquire<K, P>(&self, store_key: K, path: P, exclusive: bool) -> LockFuture
    where
        K: Into<Segment>,
        P: IntoIterator,
        P::Item: Into<Segment>,
    {
        let (resolver, future) = Resolver::channel();
        let request = Arc::new(LockRequest::new(
            RequestId::new(self.inner.next_request_id.fetch_add(1, Ordering::Relaxed)),
            store_key.into(),
            lock_path(path),
            exclusive,
            resolver,
        ));
        let request_id = request.id();

        debug!(
            engine = %self.inner.config.name,
            request = %request_id,
            store_key = %request.store_key(),
            path = ?request.path(),
            exclusive,
            "lock requested"
        );
        self.inner.stats.record_enqueue();

        let granted = {
            let mut state = self.inner.state.lock();
            let action = Action::EnqueueLockRequest {
                request,
                policy: self.inner.config.policy,
            };
            *state = Arc::new(reduce(&state, action));
            self.process_pending_lock_requests(&mut state)
        };
        self.deliver(granted, Some(request_id));

        future.owned_by(Arc::downgrade(&self.inner))
    }

    /// Like [`acquire`](Self::acquire), rejecting an empty store key.
    pub fn try_acquire<K, P>(&self, store_key: K, path: P, exclusive: bool) -> LockResult<LockFuture>
    where
        K: Into<Segment>,
        P: IntoIterator,
        P::Item: Into<Segment>,
    {
        let store_key = store_key.into();
        if store_key.is_empty() {
            return Err(LockError::EmptyStoreKey);
        }
        Ok(self.acquire(store_key, path, exclusive))
    }

    /// Acquires a lock and wraps it in a guard that releases on drop.
    pub async fn acquire_guard<K, P>(
        &self,
        store_key: K,
        path: P,
        exclusive: bool,
    ) -> LockResult<LockGuard>
    where
        K: Into<Segment>,
        P: IntoIterator,
        P::Item: Into<Segment>,
    {
        let lock = self.acquire(store_key, path, exclusive).await?;
        Ok(self.guard(lock))
    }

    /// Wraps an already granted lock in a guard.
    pub fn guard(&self, lock: Lock) -> LockGuard {
        LockGuard::new(self.clone(), lock)
    }

    /// Releases `lock` and grants whatever it was blocking.
    ///
    /// Releasing an unknown or already released handle does nothing.
    pub fn release(&self, lock: &Lock) {
        self.release_inner(lock);
    }

    /// Like [`release`](Self::release), reporting unknown handles.
    pub fn try_release(&self, lock: &Lock) -> LockResult<()> {
        if self.release_inner(lock) {
            Ok(())
        } else {
            Err(LockError::unknown_lock(lock.id()))
        }
    }

    fn release_inner(&self, lock: &Lock) -> bool {
        let (released, granted) = {
            let mut state = self.inner.state.lock();
            let next = reduce(&state, Action::ReleaseLock { lock: lock.clone() });
            let released = !Arc::ptr_eq(next.tree(), state.tree());
            if released {
                *state = Arc::new(next);
            }
            (released, self.process_pending_lock_requests(&mut state))
        };

        if released {
            self.inner.stats.record_release();
            debug!(
                engine = %self.inner.config.name,
                lock = %lock.id(),
                store_key = %lock.store_key(),
                "lock released"
            );
        } else {
            self.inner.stats.record_unknown_release();
            debug!(
                engine = %self.inner.config.name,
                lock = %lock.id(),
                "release of unknown lock ignored"
            );
        }

        self.deliver(granted, None);
        released
    }

    /// Runs one scheduling pass. Caller holds the state mutex.
    fn process_pending_lock_requests(&self, state: &mut Arc<EngineState>) -> Grants {
        let policy = self.inner.config.policy;
        let queue = state.requests().to_vec();
        let mut reserved = LockTreeNode::new();
        let mut granted = Grants::new();

        self.inner.stats.record_pass();

        for request in queue {
            if request.resolver().is_abandoned() {
                *state = Arc::new(reduce(
                    state,
                    Action::DiscardLockRequest {
                        request: request.id(),
                    },
                ));
                self.inner.stats.record_abandoned();
                debug!(
                    engine = %self.inner.config.name,
                    request = %request.id(),
                    "lock request abandoned"
                );
                continue;
            }

            let store_key = request.store_key().as_str();
            let available = state.is_lock_available(store_key, request.path(), request.is_exclusive())
                && (policy == SchedulingPolicy::MostRecentFirst
                    || is_lock_available(&reserved, store_key, request.path(), request.is_exclusive()));

            if available {
                let lock = request.to_lock(LockId::new(
                    self.inner.next_lock_id.fetch_add(1, Ordering::Relaxed),
                ));
                *state = Arc::new(reduce(
                    state,
                    Action::GrantLockRequest {
                        lock: lock.clone(),
                        request: request.id(),
                    },
                ));
                granted.push((request, lock));
            } else if policy == SchedulingPolicy::Fifo {
                reserved = reserve(&reserved, &request);
            }
        }

        trace!(
            engine = %self.inner.config.name,
            granted = granted.len(),
            pending = state.requests().len(),
            "scheduling pass"
        );
        granted
    }

    /// Resolves futures for `granted`. Must run without the state mutex.
    fn deliver(&self, granted: Grants, issued_by: Option<RequestId>) {
        for (request, lock) in granted {
            self.inner.stats.record_grant(issued_by == Some(request.id()));
            match request.resolver().resolve(lock) {
                Ok(()) => {
                    debug!(
                        engine = %self.inner.config.name,
                        request = %request.id(),
                        store_key = %request.store_key(),
                        exclusive = request.is_exclusive(),
                        "lock granted"
                    );
                }
                Err(lock) => {
                    debug!(
                        engine = %self.inner.config.name,
                        request = %request.id(),
                        lock = %lock.id(),
                        "granted lock has no waiter, releasing"
                    );
                    self.release_inner(&lock);
                }
            }
        }
    }

    /// Returns the current state. The snapshot never changes afterwards.
    #[must_use]
    pub fn snapshot(&self) -> Arc<EngineState> {
        Arc::clone(&self.inner.state.lock())
    }

    /// True if `(store_key, path)` could be granted right now.
    #[must_use]
    pub fn is_lock_available<S: AsRef<str>>(&self, store_key: &str, path: &[S], exclusive: bool) -> bool {
        self.snapshot().is_lock_available(store_key, path, exclusive)
    }

    /// Number of requests still waiting.
    #[must_use]
    pub fn pending_request_count(&self) -> usize {
        self.inner.state.lock().requests().len()
    }

    /// Returns a copy of the engine counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }
}

impl Default for LockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LockEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockEngine")
            .field("name", &self.inner.config.name)
            .field("policy", &self.inner.config.policy)
            .field("pending", &self.pending_request_count())
            .finish_non_exhaustive()
    }
}

/// Marks the region a waiting request needs in the reservation tree.
fn reserve(reserved: &LockTreeNode, request: &LockRequest) -> LockTreeNode {
    let path: Vec<Segment> = iter::once(request.store_key().clone())
        .chain(request.path().iter().cloned())
        .collect();
    // stands in for the waiting request; never leaves this pass
    let placeholder = request.to_lock(LockId::new(request.id().as_u64()));
    copy_path_with(reserved, &path, |node| node.locks.push(placeholder))
}
