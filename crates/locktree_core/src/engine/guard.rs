//! RAII lock guard.

use super::LockEngine;
use crate::state::Lock;
use std::fmt;

/// Holds a granted lock and releases it on drop.
///
/// Created by [`LockEngine::acquire_guard`] or [`LockEngine::guard`].
///
/// ```rust,ignore
/// let guard = engine.acquire_guard("entities", ["post", "42"], true).await?;
/// save_post(42).await?;
/// // released here
/// ```
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard {
    engine: LockEngine,
    lock: Lock,
}

impl LockGuard {
    pub(crate) fn new(engine: LockEngine, lock: Lock) -> Self {
        Self { engine, lock }
    }

    /// The guarded lock.
    #[must_use]
    pub fn lock(&self) -> &Lock {
        &self.lock
    }

    /// Releases the lock now.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.engine.release(&self.lock);
    }
}

impl fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard").field("lock", &self.lock).finish()
    }
}
