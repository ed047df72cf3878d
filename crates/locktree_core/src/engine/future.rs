//! One-shot notification of a granted lock.

use super::manager::{EngineInner, LockEngine};
use crate::error::{LockError, LockResult};
use crate::state::Lock;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};
use tokio::sync::oneshot::{self, error::TryRecvError};

/// Sending half stored inside a queued request.
///
/// A resolver fires at most once.
pub struct Resolver {
    slot: Mutex<Option<oneshot::Sender<Lock>>>,
}

impl Resolver {
    /// Creates a resolver paired with the future it resolves.
    #[must_use]
    pub fn channel() -> (Self, LockFuture) {
        let (sender, receiver) = oneshot::channel();
        let resolver = Self {
            slot: Mutex::new(Some(sender)),
        };
        let future = LockFuture {
            receiver: Some(receiver),
            owner: Weak::new(),
        };
        (resolver, future)
    }

    /// Creates a resolver nobody is listening to.
    ///
    /// Useful for driving the reducer directly.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Hands `lock` to the waiting future.
    ///
    /// Returns the lock back if the future is gone or was already resolved.
    pub fn resolve(&self, lock: Lock) -> Result<(), Lock> {
        let sender = self.slot.lock().take();
        match sender {
            Some(sender) => sender.send(lock),
            None => Err(lock),
        }
    }

    /// True once the waiting future has been dropped.
    ///
    /// A detached resolver is never abandoned.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.slot
            .lock()
            .as_ref()
            .is_some_and(oneshot::Sender::is_closed)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("pending", &self.slot.lock().is_some())
            .finish()
    }
}

/// Future returned by [`LockEngine::acquire`].
///
/// It may already be resolved when `acquire` returns. It fails only if the
/// engine is dropped while the request is still queued.
///
/// Dropping the future withdraws the request. If the lock was granted but
/// never taken out of the future, dropping it releases the lock.
#[must_use = "dropping a LockFuture withdraws the lock request"]
pub struct LockFuture {
    receiver: Option<oneshot::Receiver<Lock>>,
    owner: Weak<EngineInner>,
}

impl LockFuture {
    pub(crate) fn owned_by(mut self, owner: Weak<EngineInner>) -> Self {
        self.owner = owner;
        self
    }

    /// Returns the outcome if it is already known, or gives the future back.
    pub fn try_take(mut self) -> Result<LockResult<Lock>, Self> {
        let Some(receiver) = self.receiver.as_mut() else {
            return Ok(Err(LockError::EngineDropped));
        };
        match receiver.try_recv() {
            Ok(lock) => Ok(Ok(lock)),
            Err(TryRecvError::Closed) => Ok(Err(LockError::EngineDropped)),
            Err(TryRecvError::Empty) => Err(self),
        }
    }

    /// Blocks the current thread until the lock is granted.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn wait(mut self) -> LockResult<Lock> {
        match self.receiver.take() {
            Some(receiver) => receiver
                .blocking_recv()
                .map_err(|_| LockError::EngineDropped),
            None => Err(LockError::EngineDropped),
        }
    }
}

impl Future for LockFuture {
    type Output = LockResult<Lock>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(receiver) = self.receiver.as_mut() else {
            return Poll::Ready(Err(LockError::EngineDropped));
        };
        Pin::new(receiver)
            .poll(cx)
            .map(|result| result.map_err(|_| LockError::EngineDropped))
    }
}

impl Drop for LockFuture {
    fn drop(&mut self) {
        // granted after the caller stopped listening
        let Some(mut receiver) = self.receiver.take() else {
            return;
        };
        if let Ok(lock) = receiver.try_recv() {
            if let Some(inner) = self.owner.upgrade() {
                LockEngine::from_inner(inner).release(&lock);
            }
        }
    }
}

impl fmt::Debug for LockFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockFuture").finish_non_exhaustive()
    }
}
