//! Error types for the lock engine.

use crate::types::LockId;
use thiserror::Error;

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;

/// Errors surfaced at the engine's API boundary.
///
/// The conflict checker and reducer are total and never produce these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The handle does not correspond to a lock currently held.
    #[error("unknown lock: {id} is not held by this engine")]
    UnknownLock {
        /// Id of the handle passed in.
        id: LockId,
    },

    /// The engine was dropped while the request was still pending.
    #[error("lock engine dropped before the request was granted")]
    EngineDropped,

    /// A store key must be a non-empty segment.
    #[error("store key must not be empty")]
    EmptyStoreKey,
}

impl LockError {
    /// Creates an unknown lock error.
    pub fn unknown_lock(id: LockId) -> Self {
        Self::UnknownLock { id }
    }
}
