//! Lock handles and pending lock requests.

use crate::engine::Resolver;
use crate::types::{LockId, LockPath, RequestId, Segment};
use serde::Serialize;
use std::fmt;
use std::iter;
use std::sync::Arc;

#[derive(Serialize)]
struct LockData {
    id: LockId,
    store_key: Segment,
    path: LockPath,
    exclusive: bool,
}

/// A granted lock.
///
/// Handles are cheap to clone. Equality is handle identity: a clone of a
/// granted handle equals it, while any separately built lock does not, even
/// with the same [`LockId`] and coordinates. Ids are only unique within one
/// engine, so pass back the handle you were given.
#[derive(Clone, Serialize)]
#[serde(transparent)]
pub struct Lock(Arc<LockData>);

impl Lock {
    /// Creates a lock handle with a fresh identity.
    ///
    /// The engine builds its own handles when it grants requests. A lock
    /// created here is never held by an engine and releasing it is a no-op.
    pub fn new(id: LockId, store_key: Segment, path: LockPath, exclusive: bool) -> Self {
        Self(Arc::new(LockData {
            id,
            store_key,
            path,
            exclusive,
        }))
    }

    /// Identity of this lock.
    #[must_use]
    pub fn id(&self) -> LockId {
        self.0.id
    }

    /// Store key (first tree segment).
    #[must_use]
    pub fn store_key(&self) -> &Segment {
        &self.0.store_key
    }

    /// Path below the store key.
    #[must_use]
    pub fn path(&self) -> &[Segment] {
        &self.0.path
    }

    /// True for exclusive locks.
    #[must_use]
    pub fn is_exclusive(&self) -> bool {
        self.0.exclusive
    }

    /// Tree path including the store key.
    pub fn full_path(&self) -> impl Iterator<Item = &Segment> {
        iter::once(&self.0.store_key).chain(self.0.path.iter())
    }
}

impl PartialEq for Lock {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Lock {}

impl std::hash::Hash for Lock {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lock")
            .field("id", &self.0.id)
            .field("store_key", &self.0.store_key)
            .field("path", &self.0.path)
            .field("exclusive", &self.0.exclusive)
            .finish()
    }
}

/// A request waiting in the engine queue.
///
/// Requests are removed from the queue, by id, when they are granted.
#[derive(Debug, Serialize)]
pub struct LockRequest {
    id: RequestId,
    store_key: Segment,
    path: LockPath,
    exclusive: bool,
    #[serde(skip)]
    resolver: Resolver,
}

impl LockRequest {
    /// Creates a request that notifies `resolver` when granted.
    pub fn new(
        id: RequestId,
        store_key: Segment,
        path: LockPath,
        exclusive: bool,
        resolver: Resolver,
    ) -> Self {
        Self {
            id,
            store_key,
            path,
            exclusive,
            resolver,
        }
    }

    /// Identity of this request.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Store key (first tree segment).
    #[must_use]
    pub fn store_key(&self) -> &Segment {
        &self.store_key
    }

    /// Path below the store key.
    #[must_use]
    pub fn path(&self) -> &[Segment] {
        &self.path
    }

    /// True for exclusive requests.
    #[must_use]
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Notification slot for the caller's future.
    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Builds the lock this request turns into once granted.
    #[must_use]
    pub fn to_lock(&self, id: LockId) -> Lock {
        Lock::new(id, self.store_key.clone(), self.path.clone(), self.exclusive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locks_compare_by_identity() {
        let a = Lock::new(LockId::new(1), "s".into(), vec!["x".into()], true);
        let b = Lock::new(LockId::new(2), "s".into(), vec!["x".into()], true);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn same_id_and_coordinates_are_still_distinct() {
        let a = Lock::new(LockId::new(1), "s".into(), vec!["x".into()], true);
        let b = Lock::new(LockId::new(1), "s".into(), vec!["x".into()], true);
        assert_eq!(a.id(), b.id());
        assert_ne!(a, b);

        let set: std::collections::HashSet<Lock> = [a.clone(), b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn full_path_starts_with_store_key() {
        let lock = Lock::new(LockId::new(1), "posts".into(), vec![42u64.into()], false);
        let path: Vec<_> = lock.full_path().map(Segment::as_str).collect();
        assert_eq!(path, ["posts", "42"]);
    }

    #[test]
    fn request_turns_into_lock() {
        let request = LockRequest::new(
            RequestId::new(5),
            "s".into(),
            vec!["a".into(), "b".into()],
            true,
            Resolver::detached(),
        );
        let lock = request.to_lock(LockId::new(9));
        assert_eq!(lock.id(), LockId::new(9));
        assert_eq!(lock.path(), request.path());
        assert!(lock.is_exclusive());
    }

    #[test]
    fn lock_serializes_coordinates() {
        let lock = Lock::new(LockId::new(3), "s".into(), vec!["a".into()], false);
        let json = serde_json::to_value(&lock).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["store_key"], "s");
        assert_eq!(json["exclusive"], false);
    }
}
