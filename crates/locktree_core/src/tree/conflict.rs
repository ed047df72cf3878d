//! Conflict checking for lock requests.

use super::{get_node, iterate_descendants, iterate_path, LockTreeNode};
use crate::state::Lock;
use std::iter;

/// Returns true if a request of the given kind cannot coexist with `locks`.
///
/// An exclusive request conflicts with any lock. A shared request conflicts
/// only with an exclusive one.
#[must_use]
pub fn has_conflicting_lock(exclusive: bool, locks: &[Lock]) -> bool {
    if exclusive {
        !locks.is_empty()
    } else {
        locks.iter().any(Lock::is_exclusive)
    }
}

/// Returns true if `(store_key, path)` can be locked right now.
///
/// Checks every existing node from the root down to the destination, then
/// the destination's whole subtree. Missing nodes hold no locks and never
/// conflict.
#[must_use]
pub fn is_lock_available<S>(tree: &LockTreeNode, store_key: &str, path: &[S], exclusive: bool) -> bool
where
    S: AsRef<str>,
{
    let full_path = || iter::once(store_key).chain(path.iter().map(<S as AsRef<str>>::as_ref));

    if iterate_path(tree, full_path()).any(|node| has_conflicting_lock(exclusive, &node.locks)) {
        return false;
    }

    match get_node(tree, full_path()) {
        Some(node) => !iterate_descendants(node)
            .any(|descendant| has_conflicting_lock(exclusive, &descendant.locks)),
        None => true,
    }
}
