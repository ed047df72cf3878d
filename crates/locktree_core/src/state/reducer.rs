//! Pure state transitions.

use super::{Lock, LockRequest};
use crate::config::SchedulingPolicy;
use crate::tree::{get_node, is_lock_available, iterate_descendants, LockTreeNode};
use crate::types::{RequestId, Segment};
use serde::Serialize;
use std::sync::Arc;

/// The whole engine state: the request queue and the lock tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineState {
    requests: Vec<Arc<LockRequest>>,
    tree: Arc<LockTreeNode>,
}

impl EngineState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending requests in scan order.
    #[must_use]
    pub fn requests(&self) -> &[Arc<LockRequest>] {
        &self.requests
    }

    /// Root of the lock tree.
    #[must_use]
    pub fn tree(&self) -> &Arc<LockTreeNode> {
        &self.tree
    }

    /// Every lock currently held, in no particular order.
    #[must_use]
    pub fn held_locks(&self) -> Vec<Lock> {
        std::iter::once(self.tree.as_ref())
            .chain(iterate_descendants(&self.tree))
            .flat_map(|node| node.locks.iter().cloned())
            .collect()
    }

    /// True if `lock` is held in this state.
    #[must_use]
    pub fn holds(&self, lock: &Lock) -> bool {
        get_node(&self.tree, lock.full_path())
            .is_some_and(|node| node.locks.iter().any(|held| held == lock))
    }

    /// Availability of `(store_key, path)` against this state's tree.
    #[must_use]
    pub fn is_lock_available<S: AsRef<str>>(
        &self,
        store_key: &str,
        path: &[S],
        exclusive: bool,
    ) -> bool {
        is_lock_available(&self.tree, store_key, path, exclusive)
    }
}

/// A state transition.
#[derive(Debug, Clone)]
pub enum Action {
    /// Add a request to the queue.
    EnqueueLockRequest {
        /// The new request.
        request: Arc<LockRequest>,
        /// Where the request joins the queue.
        policy: SchedulingPolicy,
    },
    /// Turn a queued request into a held lock.
    GrantLockRequest {
        /// Lock to place in the tree.
        lock: Lock,
        /// Request to drop from the queue.
        request: RequestId,
    },
    /// Remove a held lock.
    ReleaseLock {
        /// Lock to remove, matched by id.
        lock: Lock,
    },
    /// Drop a queued request without granting it.
    DiscardLockRequest {
        /// Request to drop from the queue.
        request: RequestId,
    },
}

/// Applies `action` to `state`, returning the next state.
///
/// `state` is left untouched. Releasing a lock that is not held returns a
/// state sharing the same tree.
#[must_use]
pub fn reduce(state: &EngineState, action: Action) -> EngineState {
    match action {
        Action::EnqueueLockRequest { request, policy } => {
            let mut requests = Vec::with_capacity(state.requests.len() + 1);
            match policy {
                SchedulingPolicy::MostRecentFirst => {
                    requests.push(request);
                    requests.extend(state.requests.iter().cloned());
                }
                SchedulingPolicy::Fifo => {
                    requests.extend(state.requests.iter().cloned());
                    requests.push(request);
                }
            }
            EngineState {
                requests,
                tree: Arc::clone(&state.tree),
            }
        }
        Action::GrantLockRequest { lock, request } => {
            let path: Vec<Segment> = lock.full_path().cloned().collect();
            let tree = copy_path_with(&state.tree, &path, |node| node.locks.push(lock));
            EngineState {
                requests: without_request(&state.requests, request),
                tree: Arc::new(tree),
            }
        }
        Action::ReleaseLock { lock } => {
            let path: Vec<Segment> = lock.full_path().cloned().collect();
            match copy_path_without(&state.tree, &path, &lock) {
                Some(tree) => EngineState {
                    requests: state.requests.clone(),
                    tree: Arc::new(tree),
                },
                None => state.clone(),
            }
        }
        Action::DiscardLockRequest { request } => EngineState {
            requests: without_request(&state.requests, request),
            tree: Arc::clone(&state.tree),
        },
    }
}

fn without_request(requests: &[Arc<LockRequest>], id: RequestId) -> Vec<Arc<LockRequest>> {
    requests
        .iter()
        .filter(|request| request.id() != id)
        .cloned()
        .collect()
}

/// Clones exactly the nodes on `path`, root included.
///
/// Missing nodes are created empty. Every subtree off the path is shared
/// with `tree` by reference.
#[must_use]
pub fn deep_copy_locks_tree_path(tree: &LockTreeNode, path: &[Segment]) -> Arc<LockTreeNode> {
    Arc::new(copy_path_with(tree, path, |_| {}))
}

/// Copies the path to the destination and lets `apply` edit the copy there.
pub(crate) fn copy_path_with<F>(node: &LockTreeNode, path: &[Segment], apply: F) -> LockTreeNode
where
    F: FnOnce(&mut LockTreeNode),
{
    let mut copy = node.clone();
    match path.split_first() {
        None => apply(&mut copy),
        Some((head, rest)) => {
            let child = match node.children.get(head) {
                Some(child) => copy_path_with(child, rest, apply),
                None => copy_path_with(&LockTreeNode::default(), rest, apply),
            };
            copy.children.insert(head.clone(), Arc::new(child));
        }
    }
    copy
}

/// Copies the path with `lock` removed at the destination.
///
/// Returns `None` when the lock is not there. Nodes left without locks or
/// children are dropped from their parent; the root is always kept.
fn copy_path_without(node: &LockTreeNode, path: &[Segment], lock: &Lock) -> Option<LockTreeNode> {
    match path.split_first() {
        None => {
            let position = node.locks.iter().position(|held| held == lock)?;
            let mut copy = node.clone();
            copy.locks.remove(position);
            Some(copy)
        }
        Some((head, rest)) => {
            let child = copy_path_without(node.children.get(head)?, rest, lock)?;
            let mut copy = node.clone();
            if child.is_empty() {
                copy.children.remove(head);
            } else {
                copy.children.insert(head.clone(), Arc::new(child));
            }
            Some(copy)
        }
    }
}
