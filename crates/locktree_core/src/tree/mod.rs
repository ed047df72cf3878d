//! Persistent lock tree and conflict checking.
//!
//! The tree is keyed by path segments, rooted at the empty path. The first
//! segment below the root is always a store key. Nodes are immutable once
//! published: children are shared through `Arc`, and every update clones
//! only the nodes on the path it touches (see
//! [`deep_copy_locks_tree_path`](crate::deep_copy_locks_tree_path)).

mod conflict;
mod iter;

pub use conflict::{has_conflicting_lock, is_lock_available};
pub use iter::{iterate_descendants, iterate_path, Descendants, PathIter};

use crate::state::Lock;
use crate::types::Segment;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A node of the lock tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LockTreeNode {
    pub(crate) locks: Vec<Lock>,
    pub(crate) children: BTreeMap<Segment, Arc<LockTreeNode>>,
}

impl LockTreeNode {
    /// Creates an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks held exactly at this node.
    #[must_use]
    pub fn locks(&self) -> &[Lock] {
        &self.locks
    }

    /// Child nodes keyed by segment.
    #[must_use]
    pub fn children(&self) -> &BTreeMap<Segment, Arc<LockTreeNode>> {
        &self.children
    }

    /// Returns the child under `segment`, if any.
    #[must_use]
    pub fn child(&self, segment: &str) -> Option<&Arc<LockTreeNode>> {
        self.children.get(segment)
    }

    /// True when the node holds no locks and has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty() && self.children.is_empty()
    }
}

/// Finds the node at `path`, or `None` if any segment is missing.
pub fn get_node<I, S>(tree: &LockTreeNode, path: I) -> Option<&LockTreeNode>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    path.into_iter()
        .try_fold(tree, |node, segment| node.child(segment.as_ref()).map(Arc::as_ref))
}
