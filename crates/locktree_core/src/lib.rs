//! # locktree core
//!
//! Hierarchical lock engine for guarding critical sections over a tree of
//! named resources.
//!
//! This crate provides:
//! - A persistent lock tree with structural sharing
//! - Conflict checking across ancestors and descendants
//! - A pure state reducer (enqueue / grant / release)
//! - The stateful [`LockEngine`] with its scheduling loop
//! - [`LockFuture`] notification and RAII [`LockGuard`]s
//!
//! ## Coordinates
//!
//! Every lock lives at `(store_key, path)`. The store key is the first
//! segment of the tree path, so `("posts", ["42", "title"])` addresses the
//! node `posts / 42 / title`. An exclusive lock reserves its node, every
//! ancestor and every descendant; shared locks only exclude exclusive ones.
//!
//! ```rust,ignore
//! use locktree_core::LockEngine;
//!
//! let engine = LockEngine::new();
//! let lock = engine.acquire("entities", ["post", "42"], true).await?;
//! // ... save post 42 ...
//! engine.release(&lock);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod state;
mod stats;
mod tree;
mod types;

pub use config::{LockConfig, SchedulingPolicy};
pub use engine::{LockEngine, LockFuture, LockGuard, Resolver};
pub use error::{LockError, LockResult};
pub use state::{deep_copy_locks_tree_path, reduce, Action, EngineState, Lock, LockRequest};
pub use stats::{LockStats, StatsSnapshot};
pub use tree::{
    get_node, has_conflicting_lock, is_lock_available, iterate_descendants, iterate_path,
    Descendants, LockTreeNode, PathIter,
};
pub use types::{LockId, LockPath, RequestId, Segment};
