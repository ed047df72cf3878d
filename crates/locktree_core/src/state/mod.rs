//! Engine state and its pure transition function.
//!
//! The engine never mutates a published [`EngineState`]. Each action
//! produces a new value that shares every untouched subtree with the
//! previous one, so a snapshot held by a caller stays frozen.

mod reducer;
mod request;

pub(crate) use reducer::copy_path_with;
pub use reducer::{deep_copy_locks_tree_path, reduce, Action, EngineState};
pub use request::{Lock, LockRequest};
