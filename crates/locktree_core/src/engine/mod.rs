//! The stateful lock engine.

mod future;
mod guard;
mod manager;

pub use future::{LockFuture, Resolver};
pub use guard::LockGuard;
pub use manager::LockEngine;
