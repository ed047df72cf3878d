//! # locktree testkit
//!
//! Test utilities for locktree.
//!
//! This crate provides:
//! - Fixtures for engines, tracing and tree dumps
//! - Property-based test generators using proptest
//! - A reference oracle for lock compatibility
//! - Stress testing utilities
//!
//! ## Usage
//!
//! ```rust,ignore
//! use locktree_testkit::prelude::*;
//!
//! #[test]
//! fn holds_are_compatible() {
//!     let mut harness = OpHarness::new(LockEngine::new());
//!     harness.apply(&LockOp::acquire(0, vec![1], true));
//!     harness.assert_consistent();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod oracle;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::oracle::*;
    pub use crate::stress::*;
    pub use locktree_core::{Lock, LockConfig, LockEngine, SchedulingPolicy};
}

pub use fixtures::*;
pub use generators::*;
pub use oracle::*;
pub use stress::*;
