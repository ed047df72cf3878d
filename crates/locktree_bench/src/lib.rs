//! Benchmark utilities for locktree.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
