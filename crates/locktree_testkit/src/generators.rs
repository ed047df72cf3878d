//! Property-based test generators using proptest.
//!
//! Segments are drawn from a tiny alphabet so that generated requests
//! overlap often.

use locktree_core::Segment;
use proptest::prelude::*;

/// Number of distinct store keys generated.
pub const STORE_KEYS: u8 = 2;

/// Number of distinct segment values per level.
pub const SEGMENT_VALUES: u8 = 3;

/// Store key for index `n`.
#[must_use]
pub fn store_key(n: u8) -> String {
    format!("store{n}")
}

/// Segment for index `n`. Even values are integers, odd ones names.
#[must_use]
pub fn segment(n: u8) -> Segment {
    if n % 2 == 0 {
        Segment::from(u32::from(n))
    } else {
        Segment::from(format!("field{n}"))
    }
}

/// Strategy for a store key index.
pub fn store_strategy() -> impl Strategy<Value = u8> {
    0..STORE_KEYS
}

/// Strategy for a path of segment indexes below a store key.
pub fn path_strategy(max_depth: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0..SEGMENT_VALUES, 0..=max_depth)
}

/// One step applied to an engine.
#[derive(Debug, Clone)]
pub enum LockOp {
    /// Request a lock.
    Acquire {
        /// Store key index.
        store: u8,
        /// Segment indexes.
        path: Vec<u8>,
        /// Exclusive or shared.
        exclusive: bool,
    },
    /// Release a held lock, chosen modulo the number held.
    Release {
        /// Selector into the held locks.
        index: usize,
    },
    /// Drop a pending future, chosen modulo the number pending.
    Abandon {
        /// Selector into the pending futures.
        index: usize,
    },
}

impl LockOp {
    /// Shorthand for an acquire step.
    #[must_use]
    pub fn acquire(store: u8, path: Vec<u8>, exclusive: bool) -> Self {
        Self::Acquire {
            store,
            path,
            exclusive,
        }
    }

    /// Resolved segments of an acquire step.
    #[must_use]
    pub fn segments(path: &[u8]) -> Vec<Segment> {
        path.iter().copied().map(segment).collect()
    }
}

/// Strategy for a single engine step.
pub fn lock_op_strategy() -> impl Strategy<Value = LockOp> {
    prop_oneof![
        4 => (store_strategy(), path_strategy(3), any::<bool>())
            .prop_map(|(store, path, exclusive)| LockOp::acquire(store, path, exclusive)),
        3 => any::<usize>().prop_map(|index| LockOp::Release { index }),
        1 => any::<usize>().prop_map(|index| LockOp::Abandon { index }),
    ]
}

/// Strategy for a sequence of engine steps.
pub fn op_sequence_strategy(min_ops: usize, max_ops: usize) -> impl Strategy<Value = Vec<LockOp>> {
    prop::collection::vec(lock_op_strategy(), min_ops..max_ops)
}

/// How many cases the property suites run.
///
/// Suites pick their budget from `LOCKTREE_PROPTEST` (`quick`, `standard`
/// or `soak`), defaulting to [`CaseBudget::Standard`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseBudget {
    /// A few dozen cases, for generator self-checks.
    Quick,
    /// The normal `cargo test` budget.
    #[default]
    Standard,
    /// Long soak runs for scheduler changes.
    Soak,
}

impl CaseBudget {
    /// Environment variable read by [`CaseBudget::from_env`].
    pub const ENV: &'static str = "LOCKTREE_PROPTEST";

    /// Reads the budget from [`CaseBudget::ENV`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(std::env::var(Self::ENV).ok().as_deref())
    }

    /// Parses a budget name; unknown or missing names give the default.
    #[must_use]
    pub fn parse(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(name) if name.eq_ignore_ascii_case("quick") => Self::Quick,
            Some(name) if name.eq_ignore_ascii_case("soak") => Self::Soak,
            _ => Self::Standard,
        }
    }

    /// Proptest settings for this budget.
    #[must_use]
    pub fn config(self) -> ProptestConfig {
        let (cases, max_shrink_iters) = match self {
            Self::Quick => (32, 200),
            Self::Standard => (256, 2_000),
            Self::Soak => (4_096, 20_000),
        };
        ProptestConfig {
            cases,
            max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
