//! Core type definitions for the lock engine.

use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// One component of a lock path.
///
/// Integer segments are stored in their decimal form, so `Segment::from(1)`
/// and `Segment::from("1")` address the same tree node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Segment(Arc<str>);

impl Segment {
    /// Creates a segment from anything string-like.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Returns the segment as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the empty segment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Borrow<str> for Segment {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Segment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Segment {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Segment {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&String> for Segment {
    fn from(value: &String) -> Self {
        Self::new(value)
    }
}

impl From<&Segment> for Segment {
    fn from(value: &Segment) -> Self {
        value.clone()
    }
}

macro_rules! segment_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Segment {
                fn from(value: $t) -> Self {
                    Self::from(value.to_string())
                }
            }
        )*
    };
}

segment_from_int!(u8, u16, u32, u64, usize, i32, i64);

/// Ordered sequence of segments below a store key.
pub type LockPath = Vec<Segment>;

/// Collects any sequence of segment-like values into a [`LockPath`].
pub(crate) fn lock_path<I>(segments: I) -> LockPath
where
    I: IntoIterator,
    I::Item: Into<Segment>,
{
    segments.into_iter().map(Into::into).collect()
}

/// Identity of a granted lock.
///
/// Assigned by the engine in increasing order and never reused within one
/// engine. Used for logging and error reporting; handle equality is by
/// identity, see [`Lock`](crate::Lock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct LockId(u64);

impl LockId {
    /// Creates a new lock ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lock:{}", self.0)
    }
}

/// Identity of a pending lock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Creates a new request ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_string_segments_match() {
        assert_eq!(Segment::from(42u64), Segment::from("42"));
        assert_eq!(Segment::from(-1i64).as_str(), "-1");
    }

    #[test]
    fn lock_path_collects_mixed_inputs() {
        let path = lock_path(["post", "7"]);
        assert_eq!(path, vec![Segment::from("post"), Segment::from(7u32)]);
    }

    #[test]
    fn id_display() {
        assert_eq!(format!("{}", LockId::new(3)), "lock:3");
        assert_eq!(format!("{}", RequestId::new(9)), "req:9");
    }

    #[test]
    fn id_ordering() {
        assert!(LockId::new(1) < LockId::new(2));
    }
}
