//! Reference oracle for lock compatibility.
//!
//! Works from the flat list of held locks instead of the tree, so it can
//! cross-check the engine's tree-based conflict checker.

use locktree_core::{Lock, Segment};

/// Two held locks that must never coexist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionViolation {
    /// First lock of the pair.
    pub first: Lock,
    /// Second lock of the pair.
    pub second: Lock,
}

fn full_path(store_key: &str, path: &[Segment]) -> Vec<String> {
    std::iter::once(store_key.to_string())
        .chain(path.iter().map(|segment| segment.as_str().to_string()))
        .collect()
}

fn lock_path(lock: &Lock) -> Vec<String> {
    full_path(lock.store_key().as_str(), lock.path())
}

/// True if one path is an ancestor of, descendant of, or equal to the other.
#[must_use]
pub fn paths_overlap(a: &[String], b: &[String]) -> bool {
    a.iter().zip(b).all(|(x, y)| x == y)
}

/// True if `a` and `b` may be held at the same time.
#[must_use]
pub fn compatible(a: &Lock, b: &Lock) -> bool {
    !paths_overlap(&lock_path(a), &lock_path(b)) || (!a.is_exclusive() && !b.is_exclusive())
}

/// Finds a pair of held locks that violates exclusion, if any.
#[must_use]
pub fn find_violation(held: &[Lock]) -> Option<ExclusionViolation> {
    held.iter().enumerate().find_map(|(i, first)| {
        held[i + 1..]
            .iter()
            .find(|second| !compatible(first, second))
            .map(|second| ExclusionViolation {
                first: first.clone(),
                second: second.clone(),
            })
    })
}

/// Expected answer of `is_lock_available` given the held locks.
#[must_use]
pub fn expected_available(held: &[Lock], store_key: &str, path: &[Segment], exclusive: bool) -> bool {
    let wanted = full_path(store_key, path);
    held.iter().all(|lock| {
        !paths_overlap(&wanted, &lock_path(lock)) || (!exclusive && !lock.is_exclusive())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use locktree_core::LockId;

    fn lock(id: u64, path: &[&str], exclusive: bool) -> Lock {
        Lock::new(
            LockId::new(id),
            "s".into(),
            path.iter().map(|s| Segment::from(*s)).collect(),
            exclusive,
        )
    }

    #[test]
    fn overlap_is_prefix_either_way() {
        let a = vec!["s".to_string(), "a".to_string()];
        let ab = vec!["s".to_string(), "a".to_string(), "b".to_string()];
        let c = vec!["s".to_string(), "c".to_string()];
        assert!(paths_overlap(&a, &ab));
        assert!(paths_overlap(&ab, &a));
        assert!(!paths_overlap(&a, &c));
    }

    #[test]
    fn shared_locks_are_compatible() {
        assert!(compatible(&lock(1, &["a"], false), &lock(2, &["a", "b"], false)));
        assert!(!compatible(&lock(1, &["a"], true), &lock(2, &["a", "b"], false)));
        assert!(compatible(&lock(1, &["a"], true), &lock(2, &["b"], true)));
    }

    #[test]
    fn violation_names_the_pair() {
        let held = [lock(1, &["a"], false), lock(2, &["b"], true), lock(3, &["a", "x"], true)];
        let violation = find_violation(&held).unwrap();
        assert_eq!(violation.first.id(), LockId::new(1));
        assert_eq!(violation.second.id(), LockId::new(3));
    }

    #[test]
    fn availability_matches_definition() {
        let held = [lock(1, &["a"], false)];
        assert!(expected_available(&held, "s", &[Segment::from("a"), Segment::from("b")], false));
        assert!(!expected_available(&held, "s", &[Segment::from("a"), Segment::from("b")], true));
        assert!(expected_available(&held, "other", &[Segment::from("a")], true));
    }
}
