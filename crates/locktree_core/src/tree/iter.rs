//! Lazy traversals over the lock tree.

use super::LockTreeNode;
use std::iter::FusedIterator;
use std::sync::Arc;

/// Iterator over the nodes from the root to the end of a path.
///
/// Created by [`iterate_path`].
#[derive(Debug)]
pub struct PathIter<'a, I> {
    node: Option<&'a LockTreeNode>,
    segments: I,
}

impl<'a, I, S> Iterator for PathIter<'a, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = &'a LockTreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node.take()?;
        self.node = self
            .segments
            .next()
            .and_then(|segment| node.child(segment.as_ref()))
            .map(Arc::as_ref);
        Some(node)
    }
}

impl<I, S> FusedIterator for PathIter<'_, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
}

/// Yields the root, then each existing node along `path`.
///
/// Stops silently at the first segment with no node.
pub fn iterate_path<I, S>(tree: &LockTreeNode, path: I) -> PathIter<'_, I::IntoIter>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    PathIter {
        node: Some(tree),
        segments: path.into_iter(),
    }
}

/// Iterator over every node strictly below a starting node.
///
/// Created by [`iterate_descendants`]. Order is depth-first but otherwise
/// unspecified.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a LockTreeNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a LockTreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.values().map(Arc::as_ref));
        Some(node)
    }
}

impl FusedIterator for Descendants<'_> {}

/// Yields all descendants of `node`, excluding `node` itself.
pub fn iterate_descendants(node: &LockTreeNode) -> Descendants<'_> {
    Descendants {
        stack: node.children.values().map(Arc::as_ref).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(children: Vec<(&str, LockTreeNode)>) -> LockTreeNode {
        LockTreeNode {
            locks: Vec::new(),
            children: children
                .into_iter()
                .map(|(name, child)| (name.into(), Arc::new(child)))
                .collect(),
        }
    }

    // root -> a -> b -> c, root -> a -> d, root -> e
    fn sample() -> LockTreeNode {
        node(vec![
            (
                "a",
                node(vec![("b", node(vec![("c", node(vec![]))])), ("d", node(vec![]))]),
            ),
            ("e", node(vec![])),
        ])
    }

    #[test]
    fn path_yields_root_to_destination() {
        let tree = sample();
        let nodes: Vec<_> = iterate_path(&tree, ["a", "b", "c"]).collect();
        assert_eq!(nodes.len(), 4);
        assert!(std::ptr::eq(nodes[0], &tree));
        assert!(nodes[3].is_empty());
    }

    #[test]
    fn path_stops_at_missing_segment() {
        let tree = sample();
        assert_eq!(iterate_path(&tree, ["a", "x", "c"]).count(), 2);
        assert_eq!(iterate_path(&tree, ["missing"]).count(), 1);
    }

    #[test]
    fn path_is_not_restartable() {
        let tree = sample();
        let mut iter = iterate_path(&tree, ["e"]);
        assert_eq!(iter.by_ref().count(), 2);
        assert!(iter.next().is_none());
    }

    #[test]
    fn descendants_cover_subtree_only() {
        let tree = sample();
        assert_eq!(iterate_descendants(&tree).count(), 5);

        let a = tree.child("a").unwrap();
        assert_eq!(iterate_descendants(a).count(), 3);

        let leaf = tree.child("e").unwrap();
        assert_eq!(iterate_descendants(leaf).count(), 0);
    }
}
