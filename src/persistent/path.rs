//! The path-copying primitive behind every edit.
//!
//! An edit first records the root-to-target chain of the original tree as a
//! [`Path`] of borrowed nodes, then rebuilds that chain bottom-up with fresh
//! clones around a [`Splice`]. Subtrees hanging off the chain are shared
//! with the original, never copied.
//!
//! The original tree is only ever read. Every clone lands in a local until
//! the caller installs the returned tree in one assignment, so a key clone
//! that panics part-way through leaves the caller's snapshot untouched.

use super::ReferenceCounter;
use super::node::{Link, Node};
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::cmp::Ordering;

/// Inline capacity of a recorded path. Deeper paths spill to the heap.
const INLINE_DEPTH: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Direction {
    Left,
    Right,
}

/// What takes the place of the node (or empty slot) at the end of a path.
pub(crate) enum Splice<T> {
    /// The slot becomes empty.
    Detach,
    /// An existing subtree is linked in as it is.
    Subtree(ReferenceCounter<Node<T>>),
    /// A fresh node with the given key and children.
    Graft { key: T, left: Link<T>, right: Link<T> },
}

impl<T> Splice<T> {
    /// Links whatever `link` holds, or nothing.
    pub(crate) fn from_link(link: Link<T>) -> Self {
        link.map_or(Self::Detach, Self::Subtree)
    }
}

/// A root-to-target chain of nodes in an existing tree.
pub(crate) struct Path<'a, T> {
    steps: SmallVec<[(&'a ReferenceCounter<Node<T>>, Direction); INLINE_DEPTH]>,
}

impl<'a, T> Path<'a, T> {
    /// Descends `tree` towards `key`.
    ///
    /// Returns the nodes passed on the way and the node holding `key`, if
    /// any. The matching node itself is not part of the path.
    pub(crate) fn locate<Q>(
        tree: Option<&'a ReferenceCounter<Node<T>>>,
        key: &Q,
    ) -> (Self, Option<&'a ReferenceCounter<Node<T>>>)
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut steps = SmallVec::new();
        let mut current = tree;
        while let Some(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => {
                    steps.push((node, Direction::Left));
                    current = node.left.as_ref();
                }
                Ordering::Greater => {
                    steps.push((node, Direction::Right));
                    current = node.right.as_ref();
                }
                Ordering::Equal => return (Self { steps }, Some(node)),
            }
        }
        (Self { steps }, None)
    }

    /// Descends `subtree` along left children to its minimum node.
    pub(crate) fn leftmost(
        subtree: &'a ReferenceCounter<Node<T>>,
    ) -> (Self, &'a ReferenceCounter<Node<T>>) {
        let mut steps = SmallVec::new();
        let mut current = subtree;
        while let Some(left) = current.left.as_ref() {
            steps.push((current, Direction::Left));
            current = left;
        }
        (Self { steps }, current)
    }

    /// Number of nodes an edit along this path will clone.
    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }

    /// Rebuilds the path around `splice`.
    ///
    /// Returns the root of the rebuilt tree and the node the splice put in
    /// place (`None` for [`Splice::Detach`]).
    pub(crate) fn splice(self, splice: Splice<T>) -> (Link<T>, Link<T>)
    where
        T: Clone,
    {
        let replacement = match splice {
            Splice::Detach => None,
            Splice::Subtree(subtree) => Some(subtree),
            Splice::Graft { key, left, right } => {
                Some(ReferenceCounter::new(Node::new(key, left, right)))
            }
        };
        let spliced = replacement.clone();

        let mut child = replacement;
        for (original, direction) in self.steps.into_iter().rev() {
            let copy = match direction {
                Direction::Left => original.with_children(child, original.right.clone()),
                Direction::Right => original.with_children(original.left.clone(), child),
            };
            child = Some(ReferenceCounter::new(copy));
        }

        (child, spliced)
    }
}

// =============================================================================
// Tests
// =============================================================================
