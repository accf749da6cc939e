//! Tree nodes, the root sentinel, and root-relative searches.
//!
//! Nodes carry no parent links. Every position query (successor,
//! predecessor, bounds) re-descends from the root of the snapshot it is
//! asked about, so ownership stays strictly tree-shaped: a node is owned by
//! its parents in however many snapshots share it, and by nothing else.

use super::ReferenceCounter;
use std::borrow::Borrow;
use std::cmp::Ordering;

/// A shared, nullable reference to a subtree.
pub(crate) type Link<T> = Option<ReferenceCounter<Node<T>>>;

// =============================================================================
// Node Definition
// =============================================================================

/// A key-bearing tree node.
///
/// Once a node is wrapped in a [`ReferenceCounter`] it is never written to
/// again; edits allocate replacements instead.
pub(crate) struct Node<T> {
    pub(crate) key: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T> Node<T> {
    /// Creates a node with the given children.
    pub(crate) const fn new(key: T, left: Link<T>, right: Link<T>) -> Self {
        Self { key, left, right }
    }

    /// Creates a copy of this node's key with new children.
    ///
    /// This is the only place a key is cloned during an edit, and so the
    /// only place an edit can unwind from.
    pub(crate) fn with_children(&self, left: Link<T>, right: Link<T>) -> Self
    where
        T: Clone,
    {
        Self {
            key: self.key.clone(),
            left,
            right,
        }
    }
}

impl<T> Drop for Node<T> {
    // Tears a subtree down with an explicit stack. The tree is not balanced,
    // so recursive drop glue could exhaust the call stack on a long chain.
    // Shared subtrees are left to their other owners.
    fn drop(&mut self) {
        let mut pending: Vec<ReferenceCounter<Self>> = Vec::new();
        pending.extend(self.left.take());
        pending.extend(self.right.take());
        while let Some(node) = pending.pop() {
            if let Ok(mut node) = ReferenceCounter::try_unwrap(node) {
                pending.extend(node.left.take());
                pending.extend(node.right.take());
            }
        }
    }
}

// =============================================================================
// Root Sentinel
// =============================================================================

/// The keyless sentinel every set owns by value.
///
/// Its `left` is the real tree. It has no right slot and no key: it is the
/// implicit upper bound of every successor search, and its position is the
/// end of iteration.
pub(crate) struct Root<T> {
    pub(crate) left: Link<T>,
}

impl<T> Root<T> {
    pub(crate) const fn new() -> Self {
        Self { left: None }
    }

    pub(crate) fn tree(&self) -> Option<&ReferenceCounter<Node<T>>> {
        self.left.as_ref()
    }
}

impl<T> Clone for Root<T> {
    fn clone(&self) -> Self {
        Self {
            left: self.left.clone(),
        }
    }
}

// =============================================================================
// Read-only Searches
// =============================================================================

/// Finds the node holding `key`.
pub(crate) fn find<'a, T, Q>(
    tree: Option<&'a ReferenceCounter<Node<T>>>,
    key: &Q,
) -> Option<&'a ReferenceCounter<Node<T>>>
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut current = tree;
    while let Some(node) = current {
        match key.cmp(node.key.borrow()) {
            Ordering::Less => current = node.left.as_ref(),
            Ordering::Greater => current = node.right.as_ref(),
            Ordering::Equal => return Some(node),
        }
    }
    None
}

/// Finds the first node whose key is not less than `key`.
pub(crate) fn lower_bound<'a, T, Q>(
    tree: Option<&'a ReferenceCounter<Node<T>>>,
    key: &Q,
) -> Option<&'a ReferenceCounter<Node<T>>>
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut candidate = None;
    let mut current = tree;
    while let Some(node) = current {
        if node.key.borrow() < key {
            current = node.right.as_ref();
        } else {
            candidate = Some(node);
            current = node.left.as_ref();
        }
    }
    candidate
}

/// Finds the first node whose key is greater than `key`.
///
/// With `key` taken from a node of `tree`, this is the in-order successor
/// of that node. `None` stands for the sentinel.
pub(crate) fn upper_bound<'a, T, Q>(
    tree: Option<&'a ReferenceCounter<Node<T>>>,
    key: &Q,
) -> Option<&'a ReferenceCounter<Node<T>>>
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut candidate = None;
    let mut current = tree;
    while let Some(node) = current {
        if key < node.key.borrow() {
            candidate = Some(node);
            current = node.left.as_ref();
        } else {
            current = node.right.as_ref();
        }
    }
    candidate
}

/// Finds the last node whose key is less than `key`: the in-order
/// predecessor when `key` belongs to a node of `tree`.
pub(crate) fn predecessor<'a, T, Q>(
    tree: Option<&'a ReferenceCounter<Node<T>>>,
    key: &Q,
) -> Option<&'a ReferenceCounter<Node<T>>>
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut candidate = None;
    let mut current = tree;
    while let Some(node) = current {
        if node.key.borrow() < key {
            candidate = Some(node);
            current = node.right.as_ref();
        } else {
            current = node.left.as_ref();
        }
    }
    candidate
}

pub(crate) fn minimum<T>(
    tree: Option<&ReferenceCounter<Node<T>>>,
) -> Option<&ReferenceCounter<Node<T>>> {
    let mut current = tree?;
    while let Some(left) = current.left.as_ref() {
        current = left;
    }
    Some(current)
}

pub(crate) fn maximum<T>(
    tree: Option<&ReferenceCounter<Node<T>>>,
) -> Option<&ReferenceCounter<Node<T>>> {
    let mut current = tree?;
    while let Some(right) = current.right.as_ref() {
        current = right;
    }
    Some(current)
}

// =============================================================================
// Tests
// =============================================================================
