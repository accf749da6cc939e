//! Bidirectional cursors over a [`PersistentSet`](super::PersistentSet)
//! snapshot.

use super::ReferenceCounter;
use super::node::{self, Link};
use std::fmt;

/// A position in one snapshot of a [`PersistentSet`](super::PersistentSet).
///
/// A cursor points either at an element or at the end position, which sits
/// between the last element and the first. It holds shared ownership of the
/// snapshot it was taken from, so it stays valid however the originating set
/// is later edited, cleared or dropped; it keeps observing that snapshot.
///
/// Moving uses root-relative search, so each step costs O(height).
///
/// # Examples
///
/// ```rust
/// use persistent_set::persistent::PersistentSet;
///
/// let set: PersistentSet<i32> = [1, 2, 3].into_iter().collect();
///
/// let mut cursor = set.begin();
/// assert_eq!(cursor.get(), Some(&1));
/// cursor.move_next();
/// assert_eq!(cursor.get(), Some(&2));
///
/// let mut cursor = set.end();
/// cursor.move_prev();
/// assert_eq!(cursor.get(), Some(&3));
/// ```
pub struct PersistentSetCursor<T> {
    node: Link<T>,
    anchor: Link<T>,
}

impl<T> PersistentSetCursor<T> {
    pub(crate) const fn new(node: Link<T>, anchor: Link<T>) -> Self {
        Self { node, anchor }
    }

    pub(crate) fn end_of(anchor: Link<T>) -> Self {
        Self { node: None, anchor }
    }

    /// Returns the element under the cursor, or `None` at the end position.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.node.as_ref().map(|node| &node.key)
    }

    /// Returns `true` if the cursor is at the end position.
    #[inline]
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.node.is_none()
    }
}

impl<T: Ord> PersistentSetCursor<T> {
    /// Moves to the next element in key order.
    ///
    /// From the last element this reaches the end position. At the end
    /// position the cursor stays where it is.
    pub fn move_next(&mut self) {
        let Some(current) = self.node.as_ref() else {
            return;
        };
        let next = node::upper_bound(self.anchor.as_ref(), &current.key).cloned();
        self.node = next;
    }

    /// Moves to the previous element in key order.
    ///
    /// From the end position this reaches the last element; from the first
    /// element it reaches the end position.
    pub fn move_prev(&mut self) {
        let previous = match self.node.as_ref() {
            Some(current) => node::predecessor(self.anchor.as_ref(), &current.key).cloned(),
            None => node::maximum(self.anchor.as_ref()).cloned(),
        };
        self.node = previous;
    }

    /// Returns a cursor one step forward, leaving this one in place.
    #[must_use]
    pub fn next_cursor(&self) -> Self {
        let mut next = self.clone();
        next.move_next();
        next
    }

    /// Returns a cursor one step back, leaving this one in place.
    #[must_use]
    pub fn prev_cursor(&self) -> Self {
        let mut previous = self.clone();
        previous.move_prev();
        previous
    }
}

impl<T> Clone for PersistentSetCursor<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            anchor: self.anchor.clone(),
        }
    }
}

/// Cursors are equal when they point at the same node, or are both at the
/// end position.
impl<T> PartialEq for PersistentSetCursor<T> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.node, &other.node) {
            (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T> Eq for PersistentSetCursor<T> {}

impl<T: fmt::Debug> fmt::Debug for PersistentSetCursor<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(key) => formatter.debug_tuple("PersistentSetCursor").field(key).finish(),
            None => formatter.write_str("PersistentSetCursor(end)"),
        }
    }
}
