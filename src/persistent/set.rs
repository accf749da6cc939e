//! Persistent ordered set with path-copying edits.
//!
//! This module provides [`PersistentSet`], an ordered set whose copies are
//! O(1) snapshots sharing their structure.
//!
//! # Overview
//!
//! The set is an unbalanced binary search tree hanging off a keyless root
//! sentinel. Edits take `&mut self` but never write to a node that already
//! exists: insert and erase clone only the chain from the root to the edited
//! position and share every other subtree with the previous version. Any
//! clone of the set taken before the edit keeps observing the old version.
//!
//! - O(height) `insert`, `erase`, `find`, `lower_bound`, `upper_bound`
//! - O(height) allocations per edit
//! - O(1) `clone`, `len`, `is_empty`, `clear`, `swap`
//!
//! Nodes have no parent links. Cursors and iterators find neighbours by
//! searching again from the root of their snapshot.
//!
//! # Examples
//!
//! ```rust
//! use persistent_set::persistent::PersistentSet;
//!
//! let mut set = PersistentSet::new();
//! set.insert(3);
//! set.insert(1);
//!
//! let snapshot = set.clone();
//! set.insert(2);
//!
//! let current: Vec<&i32> = set.iter().collect();
//! let previous: Vec<&i32> = snapshot.iter().collect();
//! assert_eq!(current, vec![&1, &2, &3]);
//! assert_eq!(previous, vec![&1, &3]);
//! ```
//!
//! # Unwind Safety
//!
//! Edits clone keys. If a key's `Clone` panics, the panic propagates and the
//! set being edited is left exactly as it was before the call.

use super::ReferenceCounter;
use super::cursor::PersistentSetCursor;
use super::node::{self, Node, Root};
use super::path::{Path, Splice};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

// =============================================================================
// PersistentSet Definition
// =============================================================================

/// A persistent ordered set.
///
/// Elements must implement `Ord`; edits additionally need `Clone`, since the
/// nodes on an edited path are copied rather than modified.
///
/// # Time Complexity
///
/// | Operation                      | Complexity |
/// |--------------------------------|------------|
/// | `new`, `clone`                 | O(1)       |
/// | `len`, `is_empty`, `clear`     | O(1)       |
/// | `insert`, `erase`, `remove`    | O(h)       |
/// | `find`, `contains`             | O(h)       |
/// | `lower_bound`, `upper_bound`   | O(h)       |
/// | cursor step                    | O(h)       |
///
/// `h` is the height of the tree. The tree is not rebalanced, so `h` is
/// O(log N) for random insertion orders and O(N) for sorted ones.
///
/// # Examples
///
/// ```rust
/// use persistent_set::persistent::PersistentSet;
///
/// let mut set = PersistentSet::new();
/// let (cursor, inserted) = set.insert(42);
/// assert!(inserted);
/// assert_eq!(cursor.get(), Some(&42));
///
/// let (_, inserted) = set.insert(42);
/// assert!(!inserted);
/// assert_eq!(set.len(), 1);
/// ```
pub struct PersistentSet<T> {
    /// Sentinel owning the tree
    root: Root<T>,
    /// Number of elements
    length: usize,
}

impl<T> PersistentSet<T> {
    /// Creates a new empty set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_set::persistent::PersistentSet;
    ///
    /// let set: PersistentSet<i32> = PersistentSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: Root::new(),
            length: 0,
        }
    }

    /// Returns the number of elements in the set.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.left.is_none()
    }

    /// Removes all elements.
    ///
    /// Only this set's reference to its tree is released; clones taken
    /// earlier keep their contents.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_set::persistent::PersistentSet;
    ///
    /// let mut set: PersistentSet<i32> = (1..=3).collect();
    /// let snapshot = set.clone();
    /// set.clear();
    ///
    /// assert!(set.is_empty());
    /// assert_eq!(snapshot.len(), 3);
    /// ```
    pub fn clear(&mut self) {
        self.root.left = None;
        self.length = 0;
    }

    /// Exchanges the contents of two sets in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Moves the contents out, leaving this set empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Returns `true` if both sets are the same snapshot, i.e. they share
    /// their whole tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_set::persistent::PersistentSet;
    ///
    /// let mut set: PersistentSet<i32> = (1..=3).collect();
    /// let snapshot = set.clone();
    /// assert!(set.ptr_eq(&snapshot));
    ///
    /// set.insert(4);
    /// assert!(!set.ptr_eq(&snapshot));
    /// ```
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self.root.tree(), other.root.tree()) {
            (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
            (None, None) => true,
            _ => false,
        }
    }

    /// Returns a cursor at the end position.
    #[inline]
    #[must_use]
    pub fn end(&self) -> PersistentSetCursor<T> {
        PersistentSetCursor::end_of(self.root.left.clone())
    }

    /// Returns the position reverse traversal stops at. This is the end
    /// position, which lies before the first element as well as after the
    /// last.
    #[inline]
    #[must_use]
    pub fn rend(&self) -> PersistentSetCursor<T> {
        self.end()
    }

    /// Returns a cursor at the first element, or at the end position if the
    /// set is empty.
    #[must_use]
    pub fn begin(&self) -> PersistentSetCursor<T> {
        self.cursor_at(node::minimum(self.root.tree()))
    }

    /// Returns a cursor at the last element, or at the end position if the
    /// set is empty. Reverse traversal walks from here with
    /// [`PersistentSetCursor::move_prev`] until it reaches [`Self::rend`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_set::persistent::PersistentSet;
    ///
    /// let set: PersistentSet<i32> = (1..=3).collect();
    /// let mut reversed = Vec::new();
    /// let mut cursor = set.rbegin();
    /// while cursor != set.rend() {
    ///     reversed.extend(cursor.get().copied());
    ///     cursor.move_prev();
    /// }
    /// assert_eq!(reversed, vec![3, 2, 1]);
    /// ```
    #[must_use]
    pub fn rbegin(&self) -> PersistentSetCursor<T> {
        self.cursor_at(node::maximum(self.root.tree()))
    }

    /// Returns the smallest element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        node::minimum(self.root.tree()).map(|node| &node.key)
    }

    /// Returns the largest element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        node::maximum(self.root.tree()).map(|node| &node.key)
    }

    fn cursor_at(&self, node: Option<&ReferenceCounter<Node<T>>>) -> PersistentSetCursor<T> {
        PersistentSetCursor::new(node.cloned(), self.root.left.clone())
    }
}

impl<T: Ord> PersistentSet<T> {
    /// Returns a cursor at `key`, or at the end position if it is absent.
    ///
    /// The key may be any borrowed form of the element type, but the
    /// ordering on the borrowed form must match the ordering on the element
    /// type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_set::persistent::PersistentSet;
    ///
    /// let set: PersistentSet<String> =
    ///     ["apple".to_string(), "pear".to_string()].into_iter().collect();
    ///
    /// assert_eq!(set.find("pear").get().map(String::as_str), Some("pear"));
    /// assert!(set.find("plum").is_end());
    /// ```
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> PersistentSetCursor<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.cursor_at(node::find(self.root.tree(), key))
    }

    /// Returns a cursor at the first element not less than `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_set::persistent::PersistentSet;
    ///
    /// let set: PersistentSet<i32> = [1, 3, 5, 7].into_iter().collect();
    /// assert_eq!(set.lower_bound(&4).get(), Some(&5));
    /// assert_eq!(set.lower_bound(&5).get(), Some(&5));
    /// assert!(set.lower_bound(&8).is_end());
    /// ```
    #[must_use]
    pub fn lower_bound<Q>(&self, key: &Q) -> PersistentSetCursor<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.cursor_at(node::lower_bound(self.root.tree(), key))
    }

    /// Returns a cursor at the first element greater than `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_set::persistent::PersistentSet;
    ///
    /// let set: PersistentSet<i32> = [1, 3, 5, 7].into_iter().collect();
    /// assert_eq!(set.upper_bound(&5).get(), Some(&7));
    /// assert!(set.upper_bound(&7).is_end());
    /// ```
    #[must_use]
    pub fn upper_bound<Q>(&self, key: &Q) -> PersistentSetCursor<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.cursor_at(node::upper_bound(self.root.tree(), key))
    }

    /// Returns a reference to the element equal to `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        node::find(self.root.tree(), key).map(|node| &node.key)
    }

    /// Returns `true` if the set contains `key`.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns an iterator over the elements in ascending order.
    ///
    /// The iterator is double-ended; `iter().rev()` walks in descending
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_set::persistent::PersistentSet;
    ///
    /// let set: PersistentSet<i32> = [2, 3, 1].into_iter().collect();
    /// let descending: Vec<&i32> = set.iter().rev().collect();
    /// assert_eq!(descending, vec![&3, &2, &1]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentSetIterator<'_, T> {
        let tree = self.root.tree();
        PersistentSetIterator {
            anchor: tree,
            front: node::minimum(tree),
            back: node::maximum(tree),
            remaining: self.length,
        }
    }
}

impl<T: Ord + Clone> PersistentSet<T> {
    /// Creates a set containing a single element.
    #[must_use]
    pub fn singleton(key: T) -> Self {
        let mut set = Self::new();
        set.insert(key);
        set
    }

    /// Inserts `key`.
    ///
    /// Returns a cursor at the element equal to `key` and whether it was
    /// newly inserted. Inserting a key that is already present changes
    /// nothing.
    ///
    /// Only the nodes from the root to the insertion point are copied; clones
    /// of this set taken earlier do not see the new element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_set::persistent::PersistentSet;
    ///
    /// let mut set: PersistentSet<i32> = (1..=3).collect();
    /// let snapshot = set.clone();
    ///
    /// let (cursor, inserted) = set.insert(10);
    /// assert!(inserted);
    /// assert_eq!(cursor.get(), Some(&10));
    /// assert!(set.contains(&10));
    /// assert!(!snapshot.contains(&10));
    /// ```
    pub fn insert(&mut self, key: T) -> (PersistentSetCursor<T>, bool) {
        let (path, found) = Path::locate(self.root.tree(), &key);
        if let Some(existing) = found {
            return (self.cursor_at(Some(existing)), false);
        }

        let copied = path.len();
        let (tree, inserted) = path.splice(Splice::Graft {
            key,
            left: None,
            right: None,
        });
        self.root.left = tree;
        self.length += 1;
        log::trace!(
            "persistent set insert: copied {copied} nodes, length {}",
            self.length
        );

        (
            PersistentSetCursor::new(inserted, self.root.left.clone()),
            true,
        )
    }

    /// Removes the element under `cursor`.
    ///
    /// Returns a cursor at the element that followed it, or at the end
    /// position. Erasing at the end position does nothing and returns the
    /// end position. The cursor is resolved by its element, so a cursor
    /// taken from another snapshot removes the equal element of this set,
    /// if there is one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_set::persistent::PersistentSet;
    ///
    /// let mut set: PersistentSet<i32> = [3, 1, 4, 2, 5].into_iter().collect();
    /// let next = set.erase(&set.find(&3));
    ///
    /// assert_eq!(next.get(), Some(&4));
    /// let remaining: Vec<&i32> = set.iter().collect();
    /// assert_eq!(remaining, vec![&1, &2, &4, &5]);
    /// ```
    pub fn erase(&mut self, cursor: &PersistentSetCursor<T>) -> PersistentSetCursor<T> {
        match cursor.get() {
            Some(key) if self.remove(key) => self.upper_bound(key),
            _ => self.end(),
        }
    }

    /// Removes the element equal to `key`. Returns whether it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_set::persistent::PersistentSet;
    ///
    /// let mut set: PersistentSet<i32> = (1..=3).collect();
    /// assert!(set.remove(&2));
    /// assert!(!set.remove(&2));
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (path, found) = Path::locate(self.root.tree(), key);
        let Some(target) = found else {
            return false;
        };

        let splice = match (&target.left, &target.right) {
            (None, None) => Splice::Detach,
            (Some(child), None) | (None, Some(child)) => Splice::Subtree(child.clone()),
            (Some(left), Some(right)) => {
                // The successor has no left child, so it leaves the right
                // subtree the same way a one-child node would, and its key
                // takes the target's place above both original subtrees.
                let (successor_path, successor) = Path::leftmost(right);
                let (right_without_successor, _) =
                    successor_path.splice(Splice::from_link(successor.right.clone()));
                Splice::Graft {
                    key: successor.key.clone(),
                    left: Some(left.clone()),
                    right: right_without_successor,
                }
            }
        };

        let copied = path.len();
        let (tree, _) = path.splice(splice);
        self.root.left = tree;
        self.length -= 1;
        log::trace!(
            "persistent set remove: copied {copied} nodes, length {}",
            self.length
        );

        true
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the elements of a [`PersistentSet`] in ascending order.
pub struct PersistentSetIterator<'a, T> {
    anchor: Option<&'a ReferenceCounter<Node<T>>>,
    front: Option<&'a ReferenceCounter<Node<T>>>,
    back: Option<&'a ReferenceCounter<Node<T>>>,
    remaining: usize,
}

impl<'a, T: Ord> Iterator for PersistentSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.front?;
        self.remaining -= 1;
        self.front = node::upper_bound(self.anchor, &current.key);
        Some(&current.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Ord> DoubleEndedIterator for PersistentSetIterator<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.back?;
        self.remaining -= 1;
        self.back = node::predecessor(self.anchor, &current.key);
        Some(&current.key)
    }
}

impl<T: Ord> ExactSizeIterator for PersistentSetIterator<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> Clone for PersistentSetIterator<'_, T> {
    fn clone(&self) -> Self {
        Self {
            anchor: self.anchor,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

/// An owning iterator over the elements of a [`PersistentSet`].
///
/// Elements may still be shared with other snapshots, so they are cloned
/// out of the tree.
pub struct PersistentSetIntoIterator<T> {
    front: PersistentSetCursor<T>,
    back: PersistentSetCursor<T>,
    remaining: usize,
}

impl<T: Ord + Clone> Iterator for PersistentSetIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.front.get()?.clone();
        self.remaining -= 1;
        self.front.move_next();
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Ord + Clone> DoubleEndedIterator for PersistentSetIntoIterator<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.back.get()?.clone();
        self.remaining -= 1;
        self.back.move_prev();
        Some(key)
    }
}

impl<T: Ord + Clone> ExactSizeIterator for PersistentSetIntoIterator<T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Clone for PersistentSet<T> {
    /// Takes an O(1) snapshot sharing the whole tree.
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            length: self.length,
        }
    }
}

impl<T> Default for PersistentSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> FromIterator<T> for PersistentSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord + Clone> Extend<T> for PersistentSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<T: Ord + Clone> IntoIterator for PersistentSet<T> {
    type Item = T;
    type IntoIter = PersistentSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentSetIntoIterator {
            front: self.begin(),
            back: self.rbegin(),
            remaining: self.length,
        }
    }
}

impl<'a, T: Ord> IntoIterator for &'a PersistentSet<T> {
    type Item = &'a T;
    type IntoIter = PersistentSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord> PartialEq for PersistentSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && (self.ptr_eq(other) || self.iter().eq(other.iter()))
    }
}

impl<T: Ord> Eq for PersistentSet<T> {}

/// Hashes the length followed by every element in ascending order, so sets
/// with equal contents hash equally whatever their tree shapes.
impl<T: Ord + Hash> Hash for PersistentSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for key in self {
            key.hash(state);
        }
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for PersistentSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Ord + fmt::Display> fmt::Display for PersistentSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for key in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Thread Safety
// =============================================================================

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentSet<i32>: Send, Sync);
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentSetCursor<String>: Send, Sync);

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(PersistentSet<i32>: Send, Sync);

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T> serde::Serialize for PersistentSet<T>
where
    T: serde::Serialize + Ord,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut sequence = serializer.serialize_seq(Some(self.len()))?;
        for key in self {
            sequence.serialize_element(key)?;
        }
        sequence.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentSetVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<T> PersistentSetVisitor<T> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for PersistentSetVisitor<T>
where
    T: serde::Deserialize<'de> + Ord + Clone,
{
    type Value = PersistentSet<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut set = PersistentSet::new();
        while let Some(key) = access.next_element()? {
            set.insert(key);
        }
        Ok(set)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentSet<T>
where
    T: serde::Deserialize<'de> + Ord + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentSetVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================


// =============================================================================
// Multithread Tests (arc feature only)
// =============================================================================

#[cfg(all(test, feature = "arc"))]
mod multithread_tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;
    use std::thread;

    #[rstest]
    fn test_snapshot_read_across_threads() {
        let set: Arc<PersistentSet<i32>> = Arc::new((1..=100).collect());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let set = Arc::clone(&set);
                thread::spawn(move || {
                    assert_eq!(set.len(), 100);
                    assert!(set.iter().copied().eq(1..=100));
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread panicked");
        }
    }

    #[rstest]
    fn test_independent_edits_per_thread() {
        let base: PersistentSet<i32> = (0..10).collect();

        let results: Vec<PersistentSet<i32>> = (10..14)
            .map(|key| {
                let mut set = base.clone();
                thread::spawn(move || {
                    set.insert(key);
                    set.remove(&0);
                    set
                })
            })
            .map(|handle| handle.join().expect("Thread panicked"))
            .collect();

        for (offset, set) in (10..14).zip(&results) {
            assert_eq!(set.len(), 10);
            assert!(set.contains(&offset));
            assert!(!set.contains(&0));
        }
        assert_eq!(base.len(), 10);
        assert!(base.contains(&0));
    }
}
