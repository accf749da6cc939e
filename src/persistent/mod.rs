//! Persistent (immutable-snapshot) ordered set.
//!
//! This module provides [`PersistentSet`], an ordered set whose clones are
//! O(1) snapshots. Edits copy only the path from the root to the edited
//! position and share every other subtree with earlier versions:
//!
//! - [`PersistentSet`]: the set itself
//! - [`PersistentSetCursor`]: a bidirectional position in one snapshot
//! - [`PersistentSetIterator`]: a borrowing, double-ended iterator
//! - [`PersistentSetIntoIterator`]: an owning iterator
//!
//! # Structural Sharing
//!
//! ```rust
//! use persistent_set::persistent::PersistentSet;
//!
//! let mut set: PersistentSet<i32> = [5, 3, 8].into_iter().collect();
//! let snapshot = set.clone();
//!
//! set.insert(4);
//! set.remove(&8);
//!
//! assert_eq!(format!("{set}"), "{3, 4, 5}");
//! assert_eq!(format!("{snapshot}"), "{3, 5, 8}"); // Original unchanged
//! ```
//!
//! # Cursors
//!
//! ```rust
//! use persistent_set::persistent::PersistentSet;
//!
//! let set: PersistentSet<i32> = [1, 3, 5, 7].into_iter().collect();
//!
//! let mut cursor = set.lower_bound(&4);
//! assert_eq!(cursor.get(), Some(&5));
//! cursor.move_next();
//! assert_eq!(cursor.get(), Some(&7));
//! cursor.move_next();
//! assert_eq!(cursor, set.end());
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`, and sets
/// and cursors can be shared across threads.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod cursor;
mod node;
mod path;
mod set;

pub use cursor::PersistentSetCursor;
pub use set::PersistentSet;
pub use set::PersistentSetIntoIterator;
pub use set::PersistentSetIterator;

// =============================================================================
// Tests
// =============================================================================
