//! # persistent-set
//!
//! A persistent ordered set for Rust.
//!
//! ## Overview
//!
//! [`PersistentSet`](persistent::PersistentSet) is an ordered set over a
//! totally ordered element type. Cloning it is O(1) and yields an
//! independent snapshot: edits to one copy are never observed by another.
//! Under the hood, edits copy only the nodes on the path from the root to
//! the edited position and share everything else.
//!
//! - Insert, erase, find, and bound queries in O(height)
//! - Bidirectional cursors that keep their snapshot alive
//! - Double-ended borrowing iteration
//! - Edits leave the set untouched if an element's `Clone` panics
//!
//! ## Feature Flags
//!
//! - `arc`: Use `Arc` instead of `Rc` so snapshots can cross threads
//! - `serde`: Serialize as a sorted sequence
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use persistent_set::prelude::*;
//!
//! let mut set = PersistentSet::new();
//! set.insert(2);
//! set.insert(1);
//!
//! let snapshot = set.clone();
//! set.insert(3);
//!
//! assert_eq!(set.len(), 3);
//! assert_eq!(snapshot.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use persistent_set::prelude::*;
/// ```
pub mod prelude {
    pub use crate::persistent::*;
}

pub mod persistent;
