//! Property-based tests for PersistentSet.
//!
//! `std::collections::BTreeSet` serves as the model: after any sequence of
//! edits, the set must hold exactly what the model holds, and every clone
//! taken along the way must still hold what the model held at that moment.

use persistent_set::persistent::PersistentSet;
use proptest::prelude::*;
use std::collections::BTreeSet;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

#[derive(Clone, Debug)]
enum Operation {
    Insert(i16),
    Remove(i16),
    EraseAtLowerBound(i16),
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => any::<i16>().prop_map(|key| Operation::Insert(key % 64)),
        1 => any::<i16>().prop_map(|key| Operation::Remove(key % 64)),
        1 => any::<i16>().prop_map(|key| Operation::EraseAtLowerBound(key % 64)),
    ]
}

fn apply(set: &mut PersistentSet<i16>, model: &mut BTreeSet<i16>, operation: &Operation) {
    match *operation {
        Operation::Insert(key) => {
            let (cursor, inserted) = set.insert(key);
            assert_eq!(inserted, model.insert(key));
            assert_eq!(cursor.get(), Some(&key));
        }
        Operation::Remove(key) => {
            assert_eq!(set.remove(&key), model.remove(&key));
        }
        Operation::EraseAtLowerBound(key) => {
            let cursor = set.lower_bound(&key);
            let erased = cursor.get().copied();
            let next = set.erase(&cursor);
            if let Some(erased) = erased {
                model.remove(&erased);
                assert_eq!(next.get(), model.range(erased..).next());
            } else {
                assert!(next.is_end());
            }
        }
    }
}

fn arbitrary_set(max_size: usize) -> impl Strategy<Value = (PersistentSet<i32>, BTreeSet<i32>)> {
    prop::collection::vec(any::<i32>(), 0..max_size).prop_map(|keys| {
        let set: PersistentSet<i32> = keys.iter().copied().collect();
        let model: BTreeSet<i32> = keys.into_iter().collect();
        (set, model)
    })
}

// =============================================================================
// Model Laws
// =============================================================================

proptest! {
    /// Law: after any edit sequence the set matches the model, and every
    /// snapshot taken along the way still matches the model at that time.
    #[test]
    fn prop_edits_match_model_and_preserve_snapshots(
        operations in prop::collection::vec(operation(), 0..80)
    ) {
        let mut set = PersistentSet::new();
        let mut model = BTreeSet::new();
        let mut history = Vec::new();

        for operation in &operations {
            history.push((set.clone(), model.clone()));
            apply(&mut set, &mut model, operation);
            prop_assert_eq!(set.len(), model.len());
        }

        prop_assert!(set.iter().eq(model.iter()));
        for (snapshot, expected) in &history {
            prop_assert_eq!(snapshot.len(), expected.len());
            prop_assert!(snapshot.iter().eq(expected.iter()));
        }
    }

    /// Law: iteration yields strictly increasing elements, both ways.
    #[test]
    fn prop_iteration_is_sorted((set, model) in arbitrary_set(64)) {
        prop_assert!(set.iter().eq(model.iter()));
        prop_assert!(set.iter().rev().eq(model.iter().rev()));
    }

    /// Law: cursor walks agree with the iterator in both directions.
    #[test]
    fn prop_cursor_walk_matches_iterator((set, model) in arbitrary_set(64)) {
        let mut forward = Vec::new();
        let mut cursor = set.begin();
        while let Some(&key) = cursor.get() {
            forward.push(key);
            cursor.move_next();
        }

        let mut backward = Vec::new();
        let mut cursor = set.rbegin();
        while cursor != set.rend() {
            backward.extend(cursor.get().copied());
            cursor.move_prev();
        }

        prop_assert!(forward.iter().eq(model.iter()));
        prop_assert!(backward.iter().eq(model.iter().rev()));
    }
}

// =============================================================================
// Query Laws
// =============================================================================

proptest! {
    /// Law: lower_bound finds the first element not less than the key.
    #[test]
    fn prop_lower_bound_matches_model((set, model) in arbitrary_set(48), key: i32) {
        prop_assert_eq!(set.lower_bound(&key).get().copied(), model.range(key..).next().copied());
    }

    /// Law: upper_bound finds the first element greater than the key.
    #[test]
    fn prop_upper_bound_matches_model((set, model) in arbitrary_set(48), key: i32) {
        let expected = model
            .range((std::ops::Bound::Excluded(key), std::ops::Bound::Unbounded))
            .next()
            .copied();
        prop_assert_eq!(set.upper_bound(&key).get().copied(), expected);
    }

    /// Law: find succeeds exactly for members.
    #[test]
    fn prop_find_matches_contains((set, model) in arbitrary_set(48), key: i32) {
        prop_assert_eq!(!set.find(&key).is_end(), model.contains(&key));
        prop_assert_eq!(set.contains(&key), model.contains(&key));
    }
}

// =============================================================================
// Insert/Remove Laws
// =============================================================================

proptest! {
    /// Law: inserting a present key is a no-op.
    /// set.insert(key); set.insert(key) leaves len unchanged
    #[test]
    fn prop_insert_idempotent((mut set, _model) in arbitrary_set(32), key: i32) {
        set.insert(key);
        let length = set.len();
        let (_, inserted) = set.insert(key);
        prop_assert!(!inserted);
        prop_assert_eq!(set.len(), length);
    }

    /// Law: remove undoes insert of a new key.
    #[test]
    fn prop_remove_after_insert((mut set, _model) in arbitrary_set(32), key: i32) {
        prop_assume!(!set.contains(&key));
        let original = set.clone();
        set.insert(key);
        prop_assert!(set.remove(&key));
        prop_assert_eq!(set, original);
    }

    /// Law: erase drops exactly one element.
    #[test]
    fn prop_erase_drops_one((mut set, model) in arbitrary_set(32), index: prop::sample::Index) {
        prop_assume!(!model.is_empty());
        let key = *model.iter().nth(index.index(model.len())).unwrap();
        let length = set.len();
        set.erase(&set.find(&key));
        prop_assert_eq!(set.len(), length - 1);
        prop_assert!(set.find(&key).is_end());
    }
}
