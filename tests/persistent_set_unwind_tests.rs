//! Unwind-safety tests for PersistentSet.
//!
//! Edits clone the keys on the copied path. These tests make a key's `Clone`
//! panic on a chosen invocation and check that the interrupted edit left the
//! set exactly as it was.

use persistent_set::persistent::PersistentSet;
use rstest::rstest;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

thread_local! {
    static CLONE_BUDGET: Cell<Option<usize>> = const { Cell::new(None) };
}

/// A key whose `Clone` panics once the thread's clone budget runs out.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Fragile(i32);

impl Clone for Fragile {
    fn clone(&self) -> Self {
        CLONE_BUDGET.with(|budget| {
            if let Some(remaining) = budget.get() {
                assert!(remaining > 0, "clone budget exhausted");
                budget.set(Some(remaining - 1));
            }
        });
        Self(self.0)
    }
}

fn with_clone_budget<R>(budget: usize, operation: impl FnOnce() -> R) -> std::thread::Result<R> {
    CLONE_BUDGET.with(|cell| cell.set(Some(budget)));
    let result = panic::catch_unwind(AssertUnwindSafe(operation));
    CLONE_BUDGET.with(|cell| cell.set(None));
    result
}

/// 8 -> (4 -> (2, 6), 12 -> (10, 14)) with leaves 1..=15 below.
fn balanced_set() -> PersistentSet<Fragile> {
    [8, 4, 12, 2, 6, 10, 14, 1, 3, 5, 7, 9, 11, 13, 15]
        .into_iter()
        .map(Fragile)
        .collect()
}

fn keys(set: &PersistentSet<Fragile>) -> Vec<i32> {
    set.iter().map(|key| key.0).collect()
}

/// Runs `edit` with budgets 0, 1, 2, ... until it completes, checking after
/// each interrupted attempt that the set is unchanged. Returns the number of
/// interrupted attempts.
fn exhaust_failures(
    set: &mut PersistentSet<Fragile>,
    edit: impl Fn(&mut PersistentSet<Fragile>),
) -> usize {
    let snapshot = set.clone();
    let expected = keys(set);

    for budget in 0..64 {
        if with_clone_budget(budget, || edit(set)).is_ok() {
            return budget;
        }
        assert!(set.ptr_eq(&snapshot));
        assert_eq!(set.len(), expected.len());
        assert_eq!(keys(set), expected);
    }
    panic!("edit never completed");
}

#[rstest]
#[case(16, 4)]
#[case(0, 4)]
#[case(100, 4)]
fn test_interrupted_insert_leaves_set_untouched(#[case] key: i32, #[case] copied: usize) {
    let mut set = balanced_set();
    let failures = exhaust_failures(&mut set, |set| {
        set.insert(Fragile(key));
    });

    assert_eq!(failures, copied);
    assert_eq!(set.len(), 16);
    assert!(!set.find(&Fragile(key)).is_end());
}

#[rstest]
#[case(1, 3)]
#[case(14, 3)]
#[case(8, 3)]
#[case(4, 3)]
fn test_interrupted_erase_leaves_set_untouched(#[case] key: i32, #[case] clones: usize) {
    let mut set = balanced_set();
    let failures = exhaust_failures(&mut set, |set| {
        set.remove(&Fragile(key));
    });

    assert_eq!(failures, clones);
    assert_eq!(set.len(), 14);
    assert!(set.find(&Fragile(key)).is_end());
}

#[rstest]
fn test_interrupted_edit_keeps_earlier_snapshot_intact() {
    let mut set = balanced_set();
    let snapshot = set.clone();
    let result = with_clone_budget(1, || set.remove(&Fragile(8)));

    assert!(result.is_err());
    assert_eq!(keys(&snapshot), (1..=15).collect::<Vec<_>>());
    assert_eq!(keys(&set), (1..=15).collect::<Vec<_>>());
}

#[rstest]
fn test_interrupted_edit_keeps_cursors_valid() {
    let mut set = balanced_set();
    let mut cursor = set.find(&Fragile(14));
    let result = with_clone_budget(0, || set.insert(Fragile(20)));

    assert!(result.is_err());
    cursor.move_next();
    assert_eq!(cursor.get(), Some(&Fragile(15)));
}
