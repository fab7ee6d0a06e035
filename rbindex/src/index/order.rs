//! Ordering strategies for index keys.
//!
//! The tree never compares keys numerically on its own. Callers pass a
//! [`KeyOrder`] to every insert, which lets a key stand for any externally
//! defined sort criterion (a score, a timestamp, ...).
//!
//! An order must be a pure, deterministic total order for the lifetime of
//! the tree. An order whose answer for a pair changes between calls silently
//! breaks the search-tree invariant.

use crate::index::node::Key;

/// A strict "less than" predicate over keys.
pub trait KeyOrder {
    fn less_than(&self, a: Key, b: Key) -> bool;
}

impl<F> KeyOrder for F
where
    F: Fn(Key, Key) -> bool,
{
    fn less_than(&self, a: Key, b: Key) -> bool {
        self(a, b)
    }
}

/// Numeric ascending order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ascending;

impl KeyOrder for Ascending {
    fn less_than(&self, a: Key, b: Key) -> bool {
        a < b
    }
}

/// Numeric descending order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Descending;

impl KeyOrder for Descending {
    fn less_than(&self, a: Key, b: Key) -> bool {
        a > b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_by<O: KeyOrder>(order: &O, mut keys: Vec<Key>) -> Vec<Key> {
        keys.sort_by(|a, b| {
            if order.less_than(*a, *b) {
                std::cmp::Ordering::Less
            } else if order.less_than(*b, *a) {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        });
        keys
    }

    #[test]
    fn test_numeric_orders() {
        assert!(Ascending.less_than(1, 2));
        assert!(!Ascending.less_than(2, 2));
        assert!(Descending.less_than(2, 1));
        assert!(!Descending.less_than(1, 1));
    }

    #[test]
    fn test_closure_order() {
        let by_last_digit = |a: Key, b: Key| (a % 10, a) < (b % 10, b);
        assert_eq!(sorted_by(&by_last_digit, vec![21, 13, 30, 11]), vec![30, 11, 21, 13]);
    }
}
