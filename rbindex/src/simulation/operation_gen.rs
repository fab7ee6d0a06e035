//! Operation generator for deterministic simulation testing.
//!
//! Produces random but reproducible sequences of inserts and removes,
//! including deliberately invalid ones that the index must reject without
//! touching the tree.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::index::{EMPTY, Key};

/// How many random draws to spend looking for an absent key before giving up.
const ABSENT_KEY_ATTEMPTS: usize = 32;

/// A single index mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert(Key),
    Remove(Key),
}

impl Operation {
    /// The key this operation targets.
    #[must_use]
    pub const fn key(self) -> Key {
        match self {
            Self::Insert(key) | Self::Remove(key) => key,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Insert(key) => write!(f, "insert({key})"),
            Self::Remove(key) => write!(f, "remove({key})"),
        }
    }
}

/// Configuration for operation generation.
#[derive(Debug, Clone)]
pub struct OperationGenConfig {
    /// Keys are drawn from `1..=key_space`.
    pub key_space: Key,
    /// Probability of a remove vs insert when the tree is non-empty (0.0 - 1.0).
    pub remove_rate: f64,
    /// Probability of generating an operation that must be rejected (0.0 - 1.0).
    pub invalid_rate: f64,
}

impl Default for OperationGenConfig {
    fn default() -> Self {
        Self {
            key_space: 1_000,
            remove_rate: 0.4,
            invalid_rate: 0.05,
        }
    }
}

/// Kinds of operations the index must reject.
///
/// `BeyondKeySpace` is only rejected by bounded stores such as `DenseArena`;
/// unbounded stores accept it as an ordinary insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidOperation {
    /// Insert of the sentinel key.
    InsertSentinel,
    /// Remove of the sentinel key.
    RemoveSentinel,
    /// Insert of a key already in the tree.
    DuplicateInsert,
    /// Remove of a key not in the tree.
    AbsentRemove,
    /// Insert of a key just past the key space.
    BeyondKeySpace,
}

impl InvalidOperation {
    /// All invalid operation kinds.
    pub const ALL: [Self; 5] = [
        Self::InsertSentinel,
        Self::RemoveSentinel,
        Self::DuplicateInsert,
        Self::AbsentRemove,
        Self::BeyondKeySpace,
    ];
}

/// Generator for random index operations.
///
/// Given the same seed and the same sequence of live key sets, produces the
/// same operations.
pub struct OperationGenerator {
    rng: StdRng,
    config: OperationGenConfig,
}

impl OperationGenerator {
    /// Create a new generator with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, OperationGenConfig::default())
    }

    /// Create a new generator with custom configuration.
    #[must_use]
    pub fn with_config(seed: u64, config: OperationGenConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config: OperationGenConfig {
                key_space: config.key_space.max(1),
                ..config
            },
        }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &OperationGenConfig {
        &self.config
    }

    /// Generate the next operation against the currently live keys.
    pub fn next_operation(&mut self, live: &BTreeSet<Key>) -> Operation {
        if self.rng.random::<f64>() < self.config.invalid_rate {
            let kind = InvalidOperation::ALL[self.rng.random_range(0..InvalidOperation::ALL.len())];
            return self.invalid_operation(kind, live);
        }
        self.valid_operation(live)
    }

    /// Generate an operation the index should accept.
    pub fn valid_operation(&mut self, live: &BTreeSet<Key>) -> Operation {
        let wants_remove = !live.is_empty() && self.rng.random::<f64>() < self.config.remove_rate;
        let insert_key = if wants_remove {
            None
        } else {
            self.absent_key(live)
        };
        if let Some(key) = insert_key {
            return Operation::Insert(key);
        }
        // Remove requested, or the key space is saturated.
        self.live_key(live).map_or(Operation::Insert(EMPTY), Operation::Remove)
    }

    /// Generate an operation of the given invalid kind.
    pub fn invalid_operation(&mut self, kind: InvalidOperation, live: &BTreeSet<Key>) -> Operation {
        match kind {
            InvalidOperation::InsertSentinel => Operation::Insert(EMPTY),
            InvalidOperation::RemoveSentinel => Operation::Remove(EMPTY),
            InvalidOperation::DuplicateInsert => {
                Operation::Insert(self.live_key(live).unwrap_or(EMPTY))
            }
            InvalidOperation::AbsentRemove => {
                let key = self
                    .absent_key(live)
                    .unwrap_or_else(|| self.config.key_space.saturating_add(1));
                Operation::Remove(key)
            }
            InvalidOperation::BeyondKeySpace => {
                let offset = self.rng.random_range(1..=16);
                Operation::Insert(self.config.key_space.saturating_add(offset))
            }
        }
    }

    /// A uniformly chosen live key.
    fn live_key(&mut self, live: &BTreeSet<Key>) -> Option<Key> {
        if live.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..live.len());
        live.iter().nth(index).copied()
    }

    /// A random key in the key space that is not live.
    fn absent_key(&mut self, live: &BTreeSet<Key>) -> Option<Key> {
        for _ in 0..ABSENT_KEY_ATTEMPTS {
            let key = self.rng.random_range(1..=self.config.key_space);
            if !live.contains(&key) {
                return Some(key);
            }
        }
        // Dense tree: scan for a gap instead of drawing forever.
        (1..=self.config.key_space).find(|key| !live.contains(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operations_deterministic() {
        let mut gen1 = OperationGenerator::new(12345);
        let mut gen2 = OperationGenerator::new(12345);
        let mut live = BTreeSet::new();

        for _ in 0..200 {
            let op1 = gen1.next_operation(&live);
            let op2 = gen2.next_operation(&live);
            assert_eq!(op1, op2);
            match op1 {
                Operation::Insert(key) if key != EMPTY && key <= gen1.config().key_space => {
                    live.insert(key);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_valid_operations_stay_valid() {
        let config = OperationGenConfig {
            key_space: 50,
            remove_rate: 0.5,
            invalid_rate: 0.0,
        };
        let mut generator = OperationGenerator::with_config(7, config);
        let mut live = BTreeSet::new();

        for _ in 0..500 {
            match generator.next_operation(&live) {
                Operation::Insert(key) => {
                    assert!((1..=50).contains(&key));
                    assert!(live.insert(key), "insert of live key {key}");
                }
                Operation::Remove(key) => {
                    assert!(live.remove(&key), "remove of absent key {key}");
                }
            }
        }
    }

    #[test]
    fn test_saturated_key_space_removes() {
        let config = OperationGenConfig {
            key_space: 4,
            remove_rate: 0.0,
            invalid_rate: 0.0,
        };
        let mut generator = OperationGenerator::with_config(1, config);
        let live: BTreeSet<Key> = (1..=4).collect();

        assert!(matches!(generator.next_operation(&live), Operation::Remove(_)));
    }

    #[test]
    fn test_invalid_operations() {
        let mut generator = OperationGenerator::new(3);
        let live: BTreeSet<Key> = [10, 20, 30].into_iter().collect();

        assert_eq!(
            generator.invalid_operation(InvalidOperation::InsertSentinel, &live),
            Operation::Insert(EMPTY)
        );
        assert_eq!(
            generator.invalid_operation(InvalidOperation::RemoveSentinel, &live),
            Operation::Remove(EMPTY)
        );

        let Operation::Insert(duplicate) =
            generator.invalid_operation(InvalidOperation::DuplicateInsert, &live)
        else {
            panic!("duplicate insert should be an insert");
        };
        assert!(live.contains(&duplicate));

        let Operation::Remove(absent) =
            generator.invalid_operation(InvalidOperation::AbsentRemove, &live)
        else {
            panic!("absent remove should be a remove");
        };
        assert!(!live.contains(&absent));

        let beyond = generator.invalid_operation(InvalidOperation::BeyondKeySpace, &live);
        assert!(beyond.key() > generator.config().key_space);
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Insert(5).to_string(), "insert(5)");
        assert_eq!(Operation::Remove(9).to_string(), "remove(9)");
    }
}
