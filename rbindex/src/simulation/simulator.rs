//! Main simulator harness for deterministic simulation testing.
//!
//! Drives a tree through a generated operation sequence, mirrors every
//! accepted operation into a `BTreeSet`, and after each step checks that the
//! tree's in-order walk matches the reference and that every structural
//! invariant still holds.

use std::collections::BTreeSet;

use crate::index::{Ascending, EMPTY, IndexError, Key, NodeStore, RedBlackTree};

use super::invariants::{InvariantViolation, TreeShape, check_tree};
use super::operation_gen::{Operation, OperationGenConfig, OperationGenerator};

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Number of operations to run.
    pub operations: usize,
    /// Operation generation configuration.
    pub operation_config: OperationGenConfig,
}

impl SimulatorConfig {
    /// Create a new simulator config with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            operations: 1_000,
            operation_config: OperationGenConfig::default(),
        }
    }

    /// Set the number of operations.
    #[must_use]
    pub const fn with_operations(mut self, operations: usize) -> Self {
        self.operations = operations;
        self
    }

    /// Set the key space keys are drawn from.
    #[must_use]
    pub const fn with_key_space(mut self, key_space: Key) -> Self {
        self.operation_config.key_space = key_space;
        self
    }

    /// Set the remove rate.
    #[must_use]
    pub const fn with_remove_rate(mut self, rate: f64) -> Self {
        self.operation_config.remove_rate = rate;
        self
    }

    /// Set the invalid operation rate.
    #[must_use]
    pub const fn with_invalid_rate(mut self, rate: f64) -> Self {
        self.operation_config.invalid_rate = rate;
        self
    }
}

/// What went wrong at a failing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The index accepted or rejected an operation differently than the reference.
    UnexpectedOutcome {
        expected: Result<(), IndexError>,
        actual: Result<(), IndexError>,
    },
    /// A rejected operation changed the root.
    RootChangedOnRejection { before: Key, after: Key },
    /// The in-order walk differs from the reference set.
    ContentMismatch {
        expected_len: usize,
        actual_len: usize,
        first_difference: Option<Key>,
    },
    /// A structural invariant was violated.
    Invariant(InvariantViolation),
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedOutcome { expected, actual } => {
                write!(f, "expected {expected:?}, got {actual:?}")
            }
            Self::RootChangedOnRejection { before, after } => {
                write!(f, "rejected operation moved root from {before} to {after}")
            }
            Self::ContentMismatch {
                expected_len,
                actual_len,
                first_difference,
            } => write!(
                f,
                "walk has {actual_len} keys, reference has {expected_len} (first difference: {first_difference:?})"
            ),
            Self::Invariant(e) => write!(f, "invariant violated: {e}"),
        }
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Invariant(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InvariantViolation> for Failure {
    fn from(e: InvariantViolation) -> Self {
        Self::Invariant(e)
    }
}

/// A failure detected during simulation.
#[derive(Debug, Clone)]
pub struct SimulationViolation {
    /// Index of the operation after which it was detected.
    pub operation_index: usize,
    /// The operation that was applied.
    pub operation: Operation,
    /// What went wrong.
    pub failure: Failure,
}

/// Results from a simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The seed used for this simulation.
    pub seed: u64,
    /// Number of operations applied.
    pub operations_run: usize,
    /// Number of accepted inserts.
    pub inserts: u64,
    /// Number of accepted removes.
    pub removes: u64,
    /// Number of operations rejected as expected.
    pub rejected: u64,
    /// Shape of the tree after the last operation.
    pub final_shape: TreeShape,
    /// Failures detected. The run stops at the first one.
    pub violations: Vec<SimulationViolation>,
}

impl SimulationResult {
    /// Check if the simulation passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// The main simulator harness.
pub struct Simulator {
    config: SimulatorConfig,
    generator: OperationGenerator,
    /// Keys the tree should hold.
    reference: BTreeSet<Key>,
    root: Key,
    inserts: u64,
    removes: u64,
    rejected: u64,
}

impl Simulator {
    /// Create a new simulator with the given configuration.
    #[must_use]
    pub fn new(config: SimulatorConfig) -> Self {
        let generator = OperationGenerator::with_config(config.seed, config.operation_config.clone());
        Self {
            config,
            generator,
            reference: BTreeSet::new(),
            root: EMPTY,
            inserts: 0,
            removes: 0,
            rejected: 0,
        }
    }

    /// Root of the simulated tree.
    #[must_use]
    pub const fn root(&self) -> Key {
        self.root
    }

    /// Keys the simulated tree should hold.
    #[must_use]
    pub const fn reference(&self) -> &BTreeSet<Key> {
        &self.reference
    }

    /// Run the configured number of operations against `store`.
    ///
    /// The store should start empty; the simulator owns the tree's root.
    pub fn run<S: NodeStore + ?Sized>(&mut self, store: &mut S) -> SimulationResult {
        let mut violations = Vec::new();
        let mut operations_run = 0;
        let mut final_shape = TreeShape::default();

        for operation_index in 0..self.config.operations {
            let operation = self.generator.next_operation(&self.reference);
            operations_run += 1;

            match self.step(store, operation) {
                Ok(shape) => final_shape = shape,
                Err(failure) => {
                    tracing::warn!(
                        "simulation seed {} failed at operation {operation_index} ({operation}): {failure}",
                        self.config.seed
                    );
                    violations.push(SimulationViolation {
                        operation_index,
                        operation,
                        failure,
                    });
                    break;
                }
            }
        }

        tracing::debug!(
            "simulation seed {}: {operations_run} operations, {} inserts, {} removes, {} rejected, {} keys left",
            self.config.seed,
            self.inserts,
            self.removes,
            self.rejected,
            final_shape.len
        );

        SimulationResult {
            seed: self.config.seed,
            operations_run,
            inserts: self.inserts,
            removes: self.removes,
            rejected: self.rejected,
            final_shape,
            violations,
        }
    }

    /// Apply one operation and verify the tree against the reference.
    pub fn step<S: NodeStore + ?Sized>(
        &mut self,
        store: &mut S,
        operation: Operation,
    ) -> Result<TreeShape, Failure> {
        let expected = self.expected_outcome(operation, store.max_key());
        let before = self.root;

        let mut tree = RedBlackTree::new(store, self.root);
        let actual = match operation {
            Operation::Insert(key) => tree.insert(key, &Ascending),
            Operation::Remove(key) => tree.remove(key),
        };
        self.root = tree.root();

        if actual != expected {
            return Err(Failure::UnexpectedOutcome { expected, actual });
        }

        match operation {
            _ if actual.is_err() => {
                self.rejected += 1;
                if self.root != before {
                    return Err(Failure::RootChangedOnRejection {
                        before,
                        after: self.root,
                    });
                }
            }
            Operation::Insert(key) => {
                self.inserts += 1;
                self.reference.insert(key);
            }
            Operation::Remove(key) => {
                self.removes += 1;
                self.reference.remove(&key);
            }
        }

        // Structure first: the walk below assumes acyclic links.
        let reader = tree.reader();
        let shape = check_tree(&reader, &Ascending)?;

        let mut walk = reader.iter();
        let mut expected_keys = self.reference.iter();
        loop {
            match (walk.next(), expected_keys.next()) {
                (None, None) => break,
                (actual_key, expected_key) if actual_key == expected_key.copied() => {}
                (actual_key, expected_key) => {
                    return Err(Failure::ContentMismatch {
                        expected_len: self.reference.len(),
                        actual_len: reader.iter().count(),
                        first_difference: actual_key.or(expected_key.copied()),
                    });
                }
            }
        }

        Ok(shape)
    }

    fn expected_outcome(&self, operation: Operation, max_key: Option<Key>) -> Result<(), IndexError> {
        match operation {
            Operation::Insert(EMPTY) | Operation::Remove(EMPTY) => Err(IndexError::InvalidKey),
            Operation::Insert(key) if self.reference.contains(&key) => {
                Err(IndexError::KeyAlreadyExists { key })
            }
            Operation::Insert(key) => match max_key {
                Some(max_key) if key > max_key => Err(IndexError::KeyOutOfRange { key, max_key }),
                _ => Ok(()),
            },
            Operation::Remove(key) if self.reference.contains(&key) => Ok(()),
            Operation::Remove(key) => Err(IndexError::KeyNotFound { key }),
        }
    }
}
