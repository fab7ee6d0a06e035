//! Deterministic Simulation Testing (DST) infrastructure.
//!
//! This module provides tools for testing the index with:
//! - Reproducible random operation generation
//! - Deliberately invalid operations that must be rejected cleanly
//! - A `BTreeSet` reference model the tree is compared against
//! - Invariant checking after each operation
//!
//! # Design Principles
//!
//! 1. All randomness is seeded for reproducibility
//! 2. Node storage is pluggable, so the same run can target any store
//! 3. Given the same seed, execution is identical
//!
//! # Usage
//!
//! ```
//! use rbindex::index::HashArena;
//! use rbindex::simulation::{Simulator, SimulatorConfig};
//!
//! let config = SimulatorConfig::new(12345) // seed
//!     .with_operations(1_000)
//!     .with_key_space(500);
//!
//! let mut sim = Simulator::new(config);
//! let result = sim.run(&mut HashArena::new());
//!
//! assert!(result.violations.is_empty());
//! ```

mod invariants;
mod operation_gen;
mod simulator;

pub use invariants::{InvariantViolation, TreeShape, ViolationKind, check_tree};
pub use operation_gen::{InvalidOperation, Operation, OperationGenConfig, OperationGenerator};
pub use simulator::{Failure, SimulationResult, SimulationViolation, Simulator, SimulatorConfig};
