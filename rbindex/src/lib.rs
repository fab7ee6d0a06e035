// Test code is allowed to use unwrap()/expect() for convenience.
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
//! Red-black ordered index whose nodes live in a key-addressed store.
//!
//! Components:
//!  - `index`: the tree, its node stores and orderings
//!  - `shared`: `RwLock` wrapper for use across threads
//!  - `simulation`: seeded operation generator, reference model and invariant checker
//!  - `config`: environment configuration for the simulation binary

pub mod config;
pub mod index;
pub mod shared;
pub mod simulation;

pub use index::{EMPTY, IndexError, Key, RedBlackTree, TreeReader};
pub use shared::SharedIndex;
