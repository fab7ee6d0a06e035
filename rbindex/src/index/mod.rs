//! Red-black ordered index over integer keys.
//!
//! This module provides a balanced search tree whose nodes live in a
//! key-addressed store instead of the process heap.
//!
//! # Structure
//!
//! - Node records: `parent`, `left`, `right` keys plus a color, stored under
//!   the node's own key
//! - The sentinel key `0` stands for "no node" and always reads as a black leaf
//! - Ordering is supplied by the caller on every insert
//!
//! # Usage
//!
//! ```
//! use rbindex::index::{Ascending, EMPTY, HashArena, RedBlackTree};
//!
//! let mut arena = HashArena::new();
//! let mut tree = RedBlackTree::new(&mut arena, EMPTY);
//!
//! for key in [5, 3, 8] {
//!     tree.insert(key, &Ascending)?;
//! }
//! assert_eq!(tree.first(), 3);
//! assert_eq!(tree.next(5)?, 8);
//! assert_eq!(tree.next(8)?, EMPTY);
//!
//! tree.remove(5)?;
//! assert_eq!(tree.iter().collect::<Vec<_>>(), vec![3, 8]);
//! # Ok::<(), rbindex::index::IndexError>(())
//! ```

mod arena;
mod error;
mod node;
mod order;
mod reader;
mod tree;

pub use arena::{DenseArena, HashArena, NodeStore};
pub use error::IndexError;
pub use node::{Color, EMPTY, Key, Node, NodeView, Side};
pub use order::{Ascending, Descending, KeyOrder};
pub use reader::{Keys, TreeReader};
pub use tree::RedBlackTree;
