//! Thread-safe wrapper around an index and its root.
//!
//! # Thread Safety
//!
//! The index uses `RwLock` instead of `Mutex` so lookups can run concurrently:
//! - Any number of readers walk the tree at once
//! - Inserts and removes acquire exclusive access and store the new root
//!   before releasing it

use std::sync::RwLock;

use crate::index::{EMPTY, IndexError, Key, KeyOrder, NodeStore, RedBlackTree, TreeReader};

struct IndexState<S> {
    store: S,
    root: Key,
}

/// A red-black index shared between threads.
pub struct SharedIndex<S: NodeStore> {
    state: RwLock<IndexState<S>>,
}

impl<S: NodeStore> SharedIndex<S> {
    /// Wrap an empty store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self::from_parts(store, EMPTY)
    }

    /// Wrap a store that already holds the tree rooted at `root`.
    #[must_use]
    pub const fn from_parts(store: S, root: Key) -> Self {
        Self {
            state: RwLock::new(IndexState { store, root }),
        }
    }

    /// Run `f` against a read-only view of the tree.
    pub fn read<R>(&self, f: impl FnOnce(TreeReader<'_, S>) -> R) -> Result<R, IndexError> {
        let state = self.state.read().map_err(|_| IndexError::LockPoisoned)?;
        Ok(f(TreeReader::new(&state.store, state.root)))
    }

    /// Run `f` with exclusive access to the tree.
    ///
    /// The root is written back after `f` returns, whatever `f` did.
    pub fn write<R>(&self, f: impl FnOnce(&mut RedBlackTree<'_, S>) -> R) -> Result<R, IndexError> {
        let mut guard = self.state.write().map_err(|_| IndexError::LockPoisoned)?;
        let state = &mut *guard;
        let mut tree = RedBlackTree::new(&mut state.store, state.root);
        let result = f(&mut tree);
        state.root = tree.root();
        drop(guard);
        Ok(result)
    }

    pub fn insert<O: KeyOrder + ?Sized>(&self, key: Key, order: &O) -> Result<(), IndexError> {
        self.write(|tree| tree.insert(key, order))?
    }

    pub fn remove(&self, key: Key) -> Result<(), IndexError> {
        self.write(|tree| tree.remove(key))?
    }

    pub fn exists(&self, key: Key) -> Result<bool, IndexError> {
        self.read(|tree| tree.exists(key))
    }

    pub fn first(&self) -> Result<Key, IndexError> {
        self.read(|tree| tree.first())
    }

    pub fn last(&self) -> Result<Key, IndexError> {
        self.read(|tree| tree.last())
    }

    pub fn next(&self, key: Key) -> Result<Key, IndexError> {
        self.read(|tree| tree.next(key))?
    }

    pub fn prev(&self, key: Key) -> Result<Key, IndexError> {
        self.read(|tree| tree.prev(key))?
    }

    /// Snapshot of every key in order.
    pub fn keys(&self) -> Result<Vec<Key>, IndexError> {
        self.read(|tree| tree.iter().collect())
    }

    pub fn root(&self) -> Result<Key, IndexError> {
        self.read(|tree| tree.root())
    }

    /// Unwrap into the store and the root key.
    pub fn into_parts(self) -> Result<(S, Key), IndexError> {
        let state = self
            .state
            .into_inner()
            .map_err(|_| IndexError::LockPoisoned)?;
        Ok((state.store, state.root))
    }
}
