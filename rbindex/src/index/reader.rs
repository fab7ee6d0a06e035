//! Read-only navigation over a red-black index.
//!
//! All traversal walks parent/child keys through the store. There is no
//! auxiliary stack and no recursion, so every step is O(1) extra space and
//! each walk is bounded by the tree height.

use crate::index::arena::NodeStore;
use crate::index::error::IndexError;
use crate::index::node::{EMPTY, Key, Node, NodeView};

/// A read-only view of a tree: the root key plus a shared borrow of its store.
pub struct TreeReader<'a, S: NodeStore + ?Sized> {
    store: &'a S,
    root: Key,
}

impl<S: NodeStore + ?Sized> Clone for TreeReader<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: NodeStore + ?Sized> Copy for TreeReader<'_, S> {}

impl<'a, S: NodeStore + ?Sized> TreeReader<'a, S> {
    /// Open a view of the tree rooted at `root`.
    ///
    /// `root == EMPTY` is an empty tree.
    #[must_use]
    pub const fn new(store: &'a S, root: Key) -> Self {
        Self { store, root }
    }

    /// Get the root key.
    #[must_use]
    pub const fn root(&self) -> Key {
        self.root
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root == EMPTY
    }

    /// Get the underlying store.
    #[must_use]
    pub const fn store(&self) -> &'a S {
        self.store
    }

    /// Read a record. The sentinel and absent keys read as a detached black leaf.
    pub(crate) fn node(&self, key: Key) -> Node {
        if key == EMPTY {
            return Node::DETACHED;
        }
        self.store.load(key).unwrap_or(Node::DETACHED)
    }

    /// Whether `key` is in the tree.
    #[must_use]
    pub fn exists(&self, key: Key) -> bool {
        key != EMPTY && (key == self.root || self.node(key).parent != EMPTY)
    }

    /// Smallest key, or `EMPTY` for an empty tree.
    #[must_use]
    pub fn first(&self) -> Key {
        self.tree_minimum(self.root)
    }

    /// Largest key, or `EMPTY` for an empty tree.
    #[must_use]
    pub fn last(&self) -> Key {
        self.tree_maximum(self.root)
    }

    /// Leftmost key in the subtree rooted at `key`.
    #[must_use]
    pub fn tree_minimum(&self, mut key: Key) -> Key {
        if key == EMPTY {
            return EMPTY;
        }
        loop {
            let left = self.node(key).left;
            if left == EMPTY {
                return key;
            }
            key = left;
        }
    }

    /// Rightmost key in the subtree rooted at `key`.
    #[must_use]
    pub fn tree_maximum(&self, mut key: Key) -> Key {
        if key == EMPTY {
            return EMPTY;
        }
        loop {
            let right = self.node(key).right;
            if right == EMPTY {
                return key;
            }
            key = right;
        }
    }

    /// In-order successor of `key`, or `EMPTY` if `key` is the last key.
    pub fn next(&self, key: Key) -> Result<Key, IndexError> {
        self.check_present(key)?;
        Ok(self.successor(key))
    }

    /// In-order predecessor of `key`, or `EMPTY` if `key` is the first key.
    pub fn prev(&self, key: Key) -> Result<Key, IndexError> {
        self.check_present(key)?;
        Ok(self.predecessor(key))
    }

    /// Structural facts about a live node.
    pub fn get_node(&self, key: Key) -> Result<NodeView, IndexError> {
        if !self.exists(key) {
            return Err(IndexError::KeyNotFound { key });
        }
        Ok(NodeView::new(key, self.node(key)))
    }

    /// Iterate over all keys in order.
    #[must_use]
    pub fn iter(&self) -> Keys<'a, S> {
        Keys {
            reader: *self,
            front: self.first(),
            back: self.last(),
        }
    }

    /// Iterate in order starting at the live key `key`.
    pub fn iter_from(&self, key: Key) -> Result<Keys<'a, S>, IndexError> {
        self.check_present(key)?;
        Ok(Keys {
            reader: *self,
            front: key,
            back: self.last(),
        })
    }

    fn check_present(&self, key: Key) -> Result<(), IndexError> {
        if key == EMPTY {
            return Err(IndexError::InvalidKey);
        }
        if !self.exists(key) {
            return Err(IndexError::KeyNotFound { key });
        }
        Ok(())
    }

    /// Successor of a key known to be live.
    pub(crate) fn successor(&self, key: Key) -> Key {
        let right = self.node(key).right;
        if right != EMPTY {
            return self.tree_minimum(right);
        }
        let mut cursor = key;
        let mut parent = self.node(cursor).parent;
        while parent != EMPTY && cursor == self.node(parent).right {
            cursor = parent;
            parent = self.node(cursor).parent;
        }
        parent
    }

    /// Predecessor of a key known to be live.
    pub(crate) fn predecessor(&self, key: Key) -> Key {
        let left = self.node(key).left;
        if left != EMPTY {
            return self.tree_maximum(left);
        }
        let mut cursor = key;
        let mut parent = self.node(cursor).parent;
        while parent != EMPTY && cursor == self.node(parent).left {
            cursor = parent;
            parent = self.node(cursor).parent;
        }
        parent
    }
}

impl<'a, S: NodeStore + ?Sized> IntoIterator for &TreeReader<'a, S> {
    type Item = Key;
    type IntoIter = Keys<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over the keys of a tree.
///
/// Walks successor/predecessor links from both ends; the two cursors meet
/// exactly once, so mixing `next` and `next_back` yields each key once.
pub struct Keys<'a, S: NodeStore + ?Sized> {
    reader: TreeReader<'a, S>,
    front: Key,
    back: Key,
}

impl<S: NodeStore + ?Sized> Iterator for Keys<'_, S> {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        if self.front == EMPTY {
            return None;
        }
        let key = self.front;
        if key == self.back {
            self.front = EMPTY;
            self.back = EMPTY;
        } else {
            self.front = self.reader.successor(key);
        }
        Some(key)
    }
}

impl<S: NodeStore + ?Sized> DoubleEndedIterator for Keys<'_, S> {
    fn next_back(&mut self) -> Option<Key> {
        if self.back == EMPTY {
            return None;
        }
        let key = self.back;
        if key == self.front {
            self.front = EMPTY;
            self.back = EMPTY;
        } else {
            self.back = self.reader.predecessor(key);
        }
        Some(key)
    }
}

impl<S: NodeStore + ?Sized> std::iter::FusedIterator for Keys<'_, S> {}
