//! Red-black tree over a key-addressed node store.
//!
//! The handle holds the root key and a mutable borrow of the store. Callers
//! persist the root themselves (like a B-tree root page id) and reopen the
//! tree with [`RedBlackTree::new`].
//!
//! # Sentinel
//!
//! [`EMPTY`] reads as a black leaf with no links and every write to it is
//! discarded. Removal tracks the parent of the replacement node explicitly
//! instead of stashing it on the sentinel, so no operation can leave stray
//! state behind on `EMPTY`.

use crate::index::arena::NodeStore;
use crate::index::error::IndexError;
use crate::index::node::{Color, EMPTY, Key, Node, NodeView, Side};
use crate::index::order::KeyOrder;
use crate::index::reader::{Keys, TreeReader};

/// A red-black tree backed by a node store.
pub struct RedBlackTree<'a, S: NodeStore + ?Sized> {
    store: &'a mut S,
    root: Key,
}

impl<'a, S: NodeStore + ?Sized> RedBlackTree<'a, S> {
    /// Open the tree rooted at `root` in `store`.
    ///
    /// If `root` is `EMPTY`, this is a new empty tree.
    #[must_use]
    pub const fn new(store: &'a mut S, root: Key) -> Self {
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

    /// Read-only view of the current tree.
    #[must_use]
    pub fn reader(&self) -> TreeReader<'_, S> {
        TreeReader::new(self.store, self.root)
    }

    #[must_use]
    pub fn exists(&self, key: Key) -> bool {
        self.reader().exists(key)
    }

    #[must_use]
    pub fn first(&self) -> Key {
        self.reader().first()
    }

    #[must_use]
    pub fn last(&self) -> Key {
        self.reader().last()
    }

    pub fn next(&self, key: Key) -> Result<Key, IndexError> {
        self.reader().next(key)
    }

    pub fn prev(&self, key: Key) -> Result<Key, IndexError> {
        self.reader().prev(key)
    }

    pub fn get_node(&self, key: Key) -> Result<NodeView, IndexError> {
        self.reader().get_node(key)
    }

    #[must_use]
    pub fn iter(&self) -> Keys<'_, S> {
        self.reader().iter()
    }

    /// Insert `key`, placing it by `order`.
    ///
    /// Keys that compare equal to an existing key go to its right.
    pub fn insert<O: KeyOrder + ?Sized>(&mut self, key: Key, order: &O) -> Result<(), IndexError> {
        if key == EMPTY {
            tracing::debug!("rejected insert of the sentinel key");
            return Err(IndexError::InvalidKey);
        }
        if self.exists(key) {
            tracing::debug!("rejected insert of key {key}: already present");
            return Err(IndexError::KeyAlreadyExists { key });
        }
        if let Some(max_key) = self.store.max_key().filter(|&max_key| key > max_key) {
            tracing::debug!("rejected insert of key {key}: store holds keys up to {max_key}");
            return Err(IndexError::KeyOutOfRange { key, max_key });
        }

        // Descend to the empty slot, remembering the last real node.
        let mut cursor = EMPTY;
        let mut side = Side::Left;
        let mut probe = self.root;
        while probe != EMPTY {
            cursor = probe;
            side = if order.less_than(key, probe) {
                Side::Left
            } else {
                Side::Right
            };
            probe = self.node(probe).child(side);
        }

        self.store.store(key, Node::fresh(cursor));
        if cursor == EMPTY {
            self.root = key;
        } else {
            self.set_child(cursor, side, key);
        }

        self.insert_fixup(key);
        tracing::trace!("inserted key {key} (root {})", self.root);
        Ok(())
    }

    /// Remove `key` from the tree and release its record.
    pub fn remove(&mut self, key: Key) -> Result<(), IndexError> {
        if key == EMPTY {
            tracing::debug!("rejected removal of the sentinel key");
            return Err(IndexError::InvalidKey);
        }
        if !self.exists(key) {
            tracing::debug!("rejected removal of key {key}: not present");
            return Err(IndexError::KeyNotFound { key });
        }

        // The node physically spliced out has at most one child: either `key`
        // itself or its in-order successor.
        let target = self.node(key);
        let spliced = if target.has_two_children() {
            self.reader().tree_minimum(target.right)
        } else {
            key
        };
        let spliced_node = self.node(spliced);
        let child = spliced_node.only_child();
        let mut child_parent = spliced_node.parent;

        self.set_parent(child, child_parent);
        self.replace_child(child_parent, spliced, child);
        let needs_fixup = !spliced_node.is_red();

        if spliced != key {
            // Re-read: the splice may have rewritten key's right slot.
            let target = self.node(key);
            self.store.store(spliced, target);
            self.set_parent(target.left, spliced);
            self.set_parent(target.right, spliced);
            self.replace_child(target.parent, key, spliced);
            if child_parent == key {
                child_parent = spliced;
            }
        }

        if needs_fixup {
            self.remove_fixup(child, child_parent);
        }

        self.store.release(key);
        tracing::trace!("removed key {key} (root {})", self.root);
        Ok(())
    }

    fn insert_fixup(&mut self, mut key: Key) {
        loop {
            let parent = self.node(key).parent;
            // The root is black, so a red parent always has a parent of its own.
            if !self.is_red(parent) {
                break;
            }
            let grandparent = self.node(parent).parent;
            let side = self.side_of(grandparent, parent);
            let uncle = self.node(grandparent).child(side.opposite());

            if self.is_red(uncle) {
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                key = grandparent;
                continue;
            }

            if key == self.node(parent).child(side.opposite()) {
                // Zig-zag: straighten so key, parent and grandparent line up.
                key = parent;
                self.rotate(key, side);
            }
            let parent = self.node(key).parent;
            let grandparent = self.node(parent).parent;
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            self.rotate(grandparent, side.opposite());
        }
        self.set_color(self.root, Color::Black);
    }

    /// Restore coloring after splicing out a black node.
    ///
    /// `key` carries an extra black and may be `EMPTY`, so its parent is
    /// passed alongside rather than read from the sentinel.
    fn remove_fixup(&mut self, mut key: Key, mut parent: Key) {
        while key != self.root && !self.is_red(key) {
            let side = if self.node(parent).left == key {
                Side::Left
            } else {
                Side::Right
            };
            let mut sibling = self.node(parent).child(side.opposite());

            if self.is_red(sibling) {
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, side);
                sibling = self.node(parent).child(side.opposite());
            }

            let near = self.node(sibling).child(side);
            let far = self.node(sibling).child(side.opposite());
            if !self.is_red(near) && !self.is_red(far) {
                self.set_color(sibling, Color::Red);
                key = parent;
                parent = self.node(key).parent;
                continue;
            }

            if !self.is_red(far) {
                self.set_color(near, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, side.opposite());
                sibling = self.node(parent).child(side.opposite());
            }

            let parent_color = self.node(parent).color;
            self.set_color(sibling, parent_color);
            self.set_color(parent, Color::Black);
            let far = self.node(sibling).child(side.opposite());
            self.set_color(far, Color::Black);
            self.rotate(parent, side);
            key = self.root;
        }
        self.set_color(key, Color::Black);
    }

    /// Rotate around `key`.
    ///
    /// `Side::Left` lifts the right child into `key`'s place and moves `key`
    /// down to its left; `Side::Right` is the mirror image. In-order
    /// sequence is preserved.
    fn rotate(&mut self, key: Key, direction: Side) {
        let rising = self.node(key).child(direction.opposite());
        let moved = self.node(rising).child(direction);

        self.set_child(key, direction.opposite(), moved);
        self.set_parent(moved, key);

        let parent = self.node(key).parent;
        self.set_parent(rising, parent);
        self.replace_child(parent, key, rising);

        self.set_child(rising, direction, key);
        self.set_parent(key, rising);
    }

    /// Point whichever slot of `parent` holds `old` at `new`, or the root if
    /// `parent` is `EMPTY`.
    fn replace_child(&mut self, parent: Key, old: Key, new: Key) {
        if parent == EMPTY {
            self.root = new;
            return;
        }
        let side = self.side_of(parent, old);
        self.set_child(parent, side, new);
    }

    /// Which slot of `parent` holds the non-empty `child`.
    fn side_of(&self, parent: Key, child: Key) -> Side {
        if self.node(parent).left == child {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn node(&self, key: Key) -> Node {
        self.reader().node(key)
    }

    fn is_red(&self, key: Key) -> bool {
        self.node(key).is_red()
    }

    /// Apply `edit` to a live record. Writes to `EMPTY` are discarded.
    fn update(&mut self, key: Key, edit: impl FnOnce(&mut Node)) {
        if key == EMPTY {
            return;
        }
        let mut node = self.node(key);
        edit(&mut node);
        self.store.store(key, node);
    }

    fn set_parent(&mut self, key: Key, parent: Key) {
        self.update(key, |node| node.parent = parent);
    }

    fn set_child(&mut self, key: Key, side: Side, child: Key) {
        self.update(key, |node| node.set_child(side, child));
    }

    fn set_color(&mut self, key: Key, color: Color) {
        self.update(key, |node| node.color = color);
    }
}
