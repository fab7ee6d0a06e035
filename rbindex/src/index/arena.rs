//! Key-addressed node storage.
//!
//! The tree never owns node memory. Every record lives in a [`NodeStore`]
//! under its own key, which lets the index sit on top of any randomly
//! addressable key-value store.
//!
//! Two in-memory stores are provided:
//! - [`HashArena`]: sparse keys, backed by a hash map
//! - [`DenseArena`]: keys in `1..=max_key`, backed by a flat vector plus an
//!   occupancy bitmap

use std::collections::HashMap;

use crate::index::node::{EMPTY, Key, Node};

/// Number of bits per byte.
const BITS_PER_BYTE: usize = 8;

/// Most slots a `Vec<Node>` can hold: its byte size must fit in `isize`.
const MAX_DENSE_SLOTS: usize = isize::MAX.unsigned_abs() / size_of::<Node>();

/// Abstraction over the record store backing a tree.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - `load` returns the last record stored for a key, or `None` after `release`
/// - `store` and `release` never touch any key other than the one given
/// - `len` counts keys that currently hold a record
///
/// The tree never calls `store` or `release` with [`EMPTY`], and never calls
/// `store` with a key above [`NodeStore::max_key`].
pub trait NodeStore {
    /// Read the record stored under `key`.
    fn load(&self, key: Key) -> Option<Node>;

    /// Write the record for `key`, replacing any previous one.
    fn store(&mut self, key: Key, node: Node);

    /// Drop the record for `key`.
    ///
    /// The store may keep stale bytes around, but `load` must stop returning them.
    fn release(&mut self, key: Key);

    /// Number of keys currently holding a record.
    fn len(&self) -> usize;

    /// Whether no key holds a record.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest key this store can hold, if bounded.
    fn max_key(&self) -> Option<Key> {
        None
    }
}

/// Hash-map backed store for sparse key spaces.
#[derive(Debug, Default, Clone)]
pub struct HashArena {
    nodes: HashMap<Key, Node>,
}

impl HashArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with room for `capacity` records before rehashing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: HashMap::with_capacity(capacity),
        }
    }
}

impl NodeStore for HashArena {
    fn load(&self, key: Key) -> Option<Node> {
        self.nodes.get(&key).copied()
    }

    fn store(&mut self, key: Key, node: Node) {
        self.nodes.insert(key, node);
    }

    fn release(&mut self, key: Key) {
        self.nodes.remove(&key);
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Flat vector store for dense key spaces.
///
/// Slot `k` holds the record for key `k`. An occupancy bitmap tracks which
/// slots are live: 0 = free, 1 = live. Released slots keep their stale bytes
/// until reused, but `load` reports them as absent.
#[derive(Debug, Clone)]
pub struct DenseArena {
    /// Record slots, indexed by key. Grows on demand up to `max_key`.
    nodes: Vec<Node>,
    /// One bit per slot.
    occupied: Vec<u8>,
    /// Largest key accepted.
    max_key: Key,
    /// Number of live slots.
    live: usize,
}

impl DenseArena {
    /// Create a store accepting keys in `1..=max_key`.
    ///
    /// `max_key` is clamped to [`DenseArena::addressable_max_key`]. Slots are
    /// allocated lazily as keys are written.
    #[must_use]
    pub fn new(max_key: Key) -> Self {
        Self {
            nodes: Vec::new(),
            occupied: Vec::new(),
            max_key: max_key.min(Self::addressable_max_key()),
            live: 0,
        }
    }

    /// Largest key whose slot vector can exist on this platform.
    ///
    /// Slot `k` needs `k + 1` records, so this is one less than the slot limit.
    #[must_use]
    pub fn addressable_max_key() -> Key {
        Key::try_from(MAX_DENSE_SLOTS - 1).unwrap_or(Key::MAX)
    }

    /// Number of slots allocated so far (live or not).
    #[must_use]
    pub fn allocated_slots(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `key` currently holds a record.
    #[must_use]
    pub fn is_live(&self, key: Key) -> bool {
        self.slot(key)
            .is_some_and(|index| get_bit(&self.occupied, index))
    }

    /// Slot index for `key`, if the key is in range.
    fn slot(&self, key: Key) -> Option<usize> {
        if key == EMPTY || key > self.max_key {
            return None;
        }
        usize::try_from(key).ok()
    }

    /// Grow the slot vector and bitmap so `index` is addressable.
    fn ensure_slot(&mut self, index: usize) {
        if index >= self.nodes.len() {
            self.nodes.resize(index + 1, Node::DETACHED);
            self.occupied
                .resize((index + 1).div_ceil(BITS_PER_BYTE), 0);
        }
    }
}

impl NodeStore for DenseArena {
    fn load(&self, key: Key) -> Option<Node> {
        let index = self.slot(key)?;
        if get_bit(&self.occupied, index) {
            self.nodes.get(index).copied()
        } else {
            None
        }
    }

    fn store(&mut self, key: Key, node: Node) {
        let Some(index) = self.slot(key) else {
            return;
        };
        self.ensure_slot(index);
        if !get_bit(&self.occupied, index) {
            set_bit(&mut self.occupied, index);
            self.live += 1;
        }
        self.nodes[index] = node;
    }

    fn release(&mut self, key: Key) {
        let Some(index) = self.slot(key) else {
            return;
        };
        if get_bit(&self.occupied, index) {
            clear_bit(&mut self.occupied, index);
            self.live -= 1;
        }
    }

    fn len(&self) -> usize {
        self.live
    }

    fn max_key(&self) -> Option<Key> {
        Some(self.max_key)
    }
}

/// Get a bit from the bitmap.
fn get_bit(bitmap: &[u8], index: usize) -> bool {
    let byte_index = index / BITS_PER_BYTE;
    let bit_index = index % BITS_PER_BYTE;

    bitmap
        .get(byte_index)
        .is_some_and(|byte| byte & (1 << bit_index) != 0)
}

/// Set a bit in the bitmap (mark as live).
fn set_bit(bitmap: &mut [u8], index: usize) {
    let byte_index = index / BITS_PER_BYTE;
    let bit_index = index % BITS_PER_BYTE;

    if byte_index < bitmap.len() {
        bitmap[byte_index] |= 1 << bit_index;
    }
}

/// Clear a bit in the bitmap (mark as free).
fn clear_bit(bitmap: &mut [u8], index: usize) {
    let byte_index = index / BITS_PER_BYTE;
    let bit_index = index % BITS_PER_BYTE;

    if byte_index < bitmap.len() {
        bitmap[byte_index] &= !(1 << bit_index);
    }
}
