use crate::index::node::Key;

/// Errors returned by index operations.
///
/// Every variant is a precondition failure detected before any mutation, so
/// a rejected call never leaves the tree partially modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    /// The sentinel key was passed where a real key is required.
    InvalidKey,
    /// Insert of a key that is already in the tree.
    KeyAlreadyExists { key: Key },
    /// Lookup or removal of a key that is not in the tree.
    KeyNotFound { key: Key },
    /// The backing store cannot address this key.
    KeyOutOfRange { key: Key, max_key: Key },
    /// A shared index lock was poisoned by a panicking writer.
    LockPoisoned,
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey => write!(f, "key 0 is reserved and cannot be indexed"),
            Self::KeyAlreadyExists { key } => write!(f, "key {key} already exists"),
            Self::KeyNotFound { key } => write!(f, "key {key} not found"),
            Self::KeyOutOfRange { key, max_key } => {
                write!(f, "key {key} out of range (max key: {max_key})")
            }
            Self::LockPoisoned => write!(f, "index lock poisoned"),
        }
    }
}

impl std::error::Error for IndexError {}
