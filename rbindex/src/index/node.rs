//! Node records for the red-black index.
//!
//! Links between nodes are keys, not pointers. A record lives in the arena
//! under its own key, so a node's identity and its storage address are the
//! same number.

/// Identifier and sort token of an indexed element.
pub type Key = u64;

/// The reserved "no node" key.
///
/// Used for a missing root, child or parent. Never a valid data key.
pub const EMPTY: Key = 0;

/// Node color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// Which child slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The mirror-image side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// A node record as stored in the arena.
///
/// Layout mirrors what a key-value store would persist under the node's key:
/// - `parent`: key of the parent, `EMPTY` for the root
/// - `left`, `right`: child keys, `EMPTY` if absent
/// - `color`: red or black
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub parent: Key,
    pub left: Key,
    pub right: Key,
    pub color: Color,
}

impl Node {
    /// The record every absent key reads as, including the sentinel.
    ///
    /// Black with no links, so color and child lookups on missing nodes
    /// never need a special case.
    pub const DETACHED: Self = Self {
        parent: EMPTY,
        left: EMPTY,
        right: EMPTY,
        color: Color::Black,
    };

    /// A freshly inserted node: red, no children.
    #[must_use]
    pub const fn fresh(parent: Key) -> Self {
        Self {
            parent,
            left: EMPTY,
            right: EMPTY,
            color: Color::Red,
        }
    }

    #[must_use]
    pub const fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }

    /// Child key on the given side.
    #[must_use]
    pub const fn child(&self, side: Side) -> Key {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Replace the child key on the given side.
    pub const fn set_child(&mut self, side: Side, child: Key) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// The sole child of a node with at most one child, or `EMPTY`.
    #[must_use]
    pub const fn only_child(&self) -> Key {
        if self.left == EMPTY {
            self.right
        } else {
            self.left
        }
    }

    /// Whether both child slots are occupied.
    #[must_use]
    pub const fn has_two_children(&self) -> bool {
        self.left != EMPTY && self.right != EMPTY
    }
}

/// Structural facts about a live node, as returned by `get_node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeView {
    pub key: Key,
    pub parent: Key,
    pub left: Key,
    pub right: Key,
    pub color: Color,
}

impl NodeView {
    #[must_use]
    pub const fn new(key: Key, node: Node) -> Self {
        Self {
            key,
            parent: node.parent,
            left: node.left,
            right: node.right,
            color: node.color,
        }
    }

    #[must_use]
    pub const fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_is_black_leaf() {
        let node = Node::DETACHED;
        assert!(!node.is_red());
        assert_eq!(node.parent, EMPTY);
        assert_eq!(node.child(Side::Left), EMPTY);
        assert_eq!(node.child(Side::Right), EMPTY);
    }

    #[test]
    fn test_fresh_node_is_red() {
        let node = Node::fresh(7);
        assert!(node.is_red());
        assert_eq!(node.parent, 7);
        assert_eq!(node.only_child(), EMPTY);
        assert!(!node.has_two_children());
    }

    #[test]
    fn test_child_slots() {
        let mut node = Node::fresh(EMPTY);
        node.set_child(Side::Left, 3);
        assert_eq!(node.left, 3);
        assert_eq!(node.only_child(), 3);

        node.set_child(Side::Right, 9);
        assert_eq!(node.child(Side::Right), 9);
        assert!(node.has_two_children());
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }

    #[test]
    fn test_node_view_copies_links() {
        let node = Node {
            parent: 4,
            left: 2,
            right: 6,
            color: Color::Black,
        };
        let view = NodeView::new(5, node);
        assert_eq!(view.key, 5);
        assert_eq!((view.parent, view.left, view.right), (4, 2, 6));
        assert!(!view.is_red());
    }
}
