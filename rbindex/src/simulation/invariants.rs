//! Invariant checking for red-black indexes.
//!
//! Verifies every structural invariant of a tree in one pass:
//! - the root is black and has no parent
//! - no red node has a red child
//! - every root-to-leaf path has the same number of black nodes
//! - every child's `parent` link points back at the node holding it
//! - the in-order walk never descends under the tree's order
//! - every live record in the store is reachable from the root

use crate::index::{EMPTY, Key, KeyOrder, NodeStore, TreeReader};

/// Summary of a tree that passed every check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeShape {
    /// Number of keys in the tree.
    pub len: usize,
    /// Nodes on the longest root-to-leaf path.
    pub height: usize,
    /// Black nodes on every root-to-leaf path.
    pub black_height: usize,
}

/// The kind of invariant a tree violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// The root is red.
    RootNotBlack,
    /// The root has a non-empty parent link.
    RootHasParent,
    /// A key linked into the tree has no record in the store.
    MissingRecord,
    /// A red node has a red child.
    RedRedEdge,
    /// Two sibling subtrees differ in black-height.
    BlackHeightMismatch,
    /// A child's `parent` link does not point at the node holding it.
    BrokenParentLink,
    /// Two neighbouring keys are out of order.
    OrderViolation,
    /// The walk visited more nodes than the store holds.
    Cycle,
    /// The store holds records that are not reachable from the root.
    UnreachableRecord,
}

/// An invariant violation detected in a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// What was violated.
    pub kind: ViolationKind,
    /// The key where it was detected.
    pub key: Key,
    /// Additional context.
    pub context: String,
}

impl InvariantViolation {
    fn new(kind: ViolationKind, key: Key, context: impl Into<String>) -> Self {
        Self {
            kind,
            key,
            context: context.into(),
        }
    }
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} at key {}", self.kind, self.key)?;
        if !self.context.is_empty() {
            write!(f, ": {}", self.context)?;
        }
        Ok(())
    }
}

impl std::error::Error for InvariantViolation {}

/// Check every invariant of `tree` under `order`.
///
/// Returns the tree's shape if all checks pass, or the first violation found.
pub fn check_tree<S, O>(tree: &TreeReader<'_, S>, order: &O) -> Result<TreeShape, InvariantViolation>
where
    S: NodeStore + ?Sized,
    O: KeyOrder + ?Sized,
{
    let root = tree.root();
    let records = tree.store().len();

    if root == EMPTY {
        if records != 0 {
            return Err(InvariantViolation::new(
                ViolationKind::UnreachableRecord,
                EMPTY,
                format!("empty tree but store holds {records} records"),
            ));
        }
        return Ok(TreeShape::default());
    }

    let root_node = tree
        .store()
        .load(root)
        .ok_or_else(|| InvariantViolation::new(ViolationKind::MissingRecord, root, "root"))?;
    if root_node.parent != EMPTY {
        return Err(InvariantViolation::new(
            ViolationKind::RootHasParent,
            root,
            format!("parent is {}", root_node.parent),
        ));
    }
    if root_node.is_red() {
        return Err(InvariantViolation::new(ViolationKind::RootNotBlack, root, ""));
    }

    let mut walk = Walk {
        tree,
        visited: 0,
        limit: records,
    };
    let (black_height, height) = walk.subtree(root, EMPTY, false)?;

    if walk.visited != records {
        return Err(InvariantViolation::new(
            ViolationKind::UnreachableRecord,
            root,
            format!("{} reachable keys but {records} records", walk.visited),
        ));
    }

    // Links are consistent past this point, so the successor walk terminates.
    let mut previous = EMPTY;
    for key in tree.iter() {
        if previous != EMPTY && order.less_than(key, previous) {
            return Err(InvariantViolation::new(
                ViolationKind::OrderViolation,
                key,
                format!("{key} follows {previous}"),
            ));
        }
        previous = key;
    }

    Ok(TreeShape {
        len: walk.visited,
        height,
        black_height,
    })
}

/// Depth-first structural walk with a visit budget.
struct Walk<'t, 'a, S: NodeStore + ?Sized> {
    tree: &'t TreeReader<'a, S>,
    visited: usize,
    limit: usize,
}

impl<S: NodeStore + ?Sized> Walk<'_, '_, S> {
    /// Returns `(black_height, height)` of the subtree at `key`.
    fn subtree(
        &mut self,
        key: Key,
        parent: Key,
        parent_red: bool,
    ) -> Result<(usize, usize), InvariantViolation> {
        if key == EMPTY {
            return Ok((0, 0));
        }

        self.visited += 1;
        if self.visited > self.limit {
            return Err(InvariantViolation::new(
                ViolationKind::Cycle,
                key,
                format!("more than {} nodes reachable", self.limit),
            ));
        }

        let node = self
            .tree
            .store()
            .load(key)
            .ok_or_else(|| InvariantViolation::new(ViolationKind::MissingRecord, key, ""))?;
        if node.parent != parent {
            return Err(InvariantViolation::new(
                ViolationKind::BrokenParentLink,
                key,
                format!("held by {parent} but parent link is {}", node.parent),
            ));
        }
        if node.is_red() && parent_red {
            return Err(InvariantViolation::new(
                ViolationKind::RedRedEdge,
                key,
                format!("red child of red {parent}"),
            ));
        }

        let (left_black, left_height) = self.subtree(node.left, key, node.is_red())?;
        let (right_black, right_height) = self.subtree(node.right, key, node.is_red())?;
        if left_black != right_black {
            return Err(InvariantViolation::new(
                ViolationKind::BlackHeightMismatch,
                key,
                format!("left {left_black}, right {right_black}"),
            ));
        }

        Ok((
            left_black + usize::from(!node.is_red()),
            1 + left_height.max(right_height),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Ascending, Color, Descending, HashArena, Node, RedBlackTree};

    fn link(parent: Key, left: Key, right: Key, color: Color) -> Node {
        Node {
            parent,
            left,
            right,
            color,
        }
    }

    /// A valid three-node tree: black 2 with red children 1 and 3.
    fn valid_arena() -> HashArena {
        let mut arena = HashArena::new();
        arena.store(2, link(EMPTY, 1, 3, Color::Black));
        arena.store(1, link(2, EMPTY, EMPTY, Color::Red));
        arena.store(3, link(2, EMPTY, EMPTY, Color::Red));
        arena
    }

    fn kind_of(arena: &HashArena, root: Key) -> ViolationKind {
        check_tree(&TreeReader::new(arena, root), &Ascending)
            .expect_err("should be invalid")
            .kind
    }

    #[test]
    fn test_valid_tree_shape() {
        let arena = valid_arena();
        let shape = check_tree(&TreeReader::new(&arena, 2), &Ascending).expect("valid");
        assert_eq!(
            shape,
            TreeShape {
                len: 3,
                height: 2,
                black_height: 1
            }
        );
    }

    #[test]
    fn test_empty_tree_is_valid() {
        let arena = HashArena::new();
        let shape = check_tree(&TreeReader::new(&arena, EMPTY), &Ascending).expect("valid");
        assert_eq!(shape, TreeShape::default());
    }

    #[test]
    fn test_detects_red_root() {
        let mut arena = valid_arena();
        arena.store(2, link(EMPTY, 1, 3, Color::Red));
        assert_eq!(kind_of(&arena, 2), ViolationKind::RootNotBlack);
    }

    #[test]
    fn test_detects_root_parent() {
        let mut arena = valid_arena();
        arena.store(2, link(9, 1, 3, Color::Black));
        assert_eq!(kind_of(&arena, 2), ViolationKind::RootHasParent);
    }

    #[test]
    fn test_detects_red_red() {
        let mut arena = valid_arena();
        arena.store(1, link(2, EMPTY, EMPTY, Color::Red));
        arena.store(3, link(2, EMPTY, 4, Color::Red));
        arena.store(4, link(3, EMPTY, EMPTY, Color::Red));
        assert_eq!(kind_of(&arena, 2), ViolationKind::RedRedEdge);
    }

    #[test]
    fn test_detects_black_height_mismatch() {
        let mut arena = valid_arena();
        arena.store(3, link(2, EMPTY, EMPTY, Color::Black));
        assert_eq!(kind_of(&arena, 2), ViolationKind::BlackHeightMismatch);
    }

    #[test]
    fn test_detects_broken_parent_link() {
        let mut arena = valid_arena();
        arena.store(1, link(3, EMPTY, EMPTY, Color::Red));
        assert_eq!(kind_of(&arena, 2), ViolationKind::BrokenParentLink);
    }

    #[test]
    fn test_detects_order_violation() {
        let arena = valid_arena();
        let violation =
            check_tree(&TreeReader::new(&arena, 2), &Descending).expect_err("wrong order");
        assert_eq!(violation.kind, ViolationKind::OrderViolation);
        assert_eq!(violation.key, 2);
    }

    #[test]
    fn test_detects_unreachable_record() {
        let mut arena = valid_arena();
        arena.store(40, Node::DETACHED);
        assert_eq!(kind_of(&arena, 2), ViolationKind::UnreachableRecord);

        let mut stale = HashArena::new();
        stale.store(7, Node::DETACHED);
        assert_eq!(kind_of(&stale, EMPTY), ViolationKind::UnreachableRecord);
    }

    #[test]
    fn test_detects_missing_record() {
        let mut arena = valid_arena();
        arena.store(2, link(EMPTY, 1, 5, Color::Black));
        arena.release(3);
        arena.store(99, Node::DETACHED);
        assert_eq!(kind_of(&arena, 2), ViolationKind::MissingRecord);
    }

    #[test]
    fn test_detects_cycle() {
        let mut arena = HashArena::new();
        arena.store(1, link(EMPTY, EMPTY, 2, Color::Black));
        arena.store(2, link(1, EMPTY, 1, Color::Black));
        let kind = kind_of(&arena, 1);
        assert!(
            matches!(kind, ViolationKind::Cycle | ViolationKind::BrokenParentLink),
            "unexpected {kind:?}"
        );
    }

    #[test]
    fn test_tree_built_by_inserts_is_valid() {
        let mut arena = HashArena::new();
        let mut tree = RedBlackTree::new(&mut arena, EMPTY);
        for key in (1..=100).rev() {
            tree.insert(key, &Ascending).expect("insert");
        }
        let shape = check_tree(&tree.reader(), &Ascending).expect("valid");
        assert_eq!(shape.len, 100);
        assert!(shape.black_height >= 3);
    }

    #[test]
    fn test_violation_display() {
        let violation = InvariantViolation::new(ViolationKind::RedRedEdge, 5, "red child of red 3");
        assert_eq!(violation.to_string(), "RedRedEdge at key 5: red child of red 3");

        let bare = InvariantViolation::new(ViolationKind::RootNotBlack, 1, "");
        assert_eq!(bare.to_string(), "RootNotBlack at key 1");
    }
}
