//! Tree node types

use crate::model::Range;
use std::fmt;

/// Index of a node inside its tree
///
/// Ids are assigned breadth-first, so the root is always `0` and two trees
/// with the same depth give the same id to nodes at the same position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root of every tree
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in breadth-first order
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Whether a node is a leaf or an internal node with exactly two children
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// An internal node and its owned children
    Internal { left: NodeId, right: NodeId },
    /// A leaf at the bottom level, whose hash is supplied by the caller
    Leaf,
}

/// A node in the range merkle tree
///
/// The parent link is a lookup-only id. Children are owned by the tree's
/// arena, never by their parent.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) range: Range,
    pub(crate) hash: Option<Vec<u8>>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) level: u8,
    /// Set on internal nodes whose hash is stale after a leaf changed
    pub(crate) dirty: bool,
}

impl Node {
    /// Create a node with no hash; it stays a leaf until it is split
    pub(crate) fn new(range: Range, parent: Option<NodeId>, level: u8) -> Self {
        Node {
            kind: NodeKind::Leaf,
            range,
            hash: None,
            parent,
            level,
            dirty: false,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn range(&self) -> &Range {
        &self.range
    }

    /// The node's hash, `None` when no data has been set or filled yet
    pub fn hash(&self) -> Option<&[u8]> {
        self.hash.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Distance from the root
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Left and right child ids of an internal node
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Internal { left, right } => Some((left, right)),
            NodeKind::Leaf => None,
        }
    }

    /// Hash bytes as compared on the wire, where absent and empty are equal
    pub(crate) fn hash_bytes(&self) -> &[u8] {
        self.hash.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_unhashed_leaf() {
        let node = Node::new(Range::new([0], [8]), None, 0);
        assert!(node.is_leaf());
        assert!(node.is_root());
        assert_eq!(node.hash(), None);
        assert_eq!(node.children(), None);
    }

    #[test]
    fn test_absent_and_empty_hash_compare_equal() {
        let mut a = Node::new(Range::new([0], [8]), None, 0);
        let b = Node::new(Range::new([0], [8]), None, 0);
        a.hash = Some(Vec::new());
        assert_eq!(a.hash_bytes(), b.hash_bytes());
        assert_ne!(a.hash(), b.hash());
    }
}
