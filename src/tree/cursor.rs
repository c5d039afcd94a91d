//! Cursor for walking and updating leaves in range order

use super::{MerkleTree, Node, NodeId, NodeKind};
use crate::{Error, Result};
use tracing::trace;

/// A cursor over the leaves of a [`MerkleTree`]
///
/// The cursor remembers the last leaf it returned. Seeks start from that
/// leaf and only climb as far as needed, which keeps in-order updates
/// (the usual case when hashing a sorted partition) close to O(1) per key.
pub struct Cursor<'a> {
    tree: &'a mut MerkleTree,
    /// Current position, always a leaf once set
    pos: Option<NodeId>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tree: &'a mut MerkleTree) -> Self {
        Cursor { tree, pos: None }
    }

    /// The leaf the cursor is on, if any
    pub fn position(&self) -> Option<NodeId> {
        self.pos
    }

    pub fn tree(&self) -> &MerkleTree {
        &*self.tree
    }

    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.node(id)
    }

    /// Move to the leftmost leaf
    pub fn first(&mut self) -> NodeId {
        let leaf = self.tree.leftmost_leaf(NodeId::ROOT);
        self.pos = Some(leaf);
        leaf
    }

    /// Move to the leaf whose range contains `key`
    ///
    /// Fails with [`Error::KeyOutOfRange`] and leaves the cursor where it
    /// was when the tree does not cover `key`.
    pub fn seek(&mut self, key: &[u8]) -> Result<NodeId> {
        let start = self.pos.unwrap_or(NodeId::ROOT);
        let leaf = self.tree.locate(start, key)?;
        trace!(key = %hex::encode(key), leaf = leaf.index(), "seek");
        self.pos = Some(leaf);
        Ok(leaf)
    }

    /// Move to the leaf right after the current one
    ///
    /// Returns `None` on the last leaf, without moving. A cursor with no
    /// position starts at the first leaf.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<NodeId>> {
        let mut id = match self.pos {
            Some(id) => id,
            None => return Ok(Some(self.first())),
        };

        if !self.tree.get(id).is_leaf() {
            return Err(Error::Invariant(format!(
                "cursor position {:?} is not a leaf",
                id
            )));
        }

        // Climb while we are the right child
        let sibling = loop {
            let parent = match self.tree.get(id).parent() {
                Some(parent) => parent,
                None => return Ok(None),
            };
            match self.tree.get(parent).kind() {
                NodeKind::Internal { right, .. } if right == id => id = parent,
                NodeKind::Internal { right, .. } => break right,
                NodeKind::Leaf => {
                    return Err(Error::Invariant(format!(
                        "parent {:?} of {:?} is a leaf",
                        parent, id
                    )))
                }
            }
        };

        let leaf = self.tree.leftmost_leaf(sibling);
        self.pos = Some(leaf);
        Ok(Some(leaf))
    }

    /// Set the hash of a leaf returned by this cursor
    pub fn set_hash(&mut self, id: NodeId, hash: impl Into<Vec<u8>>) -> Result<()> {
        self.tree.set_hash(id, hash)
    }

    /// Reset a leaf returned by this cursor to the "no data" state
    pub fn clear_hash(&mut self, id: NodeId) -> Result<()> {
        self.tree.clear_hash(id)
    }
}
