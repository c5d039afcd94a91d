//! Range merkle tree implementation

use super::{Cursor, Node, NodeId, NodeKind};
use crate::combine::{Combiner, Murmur3Combiner};
use crate::config::TreeConfig;
use crate::model::{Range, Ring};
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Deepest tree that can be built or deserialized
///
/// A tree of depth `d` holds `2^(d+1) - 1` nodes, so this also bounds the
/// memory a peer can make us allocate.
pub const MAX_DEPTH: u8 = 24;

/// Number of nodes in a complete tree of the given depth
pub fn node_count(depth: u8) -> usize {
    (1usize << (depth as usize + 1)) - 1
}

/// A complete binary merkle tree over one partition of the hash ring
///
/// The tree is built once, fully, at construction. After that only hashes
/// change: callers set leaf hashes and [`fill`](MerkleTree::fill) brings
/// the internal hashes up to date.
#[derive(Clone)]
pub struct MerkleTree {
    ring: Ring,
    full_range: Range,
    depth: u8,
    /// All nodes in breadth-first order, root first
    nodes: Vec<Node>,
    combiner: Arc<dyn Combiner>,
}

impl MerkleTree {
    /// Build a tree of `depth` levels over `(left, right]` using the
    /// default murmur3 combiner
    pub fn new(
        depth: u8,
        min: impl Into<Vec<u8>>,
        max: impl Into<Vec<u8>>,
        left: impl Into<Vec<u8>>,
        right: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        Self::with_combiner(depth, min, max, left, right, Arc::new(Murmur3Combiner))
    }

    /// Build a tree that combines child hashes with `combiner`
    pub fn with_combiner(
        depth: u8,
        min: impl Into<Vec<u8>>,
        max: impl Into<Vec<u8>>,
        left: impl Into<Vec<u8>>,
        right: impl Into<Vec<u8>>,
        combiner: Arc<dyn Combiner>,
    ) -> Result<Self> {
        check_depth(depth)?;
        let ring = Ring::new(min, max)?;
        let full_range = Range::new(left, right);
        ring.check_range(&full_range)?;

        Self::assemble(ring, full_range, depth, combiner, std::iter::repeat(None))
    }

    /// Lay out the complete tree breadth-first, taking one hash per node
    /// from `hashes` in the same order
    pub(crate) fn assemble(
        ring: Ring,
        full_range: Range,
        depth: u8,
        combiner: Arc<dyn Combiner>,
        hashes: impl IntoIterator<Item = Option<Vec<u8>>>,
    ) -> Result<Self> {
        check_depth(depth)?;

        let total = node_count(depth);
        let mut nodes = Vec::with_capacity(total);
        nodes.push(Node::new(full_range.clone(), None, 0));

        let mut hashes = hashes.into_iter();
        let mut next = 0;
        while next < nodes.len() {
            let hash = hashes.next().ok_or_else(|| {
                Error::ShapeMismatch(format!("ran out of hashes at node {} of {}", next, total))
            })?;
            nodes[next].hash = hash;

            let level = nodes[next].level;
            if level < depth {
                let (left_range, right_range) = ring.split(&nodes[next].range);
                let parent = Some(NodeId(next));

                let left = NodeId(nodes.len());
                nodes.push(Node::new(left_range, parent, level + 1));
                let right = NodeId(nodes.len());
                nodes.push(Node::new(right_range, parent, level + 1));

                nodes[next].kind = NodeKind::Internal { left, right };
            }

            next += 1;
        }

        debug!(
            depth,
            nodes = nodes.len(),
            range = %full_range,
            combiner = combiner.name(),
            "built merkle tree"
        );

        Ok(MerkleTree {
            ring,
            full_range,
            depth,
            nodes,
            combiner,
        })
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    pub fn min(&self) -> &[u8] {
        self.ring.min()
    }

    pub fn max(&self) -> &[u8] {
        self.ring.max()
    }

    /// The partition this tree covers
    pub fn full_range(&self) -> &Range {
        &self.full_range
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn combiner(&self) -> &Arc<dyn Combiner> {
        &self.combiner
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least a root and two leaves
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn leaf_count(&self) -> usize {
        1usize << self.depth
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn root_hash(&self) -> Option<&[u8]> {
        self.get(NodeId::ROOT).hash()
    }

    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Construction parameters that rebuild this tree's geometry
    pub fn config(&self) -> TreeConfig {
        TreeConfig::new(
            self.depth,
            self.ring.min(),
            self.ring.max(),
            self.full_range.left.clone(),
            self.full_range.right.clone(),
        )
    }

    /// Iterate the leaves from left to right
    pub fn leaves(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        let first = self.nodes.len() - self.leaf_count();
        self.nodes[first..]
            .iter()
            .enumerate()
            .map(move |(i, node)| (NodeId(first + i), node))
    }

    /// Get a cursor positioned before the first leaf
    pub fn cursor(&mut self) -> Cursor<'_> {
        Cursor::new(self)
    }

    /// Find the leaf whose range contains `key`, starting from the root
    pub fn leaf_for(&self, key: &[u8]) -> Result<NodeId> {
        self.locate(NodeId::ROOT, key)
    }

    /// Set the hash of a leaf
    pub fn set_hash(&mut self, id: NodeId, hash: impl Into<Vec<u8>>) -> Result<()> {
        self.store_hash(id, Some(hash.into()))
    }

    /// Reset a leaf to the "no data" state
    pub fn clear_hash(&mut self, id: NodeId) -> Result<()> {
        self.store_hash(id, None)
    }

    /// Whether all internal hashes reflect the current leaf hashes
    pub fn is_filled(&self) -> bool {
        !self.get(NodeId::ROOT).dirty
    }

    /// Recompute the hashes of internal nodes whose leaves changed
    ///
    /// Children always sit after their parent in the arena, so a reverse
    /// sweep visits every node after both of its children.
    pub fn fill(&mut self) -> Result<()> {
        if self.is_filled() {
            return Ok(());
        }

        let mut recomputed = 0usize;
        for index in (0..self.nodes.len()).rev() {
            let node = &self.nodes[index];
            if !node.dirty {
                continue;
            }
            let (left, right) = match node.kind {
                NodeKind::Internal { left, right } => (left, right),
                NodeKind::Leaf => {
                    return Err(Error::Invariant(format!(
                        "leaf {} is marked dirty",
                        node.range
                    )))
                }
            };

            let hash = match (self.get(left).hash(), self.get(right).hash()) {
                (None, None) => None,
                (Some(h), None) | (None, Some(h)) => Some(h.to_vec()),
                (Some(l), Some(r)) => Some(self.combiner.combine(l, r)?),
            };

            let node = &mut self.nodes[index];
            node.hash = hash;
            node.dirty = false;
            recomputed += 1;
        }

        trace!(recomputed, "filled internal hashes");
        Ok(())
    }

    /// Fill both trees and return the ranges where they disagree
    pub fn diff(&mut self, other: &mut MerkleTree) -> Result<Vec<Range>> {
        self.fill()?;
        other.fill()?;
        crate::ops::diff(self, other)
    }

    // === Internal helpers ===

    /// All nodes, breadth-first
    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node at a valid id
    pub(crate) fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Leftmost leaf of the subtree rooted at `id`
    pub(crate) fn leftmost_leaf(&self, mut id: NodeId) -> NodeId {
        while let NodeKind::Internal { left, .. } = self.get(id).kind {
            id = left;
        }
        id
    }

    /// Walk up from `start` to the first node containing `key`, then down
    /// to the leaf that contains it
    pub(crate) fn locate(&self, start: NodeId, key: &[u8]) -> Result<NodeId> {
        // A wrapping range contains everything above left, including
        // values that are not on the ring at all
        if !self.ring.contains_key(key) {
            return Err(Error::KeyOutOfRange(format!(
                "{} is not on the ring [{}, {}]",
                hex::encode(key),
                hex::encode(self.ring.min()),
                hex::encode(self.ring.max())
            )));
        }

        let mut id = start;
        while !self.get(id).range.contains(key) {
            id = match self.get(id).parent {
                Some(parent) => parent,
                None => {
                    return Err(Error::KeyOutOfRange(format!(
                        "{} is outside {}",
                        hex::encode(key),
                        self.full_range
                    )))
                }
            };
        }

        loop {
            match self.get(id).kind {
                NodeKind::Leaf => return Ok(id),
                NodeKind::Internal { left, right } => {
                    id = if self.get(left).range.contains(key) {
                        left
                    } else if self.get(right).range.contains(key) {
                        right
                    } else {
                        return Err(Error::Invariant(format!(
                            "no child of {} contains {}",
                            self.get(id).range,
                            hex::encode(key)
                        )));
                    };
                }
            }
        }
    }

    fn store_hash(&mut self, id: NodeId, hash: Option<Vec<u8>>) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or_else(|| Error::Invariant(format!("{:?} is not in this tree", id)))?;
        if !node.is_leaf() {
            return Err(Error::Invariant(format!(
                "{:?} covering {} is not a leaf",
                id, node.range
            )));
        }
        node.hash = hash;

        // Ancestors of a dirty node are already dirty
        let mut parent = node.parent;
        while let Some(p) = parent {
            let node = &mut self.nodes[p.0];
            if node.dirty {
                break;
            }
            node.dirty = true;
            parent = node.parent;
        }

        Ok(())
    }
}

impl fmt::Debug for MerkleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerkleTree")
            .field("ring", &self.ring)
            .field("full_range", &self.full_range)
            .field("depth", &self.depth)
            .field("nodes", &self.nodes.len())
            .field("combiner", &self.combiner.name())
            .field("filled", &self.is_filled())
            .finish()
    }
}

fn check_depth(depth: u8) -> Result<()> {
    if depth == 0 {
        return Err(Error::Config("depth must be at least 1".into()));
    }
    if depth > MAX_DEPTH {
        return Err(Error::Config(format!(
            "depth {} exceeds the maximum of {}",
            depth, MAX_DEPTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::Blake3Combiner;

    fn sample_tree() -> MerkleTree {
        MerkleTree::new(2, [0], [255], [16], [31]).unwrap()
    }

    #[test]
    fn test_depth_zero_rejected() {
        let err = MerkleTree::new(0, [0], [255], [16], [31]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_depth_above_max_rejected() {
        let err = MerkleTree::new(MAX_DEPTH + 1, [0], [255], [16], [31]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_range_outside_ring_rejected() {
        let err = MerkleTree::new(2, [20], [255], [16], [31]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_complete_tree_shape() {
        let tree = sample_tree();
        assert_eq!(tree.len(), node_count(2));
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.get(tree.root()).range(), tree.full_range());

        for (id, leaf) in tree.leaves() {
            assert!(leaf.is_leaf());
            assert_eq!(leaf.level(), 2);
            assert!(id.index() >= 3);
        }

        let internal = tree.nodes.iter().filter(|n| !n.is_leaf()).count();
        assert_eq!(internal, 3);
    }

    #[test]
    fn test_children_split_parent_range() {
        let tree = sample_tree();
        for (index, node) in tree.nodes.iter().enumerate() {
            if let Some((left, right)) = node.children() {
                let (l, r) = (tree.get(left), tree.get(right));
                assert_eq!(l.range().left, node.range().left);
                assert_eq!(r.range().right, node.range().right);
                assert_eq!(l.range().right, r.range().left);
                assert_eq!(l.parent(), Some(NodeId(index)));
                assert_eq!(r.parent(), Some(NodeId(index)));
                assert_eq!(l.level(), node.level() + 1);
            }
        }
    }

    #[test]
    fn test_leaf_ranges() {
        let tree = sample_tree();
        let ranges: Vec<Range> = tree.leaves().map(|(_, n)| n.range().clone()).collect();
        assert_eq!(
            ranges,
            vec![
                Range::new([16], [19]),
                Range::new([19], [23]),
                Range::new([23], [27]),
                Range::new([27], [31]),
            ]
        );
    }

    #[test]
    fn test_fill_passthrough_and_combine() {
        let mut tree = sample_tree();
        let a = tree.leaf_for(&[17]).unwrap();
        let b = tree.leaf_for(&[31]).unwrap();
        tree.set_hash(a, b"test".to_vec()).unwrap();
        tree.set_hash(b, b"foo".to_vec()).unwrap();
        assert!(!tree.is_filled());

        tree.fill().unwrap();
        assert!(tree.is_filled());

        let (left, right) = tree.get(tree.root()).children().unwrap();
        assert_eq!(tree.get(left).hash(), Some(&b"test"[..]));
        assert_eq!(tree.get(right).hash(), Some(&b"foo"[..]));
        assert_eq!(
            tree.root_hash(),
            Some(&[43, 75, 75, 233, 233, 220, 128, 100][..])
        );
    }

    #[test]
    fn test_fill_without_data_leaves_hashes_absent() {
        let mut tree = sample_tree();
        tree.fill().unwrap();
        assert!(tree.nodes.iter().all(|n| n.hash().is_none()));
    }

    #[test]
    fn test_refill_after_leaf_change() {
        let mut tree = sample_tree();
        let leaf = tree.leaf_for(&[20]).unwrap();
        tree.set_hash(leaf, b"one".to_vec()).unwrap();
        tree.fill().unwrap();
        assert_eq!(tree.root_hash(), Some(&b"one"[..]));

        tree.set_hash(leaf, b"two".to_vec()).unwrap();
        assert!(!tree.is_filled());
        tree.fill().unwrap();
        assert_eq!(tree.root_hash(), Some(&b"two"[..]));

        tree.clear_hash(leaf).unwrap();
        tree.fill().unwrap();
        assert_eq!(tree.root_hash(), None);
    }

    #[test]
    fn test_set_hash_on_internal_node_is_defect() {
        let mut tree = sample_tree();
        let err = tree.set_hash(tree.root(), b"x".to_vec()).unwrap_err();
        assert!(err.is_defect());
    }

    #[test]
    fn test_custom_combiner_used_by_fill() {
        let mut tree =
            MerkleTree::with_combiner(1, [0], [255], [0], [200], Arc::new(Blake3Combiner))
                .unwrap();
        let (left, right) = tree.get(tree.root()).children().unwrap();
        tree.set_hash(left, b"l".to_vec()).unwrap();
        tree.set_hash(right, b"r".to_vec()).unwrap();
        tree.fill().unwrap();
        assert_eq!(tree.root_hash(), Some(&blake3::hash(b"lr").as_bytes()[..]));
    }

    #[test]
    fn test_config_rebuilds_same_geometry() {
        let tree = sample_tree();
        let rebuilt = tree.config().build().unwrap();
        let a: Vec<_> = tree.leaves().map(|(_, n)| n.range().clone()).collect();
        let b: Vec<_> = rebuilt.leaves().map(|(_, n)| n.range().clone()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_leaf_for_out_of_range() {
        let tree = sample_tree();
        assert!(matches!(tree.leaf_for(&[16]), Err(Error::KeyOutOfRange(_))));
        assert!(matches!(tree.leaf_for(&[32]), Err(Error::KeyOutOfRange(_))));
    }

    #[test]
    fn test_leaf_for_key_below_ring_min() {
        // (15, 12] wraps, so 5 would pass the range check alone
        let tree = MerkleTree::new(1, [10], [20], [15], [12]).unwrap();
        let err = tree.leaf_for(&[5]).unwrap_err();
        assert!(matches!(err, Error::KeyOutOfRange(_)));
        assert!(!err.is_defect());
        assert!(tree.leaf_for(&[10]).is_ok());
        assert!(tree.leaf_for(&[20]).is_ok());
    }

    #[test]
    fn test_is_empty() {
        let tree = sample_tree();
        assert!(!tree.is_empty());
        assert_eq!(tree.len(), 7);
    }
}
