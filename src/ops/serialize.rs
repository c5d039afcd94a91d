//! Breadth-first wire representation of a tree

use crate::combine::{Combiner, Murmur3Combiner};
use crate::model::{Range, Ring};
use crate::tree::{node_count, MerkleTree, MAX_DEPTH};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A tree flattened for transport
///
/// `flat_tree` holds one hash per node in breadth-first order starting at
/// the root, with a zero-length entry for a node without a hash. The shape
/// is implied by `depth` and the ring, so only hashes travel. Field names
/// follow the camelCase schema shared with other peers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedTree {
    pub min: Vec<u8>,
    pub max: Vec<u8>,
    pub full_range: Range,
    pub depth: u8,
    pub flat_tree: Vec<Vec<u8>>,
}

impl SerializedTree {
    /// Encode with bincode
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(data)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Flatten a filled tree
///
/// Fails with [`Error::NotFilled`] when leaf changes have not been filled,
/// since the peer would otherwise receive stale internal hashes.
pub fn serialize(tree: &MerkleTree) -> Result<SerializedTree> {
    if !tree.is_filled() {
        return Err(Error::NotFilled);
    }

    let flat_tree = tree
        .nodes()
        .iter()
        .map(|node| node.hash_bytes().to_vec())
        .collect();

    Ok(SerializedTree {
        min: tree.min().to_vec(),
        max: tree.max().to_vec(),
        full_range: tree.full_range().clone(),
        depth: tree.depth(),
        flat_tree,
    })
}

/// Rebuild a tree using the default murmur3 combiner
pub fn deserialize(s: &SerializedTree) -> Result<MerkleTree> {
    deserialize_with(s, Arc::new(Murmur3Combiner))
}

/// Rebuild a tree that will combine hashes with `combiner`
pub fn deserialize_with(s: &SerializedTree, combiner: Arc<dyn Combiner>) -> Result<MerkleTree> {
    if s.depth == 0 || s.depth > MAX_DEPTH {
        return Err(Error::ShapeMismatch(format!(
            "depth {} is outside 1..={}",
            s.depth, MAX_DEPTH
        )));
    }

    let expected = node_count(s.depth);
    if s.flat_tree.len() != expected {
        return Err(Error::ShapeMismatch(format!(
            "expected {} hashes for depth {}, got {}",
            expected,
            s.depth,
            s.flat_tree.len()
        )));
    }

    let ring = Ring::new(s.min.clone(), s.max.clone())?;
    ring.check_range(&s.full_range)?;

    let hashes = s
        .flat_tree
        .iter()
        .map(|hash| (!hash.is_empty()).then(|| hash.clone()));

    let tree = MerkleTree::assemble(ring, s.full_range.clone(), s.depth, combiner, hashes)?;
    debug!(depth = s.depth, range = %s.full_range, "deserialized merkle tree");
    Ok(tree)
}
