//! Fixed-depth merkle tree over a ring partition
//!
//! The tree is a complete binary tree stored in a breadth-first arena:
//! - Every internal node splits its range at the ring midpoint
//! - Leaf hashes are set by the caller, usually through a [`Cursor`]
//! - Internal hashes are recomputed lazily by [`MerkleTree::fill`]

mod cursor;
mod node;
mod tree;

pub use cursor::Cursor;
pub use node::{Node, NodeId, NodeKind};
pub use tree::{node_count, MerkleTree, MAX_DEPTH};
