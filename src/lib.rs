//! # range_merkle
//!
//! Fixed-depth merkle trees over partitions of a hash ring, for anti-entropy
//! repair between replicas.
//!
//! Each replica builds a tree over the same token range, sets the leaf hashes
//! from its local data, fills the tree and ships it to a peer. Diffing two
//! trees yields the smallest set of contiguous ranges whose data disagree, so
//! repair only has to stream those ranges.
//!
//! ## Core Concepts
//!
//! - **Ring**: the `[min, max]` key space, where keys wrap from max to min
//! - **Range**: a half-open interval `(left, right]` on the ring
//! - **MerkleTree**: a complete binary tree that halves its range at each level
//! - **Cursor**: ordered, seekable access to the leaves
//! - **Combiner**: the pluggable function that merges two child hashes
//!
//! ## Example
//!
//! ```
//! use range_merkle::{ops, MerkleTree};
//!
//! # fn main() -> range_merkle::Result<()> {
//! let mut local = MerkleTree::new(2, [0], [255], [16], [31])?;
//! let mut c = local.cursor();
//! let leaf = c.seek(&[17])?;
//! c.set_hash(leaf, b"digest".to_vec())?;
//! local.fill()?;
//!
//! let wire = ops::serialize(&local)?.to_bytes()?;
//! let mut remote = ops::deserialize(&ops::SerializedTree::from_bytes(&wire)?)?;
//! assert!(local.diff(&mut remote)?.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod combine;
pub mod config;
pub mod model;
pub mod ops;
pub mod tree;

mod error;

pub use combine::{Blake3Combiner, Combiner, Murmur3Combiner};
pub use config::TreeConfig;
pub use error::{Error, Result};
pub use model::{Range, Ring};
pub use ops::{deserialize, deserialize_with, diff, diff_with, serialize, SerializedTree};
pub use tree::{Cursor, MerkleTree, Node, NodeId, NodeKind, MAX_DEPTH};
