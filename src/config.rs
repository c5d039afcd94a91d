//! Tree construction parameters
//!
//! A `TreeConfig` is what two replicas agree on before they build trees
//! over the same partition. Byte fields are hex strings in JSON, e.g.:
//!
//! ```json
//! { "depth": 2, "min": "00", "max": "ff", "left": "10", "right": "1f" }
//! ```

use crate::combine::Combiner;
use crate::model::{Range, Ring};
use crate::tree::{MerkleTree, MAX_DEPTH};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parameters that fully determine a tree's geometry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Number of splits between the root and the leaves
    pub depth: u8,
    /// Smallest key on the ring
    #[serde(with = "hex_bytes")]
    pub min: Vec<u8>,
    /// Largest key on the ring
    #[serde(with = "hex_bytes")]
    pub max: Vec<u8>,
    /// Exclusive start of the partition
    #[serde(with = "hex_bytes")]
    pub left: Vec<u8>,
    /// Inclusive end of the partition
    #[serde(with = "hex_bytes")]
    pub right: Vec<u8>,
}

impl TreeConfig {
    pub fn new(
        depth: u8,
        min: impl Into<Vec<u8>>,
        max: impl Into<Vec<u8>>,
        left: impl Into<Vec<u8>>,
        right: impl Into<Vec<u8>>,
    ) -> Self {
        TreeConfig {
            depth,
            min: min.into(),
            max: max.into(),
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: TreeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The partition described by this config
    pub fn range(&self) -> Range {
        Range::new(self.left.clone(), self.right.clone())
    }

    /// Check the config without building a tree
    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 || self.depth > MAX_DEPTH {
            return Err(Error::Config(format!(
                "depth must be in 1..={}, got {}",
                MAX_DEPTH, self.depth
            )));
        }
        let ring = Ring::new(self.min.clone(), self.max.clone())?;
        ring.check_range(&self.range())
    }

    /// Build a tree with the default murmur3 combiner
    pub fn build(&self) -> Result<MerkleTree> {
        MerkleTree::new(
            self.depth,
            self.min.clone(),
            self.max.clone(),
            self.left.clone(),
            self.right.clone(),
        )
    }

    /// Build a tree with a specific combiner
    pub fn build_with(&self, combiner: Arc<dyn Combiner>) -> Result<MerkleTree> {
        MerkleTree::with_combiner(
            self.depth,
            self.min.clone(),
            self.max.clone(),
            self.left.clone(),
            self.right.clone(),
            combiner,
        )
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
