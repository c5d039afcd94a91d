//! Half-open key ranges over the hash ring

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A token range `(left, right]` over big-endian unsigned integers
///
/// When `left > right` the range wraps past the ring maximum back to the
/// minimum. Two ranges are equal only when both endpoints are byte-equal,
/// so `[0x01]` and `[0x00, 0x01]` are different endpoints even though they
/// encode the same integer.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub left: Vec<u8>,
    pub right: Vec<u8>,
}

impl Range {
    /// Create a range from its two endpoints
    pub fn new(left: impl Into<Vec<u8>>, right: impl Into<Vec<u8>>) -> Self {
        Range {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Whether this range wraps around the end of the ring
    pub fn is_wrapping(&self) -> bool {
        BigUint::from_bytes_be(&self.left) > BigUint::from_bytes_be(&self.right)
    }

    /// Check if `key` falls inside the range
    pub fn contains(&self, key: &[u8]) -> bool {
        let left = BigUint::from_bytes_be(&self.left);
        let right = BigUint::from_bytes_be(&self.right);
        let key = BigUint::from_bytes_be(key);

        if left > right {
            key > left || key <= right
        } else {
            left < key && key <= right
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}]", hex::encode(&self.left), hex::encode(&self.right))
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Range{}", self)
    }
}
