//! Ring bounds and the midpoint arithmetic used to split ranges

use super::Range;
use crate::{Error, Result};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// The absolute `[min, max]` bounds of the hash ring
///
/// Every endpoint produced by splitting is padded to the byte width of
/// `max`, so two peers with the same ring derive byte-identical ranges.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ring {
    min: Vec<u8>,
    max: Vec<u8>,
}

impl Ring {
    /// Create a ring, rejecting bounds where `min >= max`
    pub fn new(min: impl Into<Vec<u8>>, max: impl Into<Vec<u8>>) -> Result<Self> {
        let ring = Ring {
            min: min.into(),
            max: max.into(),
        };

        if to_int(&ring.min) >= to_int(&ring.max) {
            return Err(Error::Config(format!(
                "ring min {} must be below max {}",
                hex::encode(&ring.min),
                hex::encode(&ring.max)
            )));
        }

        Ok(ring)
    }

    pub fn min(&self) -> &[u8] {
        &self.min
    }

    pub fn max(&self) -> &[u8] {
        &self.max
    }

    /// Byte width every split point is padded to
    pub fn width(&self) -> usize {
        self.max.len()
    }

    /// Check if `key` lies within `[min, max]`
    pub fn contains_key(&self, key: &[u8]) -> bool {
        let key = to_int(key);
        to_int(&self.min) <= key && key <= to_int(&self.max)
    }

    /// Validate a partition range before a tree is built over it
    pub fn check_range(&self, range: &Range) -> Result<()> {
        for endpoint in [&range.left, &range.right] {
            if !self.contains_key(endpoint) {
                return Err(Error::Config(format!(
                    "range endpoint {} lies outside the ring [{}, {}]",
                    hex::encode(endpoint),
                    hex::encode(&self.min),
                    hex::encode(&self.max)
                )));
            }
        }

        if to_int(&range.left) == to_int(&range.right) {
            return Err(Error::Config(format!("range {} is empty", range)));
        }

        Ok(())
    }

    /// Split point of `range`
    ///
    /// Both endpoints must already lie within the ring; every range derived
    /// from a checked partition does.
    pub fn midpoint(&self, range: &Range) -> Vec<u8> {
        let min = to_int(&self.min);
        let max = to_int(&self.max);
        let left = to_int(&range.left);
        let right = to_int(&range.right);

        let mid = if left <= right {
            (left + right) >> 1usize
        } else {
            // Wrapped: size is (max - left) + (right - min)
            let size = (&max - &left) + (right - &min);
            let mid = left + (size >> 1usize);
            if mid > max {
                // Same as plain `mid - max` when min is zero; with a
                // non-zero min that form would land below the ring
                mid - max + min
            } else {
                mid
            }
        };

        pad(mid, self.width())
    }

    /// Split `range` into its left and right halves
    pub fn split(&self, range: &Range) -> (Range, Range) {
        let mid = self.midpoint(range);
        (
            Range::new(range.left.clone(), mid.clone()),
            Range::new(mid, range.right.clone()),
        )
    }
}

fn to_int(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Big-endian bytes of `value`, left-padded with zeros to `width`
fn pad(value: BigUint, width: usize) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    if bytes.len() >= width {
        return bytes;
    }

    let mut padded = vec![0u8; width - bytes.len()];
    padded.extend(bytes);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_ring() -> Ring {
        Ring::new([0], [255]).unwrap()
    }

    #[test]
    fn test_ring_rejects_inverted_bounds() {
        assert!(matches!(Ring::new([9], [9]), Err(Error::Config(_))));
        assert!(matches!(Ring::new([10], [2]), Err(Error::Config(_))));
    }

    #[test]
    fn test_midpoint_plain_range() {
        let ring = byte_ring();
        assert_eq!(ring.midpoint(&Range::new([16], [31])), vec![23]);
        assert_eq!(ring.midpoint(&Range::new([16], [23])), vec![19]);
        assert_eq!(ring.midpoint(&Range::new([23], [31])), vec![27]);
    }

    #[test]
    fn test_midpoint_wrapping_range() {
        let ring = byte_ring();
        assert_eq!(ring.midpoint(&Range::new([255], [3])), vec![1]);
        // (200, 10]: size 65, left + 32 stays below max
        assert_eq!(ring.midpoint(&Range::new([200], [10])), vec![232]);
    }

    #[test]
    fn test_midpoint_nonzero_min_stays_in_range() {
        let ring = Ring::new([10], [20]).unwrap();
        let range = Range::new([19], [15]);
        let mid = ring.midpoint(&range);
        assert_eq!(mid, vec![12]);
        assert!(range.contains(&mid));
    }

    #[test]
    fn test_midpoint_padded_to_max_width() {
        let ring = Ring::new([0, 0], [255, 255]).unwrap();
        assert_eq!(ring.midpoint(&Range::new([0, 0], [0, 4])), vec![0, 2]);
        assert_eq!(ring.midpoint(&Range::new([0, 0], [0, 1])), vec![0, 0]);
    }

    #[test]
    fn test_check_range() {
        let ring = Ring::new([10], [200]).unwrap();
        assert!(ring.check_range(&Range::new([16], [31])).is_ok());
        assert!(ring.check_range(&Range::new([150], [20])).is_ok());
        assert!(ring.check_range(&Range::new([5], [31])).is_err());
        assert!(ring.check_range(&Range::new([16], [201])).is_err());
        assert!(ring.check_range(&Range::new([16], [16])).is_err());
    }

    #[test]
    fn test_split_halves_share_midpoint() {
        let ring = byte_ring();
        let (l, r) = ring.split(&Range::new([255], [3]));
        assert_eq!(l, Range::new([255], [1]));
        assert_eq!(r, Range::new([1], [3]));
    }
}
