//! 64-bit murmur3 combiner

use super::Combiner;
use crate::{Error, Result};
use std::io::Cursor;

/// Combines child hashes with the first 64 bits of murmur3 x64/128
///
/// The output is big-endian and uses seed 0, which keeps internal hashes
/// byte-compatible with other peers that use murmur3 64-bit digests.
#[derive(Clone, Copy, Debug, Default)]
pub struct Murmur3Combiner;

impl Murmur3Combiner {
    pub fn new() -> Self {
        Murmur3Combiner
    }
}

impl Combiner for Murmur3Combiner {
    fn name(&self) -> &str {
        "murmur3-64"
    }

    fn output_len(&self) -> usize {
        8
    }

    fn combine(&self, left: &[u8], right: &[u8]) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(left.len() + right.len());
        data.extend_from_slice(left);
        data.extend_from_slice(right);

        let digest = murmur3::murmur3_x64_128(&mut Cursor::new(data), 0)
            .map_err(|e| Error::Hash(format!("murmur3 failed: {}", e)))?;

        // Low half holds h1
        let h1 = digest as u64;
        Ok(h1.to_be_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let combiner = Murmur3Combiner::new();
        let hash = combiner.combine(b"test", b"foo").unwrap();
        assert_eq!(hash, vec![43, 75, 75, 233, 233, 220, 128, 100]);
    }

    #[test]
    fn test_combine_is_order_sensitive() {
        let combiner = Murmur3Combiner::new();
        let ab = combiner.combine(b"a", b"b").unwrap();
        let ba = combiner.combine(b"b", b"a").unwrap();
        assert_ne!(ab, ba);
        assert_eq!(ab.len(), combiner.output_len());
    }
}
