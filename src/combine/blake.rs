//! BLAKE3 combiner

use super::Combiner;
use crate::Result;

/// Combines child hashes into a 32-byte BLAKE3 digest of `left || right`
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Combiner;

impl Blake3Combiner {
    pub fn new() -> Self {
        Blake3Combiner
    }
}

impl Combiner for Blake3Combiner {
    fn name(&self) -> &str {
        "blake3"
    }

    fn output_len(&self) -> usize {
        blake3::OUT_LEN
    }

    fn combine(&self, left: &[u8], right: &[u8]) -> Result<Vec<u8>> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(left);
        hasher.update(right);
        Ok(hasher.finalize().as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_concatenated_digest() {
        let combiner = Blake3Combiner::new();
        let hash = combiner.combine(b"left", b"right").unwrap();
        assert_eq!(hash, blake3::hash(b"leftright").as_bytes().to_vec());
        assert_eq!(hash.len(), 32);
    }

    #[test]
    fn test_combine_is_order_sensitive() {
        let combiner = Blake3Combiner::new();
        assert_ne!(
            combiner.combine(b"x", b"y").unwrap(),
            combiner.combine(b"y", b"x").unwrap()
        );
    }
}
