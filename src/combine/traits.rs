//! Combiner trait definition

use crate::Result;

/// Trait for merging two child hashes into their parent's hash
///
/// Implementations must be deterministic and order-sensitive, and must
/// produce `output_len()` bytes for every input. Peers that exchange trees
/// have to agree on the combiner, since the wire format does not name it.
pub trait Combiner: Send + Sync {
    /// Get the combiner name/identifier
    fn name(&self) -> &str;

    /// Get the width of every combined hash in bytes
    fn output_len(&self) -> usize;

    /// Combine the hashes of a left and right child
    fn combine(&self, left: &[u8], right: &[u8]) -> Result<Vec<u8>>;
}

impl std::fmt::Debug for dyn Combiner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Combiner({})", self.name())
    }
}
