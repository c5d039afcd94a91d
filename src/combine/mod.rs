//! Pluggable functions for combining child hashes

mod blake;
mod murmur;
mod traits;

pub use blake::Blake3Combiner;
pub use murmur::Murmur3Combiner;
pub use traits::Combiner;
