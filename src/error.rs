//! Error types for range_merkle

use thiserror::Error;

/// Result type alias for range_merkle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, filling, diffing or decoding trees
///
/// `Invariant` is the only variant that signals a defect in tree
/// construction; everything else is a caller or input error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Key not in tree range: {0}")]
    KeyOutOfRange(String),

    #[error("Tree shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),

    #[error("Tree has leaf changes that are not filled yet")]
    NotFilled,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the error points at a broken tree rather than bad input
    pub fn is_defect(&self) -> bool {
        matches!(self, Error::Invariant(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_invariant_is_defect() {
        assert!(Error::Invariant("no child".into()).is_defect());
        assert!(!Error::KeyOutOfRange("ff".into()).is_defect());
        assert!(!Error::Config("depth".into()).is_defect());
        assert!(!Error::NotFilled.is_defect());
    }
}
