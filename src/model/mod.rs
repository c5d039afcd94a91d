//! Core data model types for range_merkle

mod range;
mod ring;

pub use range::Range;
pub use ring::Ring;
