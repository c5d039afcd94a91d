//! Operations over whole trees: diff and wire serialization

mod diff;
mod serialize;

pub use diff::{diff, diff_with, Consistency};
pub use serialize::{deserialize, deserialize_with, serialize, SerializedTree};
