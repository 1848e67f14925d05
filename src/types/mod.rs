//! Strongly-typed index types.

mod indices;

pub use indices::{CellIndex, FaceIndex, PatchIndex};
