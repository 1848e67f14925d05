//! Named boundary patches.
//!
//! Boundary faces of a mesh are stored as one flat list. A patch owns a
//! contiguous run `start..start + n_faces` of that list and is looked up by
//! name.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::types::PatchIndex;

/// A named, contiguous group of boundary faces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryPatch {
    /// Patch name, unique within a mesh
    pub name: String,
    /// First boundary face of the patch
    pub start: usize,
    /// Number of boundary faces in the patch
    pub n_faces: usize,
}

impl BoundaryPatch {
    /// Create a patch covering `n_faces` boundary faces starting at `start`.
    pub fn new(name: impl Into<String>, start: usize, n_faces: usize) -> Self {
        Self {
            name: name.into(),
            start,
            n_faces,
        }
    }

    /// Boundary-face range covered by this patch.
    #[inline]
    pub fn faces(&self) -> Range<usize> {
        self.start..self.start + self.n_faces
    }
}

/// Ordered list of the patches present on one mesh or partition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryMesh {
    patches: Vec<BoundaryPatch>,
}

impl BoundaryMesh {
    /// Wrap a patch list. Validation happens in [`FvMesh::new`](super::FvMesh::new).
    pub fn new(patches: Vec<BoundaryPatch>) -> Self {
        Self { patches }
    }

    /// Number of patches.
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// True if the mesh has no patches at all.
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Resolve a patch name.
    ///
    /// Returns `None` when no patch of that name exists here, which on a
    /// decomposed mesh simply means this partition owns none of its faces.
    pub fn find(&self, name: &str) -> Option<PatchIndex> {
        self.patches
            .iter()
            .position(|p| p.name == name)
            .map(PatchIndex::new)
    }

    /// Patch at `index`.
    pub fn patch(&self, index: PatchIndex) -> &BoundaryPatch {
        &self.patches[index.get()]
    }

    /// Iterate over patches in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &BoundaryPatch> {
        self.patches.iter()
    }
}
