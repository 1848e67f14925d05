//! Mesh interface consumed by the mass-balance diagnostic.
//!
//! The diagnostic never walks connectivity or geometry. It needs cell
//! volumes and a way to find the boundary faces of a named patch, so that is
//! all this trait asks of a solver's mesh.

use std::ops::Range;

use crate::types::PatchIndex;

/// Partition-local view of a finite-volume mesh.
///
/// On a decomposed run every process holds one of these for its own cells
/// and boundary faces.
pub trait PartitionMesh {
    /// Number of cells owned by this partition.
    fn n_cells(&self) -> usize;

    /// Cell volumes, one per owned cell.
    fn cell_volumes(&self) -> &[f64];

    /// Number of boundary faces owned by this partition, over all patches.
    fn n_boundary_faces(&self) -> usize;

    /// Resolve a patch name on this partition.
    fn find_patch(&self, name: &str) -> Option<PatchIndex>;

    /// Boundary-face range of a resolved patch.
    fn patch_faces(&self, patch: PatchIndex) -> Range<usize>;

    /// Name of a resolved patch.
    fn patch_name(&self, patch: PatchIndex) -> &str;
}

impl<M: PartitionMesh + ?Sized> PartitionMesh for &M {
    fn n_cells(&self) -> usize {
        (**self).n_cells()
    }

    fn cell_volumes(&self) -> &[f64] {
        (**self).cell_volumes()
    }

    fn n_boundary_faces(&self) -> usize {
        (**self).n_boundary_faces()
    }

    fn find_patch(&self, name: &str) -> Option<PatchIndex> {
        (**self).find_patch(name)
    }

    fn patch_faces(&self, patch: PatchIndex) -> Range<usize> {
        (**self).patch_faces(patch)
    }

    fn patch_name(&self, patch: PatchIndex) -> &str {
        (**self).patch_name(patch)
    }
}
