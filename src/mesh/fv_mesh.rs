//! Partition-local finite-volume mesh.
//!
//! Only the pieces the mass balance needs are stored: cell volumes, the
//! owner cell of every boundary face, and the named patches over the
//! boundary-face list.

use std::collections::HashSet;
use std::ops::Range;

use thiserror::Error;

use super::boundary_patch::{BoundaryMesh, BoundaryPatch};
use super::traits::PartitionMesh;
use crate::types::{CellIndex, PatchIndex};

/// Error type for mesh construction and decomposition.
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    /// A cell volume is zero, negative or not finite.
    #[error("cell {cell} has non-positive volume {volume}")]
    NonPositiveVolume {
        /// Offending cell
        cell: CellIndex,
        /// Its volume
        volume: f64,
    },

    /// Two patches share a name.
    #[error("duplicate patch name: {0}")]
    DuplicatePatch(String),

    /// A patch extends past the last boundary face.
    #[error("patch {name} ends at face {end} but the mesh has {n_faces} boundary faces")]
    PatchOutOfRange {
        /// Patch name
        name: String,
        /// One past the last face of the patch
        end: usize,
        /// Boundary faces in the mesh
        n_faces: usize,
    },

    /// Two patches claim the same boundary face.
    #[error("patches {0} and {1} overlap")]
    OverlappingPatches(String, String),

    /// A boundary face names an owner cell that does not exist.
    #[error("boundary face {face} is owned by cell {cell}, mesh has {n_cells} cells")]
    InvalidFaceCell {
        /// Boundary face
        face: usize,
        /// Claimed owner cell
        cell: CellIndex,
        /// Cells in the mesh
        n_cells: usize,
    },

    /// Decomposition into zero partitions or more partitions than cells.
    #[error("cannot split {n_cells} cells into {n_parts} partitions")]
    InvalidPartitionCount {
        /// Cells in the mesh
        n_cells: usize,
        /// Requested partitions
        n_parts: usize,
    },
}

/// Finite-volume mesh as seen by one partition.
#[derive(Clone, Debug)]
pub struct FvMesh {
    /// Volume of each cell
    cell_volumes: Vec<f64>,
    /// Owner cell of each boundary face
    face_cells: Vec<CellIndex>,
    /// Named patches over the boundary faces
    boundary: BoundaryMesh,
}

impl FvMesh {
    /// Build a mesh, checking volumes, face owners and patch layout.
    pub fn new(
        cell_volumes: Vec<f64>,
        face_cells: Vec<CellIndex>,
        patches: Vec<BoundaryPatch>,
    ) -> Result<Self, MeshError> {
        for (i, &volume) in cell_volumes.iter().enumerate() {
            if !(volume > 0.0 && volume.is_finite()) {
                return Err(MeshError::NonPositiveVolume {
                    cell: CellIndex::new(i),
                    volume,
                });
            }
        }

        let n_cells = cell_volumes.len();
        for (face, &cell) in face_cells.iter().enumerate() {
            if cell.get() >= n_cells {
                return Err(MeshError::InvalidFaceCell {
                    face,
                    cell,
                    n_cells,
                });
            }
        }

        validate_patches(&patches, face_cells.len())?;

        Ok(Self {
            cell_volumes,
            face_cells,
            boundary: BoundaryMesh::new(patches),
        })
    }

    /// Uniform vertical column of `n_cells` cells between `z_min` and `z_max`.
    ///
    /// Two boundary faces: `bottom` (below cell 0) and `atmosphere` (above
    /// the last cell), each with cross-section `area`.
    pub fn uniform_column(z_min: f64, z_max: f64, n_cells: usize, area: f64) -> Self {
        assert!(n_cells > 0, "Need at least one cell");
        assert!(z_max > z_min, "z_max must be greater than z_min");
        assert!(area > 0.0, "Cross-section area must be positive");

        let dz = (z_max - z_min) / n_cells as f64;

        Self {
            cell_volumes: vec![dz * area; n_cells],
            face_cells: vec![CellIndex::new(0), CellIndex::new(n_cells - 1)],
            boundary: BoundaryMesh::new(vec![
                BoundaryPatch::new("bottom", 0, 1),
                BoundaryPatch::new("atmosphere", 1, 1),
            ]),
        }
    }

    /// Single-layer box of `nx * ny` cells of size `dx * dy * dz`.
    ///
    /// Cells are numbered row by row, `k = j * nx + i`. Boundary faces are
    /// grouped into the patches `left`, `right`, `bottom` (row `j = 0`) and
    /// `atmosphere` (row `j = ny - 1`), in that order.
    pub fn uniform_box(nx: usize, ny: usize, dx: f64, dy: f64, dz: f64) -> Self {
        assert!(nx > 0 && ny > 0, "Need at least one cell in each direction");
        assert!(dx > 0.0 && dy > 0.0 && dz > 0.0, "Cell sizes must be positive");

        let cell = |i: usize, j: usize| CellIndex::new(j * nx + i);

        let mut face_cells = Vec::with_capacity(2 * (nx + ny));
        face_cells.extend((0..ny).map(|j| cell(0, j)));
        face_cells.extend((0..ny).map(|j| cell(nx - 1, j)));
        face_cells.extend((0..nx).map(|i| cell(i, 0)));
        face_cells.extend((0..nx).map(|i| cell(i, ny - 1)));

        Self {
            cell_volumes: vec![dx * dy * dz; nx * ny],
            face_cells,
            boundary: BoundaryMesh::new(vec![
                BoundaryPatch::new("left", 0, ny),
                BoundaryPatch::new("right", ny, ny),
                BoundaryPatch::new("bottom", 2 * ny, nx),
                BoundaryPatch::new("atmosphere", 2 * ny + nx, nx),
            ]),
        }
    }

    /// Owner cell of each boundary face.
    pub fn face_cells(&self) -> &[CellIndex] {
        &self.face_cells
    }

    /// Patches present on this mesh.
    pub fn boundary(&self) -> &BoundaryMesh {
        &self.boundary
    }

    /// Sum of all cell volumes.
    pub fn total_volume(&self) -> f64 {
        self.cell_volumes.iter().sum()
    }
}

impl PartitionMesh for FvMesh {
    fn n_cells(&self) -> usize {
        self.cell_volumes.len()
    }

    fn cell_volumes(&self) -> &[f64] {
        &self.cell_volumes
    }

    fn n_boundary_faces(&self) -> usize {
        self.face_cells.len()
    }

    fn find_patch(&self, name: &str) -> Option<PatchIndex> {
        self.boundary.find(name)
    }

    fn patch_faces(&self, patch: PatchIndex) -> Range<usize> {
        self.boundary.patch(patch).faces()
    }

    fn patch_name(&self, patch: PatchIndex) -> &str {
        &self.boundary.patch(patch).name
    }
}

fn validate_patches(patches: &[BoundaryPatch], n_faces: usize) -> Result<(), MeshError> {
    let mut names = HashSet::with_capacity(patches.len());
    for patch in patches {
        if !names.insert(patch.name.as_str()) {
            return Err(MeshError::DuplicatePatch(patch.name.clone()));
        }
        let end = patch.faces().end;
        if end > n_faces {
            return Err(MeshError::PatchOutOfRange {
                name: patch.name.clone(),
                end,
                n_faces,
            });
        }
    }

    // Empty patches own no faces and cannot overlap anything
    let mut ordered: Vec<&BoundaryPatch> = patches.iter().filter(|p| p.n_faces > 0).collect();
    ordered.sort_by_key(|p| p.start);
    for pair in ordered.windows(2) {
        if pair[1].start < pair[0].faces().end {
            return Err(MeshError::OverlappingPatches(
                pair[0].name.clone(),
                pair[1].name.clone(),
            ));
        }
    }

    Ok(())
}
