//! Block decomposition of a mesh into partitions.
//!
//! Cells are split into contiguous blocks of near-equal size. A boundary
//! face goes to the partition that owns its cell. A patch is kept on a
//! partition only if at least one of its faces lands there, so looking it up
//! elsewhere fails, the same way it does on a real decomposed case.

use std::ops::Range;

use super::boundary_patch::BoundaryPatch;
use super::fv_mesh::{FvMesh, MeshError};
use super::traits::PartitionMesh;
use crate::field::{BoundaryField, CellField};
use crate::types::CellIndex;

/// One partition of a decomposed mesh, with its maps back to the global mesh.
#[derive(Clone, Debug)]
pub struct Partition {
    /// Rank of this partition in `0..n_parts`
    pub rank: usize,
    /// Partition-local mesh
    pub mesh: FvMesh,
    /// Global cells owned by this partition
    cells: Range<usize>,
    /// Global boundary face of each local boundary face
    face_map: Vec<usize>,
}

impl Partition {
    /// Global cell range owned by this partition.
    pub fn cells(&self) -> Range<usize> {
        self.cells.clone()
    }

    /// Global boundary-face index of each local boundary face.
    pub fn face_map(&self) -> &[usize] {
        &self.face_map
    }

    /// Extract this partition's share of a global cell field.
    pub fn restrict_cells(&self, global: &CellField) -> CellField {
        CellField::new(global.as_slice()[self.cells()].to_vec())
    }

    /// Extract this partition's share of a global boundary field.
    pub fn restrict_faces(&self, global: &BoundaryField) -> BoundaryField {
        let values = global.as_slice();
        BoundaryField::new(self.face_map.iter().map(|&f| values[f]).collect())
    }
}

/// Split `mesh` into `n_parts` contiguous cell blocks.
///
/// The first `n_cells % n_parts` partitions get one extra cell.
pub fn decompose(mesh: &FvMesh, n_parts: usize) -> Result<Vec<Partition>, MeshError> {
    let n_cells = mesh.n_cells();
    if n_parts == 0 || n_parts > n_cells {
        return Err(MeshError::InvalidPartitionCount { n_cells, n_parts });
    }

    let base = n_cells / n_parts;
    let rem = n_cells % n_parts;
    let mut out = Vec::with_capacity(n_parts);
    let mut cursor = 0;

    for rank in 0..n_parts {
        let n_local = base + usize::from(rank < rem);
        let cells = cursor..cursor + n_local;
        cursor = cells.end;

        let mut face_map = Vec::new();
        let mut face_cells = Vec::new();
        for (f, owner) in mesh.face_cells().iter().enumerate() {
            if cells.contains(&owner.get()) {
                face_map.push(f);
                face_cells.push(CellIndex::new(owner.get() - cells.start));
            }
        }

        // face_map is sorted, so each global patch maps to a contiguous local run
        let patches = mesh
            .boundary()
            .iter()
            .filter_map(|p| {
                let start = face_map.partition_point(|&f| f < p.start);
                let end = face_map.partition_point(|&f| f < p.faces().end);
                (end > start).then(|| BoundaryPatch::new(p.name.clone(), start, end - start))
            })
            .collect();

        let volumes = mesh.cell_volumes()[cells.clone()].to_vec();
        out.push(Partition {
            rank,
            mesh: FvMesh::new(volumes, face_cells, patches)?,
            cells,
            face_map,
        });
    }

    Ok(out)
}
