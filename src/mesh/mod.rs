//! Mesh representation.
//!
//! Provides the partition-local mesh view the mass balance reads:
//! - [`PartitionMesh`]: cell volumes and named-patch lookup
//! - [`FvMesh`]: a concrete mesh with validated patch layout
//! - [`decompose`]: block decomposition into partitions

mod boundary_patch;
mod decomposition;
mod fv_mesh;
mod traits;

pub use boundary_patch::{BoundaryMesh, BoundaryPatch};
pub use decomposition::{decompose, Partition};
pub use fv_mesh::{FvMesh, MeshError};
pub use traits::PartitionMesh;
