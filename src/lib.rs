//! # massbal
//!
//! Mass-continuity diagnostic for transient finite-volume flow solvers,
//! including domain-decomposed runs.
//!
//! After each completed time step the solver hands over its density before
//! and after the step, the boundary mass flux and the step size. The checker
//! answers whether the change of mass inside the domain matches the mass
//! that left through one named boundary patch:
//!
//! - [`MassBalanceChecker`]: the per-step residual `|dM + netOutFlux|`
//! - [`PartitionMesh`]: what the checker needs from a mesh
//! - [`Communicator`]: the collective sum the checker reduces with
//! - [`decompose`]: block decomposition, mainly for tests and demos
//!
//! # Example
//!
//! ```
//! use massbal::{
//!     BoundaryField, CellField, FvMesh, MassBalanceChecker, MassBalanceInput, PartitionMesh,
//!     SerialComm,
//! };
//!
//! let mesh = FvMesh::uniform_column(0.0, 1.0, 4, 1.0);
//! let rho_old = CellField::uniform(4, 1000.0);
//! let mut rho = rho_old.clone();
//! rho.as_mut_slice()[3] = 999.0;
//!
//! // 0.25 kg left through the top face during a step of 0.5 s
//! let mut rho_phi = BoundaryField::uniform(mesh.n_boundary_faces(), 0.0);
//! rho_phi.as_mut_slice()[1] = 0.5;
//!
//! let checker = MassBalanceChecker::for_patch("atmosphere").unwrap();
//! let input = MassBalanceInput::from_mesh(&mesh, &rho, &rho_old, &rho_phi, 0.5);
//! let report = checker.check(&mesh, &SerialComm, &input).unwrap();
//! assert!(report.residual < 1e-12);
//! ```

pub mod diagnostics;
pub mod field;
pub mod mesh;
pub mod parallel;
pub mod types;

pub use diagnostics::{
    mass_continuity_error, MassBalanceChecker, MassBalanceConfig, MassBalanceError,
    MassBalanceInput, MassBalanceReport, MassBalanceTracker, MissingPatchPolicy,
};
pub use field::{BoundaryField, CellField};
pub use mesh::{decompose, BoundaryMesh, BoundaryPatch, FvMesh, MeshError, Partition, PartitionMesh};
pub use parallel::{run_partitioned, thread_group, CommError, Communicator, SerialComm, ThreadComm};
pub use types::{CellIndex, FaceIndex, PatchIndex};
