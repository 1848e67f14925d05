//! Scalar field snapshots.
//!
//! - [`CellField`]: one value per cell (density, phase fraction)
//! - [`BoundaryField`]: one value per boundary face (mass flux)

mod boundary_field;
mod cell_field;

pub use boundary_field::BoundaryField;
pub use cell_field::CellField;
