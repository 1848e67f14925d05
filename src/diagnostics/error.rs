//! Error type for the mass-balance check.

use thiserror::Error;

use super::report::MassBalanceReport;
use crate::parallel::CommError;

/// Why a mass-balance check produced no usable residual.
///
/// A patch absent on one partition is not an error and never shows up here.
#[derive(Debug, Error, PartialEq)]
pub enum MassBalanceError {
    /// Per-cell or per-face input does not line up with the mesh.
    #[error("{field} has {actual} entries, expected {expected}")]
    MisalignedField {
        /// Which input is misaligned
        field: &'static str,
        /// Entries required by the mesh
        expected: usize,
        /// Entries supplied
        actual: usize,
    },

    /// Time-step size is not a positive finite number.
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    /// A cell volume is not strictly positive.
    #[error("cell {cell} has non-positive volume {volume}")]
    NonPositiveVolume {
        /// Local cell index
        cell: usize,
        /// Its volume
        volume: f64,
    },

    /// The configured patch name is blank.
    #[error("mass-balance patch name is empty")]
    EmptyPatchName,

    /// No partition has a patch of the configured name.
    ///
    /// The attached report was computed with zero outflux.
    #[error("patch '{patch}' not found on any partition; outflux is zero and the residual is meaningless")]
    PatchNotFoundAnywhere {
        /// Configured patch name
        patch: String,
        /// Report computed with zero outflux
        report: Box<MassBalanceReport>,
    },

    /// Input on other partitions failed validation for this step.
    ///
    /// Those partitions report their own error; the residual is not formed
    /// anywhere in the group.
    #[error("{failed} partition(s) rejected their input for this step")]
    PartitionFailed {
        /// Number of partitions whose input was rejected
        failed: usize,
    },

    /// The cross-partition reduction failed.
    #[error("collective reduction failed: {0}")]
    Reduction(#[from] CommError),
}
