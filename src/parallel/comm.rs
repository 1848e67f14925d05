//! Collective reduction interface.

use thiserror::Error;

/// Failure of a collective operation.
///
/// Always fatal for the operation that hit it. There is no retry: once a
/// group member has gone away the remaining ranks cannot complete.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommError {
    /// A group member left before the collective completed.
    #[error("partition group aborted during a collective reduction")]
    GroupAborted,

    /// Ranks contributed buffers of different lengths.
    #[error("reduction buffer length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length contributed by rank 0
        expected: usize,
        /// Length contributed by another rank
        actual: usize,
    },
}

/// Sum-reduction over a group of cooperating partitions.
///
/// Every rank of the group must make the same sequence of calls. A rank
/// that skips a call leaves the others blocked.
pub trait Communicator {
    /// Rank of the calling partition, in `0..size()`.
    fn rank(&self) -> usize;

    /// Number of partitions in the group.
    fn size(&self) -> usize;

    /// Element-wise sum of `local` over all ranks, returned on every rank.
    fn all_reduce_sum(&self, local: &[f64]) -> Result<Vec<f64>, CommError>;

    /// Sum a single scalar over all ranks.
    fn all_reduce_sum_scalar(&self, local: f64) -> Result<f64, CommError> {
        let reduced = self.all_reduce_sum(&[local])?;
        reduced.first().copied().ok_or(CommError::LengthMismatch {
            expected: 1,
            actual: 0,
        })
    }
}

impl<C: Communicator + ?Sized> Communicator for &C {
    fn rank(&self) -> usize {
        (**self).rank()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn all_reduce_sum(&self, local: &[f64]) -> Result<Vec<f64>, CommError> {
        (**self).all_reduce_sum(local)
    }
}

/// Single-partition communicator: the reduction is the identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialComm;

impl Communicator for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_sum(&self, local: &[f64]) -> Result<Vec<f64>, CommError> {
        Ok(local.to_vec())
    }
}
