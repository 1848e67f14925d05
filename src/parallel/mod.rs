//! Cross-partition reductions.
//!
//! The diagnostic never reaches for a process-wide communicator. Callers pass
//! one in:
//! - [`SerialComm`]: single partition, identity reduction
//! - [`ThreadComm`]: in-process group, one thread per partition
//!
//! A solver running under MPI implements [`Communicator`] on top of its own
//! communicator handle.

mod comm;
mod thread_group;

pub use comm::{CommError, Communicator, SerialComm};
pub use thread_group::{run_partitioned, thread_group, ThreadComm};
