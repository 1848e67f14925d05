//! Mass-conservation diagnostics.
//!
//! - [`MassBalanceChecker`]: per-step global mass-continuity residual
//! - [`MassBalanceTracker`]: residual history over a run
//! - [`MassBalanceConfig`]: patch name and missing-patch policy

mod config;
mod error;
mod mass_balance;
mod report;
mod tracker;

pub use config::{MassBalanceConfig, MissingPatchPolicy, DEFAULT_PATCH_NAME};
pub use error::MassBalanceError;
pub use mass_balance::{mass_continuity_error, MassBalanceChecker, MassBalanceInput};
pub use report::MassBalanceReport;
pub use tracker::MassBalanceTracker;
