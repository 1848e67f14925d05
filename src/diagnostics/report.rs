//! Result of one mass-balance check.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Global mass balance over one time step.
///
/// All quantities are already reduced over every partition, so each rank
/// holds the same report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MassBalanceReport {
    /// Mass accumulated in the domain over the step, `Σ (ρ - ρ⁰) V`
    pub accumulation: f64,
    /// Mass that left through the patch over the step, `Δt Σ φ_f`
    pub net_out_flux: f64,
    /// Mass-continuity error `|accumulation + net_out_flux|`
    pub residual: f64,
    /// Total mass at the end of the step, `Σ ρ V`
    pub total_mass: f64,
    /// Partitions on which the patch name resolves, possibly to zero faces
    pub patch_partitions: usize,
    /// Partitions that took part in the check
    pub n_partitions: usize,
}

impl MassBalanceReport {
    /// Build a report from reduced sums.
    pub fn from_sums(
        accumulation: f64,
        net_out_flux: f64,
        total_mass: f64,
        patch_partitions: usize,
        n_partitions: usize,
    ) -> Self {
        Self {
            accumulation,
            net_out_flux,
            residual: (accumulation + net_out_flux).abs(),
            total_mass,
            patch_partitions,
            n_partitions,
        }
    }

    /// True if the patch name resolves on at least one partition.
    pub fn patch_found(&self) -> bool {
        self.patch_partitions > 0
    }

    /// Residual relative to total mass; zero for an (almost) empty domain.
    pub fn relative_error(&self) -> f64 {
        if self.total_mass.abs() > 1e-300 {
            self.residual / self.total_mass.abs()
        } else {
            0.0
        }
    }

    /// Signed continuity error `accumulation + net_out_flux`.
    pub fn signed_error(&self) -> f64 {
        self.accumulation + self.net_out_flux
    }

    /// Single-line summary for solver logs.
    pub fn summary_line(&self) -> String {
        format!(
            "Mass continuity error = {:e} of total mass {:e}",
            self.residual, self.total_mass
        )
    }
}

impl fmt::Display for MassBalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary_line())
    }
}
