//! Mass-balance history over a run.

use serde::{Deserialize, Serialize};

use super::report::MassBalanceReport;

/// Accumulates per-step mass-balance reports.
///
/// Per-step residuals can hide a slow drift. The tracker keeps the signed
/// error summed over all steps so a systematic bias shows up.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MassBalanceTracker {
    /// Steps recorded
    n_steps: usize,
    /// Simulation time of the last update
    current_time: f64,
    /// Domain mass before the first recorded step
    initial_mass: Option<f64>,
    /// Domain mass after the last recorded step
    current_mass: f64,
    /// Σ (accumulation + net_out_flux)
    cumulative_error: f64,
    /// Σ residual
    cumulative_residual: f64,
    /// Σ net_out_flux
    cumulative_out_flux: f64,
    /// Largest single-step residual
    max_residual: f64,
    /// Largest single-step relative error
    max_relative_error: f64,
}

impl MassBalanceTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the report of the step ending at `time`.
    pub fn update(&mut self, time: f64, report: &MassBalanceReport) {
        if self.initial_mass.is_none() {
            self.initial_mass = Some(report.total_mass - report.accumulation);
        }

        self.n_steps += 1;
        self.current_time = time;
        self.current_mass = report.total_mass;
        self.cumulative_error += report.signed_error();
        self.cumulative_residual += report.residual;
        self.cumulative_out_flux += report.net_out_flux;
        self.max_residual = self.max_residual.max(report.residual);
        self.max_relative_error = self.max_relative_error.max(report.relative_error());
    }

    /// Steps recorded.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Signed continuity error summed over all steps.
    pub fn cumulative_error(&self) -> f64 {
        self.cumulative_error
    }

    /// Sum of per-step residuals; an upper bound on `|cumulative_error|`.
    pub fn cumulative_residual(&self) -> f64 {
        self.cumulative_residual
    }

    /// Total mass that left through the patch.
    pub fn cumulative_out_flux(&self) -> f64 {
        self.cumulative_out_flux
    }

    /// Largest single-step residual.
    pub fn max_residual(&self) -> f64 {
        self.max_residual
    }

    /// Largest single-step residual relative to total mass.
    pub fn max_relative_error(&self) -> f64 {
        self.max_relative_error
    }

    /// Domain mass before the first recorded step.
    pub fn initial_mass(&self) -> Option<f64> {
        self.initial_mass
    }

    /// Change of domain mass not explained by outflux, relative to the
    /// initial mass.
    pub fn mass_drift(&self) -> f64 {
        match self.initial_mass {
            Some(m0) if m0.abs() > 1e-300 => {
                (self.current_mass - m0 + self.cumulative_out_flux) / m0.abs()
            }
            _ => 0.0,
        }
    }

    /// False once any recorded quantity has become NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.cumulative_error.is_finite()
            && self.cumulative_residual.is_finite()
            && self.current_mass.is_finite()
    }

    /// Multi-line summary of the run.
    pub fn summary(&self) -> String {
        format!(
            "=== Mass Balance Summary ===\n\
             Time: {:.4} s ({} steps)\n\
             Cumulative error:    {:.6e}\n\
             Cumulative residual: {:.6e}\n\
             Max residual:        {:.6e}\n\
             Max relative error:  {:.6e}\n\
             Net outflux:         {:.6e}\n\
             Mass drift:          {:.6e}",
            self.current_time,
            self.n_steps,
            self.cumulative_error,
            self.cumulative_residual,
            self.max_residual,
            self.max_relative_error,
            self.cumulative_out_flux,
            self.mass_drift()
        )
    }

    /// Write the summary to the log, one record per line.
    pub fn log_summary(&self) {
        for line in self.summary().lines() {
            log::info!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tracker() {
        let tracker = MassBalanceTracker::new();
        assert_eq!(tracker.n_steps(), 0);
        assert_eq!(tracker.initial_mass(), None);
        assert_eq!(tracker.mass_drift(), 0.0);
        assert!(tracker.is_finite());
    }

    #[test]
    fn test_accumulates_signed_error() {
        let mut tracker = MassBalanceTracker::new();
        // Mass 10 -> 9.5, 0.5 left through the patch: balanced
        tracker.update(0.1, &MassBalanceReport::from_sums(-0.5, 0.5, 9.5, 1, 1));
        // Mass 9.5 -> 9.3, 0.1 left: 0.1 lost
        tracker.update(0.2, &MassBalanceReport::from_sums(-0.2, 0.1, 9.3, 1, 1));
        // Mass 9.3 -> 9.35, nothing left: 0.05 created
        tracker.update(0.3, &MassBalanceReport::from_sums(0.05, 0.0, 9.35, 1, 1));

        assert_eq!(tracker.n_steps(), 3);
        assert_eq!(tracker.initial_mass(), Some(10.0));
        assert!((tracker.cumulative_error() - (-0.05)).abs() < 1e-12);
        assert!((tracker.cumulative_residual() - 0.15).abs() < 1e-12);
        assert!((tracker.max_residual() - 0.1).abs() < 1e-12);
        assert!((tracker.cumulative_out_flux() - 0.6).abs() < 1e-12);
        // (9.35 - 10 + 0.6) / 10
        assert!((tracker.mass_drift() - (-0.005)).abs() < 1e-12);
    }

    #[test]
    fn test_detects_non_finite() {
        let mut tracker = MassBalanceTracker::new();
        tracker.update(1.0, &MassBalanceReport::from_sums(f64::NAN, 0.0, 1.0, 1, 1));
        assert!(!tracker.is_finite());
    }

    #[test]
    fn test_summary_contents() {
        let mut tracker = MassBalanceTracker::new();
        tracker.update(0.5, &MassBalanceReport::from_sums(0.0, 0.0, 1.0, 1, 1));
        let summary = tracker.summary();
        assert!(summary.contains("1 steps"));
        assert!(summary.contains("Max residual"));
    }
}
