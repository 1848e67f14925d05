//! Mass-continuity check for one time step.
//!
//! Over a step of size `Δt` the mass inside the domain changes by
//!
//! ```text
//! dM = Σ_cells (ρ - ρ⁰) V
//! ```
//!
//! and, for a conservative scheme, that change is balanced by the mass that
//! crossed the open boundary,
//!
//! ```text
//! netOutFlux = Δt Σ_{faces of patch} (ρφ)_f      (outward positive)
//! ```
//!
//! so `|dM + netOutFlux|` should be zero up to round-off. Both sums are
//! formed per partition and then reduced over the whole group.
//!
//! # Example
//!
//! ```
//! use massbal::diagnostics::{MassBalanceChecker, MassBalanceConfig, MassBalanceInput};
//! use massbal::field::{BoundaryField, CellField};
//! use massbal::mesh::{FvMesh, PartitionMesh};
//! use massbal::parallel::SerialComm;
//!
//! let mesh = FvMesh::uniform_column(0.0, 2.0, 2, 1.0);
//! let rho_old = CellField::new(vec![1.0, 1.0]);
//! let rho = CellField::new(vec![1.1, 0.9]);
//! let rho_phi = BoundaryField::uniform(mesh.n_boundary_faces(), 0.0);
//!
//! let checker = MassBalanceChecker::new(MassBalanceConfig::default()).unwrap();
//! let input = MassBalanceInput::from_mesh(&mesh, &rho, &rho_old, &rho_phi, 0.1);
//! let report = checker.check(&mesh, &SerialComm, &input).unwrap();
//! assert!(report.residual < 1e-12);
//! assert!((report.total_mass - 2.0).abs() < 1e-12);
//! ```

use super::config::{MassBalanceConfig, MissingPatchPolicy};
use super::error::MassBalanceError;
use super::report::MassBalanceReport;
use crate::field::{BoundaryField, CellField};
use crate::mesh::PartitionMesh;
use crate::parallel::{CommError, Communicator};

/// Per-step data for one partition, all borrowed from the solver.
#[derive(Clone, Copy, Debug)]
pub struct MassBalanceInput<'a> {
    /// Density at the end of the step
    pub density: &'a CellField,
    /// Density at the start of the step
    pub density_old: &'a CellField,
    /// Cell volumes, aligned with the density fields
    pub cell_volumes: &'a [f64],
    /// Mass flux on every boundary face, outward positive
    pub rho_phi: &'a BoundaryField,
    /// Size of the step just completed
    pub dt: f64,
}

impl<'a> MassBalanceInput<'a> {
    /// Bundle per-step inputs with explicitly supplied cell volumes.
    pub fn new(
        density: &'a CellField,
        density_old: &'a CellField,
        cell_volumes: &'a [f64],
        rho_phi: &'a BoundaryField,
        dt: f64,
    ) -> Self {
        Self {
            density,
            density_old,
            cell_volumes,
            rho_phi,
            dt,
        }
    }

    /// Bundle per-step inputs, taking cell volumes from `mesh`.
    pub fn from_mesh<M: PartitionMesh>(
        mesh: &'a M,
        density: &'a CellField,
        density_old: &'a CellField,
        rho_phi: &'a BoundaryField,
        dt: f64,
    ) -> Self {
        Self::new(density, density_old, mesh.cell_volumes(), rho_phi, dt)
    }
}

/// Reduced buffer: accumulation, outflux, total mass, patch count, failures.
const REDUCED_LEN: usize = 5;

/// Partial sums of one partition before the reduction.
#[derive(Clone, Copy, Debug, PartialEq)]
struct LocalSums {
    accumulation: f64,
    out_flux: f64,
    total_mass: f64,
    patch_found: bool,
}

/// Checks global mass conservation across the configured boundary patch.
///
/// Stateless: each [`check`](Self::check) is a pure function of its inputs.
/// The call is collective, so every partition must make it once per step,
/// including partitions that own no faces of the patch.
#[derive(Clone, Debug)]
pub struct MassBalanceChecker {
    config: MassBalanceConfig,
}

impl MassBalanceChecker {
    /// Create a checker from a validated configuration.
    pub fn new(config: MassBalanceConfig) -> Result<Self, MassBalanceError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Checker for `patch_name` with the default missing-patch policy.
    pub fn for_patch(patch_name: impl Into<String>) -> Result<Self, MassBalanceError> {
        Self::new(MassBalanceConfig::new(patch_name))
    }

    /// Name of the checked patch.
    pub fn patch_name(&self) -> &str {
        &self.config.patch_name
    }

    /// Configuration in use.
    pub fn config(&self) -> &MassBalanceConfig {
        &self.config
    }

    /// Compute the global mass-continuity residual for the step just taken.
    ///
    /// Every rank enters the reduction, including one whose input fails
    /// validation. It contributes zeros and raises a failure count, so the
    /// group stays in step: the failing rank gets its own validation error
    /// and every other rank gets [`MassBalanceError::PartitionFailed`].
    pub fn check<M, C>(
        &self,
        mesh: &M,
        comm: &C,
        input: &MassBalanceInput<'_>,
    ) -> Result<MassBalanceReport, MassBalanceError>
    where
        M: PartitionMesh + ?Sized,
        C: Communicator + ?Sized,
    {
        let local = self.local_sums(mesh, input);
        let contribution = match &local {
            Ok(sums) => {
                if !sums.patch_found {
                    log::trace!(
                        "patch '{}' not present on partition {}",
                        self.config.patch_name,
                        comm.rank()
                    );
                }
                [
                    sums.accumulation,
                    sums.out_flux,
                    sums.total_mass,
                    if sums.patch_found { 1.0 } else { 0.0 },
                    0.0,
                ]
            }
            Err(_) => [0.0, 0.0, 0.0, 0.0, 1.0],
        };

        let reduced = comm.all_reduce_sum(&contribution);
        if let Err(err) = local {
            return Err(err);
        }
        let reduced = reduced?;
        if reduced.len() != REDUCED_LEN {
            return Err(CommError::LengthMismatch {
                expected: REDUCED_LEN,
                actual: reduced.len(),
            }
            .into());
        }

        let failed = reduced[4].round() as usize;
        if failed > 0 {
            return Err(MassBalanceError::PartitionFailed { failed });
        }

        let report = MassBalanceReport::from_sums(
            reduced[0],
            reduced[1],
            reduced[2],
            reduced[3].round() as usize,
            comm.size(),
        );

        if !report.patch_found() {
            match self.config.missing_patch {
                MissingPatchPolicy::Error => {
                    return Err(MassBalanceError::PatchNotFoundAnywhere {
                        patch: self.config.patch_name.clone(),
                        report: Box::new(report),
                    });
                }
                MissingPatchPolicy::Warn => {
                    if comm.rank() == 0 {
                        log::warn!(
                            "patch '{}' not found on any partition, mass balance assumes a closed domain",
                            self.config.patch_name
                        );
                    }
                }
            }
        }

        if comm.rank() == 0 {
            log::info!("{}", report.summary_line());
        }

        Ok(report)
    }

    fn local_sums<M>(
        &self,
        mesh: &M,
        input: &MassBalanceInput<'_>,
    ) -> Result<LocalSums, MassBalanceError>
    where
        M: PartitionMesh + ?Sized,
    {
        let n_cells = mesh.n_cells();
        check_len("density", n_cells, input.density.len())?;
        check_len("density_old", n_cells, input.density_old.len())?;
        check_len("cell_volumes", n_cells, input.cell_volumes.len())?;
        check_len("rho_phi", mesh.n_boundary_faces(), input.rho_phi.len())?;

        if !(input.dt > 0.0 && input.dt.is_finite()) {
            return Err(MassBalanceError::InvalidTimeStep(input.dt));
        }
        if let Some((cell, &volume)) = input
            .cell_volumes
            .iter()
            .enumerate()
            .find(|(_, v)| !(**v > 0.0))
        {
            return Err(MassBalanceError::NonPositiveVolume { cell, volume });
        }

        let patch_faces = mesh
            .find_patch(&self.config.patch_name)
            .map(|p| mesh.patch_faces(p));
        if let Some(faces) = &patch_faces {
            if faces.end > input.rho_phi.len() {
                return Err(MassBalanceError::MisalignedField {
                    field: "rho_phi",
                    expected: faces.end,
                    actual: input.rho_phi.len(),
                });
            }
        }

        let rho = input.density.as_slice();
        let rho_old = input.density_old.as_slice();
        let accumulation = rho
            .iter()
            .zip(rho_old)
            .zip(input.cell_volumes)
            .map(|((r, r0), v)| (r - r0) * v)
            .sum();

        let out_flux = match &patch_faces {
            Some(faces) => input.rho_phi.patch_sum(faces.clone()) * input.dt,
            None => 0.0,
        };

        Ok(LocalSums {
            accumulation,
            out_flux,
            total_mass: input.density.integrate(input.cell_volumes),
            patch_found: patch_faces.is_some(),
        })
    }
}

/// Check one step without keeping a checker around.
pub fn mass_continuity_error<M, C>(
    config: &MassBalanceConfig,
    mesh: &M,
    comm: &C,
    input: &MassBalanceInput<'_>,
) -> Result<MassBalanceReport, MassBalanceError>
where
    M: PartitionMesh + ?Sized,
    C: Communicator + ?Sized,
{
    MassBalanceChecker::new(config.clone())?.check(mesh, comm, input)
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<(), MassBalanceError> {
    if expected != actual {
        return Err(MassBalanceError::MisalignedField {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{BoundaryPatch, FvMesh};
    use crate::parallel::{thread_group, SerialComm};
    use crate::types::CellIndex;

    fn two_cell_mesh() -> FvMesh {
        FvMesh::new(
            vec![1.0, 1.0],
            vec![CellIndex::new(0), CellIndex::new(1)],
            vec![
                BoundaryPatch::new("walls", 0, 1),
                BoundaryPatch::new("atmosphere", 1, 1),
            ],
        )
        .unwrap()
    }

    fn checker() -> MassBalanceChecker {
        MassBalanceChecker::new(MassBalanceConfig::default()).unwrap()
    }

    #[test]
    fn test_two_cell_scenario() {
        let mesh = two_cell_mesh();
        let rho_old = CellField::new(vec![1.0, 1.0]);
        let rho = CellField::new(vec![1.1, 0.9]);
        let phi = BoundaryField::uniform(2, 0.0);
        let input = MassBalanceInput::from_mesh(&mesh, &rho, &rho_old, &phi, 0.5);

        let report = checker().check(&mesh, &SerialComm, &input).unwrap();
        assert!(report.accumulation.abs() < 1e-15);
        assert_eq!(report.net_out_flux, 0.0);
        assert!(report.residual < 1e-15);
        assert!((report.total_mass - 2.0).abs() < 1e-15);
        assert_eq!(report.patch_partitions, 1);
        assert_eq!(report.n_partitions, 1);
    }

    #[test]
    fn test_only_named_patch_contributes() {
        let mesh = two_cell_mesh();
        let rho = CellField::uniform(2, 1.0);
        // Flux through "walls" must be ignored
        let phi = BoundaryField::new(vec![100.0, 0.5]);
        let input = MassBalanceInput::from_mesh(&mesh, &rho, &rho, &phi, 0.2);

        let report = checker().check(&mesh, &SerialComm, &input).unwrap();
        assert!((report.net_out_flux - 0.1).abs() < 1e-15);
        assert!((report.residual - 0.1).abs() < 1e-15);
    }

    #[test]
    fn test_unchanged_density_closed_domain_is_exact() {
        let mesh = two_cell_mesh();
        let rho = CellField::new(vec![998.2, 1.2]);
        let phi = BoundaryField::uniform(2, 0.0);
        let input = MassBalanceInput::from_mesh(&mesh, &rho, &rho, &phi, 1e-3);

        let report = checker().check(&mesh, &SerialComm, &input).unwrap();
        assert_eq!(report.residual, 0.0);
    }

    #[test]
    fn test_misaligned_density() {
        let mesh = two_cell_mesh();
        let rho = CellField::uniform(2, 1.0);
        let rho_old = CellField::uniform(3, 1.0);
        let phi = BoundaryField::uniform(2, 0.0);
        let input = MassBalanceInput::from_mesh(&mesh, &rho, &rho_old, &phi, 0.1);

        let err = checker().check(&mesh, &SerialComm, &input).unwrap_err();
        assert_eq!(
            err,
            MassBalanceError::MisalignedField {
                field: "density_old",
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_misaligned_volumes_and_flux() {
        let mesh = two_cell_mesh();
        let rho = CellField::uniform(2, 1.0);
        let phi = BoundaryField::uniform(2, 0.0);
        let volumes = [1.0];
        let input = MassBalanceInput::new(&rho, &rho, &volumes, &phi, 0.1);
        assert!(matches!(
            checker().check(&mesh, &SerialComm, &input),
            Err(MassBalanceError::MisalignedField { field: "cell_volumes", .. })
        ));

        let short_phi = BoundaryField::uniform(1, 0.0);
        let input = MassBalanceInput::from_mesh(&mesh, &rho, &rho, &short_phi, 0.1);
        assert!(matches!(
            checker().check(&mesh, &SerialComm, &input),
            Err(MassBalanceError::MisalignedField { field: "rho_phi", .. })
        ));
    }

    #[test]
    fn test_invalid_time_step() {
        let mesh = two_cell_mesh();
        let rho = CellField::uniform(2, 1.0);
        let phi = BoundaryField::uniform(2, 0.0);
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let input = MassBalanceInput::from_mesh(&mesh, &rho, &rho, &phi, dt);
            assert!(matches!(
                checker().check(&mesh, &SerialComm, &input),
                Err(MassBalanceError::InvalidTimeStep(_))
            ));
        }
    }

    #[test]
    fn test_non_positive_volume_in_input() {
        let mesh = two_cell_mesh();
        let rho = CellField::uniform(2, 1.0);
        let phi = BoundaryField::uniform(2, 0.0);
        let volumes = [1.0, -0.5];
        let input = MassBalanceInput::new(&rho, &rho, &volumes, &phi, 0.1);
        assert_eq!(
            checker().check(&mesh, &SerialComm, &input).unwrap_err(),
            MassBalanceError::NonPositiveVolume {
                cell: 1,
                volume: -0.5
            }
        );
    }

    #[test]
    fn test_missing_patch_error_policy() {
        let mesh = two_cell_mesh();
        let rho_old = CellField::uniform(2, 1.0);
        let rho = CellField::new(vec![1.0, 0.8]);
        let phi = BoundaryField::uniform(2, 3.0);
        let input = MassBalanceInput::from_mesh(&mesh, &rho, &rho_old, &phi, 0.1);

        let checker = MassBalanceChecker::for_patch("outlet").unwrap();
        match checker.check(&mesh, &SerialComm, &input) {
            Err(MassBalanceError::PatchNotFoundAnywhere { patch, report }) => {
                assert_eq!(patch, "outlet");
                assert_eq!(report.net_out_flux, 0.0);
                assert!((report.residual - 0.2).abs() < 1e-12);
            }
            other => panic!("expected PatchNotFoundAnywhere, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_patch_warn_policy() {
        let mesh = two_cell_mesh();
        let rho = CellField::uniform(2, 1.0);
        let phi = BoundaryField::uniform(2, 3.0);
        let input = MassBalanceInput::from_mesh(&mesh, &rho, &rho, &phi, 0.1);

        let config = MassBalanceConfig::new("outlet").with_missing_patch(MissingPatchPolicy::Warn);
        let report = mass_continuity_error(&config, &mesh, &SerialComm, &input).unwrap();
        assert!(!report.patch_found());
        assert_eq!(report.net_out_flux, 0.0);
        assert_eq!(report.residual, 0.0);
    }

    #[test]
    fn test_reduction_failure_is_propagated() {
        struct BrokenComm;
        impl Communicator for BrokenComm {
            fn rank(&self) -> usize {
                0
            }
            fn size(&self) -> usize {
                2
            }
            fn all_reduce_sum(&self, _local: &[f64]) -> Result<Vec<f64>, CommError> {
                Err(CommError::GroupAborted)
            }
        }

        let mesh = two_cell_mesh();
        let rho = CellField::uniform(2, 1.0);
        let phi = BoundaryField::uniform(2, 0.0);
        let input = MassBalanceInput::from_mesh(&mesh, &rho, &rho, &phi, 0.1);
        assert_eq!(
            checker().check(&mesh, &BrokenComm, &input).unwrap_err(),
            MassBalanceError::Reduction(CommError::GroupAborted)
        );
    }

    #[test]
    fn test_empty_patch_name_rejected() {
        assert_eq!(
            MassBalanceChecker::for_patch("").unwrap_err(),
            MassBalanceError::EmptyPatchName
        );
    }

    #[test]
    fn test_empty_patch_counts_as_present() {
        let mesh = FvMesh::new(
            vec![1.0, 1.0],
            vec![CellIndex::new(0), CellIndex::new(1)],
            vec![
                BoundaryPatch::new("walls", 0, 2),
                BoundaryPatch::new("atmosphere", 2, 0),
            ],
        )
        .unwrap();
        let rho = CellField::uniform(2, 1.0);
        let phi = BoundaryField::uniform(2, 4.0);
        let input = MassBalanceInput::from_mesh(&mesh, &rho, &rho, &phi, 0.1);

        let report = checker().check(&mesh, &SerialComm, &input).unwrap();
        assert_eq!(report.patch_partitions, 1);
        assert!(report.patch_found());
        assert_eq!(report.net_out_flux, 0.0);
    }

    #[test]
    fn test_rejected_input_keeps_group_in_step() {
        // Rank 1 passes a short density field at step 0 only. Both ranks keep
        // their communicator and go on to step 1.
        let mesh = two_cell_mesh();
        let comms = thread_group(2);

        let results: Vec<Vec<Result<MassBalanceReport, MassBalanceError>>> =
            std::thread::scope(|s| {
                let handles: Vec<_> = comms
                    .into_iter()
                    .map(|comm| {
                        let mesh = &mesh;
                        s.spawn(move || {
                            let checker = checker();
                            let phi = BoundaryField::uniform(2, 0.0);
                            let rho_old = CellField::uniform(2, 1.0);
                            (0..2)
                                .map(|step| {
                                    let rank = comm.rank();
                                    // Step 0 gains 1 per rank; step 1 gains 10
                                    let gain = if step == 0 { 0.5 } else { 5.0 };
                                    let n = if rank == 1 && step == 0 { 1 } else { 2 };
                                    let rho = CellField::uniform(n, 1.0 + gain);
                                    let input = MassBalanceInput::from_mesh(
                                        mesh, &rho, &rho_old, &phi, 0.1,
                                    );
                                    checker.check(mesh, &comm, &input)
                                })
                                .collect::<Vec<_>>()
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

        assert_eq!(
            results[0][0],
            Err(MassBalanceError::PartitionFailed { failed: 1 })
        );
        assert_eq!(
            results[1][0],
            Err(MassBalanceError::MisalignedField {
                field: "density",
                expected: 2,
                actual: 1
            })
        );
        for rank_results in &results {
            let report = rank_results[1].as_ref().unwrap();
            assert!((report.accumulation - 20.0).abs() < 1e-12);
            assert_eq!(report.n_partitions, 2);
        }
    }
}
