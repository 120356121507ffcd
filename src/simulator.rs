//! Top-level calculation entry points combining the field model, beam
//! model, trajectory integrator, radiation calculator and ensemble
//! executor.

use crate::beam::{BeamSet, ParticleBeamSpec, SamplingConfig};
use crate::ensemble::{EnsembleRunner, ExecutionConfig, RunContext, Verbose};
use crate::error::{SimulationError, SimulationResult};
use crate::field::{
    file::read_field_file, FieldContributor, FieldKind, FieldModel, Placement,
};
use crate::geometry::Point3;
use crate::radiation::{
    frd, lienard_wiechert, power, spectrum as spectral, FieldSample, Spectrum, SurfaceMap,
    SurfaceRectangle,
};
use crate::trajectory::{rk4, TimeWindow, Trajectory};
use std::path::Path;

/// A complete radiation simulation setup: field configuration, particle
/// beams, the integration time window and execution settings.
///
/// All configuration is explicit, per-instance state; concurrent
/// simulators do not share anything.
pub struct Simulator {
    field_model: FieldModel,
    beam_set: BeamSet,
    execution: ExecutionConfig,
    context: RunContext,
    window: Option<TimeWindow>,
}

impl Simulator {
    /// Creates a simulator with no fields, beams or time window.
    pub fn new() -> Self {
        Self {
            field_model: FieldModel::new(),
            beam_set: BeamSet::new(),
            execution: ExecutionConfig::default(),
            context: RunContext::default(),
            window: None,
        }
    }

    // --- configuration ---

    /// Registers a magnetic field contributor.
    pub fn add_bfield<C: FieldContributor + 'static>(
        &mut self,
        contributor: C,
        placement: Placement,
    ) {
        self.field_model
            .add_field(FieldKind::Magnetic, contributor, placement);
    }

    /// Registers an electric field contributor.
    pub fn add_efield<C: FieldContributor + 'static>(
        &mut self,
        contributor: C,
        placement: Placement,
    ) {
        self.field_model
            .add_field(FieldKind::Electric, contributor, placement);
    }

    /// Registers a magnetic field interpolated from a sample file.
    pub fn add_bfield_file(
        &mut self,
        file_path: &Path,
        format: &str,
        placement: Placement,
    ) -> SimulationResult<()> {
        let field = read_field_file(file_path, format)?;
        self.add_bfield(field, placement);
        Ok(())
    }

    /// Registers an electric field interpolated from a sample file.
    pub fn add_efield_file(
        &mut self,
        file_path: &Path,
        format: &str,
        placement: Placement,
    ) -> SimulationResult<()> {
        let field = read_field_file(file_path, format)?;
        self.add_efield(field, placement);
        Ok(())
    }

    /// Removes all magnetic field contributors.
    pub fn clear_bfields(&mut self) {
        self.field_model.clear_fields(FieldKind::Magnetic);
    }

    /// Removes all electric field contributors.
    pub fn clear_efields(&mut self) {
        self.field_model.clear_fields(FieldKind::Electric);
    }

    /// Replaces all beams with the given one.
    pub fn set_particle_beam(&mut self, spec: ParticleBeamSpec) -> SimulationResult<()> {
        self.beam_set.set_beam(spec)
    }

    /// Registers an additional beam for weighted superposition.
    pub fn add_particle_beam(&mut self, spec: ParticleBeamSpec) -> SimulationResult<()> {
        self.beam_set.add_beam(spec)
    }

    /// Removes all registered beams.
    pub fn clear_particle_beams(&mut self) {
        self.beam_set.clear();
    }

    /// Sets the base seed for the per-particle random number streams.
    pub fn set_seed(&mut self, seed: u64) {
        self.context.seed = seed;
    }

    /// Sets the execution backend and failure policy.
    pub fn set_execution_config(&mut self, execution: ExecutionConfig) {
        self.execution = execution;
    }

    /// Sets the beam sampling configuration.
    pub fn set_sampling_config(&mut self, sampling: SamplingConfig) {
        self.context.sampling = sampling;
    }

    /// Sets whether to report progress while running.
    pub fn set_verbose(&mut self, verbose: Verbose) {
        self.context.verbose = verbose;
    }

    /// Sets the time window particle trajectories are integrated over.
    pub fn set_time_window(
        &mut self,
        t_start: f64,
        t_stop: f64,
        n_points: usize,
    ) -> SimulationResult<()> {
        self.window = Some(TimeWindow::new(t_start, t_stop, n_points)?);
        Ok(())
    }

    // --- calculations ---

    /// Integrates the trajectory of the ideal (central) particle of the
    /// primary beam over the given window.
    pub fn calculate_trajectory(
        &self,
        t_start: f64,
        t_stop: f64,
        n_points: usize,
    ) -> SimulationResult<Trajectory> {
        self.require_fields()?;
        let particle = self.primary_beam()?.central_particle();
        rk4::integrate(&particle, &self.field_model, t_start, t_stop, n_points)
    }

    /// Computes the retarded electric field of the ideal particle at the
    /// given observer over a uniform grid of observation times.
    pub fn calculate_efield_vs_time(
        &self,
        observer: &Point3<frd>,
        t_start: f64,
        t_stop: f64,
        n_points: usize,
    ) -> SimulationResult<Vec<FieldSample>> {
        self.require_fields()?;
        let particle = self.primary_beam()?.central_particle();
        let window = self.window()?;
        let trajectory = rk4::integrate(
            &particle,
            &self.field_model,
            window.t_start,
            window.t_stop,
            window.n_points,
        )?;
        lienard_wiechert::field_vs_time(
            &trajectory,
            observer,
            t_start,
            t_stop,
            n_points,
            particle.charge(),
        )
    }

    /// Computes the ensemble-averaged spectral flux at the given
    /// observer for the given photon energies [eV].
    pub fn calculate_spectrum(
        &self,
        observer: &Point3<frd>,
        photon_energies: &[frd],
        n_particles: usize,
    ) -> SimulationResult<Spectrum> {
        self.require_fields()?;
        let current = self.beam_set.total_current();
        let observer = *observer;
        let energies = photon_energies.to_vec();

        let fluxes = self.run_ensemble(n_particles, photon_energies.len(), {
            let energies = energies.clone();
            move |particle: &crate::beam::Particle, trajectory: &Trajectory| {
                spectral::spectrum(trajectory, &observer, &energies, particle.charge(), current)
                    .map(|spectrum| spectrum.fluxes)
            }
        })?;

        Ok(Spectrum {
            photon_energies: energies,
            fluxes,
        })
    }

    /// Computes the ensemble-averaged photon flux at one photon energy
    /// [eV] over the given observation rectangle.
    pub fn calculate_flux_rectangle(
        &self,
        surface: SurfaceRectangle,
        photon_energy: frd,
        n_particles: usize,
    ) -> SimulationResult<SurfaceMap> {
        self.require_fields()?;
        let current = self.beam_set.total_current();
        let points = surface.points();

        let values = self.run_ensemble(n_particles, points.len(), {
            let points = points.clone();
            move |particle: &crate::beam::Particle, trajectory: &Trajectory| {
                points
                    .iter()
                    .map(|point| {
                        spectral::spectrum(
                            trajectory,
                            point,
                            &[photon_energy],
                            particle.charge(),
                            current,
                        )
                        .map(|spectrum| spectrum.fluxes[0])
                    })
                    .collect()
            }
        })?;

        SurfaceMap::from_flat_values(surface, values)
    }

    /// Computes the ensemble-averaged radiated power density [W/mm^2]
    /// received at a single observation point.
    pub fn calculate_power_density(
        &self,
        observer: &Point3<frd>,
        n_particles: usize,
    ) -> SimulationResult<frd> {
        self.require_fields()?;
        let current = self.beam_set.total_current();
        let observer = *observer;

        let values = self.run_ensemble(n_particles, 1, {
            move |particle: &crate::beam::Particle, trajectory: &Trajectory| {
                power::power_density_at(trajectory, &observer, particle.charge(), current)
                    .map(|density| vec![density])
            }
        })?;
        Ok(values[0])
    }

    /// Computes the ensemble-averaged radiated power density [W/mm^2]
    /// over the given observation rectangle.
    pub fn calculate_power_density_rectangle(
        &self,
        surface: SurfaceRectangle,
        n_particles: usize,
    ) -> SimulationResult<SurfaceMap> {
        self.require_fields()?;
        let current = self.beam_set.total_current();

        let values = self.run_ensemble(n_particles, surface.number_of_points(), {
            let surface = surface.clone();
            move |particle: &crate::beam::Particle, trajectory: &Trajectory| {
                power::power_density_over_surface(
                    trajectory,
                    &surface,
                    particle.charge(),
                    current,
                )
            }
        })?;

        SurfaceMap::from_flat_values(surface, values)
    }

    /// Computes the ensemble-averaged total radiated power [W] over the
    /// modeled region.
    pub fn calculate_total_power(&self, n_particles: usize) -> SimulationResult<frd> {
        self.require_fields()?;
        let current = self.beam_set.total_current();

        let values = self.run_ensemble(n_particles, 1, {
            move |particle: &crate::beam::Particle, trajectory: &Trajectory| {
                power::total_power(trajectory, particle.charge(), current)
                    .map(|total| vec![total])
            }
        })?;
        Ok(values[0])
    }

    // --- helpers ---

    fn run_ensemble<Q>(
        &self,
        n_particles: usize,
        number_of_values: usize,
        quantity: Q,
    ) -> SimulationResult<Vec<frd>>
    where
        Q: Fn(&crate::beam::Particle, &Trajectory) -> SimulationResult<Vec<frd>> + Sync,
    {
        let runner = EnsembleRunner::new(
            &self.field_model,
            &self.beam_set,
            self.window()?,
            self.execution,
            self.context,
        );
        runner
            .run(n_particles, number_of_values, &quantity)?
            .weighted_mean()
    }

    fn window(&self) -> SimulationResult<TimeWindow> {
        self.window.ok_or_else(|| {
            SimulationError::Configuration(
                "no time window has been set; call set_time_window first".to_string(),
            )
        })
    }

    fn primary_beam(&self) -> SimulationResult<&ParticleBeamSpec> {
        self.beam_set.beams().first().ok_or_else(|| {
            SimulationError::Configuration("no particle beam has been set".to_string())
        })
    }

    fn require_fields(&self) -> SimulationResult<()> {
        if self.field_model.is_empty() {
            return Err(SimulationError::Configuration(
                "no field contributor has been registered".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}
