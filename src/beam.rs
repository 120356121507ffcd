//! Statistical particle beam descriptions and phase-space sampling.

use crate::constants::{ELEMENTARY_CHARGE, EV_TO_J, M_ELECTRON, M_PROTON, SPEED_OF_LIGHT};
use crate::error::{SimulationError, SimulationResult};
use crate::geometry::{orthonormal_basis, Point3, Vec3};
use crate::random::{derive_stream_seed, truncated_standard_normal};
use rand::{rngs::StdRng, Rng, RngExt, SeedableRng};
use rand_distr::StandardNormal;

/// Floating-point precision to use for beam physics.
#[allow(non_camel_case_types)]
pub type fbm = f64;

/// The charged particle species a beam consists of.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Species {
    Electron,
    Positron,
    Proton,
    /// A custom species with the given charge [C] and mass [kg].
    Custom { charge: fbm, mass: fbm },
}

impl Species {
    /// Returns the charge of the species [C].
    pub fn charge(&self) -> fbm {
        match self {
            Self::Electron => -ELEMENTARY_CHARGE,
            Self::Positron | Self::Proton => ELEMENTARY_CHARGE,
            Self::Custom { charge, .. } => *charge,
        }
    }

    /// Returns the rest mass of the species [kg].
    pub fn mass(&self) -> fbm {
        match self {
            Self::Electron | Self::Positron => M_ELECTRON,
            Self::Proton => M_PROTON,
            Self::Custom { mass, .. } => *mass,
        }
    }

    /// Returns the rest energy of the species [eV].
    pub fn rest_energy_ev(&self) -> fbm {
        self.mass() * SPEED_OF_LIGHT * SPEED_OF_LIGHT / EV_TO_J
    }
}

/// Configuration parameters for beam phase-space sampling.
#[derive(Clone, Copy, Debug)]
pub struct SamplingConfig {
    /// Number of standard deviations the energy distribution is
    /// truncated at, by rejecting and redrawing samples beyond it.
    pub truncation_sigmas: fbm,
    /// Upper bound on redraws before sampling fails.
    pub max_resampling_attempts: usize,
}

impl SamplingConfig {
    pub const DEFAULT_TRUNCATION_SIGMAS: fbm = 6.0;
    pub const DEFAULT_MAX_RESAMPLING_ATTEMPTS: usize = 1000;
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            truncation_sigmas: Self::DEFAULT_TRUNCATION_SIGMAS,
            max_resampling_attempts: Self::DEFAULT_MAX_RESAMPLING_ATTEMPTS,
        }
    }
}

/// Describes a statistical ensemble of particles sharing a species,
/// central energy and phase-space envelope.
#[derive(Clone, Debug)]
pub struct ParticleBeamSpec {
    /// Particle species of the beam.
    pub species: Species,
    /// Central total energy [eV].
    pub energy_ev: fbm,
    /// Relative Gaussian energy spread (sigma over central energy).
    pub relative_energy_spread: fbm,
    /// Initial position of the beam centroid [m].
    pub position: Point3<fbm>,
    /// Initial propagation direction (normalized on registration).
    pub direction: Vec3<fbm>,
    /// Horizontal emittance [m rad].
    pub horizontal_emittance: fbm,
    /// Vertical emittance [m rad].
    pub vertical_emittance: fbm,
    /// Horizontal beta function at the initial position [m].
    pub horizontal_beta: fbm,
    /// Vertical beta function at the initial position [m].
    pub vertical_beta: fbm,
    /// Beam current [A], used to normalize flux and power results.
    pub current: fbm,
    /// Statistical weight for multi-beam superposition.
    pub weight: fbm,
}

impl ParticleBeamSpec {
    pub const DEFAULT_CURRENT: fbm = 0.1;

    /// Creates a monochromatic zero-emittance beam of the given species,
    /// energy, initial position and direction.
    pub fn filament(
        species: Species,
        energy_ev: fbm,
        position: Point3<fbm>,
        direction: Vec3<fbm>,
    ) -> Self {
        Self {
            species,
            energy_ev,
            relative_energy_spread: 0.0,
            position,
            direction,
            horizontal_emittance: 0.0,
            vertical_emittance: 0.0,
            horizontal_beta: 1.0,
            vertical_beta: 1.0,
            current: Self::DEFAULT_CURRENT,
            weight: 1.0,
        }
    }

    /// Whether the beam has zero spread and zero emittance, so that every
    /// sample is the identical central particle.
    pub fn is_filament(&self) -> bool {
        self.relative_energy_spread == 0.0
            && self.horizontal_emittance == 0.0
            && self.vertical_emittance == 0.0
    }

    /// Checks the beam parameters for consistency.
    fn validate(&self) -> SimulationResult<()> {
        if self.direction.is_zero() || !self.direction.is_finite() {
            return Err(SimulationError::Configuration(
                "beam direction must be a non-zero finite vector".to_string(),
            ));
        }
        if self.species.mass() <= 0.0 || self.species.charge() == 0.0 {
            return Err(SimulationError::Configuration(
                "beam species must have positive mass and non-zero charge".to_string(),
            ));
        }
        if self.energy_ev <= self.species.rest_energy_ev() {
            return Err(SimulationError::Configuration(format!(
                "beam energy {:e} eV does not exceed the species rest energy {:e} eV",
                self.energy_ev,
                self.species.rest_energy_ev()
            )));
        }
        if self.weight < 0.0 {
            return Err(SimulationError::Configuration(
                "beam weight must be non-negative".to_string(),
            ));
        }
        if self.relative_energy_spread < 0.0
            || self.horizontal_emittance < 0.0
            || self.vertical_emittance < 0.0
        {
            return Err(SimulationError::Configuration(
                "beam spread and emittances must be non-negative".to_string(),
            ));
        }
        if self.horizontal_beta <= 0.0 || self.vertical_beta <= 0.0 {
            return Err(SimulationError::Configuration(
                "beam beta functions must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the central particle of the beam without involving
    /// any random sampling.
    pub fn central_particle(&self) -> Particle {
        Particle::from_energy(
            self.species,
            self.energy_ev,
            self.position,
            self.direction.normalized(),
            self.weight,
        )
    }

    fn sample<R: Rng>(&self, rng: &mut R, config: &SamplingConfig) -> SimulationResult<Particle> {
        if self.is_filament() {
            return Ok(self.central_particle());
        }

        let energy_ev = if self.relative_energy_spread > 0.0 {
            self.sample_energy(rng, config)?
        } else {
            self.energy_ev
        };

        let direction = self.direction.normalized();
        let (horizontal, vertical) = orthonormal_basis(&direction);

        let mut position = self.position;
        let mut propagation = direction;
        if self.horizontal_emittance > 0.0 {
            let (offset, angle) =
                sample_phase_plane(rng, self.horizontal_emittance, self.horizontal_beta);
            position = position + &horizontal * offset;
            propagation = propagation + &horizontal * angle;
        }
        if self.vertical_emittance > 0.0 {
            let (offset, angle) =
                sample_phase_plane(rng, self.vertical_emittance, self.vertical_beta);
            position = position + &vertical * offset;
            propagation = propagation + &vertical * angle;
        }

        Ok(Particle::from_energy(
            self.species,
            energy_ev,
            position,
            propagation.normalized(),
            self.weight,
        ))
    }

    fn sample_energy<R: Rng>(
        &self,
        rng: &mut R,
        config: &SamplingConfig,
    ) -> SimulationResult<fbm> {
        let rest_energy = self.species.rest_energy_ev();
        for _ in 0..config.max_resampling_attempts {
            let deviate = truncated_standard_normal(
                rng,
                config.truncation_sigmas,
                config.max_resampling_attempts,
            )?;
            let energy = self.energy_ev * (1.0 + self.relative_energy_spread * deviate);
            // Subluminal samples only; reject the unphysical tail.
            if energy > rest_energy {
                return Ok(energy);
            }
        }
        Err(SimulationError::Sampling {
            max_attempts: config.max_resampling_attempts,
        })
    }
}

/// Draws a transverse (offset, angle) pair from the uncorrelated Gaussian
/// phase-space ellipse defined by an emittance and beta function.
fn sample_phase_plane<R: Rng>(rng: &mut R, emittance: fbm, beta_function: fbm) -> (fbm, fbm) {
    let offset_deviate: fbm = rng.sample(StandardNormal);
    let angle_deviate: fbm = rng.sample(StandardNormal);
    (
        (emittance * beta_function).sqrt() * offset_deviate,
        (emittance / beta_function).sqrt() * angle_deviate,
    )
}

/// One sampled particle instance. Immutable once sampled.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    position: Point3<fbm>,
    beta: Vec3<fbm>,
    energy_ev: fbm,
    charge: fbm,
    mass: fbm,
    weight: fbm,
}

impl Particle {
    /// Creates a particle of the given species moving along `direction`
    /// with the given total energy.
    pub fn from_energy(
        species: Species,
        energy_ev: fbm,
        position: Point3<fbm>,
        direction: Vec3<fbm>,
        weight: fbm,
    ) -> Self {
        let lorentz_factor = crate::units::lorentz_factor(energy_ev, species.mass());
        let speed_fraction = crate::units::beta_from_lorentz_factor(lorentz_factor);
        Self {
            position,
            beta: direction * speed_fraction,
            energy_ev,
            charge: species.charge(),
            mass: species.mass(),
            weight,
        }
    }

    /// Returns the initial position [m].
    pub fn position(&self) -> &Point3<fbm> {
        &self.position
    }

    /// Returns the initial velocity as a fraction of the speed of light.
    pub fn beta(&self) -> &Vec3<fbm> {
        &self.beta
    }

    /// Returns the total energy [eV].
    pub fn energy_ev(&self) -> fbm {
        self.energy_ev
    }

    /// Returns the charge [C].
    pub fn charge(&self) -> fbm {
        self.charge
    }

    /// Returns the rest mass [kg].
    pub fn mass(&self) -> fbm {
        self.mass
    }

    /// Returns the statistical weight inherited from the beam.
    pub fn weight(&self) -> fbm {
        self.weight
    }

    /// Returns the Lorentz factor of the particle.
    pub fn lorentz_factor(&self) -> fbm {
        crate::units::lorentz_factor(self.energy_ev, self.mass)
    }
}

/// The set of particle beams contributing to a run, sampled by
/// per-particle-index deterministic random number streams.
#[derive(Clone, Debug, Default)]
pub struct BeamSet {
    beams: Vec<ParticleBeamSpec>,
}

impl BeamSet {
    /// Creates an empty beam set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all registered beams with the given one.
    pub fn set_beam(&mut self, spec: ParticleBeamSpec) -> SimulationResult<()> {
        spec.validate()?;
        self.beams.clear();
        self.beams.push(spec);
        Ok(())
    }

    /// Registers an additional beam for weighted superposition.
    pub fn add_beam(&mut self, spec: ParticleBeamSpec) -> SimulationResult<()> {
        spec.validate()?;
        self.beams.push(spec);
        Ok(())
    }

    /// Removes all registered beams.
    pub fn clear(&mut self) {
        self.beams.clear();
    }

    /// Whether no beam is registered.
    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }

    /// Returns the registered beams.
    pub fn beams(&self) -> &[ParticleBeamSpec] {
        &self.beams
    }

    /// Returns the summed current of all registered beams [A].
    pub fn total_current(&self) -> fbm {
        self.beams.iter().map(|beam| beam.current).sum()
    }

    /// Whether every sampled particle is the identical central one.
    pub fn is_filament(&self) -> bool {
        self.beams.len() == 1 && self.beams[0].is_filament()
    }

    /// Samples the particle with the given index, using an independent
    /// random number stream derived from the base seed and the index.
    ///
    /// A filament beam set takes a deterministic branch that never
    /// constructs the random number generator. With several beams
    /// registered, the contributing beam is drawn uniformly and the
    /// particle inherits that beam's statistical weight.
    pub fn sample_particle(
        &self,
        particle_index: usize,
        base_seed: u64,
        config: &SamplingConfig,
    ) -> SimulationResult<Particle> {
        if self.beams.is_empty() {
            return Err(SimulationError::Configuration(
                "no particle beam has been set".to_string(),
            ));
        }
        if self.is_filament() {
            return Ok(self.beams[0].central_particle());
        }

        let mut rng = StdRng::seed_from_u64(derive_stream_seed(
            base_seed,
            particle_index as u64,
        ));
        let beam = if self.beams.len() == 1 {
            &self.beams[0]
        } else {
            &self.beams[rng.random_range(0..self.beams.len())]
        };
        beam.sample(&mut rng, config)
    }
}
