//! Typed failures signaled by the calculation engine.

use thiserror::Error;

/// The error kinds a calculation can fail with.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// The requested calculation is inconsistent with the configured state,
    /// or a supplied configuration value is malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Beam sampling exceeded the resampling retry bound.
    #[error("beam sampling exceeded {max_attempts} resampling attempts")]
    Sampling { max_attempts: usize },

    /// Trajectory integration produced a superluminal or non-finite state.
    #[error("trajectory integration diverged at t = {time:e} s: {reason}")]
    Divergence { time: f64, reason: String },

    /// A query fell outside the domain covered by the available data.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// The requested execution backend could not be used.
    #[error("execution error: {0}")]
    Execution(String),

    /// A per-particle task of an ensemble run failed.
    #[error("particle task {particle_index} failed: {source}")]
    ParticleTask {
        particle_index: usize,
        source: Box<SimulationError>,
    },

    /// Reading a field sample file failed.
    #[error("could not read field file: {0}")]
    Io(#[from] std::io::Error),
}

impl SimulationError {
    /// Wraps the error with the index of the ensemble particle task
    /// it occurred in.
    pub fn for_particle(self, particle_index: usize) -> Self {
        Self::ParticleTask {
            particle_index,
            source: Box::new(self),
        }
    }
}

/// Convenience alias for results with a [`SimulationError`] error type.
pub type SimulationResult<T> = Result<T, SimulationError>;
