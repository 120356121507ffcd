//! Fan-out execution of independent per-particle tasks and weighted
//! reduction of their results.

use crate::beam::{BeamSet, Particle, SamplingConfig};
use crate::error::{SimulationError, SimulationResult};
use crate::field::FieldModel;
use crate::trajectory::{rk4, TimeWindow, Trajectory};
use indicatif::ProgressBar;
use log::warn;
use rayon::prelude::*;

/// Floating-point precision to use for ensemble reductions.
#[allow(non_camel_case_types)]
pub type fen = f64;

/// Whether or not to print non-critical status messages.
#[derive(Clone, Copy, Debug)]
pub enum Verbose {
    Yes,
    No,
}

impl Verbose {
    pub fn is_yes(&self) -> bool {
        match self {
            Verbose::Yes => true,
            Verbose::No => false,
        }
    }
}

/// The execution backend particle tasks are dispatched on.
///
/// Every backend runs the identical ensemble algorithm; only the
/// dispatch and reduction mechanics differ, so results agree across
/// backends up to floating-point summation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionBackend {
    /// Synchronous execution on the calling thread.
    SingleThreaded,
    /// A bounded worker pool; `num_threads = 0` sizes the pool
    /// automatically.
    ThreadPool { num_threads: usize },
    /// Accelerator offload (not available in this build).
    Accelerator,
    /// Multi-process distributed reduction (not available in this build).
    Distributed,
}

/// How the ensemble reacts to a failed particle task.
///
/// Configuration and sampling errors always abort the run; the policy
/// applies to per-particle numerical failures (divergence, out-of-range
/// radiation queries).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the whole run, reporting the failing particle index.
    Abort,
    /// Drop the failed task's weight from the reduction and log a
    /// warning naming the particle index.
    ExcludeAndWarn,
}

/// Execution configuration for ensemble runs.
#[derive(Clone, Copy, Debug)]
pub struct ExecutionConfig {
    pub backend: ExecutionBackend,
    pub failure_policy: FailurePolicy,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            backend: ExecutionBackend::SingleThreaded,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

/// Explicit per-run state, replacing process-wide configuration so that
/// concurrent runs stay isolated.
#[derive(Clone, Copy, Debug)]
pub struct RunContext {
    /// Base seed the per-particle random number streams derive from.
    pub seed: u64,
    /// Beam sampling configuration.
    pub sampling: SamplingConfig,
    /// Whether to report progress while running.
    pub verbose: Verbose,
}

impl RunContext {
    pub const DEFAULT_SEED: u64 = 1;
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            seed: Self::DEFAULT_SEED,
            sampling: SamplingConfig::default(),
            verbose: Verbose::No,
        }
    }
}

/// Weighted sums of per-particle quantities, merged associatively and
/// commutatively from partial results.
///
/// The final value of each observation coordinate is
/// `sum(weight_i * quantity_i) / sum(weight_i)`, independent of merge
/// order up to floating-point summation order.
#[derive(Clone, Debug)]
pub struct ResultAccumulator {
    weighted_sums: Vec<fen>,
    total_weight: fen,
    contributing_tasks: usize,
}

impl ResultAccumulator {
    /// Creates an empty accumulator for the given number of observation
    /// coordinates.
    pub fn new(number_of_values: usize) -> Self {
        Self {
            weighted_sums: vec![0.0; number_of_values],
            total_weight: 0.0,
            contributing_tasks: 0,
        }
    }

    /// Adds one task's quantity values with the given weight.
    pub fn accumulate(&mut self, values: &[fen], weight: fen) {
        debug_assert_eq!(values.len(), self.weighted_sums.len());
        for (sum, value) in self.weighted_sums.iter_mut().zip(values) {
            *sum += weight * value;
        }
        self.total_weight += weight;
        self.contributing_tasks += 1;
    }

    /// Merges another partial accumulator into this one and returns the
    /// combination.
    pub fn merged(mut self, other: Self) -> Self {
        debug_assert_eq!(self.weighted_sums.len(), other.weighted_sums.len());
        for (sum, other_sum) in self.weighted_sums.iter_mut().zip(&other.weighted_sums) {
            *sum += other_sum;
        }
        self.total_weight += other.total_weight;
        self.contributing_tasks += other.contributing_tasks;
        self
    }

    /// Returns the number of tasks that have contributed.
    pub fn contributing_tasks(&self) -> usize {
        self.contributing_tasks
    }

    /// Returns the summed weight of all contributions.
    pub fn total_weight(&self) -> fen {
        self.total_weight
    }

    /// Computes the weighted ensemble average of the accumulated
    /// quantities.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains one averaged value per observation coordinate.
    /// - `Err`: No weight was accumulated (e.g. every task was excluded).
    pub fn weighted_mean(&self) -> SimulationResult<Vec<fen>> {
        if self.total_weight <= 0.0 {
            return Err(SimulationError::Execution(
                "no particle task contributed to the ensemble average".to_string(),
            ));
        }
        Ok(self
            .weighted_sums
            .iter()
            .map(|sum| sum / self.total_weight)
            .collect())
    }
}

/// Runs ensembles of independent particle tasks over read-only field and
/// beam state: sample particle, integrate trajectory, evaluate the
/// requested radiation quantity, then reduce by weighted summation.
pub struct EnsembleRunner<'a> {
    field_model: &'a FieldModel,
    beam_set: &'a BeamSet,
    window: TimeWindow,
    execution: ExecutionConfig,
    context: RunContext,
}

impl<'a> EnsembleRunner<'a> {
    /// Creates a runner over the given shared state.
    pub fn new(
        field_model: &'a FieldModel,
        beam_set: &'a BeamSet,
        window: TimeWindow,
        execution: ExecutionConfig,
        context: RunContext,
    ) -> Self {
        Self {
            field_model,
            beam_set,
            window,
            execution,
            context,
        }
    }

    /// Runs `n_particles` independent tasks and reduces their quantity
    /// values into a weighted accumulator.
    ///
    /// # Parameters
    ///
    /// - `n_particles`: Number of particles to sample and dispatch.
    /// - `number_of_values`: Number of observation coordinates each task
    ///   must produce.
    /// - `quantity`: The per-particle radiation computation.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains the reduced `ResultAccumulator`.
    /// - `Err`: The configuration is unusable, the backend is
    ///   unavailable, or a task failed under the `Abort` policy.
    pub fn run<Q>(
        &self,
        n_particles: usize,
        number_of_values: usize,
        quantity: &Q,
    ) -> SimulationResult<ResultAccumulator>
    where
        Q: Fn(&Particle, &Trajectory) -> SimulationResult<Vec<fen>> + Sync,
    {
        if n_particles == 0 {
            return Err(SimulationError::Configuration(
                "ensemble run needs at least one particle".to_string(),
            ));
        }
        if self.beam_set.is_empty() {
            return Err(SimulationError::Configuration(
                "no particle beam has been set".to_string(),
            ));
        }

        let progress = if self.context.verbose.is_yes() && n_particles > 1 {
            ProgressBar::new(n_particles as u64)
        } else {
            ProgressBar::hidden()
        };

        let result = match self.execution.backend {
            ExecutionBackend::SingleThreaded => {
                let mut accumulator = ResultAccumulator::new(number_of_values);
                for particle_index in 0..n_particles {
                    accumulator = accumulator
                        .merged(self.execute_task(particle_index, number_of_values, quantity)?);
                    progress.inc(1);
                }
                Ok(accumulator)
            }
            ExecutionBackend::ThreadPool { num_threads } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|err| {
                        SimulationError::Execution(format!(
                            "could not build thread pool: {}",
                            err
                        ))
                    })?;
                pool.install(|| {
                    (0..n_particles)
                        .into_par_iter()
                        .map(|particle_index| {
                            let partial =
                                self.execute_task(particle_index, number_of_values, quantity);
                            progress.inc(1);
                            partial
                        })
                        .try_reduce(
                            || ResultAccumulator::new(number_of_values),
                            |left, right| Ok(left.merged(right)),
                        )
                })
            }
            ExecutionBackend::Accelerator => Err(SimulationError::Execution(
                "accelerator offload is not available in this build; \
                 select a thread-pool or single-threaded backend"
                    .to_string(),
            )),
            ExecutionBackend::Distributed => Err(SimulationError::Execution(
                "distributed execution is not available in this build; \
                 select a thread-pool or single-threaded backend"
                    .to_string(),
            )),
        };
        progress.finish_and_clear();
        result
    }

    fn execute_task<Q>(
        &self,
        particle_index: usize,
        number_of_values: usize,
        quantity: &Q,
    ) -> SimulationResult<ResultAccumulator>
    where
        Q: Fn(&Particle, &Trajectory) -> SimulationResult<Vec<fen>> + Sync,
    {
        let mut accumulator = ResultAccumulator::new(number_of_values);
        match self.try_execute_task(particle_index, quantity) {
            Ok((values, weight)) => {
                if values.len() != number_of_values {
                    return Err(SimulationError::Configuration(format!(
                        "particle task produced {} values where {} were expected",
                        values.len(),
                        number_of_values
                    )));
                }
                accumulator.accumulate(&values, weight);
                Ok(accumulator)
            }
            Err(error) => {
                if self.execution.failure_policy == FailurePolicy::ExcludeAndWarn
                    && is_excludable(&error)
                {
                    warn!(
                        "excluding particle {} from the ensemble average: {}",
                        particle_index, error
                    );
                    Ok(accumulator)
                } else {
                    Err(error.for_particle(particle_index))
                }
            }
        }
    }

    fn try_execute_task<Q>(
        &self,
        particle_index: usize,
        quantity: &Q,
    ) -> SimulationResult<(Vec<fen>, fen)>
    where
        Q: Fn(&Particle, &Trajectory) -> SimulationResult<Vec<fen>> + Sync,
    {
        let particle = self.beam_set.sample_particle(
            particle_index,
            self.context.seed,
            &self.context.sampling,
        )?;
        let trajectory = rk4::integrate(
            &particle,
            self.field_model,
            self.window.t_start,
            self.window.t_stop,
            self.window.n_points,
        )?;
        let values = quantity(&particle, &trajectory)?;
        Ok((values, particle.weight()))
    }
}

/// Whether a task failure may be excluded from the reduction instead of
/// aborting the run. Configuration and sampling errors always abort.
fn is_excludable(error: &SimulationError) -> bool {
    matches!(
        error,
        SimulationError::Divergence { .. } | SimulationError::OutOfRange(_)
    )
}
