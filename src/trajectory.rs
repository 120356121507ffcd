//! Discretized relativistic particle trajectories.

pub mod rk4;

use crate::error::{SimulationError, SimulationResult};
use crate::geometry::{Point3, Vec3};

/// Floating-point precision to use for trajectories.
#[allow(non_camel_case_types)]
pub type ftr = f64;

/// A uniformly sampled time interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    /// Start of the interval [s].
    pub t_start: ftr,
    /// End of the interval [s].
    pub t_stop: ftr,
    /// Number of samples over the interval.
    pub n_points: usize,
}

impl TimeWindow {
    /// Creates a new time window after checking its consistency.
    pub fn new(t_start: ftr, t_stop: ftr, n_points: usize) -> SimulationResult<Self> {
        if n_points < 2 {
            return Err(SimulationError::Configuration(format!(
                "time window needs at least 2 points, got {}",
                n_points
            )));
        }
        if !(t_start.is_finite() && t_stop.is_finite()) || t_start == t_stop {
            return Err(SimulationError::Configuration(format!(
                "invalid time window [{:e}, {:e}] s",
                t_start, t_stop
            )));
        }
        Ok(Self {
            t_start,
            t_stop,
            n_points,
        })
    }

    /// Returns the (signed) spacing between consecutive samples [s].
    pub fn time_step(&self) -> ftr {
        (self.t_stop - self.t_start) / ((self.n_points - 1) as ftr)
    }
}

/// The state of a particle at one trajectory sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectorySample {
    /// Sample time [s].
    pub time: ftr,
    /// Particle position [m].
    pub position: Point3<ftr>,
    /// Particle velocity as a fraction of the speed of light.
    pub beta: Vec3<ftr>,
    /// Time derivative of beta [1/s].
    pub beta_derivative: Vec3<ftr>,
}

/// An ordered, time-ascending sequence of state samples describing one
/// particle's motion. Produced once by the trajectory integrator and
/// consumed read-only by the radiation calculator.
#[derive(Clone, Debug)]
pub struct Trajectory {
    times: Vec<ftr>,
    positions: Vec<Point3<ftr>>,
    betas: Vec<Vec3<ftr>>,
    beta_derivatives: Vec<Vec3<ftr>>,
}

impl Trajectory {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            times: Vec::with_capacity(capacity),
            positions: Vec::with_capacity(capacity),
            betas: Vec::with_capacity(capacity),
            beta_derivatives: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, sample: TrajectorySample) {
        self.times.push(sample.time);
        self.positions.push(sample.position);
        self.betas.push(sample.beta);
        self.beta_derivatives.push(sample.beta_derivative);
    }

    /// Reverses the sample order, for normalizing backward integrations
    /// to ascending time.
    pub(crate) fn reverse(&mut self) {
        self.times.reverse();
        self.positions.reverse();
        self.betas.reverse();
        self.beta_derivatives.reverse();
    }

    /// Returns the number of samples.
    pub fn number_of_points(&self) -> usize {
        self.times.len()
    }

    /// Returns the time of the first sample [s].
    pub fn start_time(&self) -> ftr {
        self.times[0]
    }

    /// Returns the time of the last sample [s].
    pub fn stop_time(&self) -> ftr {
        self.times[self.times.len() - 1]
    }

    /// Returns the spacing between consecutive samples [s].
    pub fn time_step(&self) -> ftr {
        (self.stop_time() - self.start_time()) / ((self.number_of_points() - 1) as ftr)
    }

    /// Returns the sample times [s].
    pub fn times(&self) -> &[ftr] {
        &self.times
    }

    /// Returns the sampled positions [m].
    pub fn positions(&self) -> &[Point3<ftr>] {
        &self.positions
    }

    /// Returns the sampled beta vectors.
    pub fn betas(&self) -> &[Vec3<ftr>] {
        &self.betas
    }

    /// Returns the sampled beta derivatives [1/s].
    pub fn beta_derivatives(&self) -> &[Vec3<ftr>] {
        &self.beta_derivatives
    }

    /// Returns a copy of the sample with the given index.
    pub fn sample(&self, idx: usize) -> TrajectorySample {
        TrajectorySample {
            time: self.times[idx],
            position: self.positions[idx],
            beta: self.betas[idx],
            beta_derivative: self.beta_derivatives[idx],
        }
    }

    /// Interpolates the particle state at the given time.
    ///
    /// # Parameters
    ///
    /// - `time`: Time to interpolate the state at [s].
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains the linearly interpolated state.
    /// - `Err`: The time lies outside the covered time domain.
    pub fn state_at(&self, time: ftr) -> SimulationResult<TrajectorySample> {
        if time < self.start_time() || time > self.stop_time() {
            return Err(SimulationError::OutOfRange(format!(
                "time {:e} s outside trajectory domain [{:e}, {:e}] s",
                time,
                self.start_time(),
                self.stop_time()
            )));
        }
        let last = self.times.len() - 1;
        let upper = self
            .times
            .partition_point(|&probe| probe < time)
            .max(1)
            .min(last);
        let lower = upper - 1;
        let fraction = (time - self.times[lower]) / (self.times[upper] - self.times[lower]);

        let interp_point = |a: &Point3<ftr>, b: &Point3<ftr>| {
            a + &((b - a) * fraction)
        };
        let interp_vec =
            |a: &Vec3<ftr>, b: &Vec3<ftr>| a * (1.0 - fraction) + b * fraction;

        Ok(TrajectorySample {
            time,
            position: interp_point(&self.positions[lower], &self.positions[upper]),
            beta: interp_vec(&self.betas[lower], &self.betas[upper]),
            beta_derivative: interp_vec(
                &self.beta_derivatives[lower],
                &self.beta_derivatives[upper],
            ),
        })
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_relative_eq;
    use crate::geometry::Dim3;

    fn linear_trajectory() -> Trajectory {
        let mut trajectory = Trajectory::with_capacity(3);
        for idx in 0..3 {
            let time = idx as ftr;
            trajectory.push(TrajectorySample {
                time,
                position: Point3::new(2.0 * time, 0.0, 0.0),
                beta: Vec3::new(0.5, 0.0, 0.0),
                beta_derivative: Vec3::zero(),
            });
        }
        trajectory
    }

    #[test]
    fn state_interpolation_is_linear() {
        let trajectory = linear_trajectory();
        let state = trajectory.state_at(0.75).unwrap();
        assert_relative_eq!(state.position[Dim3::X], 1.5, max_relative = 1e-14);
        assert_relative_eq!(state.beta[Dim3::X], 0.5, max_relative = 1e-14);
    }

    #[test]
    fn state_outside_domain_is_out_of_range() {
        let trajectory = linear_trajectory();
        assert!(matches!(
            trajectory.state_at(-0.1),
            Err(SimulationError::OutOfRange(_))
        ));
        assert!(matches!(
            trajectory.state_at(2.1),
            Err(SimulationError::OutOfRange(_))
        ));
    }

    #[test]
    fn window_with_too_few_points_is_rejected() {
        assert!(TimeWindow::new(0.0, 1.0, 1).is_err());
        assert!(TimeWindow::new(0.0, 0.0, 10).is_err());
    }
}
