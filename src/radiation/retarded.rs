//! Root-finding for retarded emission times.
//!
//! For an observer at position `r` and observation time `t_obs`, the
//! retarded time is the emission time `t` satisfying
//! `t + |r - x(t)|/c = t_obs`. Since the particle stays subluminal the
//! light-travel-delay function is strictly increasing in `t`, so the
//! root is unique and can be bracketed by the trajectory's time domain.
//! The solve below runs Newton iterations seeded and safeguarded by
//! bisection, falling back to the bracket midpoint whenever a Newton
//! step would leave the bracket.

use super::frd;
use crate::constants::SPEED_OF_LIGHT;
use crate::error::{SimulationError, SimulationResult};
use crate::geometry::Point3;
use crate::trajectory::{Trajectory, TrajectorySample};

/// Upper bound on root-finding iterations before giving up.
const MAX_ITERATIONS: usize = 100;

/// Convergence tolerance on the delay residual, relative to the
/// trajectory's time span.
const RELATIVE_TOLERANCE: frd = 1e-12;

/// Solves for the state of the particle at the retarded time
/// corresponding to the given observation time.
///
/// # Parameters
///
/// - `trajectory`: Trajectory of the emitting particle.
/// - `observer`: Observer position [m].
/// - `observation_time`: Time of observation [s].
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: Contains the interpolated state at the retarded time.
/// - `Err`: No retarded time lies within the trajectory's time domain,
///   or the iteration bound was exhausted.
pub fn solve_retarded_state(
    trajectory: &Trajectory,
    observer: &Point3<frd>,
    observation_time: frd,
) -> SimulationResult<TrajectorySample> {
    let mut lower = trajectory.start_time();
    let mut upper = trajectory.stop_time();
    let span = upper - lower;
    let tolerance = span * RELATIVE_TOLERANCE;

    let residual_at = |sample: &TrajectorySample| {
        let separation = (observer - &sample.position).length();
        sample.time + separation / SPEED_OF_LIGHT - observation_time
    };

    if residual_at(&trajectory.sample(0)) > 0.0 {
        return Err(SimulationError::OutOfRange(format!(
            "observation time {:e} s precedes the emission reachable from the trajectory start",
            observation_time
        )));
    }
    if residual_at(&trajectory.sample(trajectory.number_of_points() - 1)) < 0.0 {
        return Err(SimulationError::OutOfRange(format!(
            "observation time {:e} s exceeds the emission reachable from the trajectory end",
            observation_time
        )));
    }

    let mut time = 0.5 * (lower + upper);
    for _ in 0..MAX_ITERATIONS {
        let sample = trajectory.state_at(time)?;
        let displacement = observer - &sample.position;
        let separation = displacement.length();
        let residual = sample.time + separation / SPEED_OF_LIGHT - observation_time;

        if residual.abs() <= tolerance {
            return Ok(sample);
        }
        if residual > 0.0 {
            upper = time;
        } else {
            lower = time;
        }

        // d(residual)/dt = 1 - n.beta, bounded away from zero while the
        // particle stays subluminal.
        let direction = displacement / separation;
        let slope = 1.0 - direction.dot(&sample.beta);
        let newton_time = time - residual / slope;

        time = if newton_time > lower && newton_time < upper {
            newton_time
        } else {
            0.5 * (lower + upper)
        };
    }

    Err(SimulationError::OutOfRange(format!(
        "retarded-time iteration did not converge for observation time {:e} s",
        observation_time
    )))
}

/// Returns the observation-time interval [s] during which emission from
/// the given trajectory can reach the given observer.
pub fn observable_window(trajectory: &Trajectory, observer: &Point3<frd>) -> (frd, frd) {
    let first = trajectory.sample(0);
    let last = trajectory.sample(trajectory.number_of_points() - 1);
    (
        first.time + (observer - &first.position).length() / SPEED_OF_LIGHT,
        last.time + (observer - &last.position).length() / SPEED_OF_LIGHT,
    )
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::beam::{Particle, Species};
    use crate::field::FieldModel;
    use crate::geometry::Vec3;
    use crate::trajectory::rk4::integrate;
    use approx::assert_relative_eq;

    fn drifting_trajectory() -> Trajectory {
        let particle = Particle::from_energy(
            Species::Electron,
            5e6,
            Point3::origin(),
            Vec3::new(0.0, 0.0, 1.0),
            1.0,
        );
        integrate(&particle, &FieldModel::new(), 0.0, 1e-9, 501).unwrap()
    }

    #[test]
    fn retarded_time_matches_analytic_drift_solution() {
        let trajectory = drifting_trajectory();
        let observer = Point3::new(0.0, 0.0, 10.0);
        let beta = trajectory.sample(0).beta.length();

        // For uniform motion along z towards the observer at distance d,
        // emission at time t arrives at t_obs = t + (d - beta c t)/c.
        let expected = 5e-10;
        let observation_time =
            expected + (10.0 - beta * SPEED_OF_LIGHT * expected) / SPEED_OF_LIGHT;

        let sample = solve_retarded_state(&trajectory, &observer, observation_time).unwrap();
        assert_relative_eq!(sample.time, expected, max_relative = 1e-9);
    }

    #[test]
    fn observation_outside_reachable_window_is_out_of_range() {
        let trajectory = drifting_trajectory();
        let observer = Point3::new(0.0, 0.0, 10.0);
        let (window_start, window_stop) = observable_window(&trajectory, &observer);
        assert!(window_stop > window_start);

        assert!(matches!(
            solve_retarded_state(&trajectory, &observer, window_start - 1e-12),
            Err(SimulationError::OutOfRange(_))
        ));
        assert!(matches!(
            solve_retarded_state(&trajectory, &observer, window_stop + 1e-12),
            Err(SimulationError::OutOfRange(_))
        ));
    }

    #[test]
    fn window_endpoints_are_solvable() {
        let trajectory = drifting_trajectory();
        let observer = Point3::new(0.3, -0.1, 5.0);
        let (window_start, window_stop) = observable_window(&trajectory, &observer);
        let midpoint = 0.5 * (window_start + window_stop);
        for &observation_time in &[window_start, midpoint, window_stop] {
            let sample = solve_retarded_state(&trajectory, &observer, observation_time).unwrap();
            let delay = (&observer - &sample.position).length() / SPEED_OF_LIGHT;
            assert_relative_eq!(
                sample.time + delay,
                observation_time,
                epsilon = 1e-21,
                max_relative = 1e-12
            );
        }
    }
}
