//! Fixed-step 4th-order Runge-Kutta integration of the relativistic
//! Lorentz-force equation of motion.

use super::{ftr, TimeWindow, Trajectory, TrajectorySample};
use crate::beam::Particle;
use crate::constants::SPEED_OF_LIGHT;
use crate::error::{SimulationError, SimulationResult};
use crate::field::FieldModel;
use crate::geometry::{Point3, Vec3};

/// Largest admissible squared beta magnitude; the Lorentz factor is
/// evaluated with beta renormalized to this bound when accumulated error
/// pushes a state closer to the light-speed limit.
const MAX_SQUARED_BETA: ftr = 1.0 - 1e-12;

/// Integrates the trajectory of the given particle through the given
/// field model.
///
/// The integration starts from the particle state taken at `t_start` and
/// proceeds with the fixed step `(t_stop - t_start)/(n_points - 1)`.
/// Backward (time-reversed) integration is requested by passing
/// `t_stop < t_start`; the returned samples are in ascending time order
/// in both cases.
///
/// # Parameters
///
/// - `particle`: Particle holding the start condition.
/// - `field_model`: Field configuration to move through.
/// - `t_start`: Time the start condition applies at [s].
/// - `t_stop`: Time to integrate to [s].
/// - `n_points`: Number of trajectory samples to produce.
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: Contains the integrated `Trajectory`.
/// - `Err`: The window is malformed or the integration produced a
///   superluminal or non-finite state.
pub fn integrate(
    particle: &Particle,
    field_model: &FieldModel,
    t_start: ftr,
    t_stop: ftr,
    n_points: usize,
) -> SimulationResult<Trajectory> {
    let window = TimeWindow::new(t_start, t_stop, n_points)?;
    let time_step = window.time_step();

    let derivative = RelativisticLorentzForce {
        field_model,
        charge: particle.charge(),
        mass: particle.mass(),
    };

    let mut position = *particle.position();
    let mut beta = *particle.beta();
    check_state(t_start, &position, &beta)?;

    let mut trajectory = Trajectory::with_capacity(n_points);
    for idx in 0..n_points {
        let time = t_start + (idx as ftr) * time_step;
        let (_, beta_derivative) = derivative.evaluate(time, &position, &beta);
        trajectory.push(TrajectorySample {
            time,
            position,
            beta,
            beta_derivative,
        });

        if idx + 1 < n_points {
            step_rk4(&derivative, time, time_step, &mut position, &mut beta);
            check_state(time + time_step, &position, &beta)?;
        }
    }

    if time_step < 0.0 {
        trajectory.reverse();
    }
    Ok(trajectory)
}

struct RelativisticLorentzForce<'a> {
    field_model: &'a FieldModel,
    charge: ftr,
    mass: ftr,
}

impl RelativisticLorentzForce<'_> {
    /// Evaluates (dx/dt, dbeta/dt) for the relativistic equation of
    /// motion dp/dt = q (E + v x B) with p = gamma m c beta.
    fn evaluate(
        &self,
        time: ftr,
        position: &Point3<ftr>,
        beta: &Vec3<ftr>,
    ) -> (Vec3<ftr>, Vec3<ftr>) {
        let squared_beta = beta.squared_length();
        // Near the light-speed limit the Lorentz factor is computed from
        // a direction renormalized onto the admissible bound.
        let clamped_squared_beta = ftr::min(squared_beta, MAX_SQUARED_BETA);
        let lorentz_factor = 1.0 / (1.0 - clamped_squared_beta).sqrt();

        let e_field = self.field_model.evaluate_e(position, time);
        let b_field = self.field_model.evaluate_b(position, time);

        let factor = self.charge / (lorentz_factor * self.mass * SPEED_OF_LIGHT);
        let beta_derivative = (&e_field + beta.cross(&b_field) * SPEED_OF_LIGHT
            - beta * beta.dot(&e_field))
            * factor;

        (beta * SPEED_OF_LIGHT, beta_derivative)
    }
}

fn step_rk4(
    derivative: &RelativisticLorentzForce<'_>,
    time: ftr,
    time_step: ftr,
    position: &mut Point3<ftr>,
    beta: &mut Vec3<ftr>,
) {
    let half_step = 0.5 * time_step;
    let start_position = *position;
    let start_beta = *beta;

    let (kx1, kb1) = derivative.evaluate(time, &start_position, &start_beta);
    let (kx2, kb2) = derivative.evaluate(
        time + half_step,
        &(&start_position + &kx1 * half_step),
        &(&start_beta + &kb1 * half_step),
    );
    let (kx3, kb3) = derivative.evaluate(
        time + half_step,
        &(&start_position + &kx2 * half_step),
        &(&start_beta + &kb2 * half_step),
    );
    let (kx4, kb4) = derivative.evaluate(
        time + time_step,
        &(&start_position + &kx3 * time_step),
        &(&start_beta + &kb3 * time_step),
    );

    let sixth_step = time_step / 6.0;
    *position = &start_position + (kx1 + kx2 * 2.0 + kx3 * 2.0 + kx4) * sixth_step;
    *beta = &start_beta + (kb1 + kb2 * 2.0 + kb3 * 2.0 + kb4) * sixth_step;
}

fn check_state(time: ftr, position: &Point3<ftr>, beta: &Vec3<ftr>) -> SimulationResult<()> {
    if !position.is_finite() || !beta.is_finite() {
        return Err(SimulationError::Divergence {
            time,
            reason: "non-finite state".to_string(),
        });
    }
    let squared_beta = beta.squared_length();
    if squared_beta >= 1.0 {
        return Err(SimulationError::Divergence {
            time,
            reason: format!("|beta| = {} reached the speed of light", squared_beta.sqrt()),
        });
    }
    Ok(())
}
