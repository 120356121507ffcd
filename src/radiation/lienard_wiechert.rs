//! Evaluation of the retarded (Liénard-Wiechert) electric field of a
//! moving point charge.

use super::retarded::{observable_window, solve_retarded_state};
use super::{frd, FieldSample};
use crate::constants::{SPEED_OF_LIGHT, VACUUM_PERMITTIVITY};
use crate::error::SimulationResult;
use crate::geometry::{Point3, Vec3};
use crate::trajectory::{Trajectory, TrajectorySample};
use std::f64::consts::PI;

/// Evaluates the Liénard-Wiechert electric field [V/m] produced at the
/// observer by a charge in the given (retarded) state.
///
/// Both the near-field velocity term and the far-field acceleration term
/// are included, each scaled by inverse powers of the retardation factor
/// `1 - n.beta`.
pub fn electric_field_from_state(
    state: &TrajectorySample,
    observer: &Point3<frd>,
    charge: frd,
) -> Vec3<frd> {
    let displacement = observer - &state.position;
    let separation = displacement.length();
    let direction = displacement / separation;

    let retardation = 1.0 - direction.dot(&state.beta);
    let retardation_cubed = retardation * retardation * retardation;
    let coupling = charge / (4.0 * PI * VACUUM_PERMITTIVITY);

    let doppler_shifted = &direction - &state.beta;
    let velocity_term = &doppler_shifted
        * ((1.0 - state.beta.squared_length())
            / (retardation_cubed * separation * separation));
    let acceleration_term = direction.cross(&doppler_shifted.cross(&state.beta_derivative))
        / (SPEED_OF_LIGHT * retardation_cubed * separation);

    (velocity_term + acceleration_term) * coupling
}

/// Computes the retarded electric field at the given observer over a
/// uniform grid of observation times.
///
/// # Parameters
///
/// - `trajectory`: Trajectory of the emitting particle.
/// - `observer`: Observer position [m].
/// - `t_start`: First observation time [s].
/// - `t_stop`: Last observation time [s].
/// - `n_points`: Number of observation times.
/// - `charge`: Charge of the emitting particle [C].
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: Contains the observed field samples in ascending time order.
/// - `Err`: An observation time has no retarded emission time within the
///   trajectory's time domain.
pub fn field_vs_time(
    trajectory: &Trajectory,
    observer: &Point3<frd>,
    t_start: frd,
    t_stop: frd,
    n_points: usize,
    charge: frd,
) -> SimulationResult<Vec<FieldSample>> {
    let window = crate::trajectory::TimeWindow::new(t_start, t_stop, n_points)?;
    let time_step = window.time_step();

    let mut samples = Vec::with_capacity(n_points);
    for idx in 0..n_points {
        let time = t_start + (idx as frd) * time_step;
        let state = solve_retarded_state(trajectory, observer, time)?;
        samples.push(FieldSample {
            time,
            electric_field: electric_field_from_state(&state, observer, charge),
        });
    }
    if time_step < 0.0 {
        samples.reverse();
    }
    Ok(samples)
}

/// Computes the retarded electric field over the full observation window
/// reachable from the trajectory, with as many samples as the trajectory
/// itself.
pub fn field_over_observable_window(
    trajectory: &Trajectory,
    observer: &Point3<frd>,
    charge: frd,
) -> SimulationResult<Vec<FieldSample>> {
    let (window_start, window_stop) = observable_window(trajectory, observer);
    field_vs_time(
        trajectory,
        observer,
        window_start,
        window_stop,
        trajectory.number_of_points(),
        charge,
    )
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::beam::{Particle, Species};
    use crate::constants::ELEMENTARY_CHARGE;
    use crate::field::FieldModel;
    use crate::trajectory::rk4::integrate;
    use approx::assert_relative_eq;

    #[test]
    fn slow_drifting_charge_reduces_to_coulomb_field() {
        // A barely moving charge: the velocity term must reduce to the
        // static Coulomb field at the observer distance.
        let rest_energy = Species::Electron.rest_energy_ev();
        let particle = Particle::from_energy(
            Species::Electron,
            rest_energy * (1.0 + 1e-9),
            Point3::origin(),
            Vec3::new(0.0, 0.0, 1.0),
            1.0,
        );
        let trajectory = integrate(&particle, &FieldModel::new(), 0.0, 1e-9, 101).unwrap();

        let distance = 2.0;
        let observer = Point3::new(distance, 0.0, 0.0);
        let (window_start, window_stop) = observable_window(&trajectory, &observer);
        let samples = field_vs_time(
            &trajectory,
            &observer,
            0.5 * (window_start + window_stop),
            window_stop,
            2,
            particle.charge(),
        )
        .unwrap();

        let coulomb = -ELEMENTARY_CHARGE
            / (4.0 * std::f64::consts::PI * crate::constants::VACUUM_PERMITTIVITY
                * distance
                * distance);
        assert_relative_eq!(
            samples[0].electric_field[crate::geometry::Dim3::X],
            coulomb,
            max_relative = 1e-4
        );
    }

    #[test]
    fn field_series_covers_requested_times() {
        let particle = Particle::from_energy(
            Species::Electron,
            5e6,
            Point3::origin(),
            Vec3::new(0.0, 0.0, 1.0),
            1.0,
        );
        let trajectory = integrate(&particle, &FieldModel::new(), 0.0, 1e-9, 101).unwrap();
        let observer = Point3::new(0.0, 0.1, 5.0);
        let samples =
            field_over_observable_window(&trajectory, &observer, particle.charge()).unwrap();
        assert_eq!(samples.len(), trajectory.number_of_points());
        assert!(samples
            .windows(2)
            .all(|pair| pair[1].time > pair[0].time));
    }
}
