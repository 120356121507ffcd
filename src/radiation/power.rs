//! Radiated power densities and total emitted power.

use super::{frd, SurfaceRectangle};
use crate::constants::{
    ELEMENTARY_CHARGE, M2_TO_MM2, SPEED_OF_LIGHT, VACUUM_PERMITTIVITY,
};
use crate::error::SimulationResult;
use crate::geometry::Point3;
use crate::trajectory::Trajectory;
use std::f64::consts::PI;

/// Computes the radiated power density [W/mm^2] received at a single
/// observation point, for the given beam current.
///
/// The angle-dependent acceleration term of the Liénard-Wiechert field
/// is integrated over the trajectory's emitter-time domain, which makes
/// the result non-negative by construction.
pub fn power_density_at(
    trajectory: &Trajectory,
    observer: &Point3<frd>,
    charge: frd,
    current: frd,
) -> SimulationResult<frd> {
    let mut received_energy_per_area = 0.0;
    let n_points = trajectory.number_of_points();

    for idx in 0..n_points {
        let sample = trajectory.sample(idx);
        let displacement = observer - &sample.position;
        let separation = displacement.length();
        let direction = displacement / separation;

        let retardation = 1.0 - direction.dot(&sample.beta);
        let numerator = direction.cross(
            &(&direction - &sample.beta).cross(&sample.beta_derivative),
        );
        let angular_density = numerator.squared_length() / retardation.powi(5);

        let edge = idx == 0 || idx + 1 == n_points;
        let weight = if edge { 0.5 } else { 1.0 };
        received_energy_per_area += weight * angular_density / (separation * separation);
    }
    received_energy_per_area *= trajectory.time_step().abs();
    received_energy_per_area *=
        charge * charge / (16.0 * PI * PI * VACUUM_PERMITTIVITY * SPEED_OF_LIGHT);

    Ok(received_energy_per_area * particles_per_second(current) / M2_TO_MM2)
}

/// Computes the radiated power density [W/mm^2] at every point of the
/// given observation rectangle, in row-major (vertical index outermost)
/// order.
pub fn power_density_over_surface(
    trajectory: &Trajectory,
    surface: &SurfaceRectangle,
    charge: frd,
    current: frd,
) -> SimulationResult<Vec<frd>> {
    surface
        .points()
        .iter()
        .map(|point| power_density_at(trajectory, point, charge, current))
        .collect()
}

/// Computes the total radiated power [W] of the beam over the modeled
/// region, via the relativistic Larmor formula
/// P = q^2 gamma^6 [(dbeta/dt)^2 - (beta x dbeta/dt)^2] / (6 pi eps0 c)
/// integrated over the trajectory.
pub fn total_power(trajectory: &Trajectory, charge: frd, current: frd) -> SimulationResult<frd> {
    let mut radiated_energy = 0.0;
    let n_points = trajectory.number_of_points();

    for idx in 0..n_points {
        let sample = trajectory.sample(idx);
        let squared_beta = sample.beta.squared_length();
        let lorentz_factor_squared = 1.0 / (1.0 - squared_beta);

        let squared_derivative = sample.beta_derivative.squared_length();
        let squared_cross = sample.beta.cross(&sample.beta_derivative).squared_length();
        let instantaneous_power =
            lorentz_factor_squared.powi(3) * (squared_derivative - squared_cross);

        let edge = idx == 0 || idx + 1 == n_points;
        let weight = if edge { 0.5 } else { 1.0 };
        radiated_energy += weight * instantaneous_power;
    }
    radiated_energy *= trajectory.time_step().abs();
    radiated_energy *= charge * charge / (6.0 * PI * VACUUM_PERMITTIVITY * SPEED_OF_LIGHT);

    Ok(radiated_energy * particles_per_second(current))
}

/// Number of particles passing through the modeled region per second
/// for the given beam current.
fn particles_per_second(current: frd) -> frd {
    current / ELEMENTARY_CHARGE
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::beam::{Particle, Species};
    use crate::field::{analytic::UniformField, FieldKind, FieldModel, Placement};
    use crate::geometry::Vec3;
    use crate::trajectory::rk4::integrate;
    use crate::units::{beta_from_lorentz_factor, lorentz_factor};
    use approx::assert_relative_eq;

    #[test]
    fn circular_motion_matches_analytic_synchrotron_power() {
        let field_strength = 1.2;
        let mut fields = FieldModel::new();
        fields.add_field(
            FieldKind::Magnetic,
            UniformField::unbounded(Vec3::new(0.0, 0.0, field_strength)),
            Placement::default(),
        );

        let energy_ev = 5e8;
        let current = 0.4;
        let particle = Particle::from_energy(
            Species::Electron,
            energy_ev,
            Point3::origin(),
            Vec3::new(1.0, 0.0, 0.0),
            1.0,
        );
        let trajectory = integrate(&particle, &fields, 0.0, 1e-9, 2001).unwrap();

        let power = total_power(&trajectory, particle.charge(), current).unwrap();

        // P = q^4 gamma^2 beta^2 B^2 / (6 pi eps0 c m^2) per particle,
        // times I/q particles per second.
        let gamma = lorentz_factor(energy_ev, Species::Electron.mass());
        let beta = beta_from_lorentz_factor(gamma);
        let mass = Species::Electron.mass();
        let per_particle = ELEMENTARY_CHARGE.powi(4)
            * gamma.powi(2)
            * beta.powi(2)
            * field_strength.powi(2)
            / (6.0 * PI * VACUUM_PERMITTIVITY * SPEED_OF_LIGHT * mass * mass);
        let expected = per_particle * 1e-9 * particles_per_second(current);

        assert_relative_eq!(power, expected, max_relative = 1e-8);
    }

    #[test]
    fn power_density_is_nonnegative_everywhere() {
        let mut fields = FieldModel::new();
        fields.add_field(
            FieldKind::Magnetic,
            UniformField::unbounded(Vec3::new(0.0, 1.0, 0.0)),
            Placement::default(),
        );
        let particle = Particle::from_energy(
            Species::Electron,
            5e8,
            Point3::origin(),
            Vec3::new(0.0, 0.0, 1.0),
            1.0,
        );
        let trajectory = integrate(&particle, &fields, 0.0, 1e-10, 501).unwrap();

        let surface = SurfaceRectangle::new(
            Point3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, 1.0),
            0.05,
            0.05,
            7,
            7,
        )
        .unwrap();
        let values =
            power_density_over_surface(&trajectory, &surface, particle.charge(), 0.1).unwrap();
        assert_eq!(values.len(), surface.number_of_points());
        assert!(values.iter().all(|&value| value >= 0.0 && value.is_finite()));
        assert!(values.iter().any(|&value| value > 0.0));
    }

    #[test]
    fn straight_motion_radiates_nothing() {
        let particle = Particle::from_energy(
            Species::Electron,
            5e8,
            Point3::origin(),
            Vec3::new(0.0, 0.0, 1.0),
            1.0,
        );
        let trajectory = integrate(&particle, &FieldModel::new(), 0.0, 1e-10, 101).unwrap();
        let power = total_power(&trajectory, particle.charge(), 0.5).unwrap();
        assert_eq!(power, 0.0);
        let density = power_density_at(
            &trajectory,
            &Point3::new(0.0, 1.0, 0.0),
            particle.charge(),
            0.5,
        )
        .unwrap();
        assert_eq!(density, 0.0);
    }

    #[test]
    fn power_density_map_row_major_layout_matches_grid() {
        let mut fields = FieldModel::new();
        fields.add_field(
            FieldKind::Magnetic,
            UniformField::unbounded(Vec3::new(0.0, 1.0, 0.0)),
            Placement::default(),
        );
        let particle = Particle::from_energy(
            Species::Electron,
            5e8,
            Point3::origin(),
            Vec3::new(0.0, 0.0, 1.0),
            1.0,
        );
        let trajectory = integrate(&particle, &fields, 0.0, 1e-10, 201).unwrap();
        let surface = SurfaceRectangle::new(
            Point3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, 1.0),
            0.05,
            0.05,
            3,
            2,
        )
        .unwrap();
        let values =
            power_density_over_surface(&trajectory, &surface, particle.charge(), 0.1).unwrap();
        let direct = power_density_at(
            &trajectory,
            &surface.point(1, 1),
            particle.charge(),
            0.1,
        )
        .unwrap();
        assert_eq!(values[surface.nx() + 1], direct);
    }
}
