//! Spectral photon flux via Fourier transforms of the retarded field.

use super::lienard_wiechert::field_over_observable_window;
use super::{frd, FieldSample, Spectrum};
use crate::constants::{ELEMENTARY_CHARGE, H_BAR, M2_TO_MM2, SPEED_OF_LIGHT, VACUUM_PERMITTIVITY};
use crate::error::{SimulationError, SimulationResult};
use crate::geometry::{Dim3, Point3};
use crate::trajectory::Trajectory;
use crate::units::photon_energy_to_angular_frequency;
use num::complex::Complex64;
use std::f64::consts::PI;

/// Fraction of the photon energy covered by the conventional 0.1%
/// spectral bandwidth.
const BANDWIDTH_FRACTION: frd = 1e-3;

/// Computes the spectral photon flux at the given observer for each
/// requested photon energy.
///
/// The flux is the squared magnitude of the Fourier transform of the
/// full time-domain retarded field, scaled to photons/s/mm^2/0.1%bw for
/// the given beam current. The transform is evaluated independently per
/// requested energy, so the energies may be irregularly spaced.
///
/// # Parameters
///
/// - `trajectory`: Trajectory of the emitting particle.
/// - `observer`: Observer position [m].
/// - `photon_energies`: Requested photon energies [eV].
/// - `charge`: Charge of the emitting particle [C].
/// - `current`: Beam current carried by the emitting ensemble [A].
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: Contains the computed `Spectrum`.
/// - `Err`: The energies are unusable or the retarded field could not
///   be evaluated.
pub fn spectrum(
    trajectory: &Trajectory,
    observer: &Point3<frd>,
    photon_energies: &[frd],
    charge: frd,
    current: frd,
) -> SimulationResult<Spectrum> {
    if photon_energies.is_empty() {
        return Err(SimulationError::Configuration(
            "spectrum request needs at least one photon energy".to_string(),
        ));
    }
    if photon_energies.iter().any(|&energy| energy <= 0.0) {
        return Err(SimulationError::Configuration(
            "photon energies must be positive".to_string(),
        ));
    }

    let field_samples = field_over_observable_window(trajectory, observer, charge)?;

    let fluxes = photon_energies
        .iter()
        .map(|&photon_energy_ev| {
            let angular_frequency = photon_energy_to_angular_frequency(photon_energy_ev);
            let spectral_energy_density =
                spectral_energy_density(&field_samples, angular_frequency);
            // Photons per second in a 0.1% bandwidth, per square
            // millimeter, for the given number of particles per second.
            spectral_energy_density * (current / ELEMENTARY_CHARGE) * BANDWIDTH_FRACTION / H_BAR
                / M2_TO_MM2
        })
        .collect();

    Ok(Spectrum {
        photon_energies: photon_energies.to_vec(),
        fluxes,
    })
}

/// Evaluates the spectral energy density d^2W/(dA domega) [J s/m^2] of
/// the observed field at one angular frequency, by a trapezoidal
/// finite-time Fourier transform of the field samples.
fn spectral_energy_density(field_samples: &[FieldSample], angular_frequency: frd) -> frd {
    let mut transform = [Complex64::new(0.0, 0.0); 3];

    for pair in field_samples.windows(2) {
        let half_width = 0.5 * (pair[1].time - pair[0].time);
        for sample in pair {
            let phase = Complex64::new(0.0, angular_frequency * sample.time).exp();
            for (component_idx, &dim) in Dim3::slice().iter().enumerate() {
                transform[component_idx] += phase * (sample.electric_field[dim] * half_width);
            }
        }
    }

    let squared_magnitude: frd = transform.iter().map(|component| component.norm_sqr()).sum();
    VACUUM_PERMITTIVITY * SPEED_OF_LIGHT * squared_magnitude / PI
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::beam::{Particle, Species};
    use crate::field::{analytic::UndulatorField, FieldKind, FieldModel, Placement};
    use crate::geometry::Vec3;
    use crate::trajectory::rk4::integrate;
    use crate::units::gev_to_ev;

    fn undulator_trajectory() -> (Particle, Trajectory) {
        let mut fields = FieldModel::new();
        let undulator = UndulatorField::new(Vec3::new(0.0, 0.5, 0.0), Dim3::Z, 0.02, 11, 0.0);
        let half_length = 0.5 * undulator.total_length();
        fields.add_field(FieldKind::Magnetic, undulator, Placement::default());

        let particle = Particle::from_energy(
            Species::Electron,
            gev_to_ev(3.0),
            Point3::new(0.0, 0.0, -half_length - 0.01),
            Vec3::new(0.0, 0.0, 1.0),
            1.0,
        );
        let flight_time = (2.0 * (half_length + 0.01)) / SPEED_OF_LIGHT;
        let trajectory = integrate(&particle, &fields, 0.0, flight_time, 4001).unwrap();
        (particle, trajectory)
    }

    #[test]
    fn undulator_spectrum_is_nonnegative_and_finite() {
        let (particle, trajectory) = undulator_trajectory();
        let observer = Point3::new(0.0, 0.0, 30.0);
        let energies: Vec<f64> = (1..40).map(|idx| 100.0 * idx as f64).collect();
        let result = spectrum(&trajectory, &observer, &energies, particle.charge(), 0.5).unwrap();

        assert_eq!(result.fluxes.len(), energies.len());
        assert!(result
            .fluxes
            .iter()
            .all(|&flux| flux.is_finite() && flux >= 0.0));
        assert!(result.fluxes.iter().any(|&flux| flux > 0.0));
    }

    #[test]
    fn irregular_energy_grids_are_supported() {
        let (particle, trajectory) = undulator_trajectory();
        let observer = Point3::new(0.0, 0.0, 30.0);
        let energies = [10.0, 11.0, 500.0, 2500.0, 2501.5];
        let result = spectrum(&trajectory, &observer, &energies, particle.charge(), 0.5).unwrap();
        assert_eq!(result.photon_energies, energies.to_vec());
    }

    #[test]
    fn unphysical_energies_are_rejected() {
        let (particle, trajectory) = undulator_trajectory();
        let observer = Point3::new(0.0, 0.0, 30.0);
        assert!(spectrum(&trajectory, &observer, &[], particle.charge(), 0.5).is_err());
        assert!(spectrum(&trajectory, &observer, &[-5.0], particle.charge(), 0.5).is_err());
    }
}
