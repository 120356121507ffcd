//! Integration tests for the radiation calculator on the reference
//! undulator setup.

mod common;

use approx::assert_relative_eq;
use std::f64::consts::PI;
use synchrad::beam::Species;
use synchrad::constants::{
    ELEMENTARY_CHARGE, H_PLANCK, SPEED_OF_LIGHT, VACUUM_PERMITTIVITY,
};
use synchrad::geometry::{Dim3, Point3, Vec3};
use synchrad::radiation::retarded::observable_window;
use synchrad::radiation::SurfaceRectangle;
use synchrad::units::{beta_from_lorentz_factor, gev_to_ev, lorentz_factor};

#[test]
fn undulator_total_power_matches_closed_form() {
    let simulator = common::undulator_simulator(common::filament_beam());
    let power = simulator.calculate_total_power(1).unwrap();

    // Average power of a planar undulator with half-strength terminating
    // poles: P = (I/e) * e^4 gamma^2 beta B0^2 (L + lambda_u/4)
    //            / (12 pi eps0 c^2 m^2),
    // where L is the body length and the lambda_u/4 term accounts for
    // the quarter-strength-squared terminations.
    let gamma = lorentz_factor(gev_to_ev(common::BEAM_ENERGY_GEV), Species::Electron.mass());
    let beta = beta_from_lorentz_factor(gamma);
    let mass = Species::Electron.mass();
    let body_length = common::UNDULATOR_PERIOD * common::UNDULATOR_PERIODS as f64;
    let effective_length = body_length + 0.25 * common::UNDULATOR_PERIOD;

    let expected = (common::BEAM_CURRENT / ELEMENTARY_CHARGE)
        * ELEMENTARY_CHARGE.powi(4)
        * gamma.powi(2)
        * beta
        * common::UNDULATOR_PEAK_FIELD.powi(2)
        * effective_length
        / (12.0 * PI * VACUUM_PERMITTIVITY * SPEED_OF_LIGHT.powi(2) * mass * mass);

    assert_relative_eq!(power, expected, max_relative = 1e-3);
}

#[test]
fn on_axis_spectrum_peaks_at_the_fundamental() {
    let simulator = common::undulator_simulator(common::filament_beam());

    // Deflection parameter and fundamental photon energy of the device.
    let gamma = lorentz_factor(gev_to_ev(common::BEAM_ENERGY_GEV), Species::Electron.mass());
    let deflection = ELEMENTARY_CHARGE * common::UNDULATOR_PEAK_FIELD * common::UNDULATOR_PERIOD
        / (2.0 * PI * Species::Electron.mass() * SPEED_OF_LIGHT);
    let fundamental_wavelength = common::UNDULATOR_PERIOD / (2.0 * gamma * gamma)
        * (1.0 + 0.5 * deflection * deflection);
    let fundamental_ev =
        H_PLANCK * SPEED_OF_LIGHT / fundamental_wavelength / ELEMENTARY_CHARGE;

    let observer = Point3::new(0.0, 0.0, 30.0);
    let energies: Vec<f64> = (1..=300)
        .map(|idx| fundamental_ev * (0.4 + 0.004 * idx as f64))
        .collect();
    let spectrum = simulator.calculate_spectrum(&observer, &energies, 1).unwrap();

    assert!(spectrum.fluxes.iter().all(|&flux| flux >= 0.0));
    let (peak_idx, _) = spectrum
        .fluxes
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .unwrap();
    let peak_energy = spectrum.photon_energies[peak_idx];
    assert_relative_eq!(peak_energy, fundamental_ev, max_relative = 0.15);
}

#[test]
fn observed_field_pulse_is_relativistically_compressed() {
    let simulator = common::undulator_simulator(common::filament_beam());
    let trajectory = simulator
        .calculate_trajectory(0.0, common::flight_time(), common::TRAJECTORY_POINTS)
        .unwrap();

    let observer = Point3::new(0.0, 0.0, 30.0);
    let (window_start, window_stop) = observable_window(&trajectory, &observer);
    let window_length = window_stop - window_start;

    // Emission towards a forward observer is compressed by roughly
    // (1 - beta), many orders of magnitude below the flight time.
    assert!(window_length > 0.0);
    assert!(window_length < 1e-6 * common::flight_time());

    let samples = simulator
        .calculate_efield_vs_time(&observer, window_start, window_stop, 501)
        .unwrap();
    assert_eq!(samples.len(), 501);
    assert!(samples
        .iter()
        .any(|sample| sample.electric_field.length() > 0.0));
    assert!(samples
        .iter()
        .all(|sample| sample.electric_field.is_finite()));
}

#[test]
fn flux_and_power_density_maps_are_nonnegative() {
    let simulator = common::undulator_simulator(common::spread_beam());

    let surface = SurfaceRectangle::new(
        Point3::new(0.0, 0.0, 30.0),
        Vec3::new(0.0, 0.0, 1.0),
        2e-3,
        2e-3,
        3,
        3,
    )
    .unwrap();

    let power_map = simulator
        .calculate_power_density_rectangle(surface.clone(), 2)
        .unwrap();
    assert_eq!(power_map.values.dim(), (3, 3));
    assert!(power_map
        .values
        .iter()
        .all(|&value| value >= 0.0 && value.is_finite()));

    let flux_map = simulator
        .calculate_flux_rectangle(surface, 3000.0, 2)
        .unwrap();
    assert!(flux_map
        .values
        .iter()
        .all(|&value| value >= 0.0 && value.is_finite()));
}

#[test]
fn on_axis_power_density_dominates_off_axis() {
    let simulator = common::undulator_simulator(common::filament_beam());
    let on_axis = simulator
        .calculate_power_density(&Point3::new(0.0, 0.0, 30.0), 1)
        .unwrap();
    // Well outside the 1/gamma radiation cone the density must be
    // drastically smaller.
    let off_axis = simulator
        .calculate_power_density(&Point3::new(0.0, 0.3, 30.0), 1)
        .unwrap();
    assert!(on_axis > 0.0);
    assert!(off_axis >= 0.0);
    assert!(off_axis < 1e-3 * on_axis);
}

#[test]
fn vertical_polarization_is_absent_on_axis() {
    // With the deflection in the x-z plane, the on-axis field has no
    // y-component.
    let simulator = common::undulator_simulator(common::filament_beam());
    let trajectory = simulator
        .calculate_trajectory(0.0, common::flight_time(), common::TRAJECTORY_POINTS)
        .unwrap();
    let observer = Point3::new(0.0, 0.0, 30.0);
    let (window_start, window_stop) = observable_window(&trajectory, &observer);
    let samples = simulator
        .calculate_efield_vs_time(&observer, window_start, window_stop, 201)
        .unwrap();

    let max_horizontal = samples
        .iter()
        .map(|sample| sample.electric_field[Dim3::X].abs())
        .fold(0.0, f64::max);
    let max_vertical = samples
        .iter()
        .map(|sample| sample.electric_field[Dim3::Y].abs())
        .fold(0.0, f64::max);
    assert!(max_vertical < 1e-9 * max_horizontal);
}
