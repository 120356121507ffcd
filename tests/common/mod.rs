//! Shared fixtures for the integration tests.

use synchrad::beam::{ParticleBeamSpec, Species};
use synchrad::constants::SPEED_OF_LIGHT;
use synchrad::field::analytic::UndulatorField;
use synchrad::field::Placement;
use synchrad::geometry::{Dim3, Point3, Vec3};
use synchrad::simulator::Simulator;
use synchrad::units::gev_to_ev;

/// Peak field of the reference undulator [T].
pub const UNDULATOR_PEAK_FIELD: f64 = 0.3;
/// Period length of the reference undulator [m].
pub const UNDULATOR_PERIOD: f64 = 0.02;
/// Number of body periods of the reference undulator.
pub const UNDULATOR_PERIODS: usize = 11;
/// Drift margin before and after the device [m].
pub const DRIFT_MARGIN: f64 = 0.01;
/// Beam energy of the reference setup [GeV].
pub const BEAM_ENERGY_GEV: f64 = 3.0;
/// Beam current of the reference setup [A].
pub const BEAM_CURRENT: f64 = 0.5;
/// Trajectory sample count of the reference setup.
pub const TRAJECTORY_POINTS: usize = 2001;

/// Builds the reference undulator device.
pub fn undulator() -> UndulatorField {
    UndulatorField::new(
        Vec3::new(0.0, UNDULATOR_PEAK_FIELD, 0.0),
        Dim3::Z,
        UNDULATOR_PERIOD,
        UNDULATOR_PERIODS,
        0.0,
    )
}

/// Builds the reference filament beam entering the undulator.
pub fn filament_beam() -> ParticleBeamSpec {
    let half_length = 0.5 * undulator().total_length() + DRIFT_MARGIN;
    ParticleBeamSpec {
        current: BEAM_CURRENT,
        ..ParticleBeamSpec::filament(
            Species::Electron,
            gev_to_ev(BEAM_ENERGY_GEV),
            Point3::new(0.0, 0.0, -half_length),
            Vec3::new(0.0, 0.0, 1.0),
        )
    }
}

/// Builds the reference beam with realistic energy spread and emittance.
pub fn spread_beam() -> ParticleBeamSpec {
    ParticleBeamSpec {
        relative_energy_spread: 1e-3,
        horizontal_emittance: 5.5e-10,
        vertical_emittance: 8e-12,
        horizontal_beta: 1.5,
        vertical_beta: 0.8,
        ..filament_beam()
    }
}

/// Duration of one pass through the modeled region [s].
pub fn flight_time() -> f64 {
    (undulator().total_length() + 2.0 * DRIFT_MARGIN) / SPEED_OF_LIGHT
}

/// Builds a fully configured simulator around the reference undulator
/// and the given beam.
pub fn undulator_simulator(beam: ParticleBeamSpec) -> Simulator {
    let mut simulator = Simulator::new();
    simulator.add_bfield(undulator(), Placement::default());
    simulator.set_particle_beam(beam).unwrap();
    simulator
        .set_time_window(0.0, flight_time(), TRAJECTORY_POINTS)
        .unwrap();
    simulator
}
