//! Physical and mathematical constants, in SI base units.

/// Floating-point precision to use for constants.
#[allow(non_camel_case_types)]
pub type fcn = f64;

// Physical constants

/// Speed of light in vacuum [m/s].
pub const SPEED_OF_LIGHT: fcn = 2.997_924_58e8;
/// Elementary charge [C].
pub const ELEMENTARY_CHARGE: fcn = 1.602_176_634e-19;
/// Electron mass [kg].
pub const M_ELECTRON: fcn = 9.109_383_701_5e-31;
/// Proton mass [kg].
pub const M_PROTON: fcn = 1.672_621_923_69e-27;
/// Vacuum permittivity [F/m].
pub const VACUUM_PERMITTIVITY: fcn = 8.854_187_812_8e-12;
/// Vacuum permeability [H/m].
pub const VACUUM_PERMEABILITY: fcn = 1.256_637_062_12e-6;
/// Planck constant [J s].
pub const H_PLANCK: fcn = 6.626_070_15e-34;
/// Reduced Planck constant [J s].
pub const H_BAR: fcn = 1.054_571_817e-34;
/// Electron rest energy [eV].
pub const ELECTRON_REST_ENERGY_EV: fcn = 5.109_989_499_96e5;

// Unit conversion factors

/// Conversion factor from electron volts to Joules.
pub const EV_TO_J: fcn = ELEMENTARY_CHARGE;
/// Conversion factor from Joules to electron volts.
pub const J_TO_EV: fcn = 1.0 / EV_TO_J;
/// Conversion factor from giga electron volts to electron volts.
pub const GEV_TO_EV: fcn = 1e9;
/// Conversion factor from square meters to square millimeters.
pub const M2_TO_MM2: fcn = 1e6;
/// Conversion factor from millimeters to meters.
pub const MM_TO_M: fcn = 1e-3;
