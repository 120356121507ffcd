//! Conversions between internal SI quantities and boundary units.
//!
//! All engine-internal quantities are SI (meters, seconds, tesla, volts
//! per meter) with particle and photon energies in electron volts.

use crate::constants::{fcn, EV_TO_J, GEV_TO_EV, H_BAR, SPEED_OF_LIGHT};

/// Converts a particle energy in GeV to eV.
pub fn gev_to_ev(energy_gev: fcn) -> fcn {
    energy_gev * GEV_TO_EV
}

/// Converts a photon energy [eV] to the corresponding angular
/// frequency [rad/s].
pub fn photon_energy_to_angular_frequency(photon_energy_ev: fcn) -> fcn {
    photon_energy_ev * EV_TO_J / H_BAR
}

/// Computes the Lorentz factor of a particle with the given total
/// energy [eV] and rest mass [kg].
pub fn lorentz_factor(energy_ev: fcn, mass: fcn) -> fcn {
    energy_ev * EV_TO_J / (mass * SPEED_OF_LIGHT * SPEED_OF_LIGHT)
}

/// Computes the speed fraction beta corresponding to the given
/// Lorentz factor.
pub fn beta_from_lorentz_factor(lorentz_factor: fcn) -> fcn {
    (1.0 - 1.0 / (lorentz_factor * lorentz_factor)).sqrt()
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::constants::M_ELECTRON;
    use approx::assert_relative_eq;

    #[test]
    fn three_gev_electron_is_ultrarelativistic() {
        let gamma = lorentz_factor(gev_to_ev(3.0), M_ELECTRON);
        assert_relative_eq!(gamma, 5870.85, max_relative = 1e-4);
        assert!(beta_from_lorentz_factor(gamma) < 1.0);
        assert!(beta_from_lorentz_factor(gamma) > 0.999_999_9);
    }
}
