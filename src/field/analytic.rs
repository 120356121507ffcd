//! Analytically parameterized field contributors.

use super::{ffd, FieldContributor};
use crate::geometry::{BoundingBox, Dim3, Point3, Vec3};
use std::f64::consts::PI;

/// A constant field vector, optionally restricted to a bounded region.
pub struct UniformField {
    vector: Vec3<ffd>,
    extent: Option<BoundingBox<ffd>>,
}

impl UniformField {
    /// Creates a uniform field filling all of space.
    pub fn unbounded(vector: Vec3<ffd>) -> Self {
        Self {
            vector,
            extent: None,
        }
    }

    /// Creates a uniform field restricted to the given region, zero
    /// outside it.
    pub fn new(vector: Vec3<ffd>, extent: BoundingBox<ffd>) -> Self {
        Self {
            vector,
            extent: Some(extent),
        }
    }
}

impl FieldContributor for UniformField {
    fn evaluate(&self, position: &Point3<ffd>, _time: ffd) -> Vec3<ffd> {
        match &self.extent {
            Some(extent) if !extent.contains(position) => Vec3::zero(),
            _ => self.vector,
        }
    }
}

/// A field with Gaussian amplitude falloff along one principal axis.
pub struct GaussianField {
    amplitude: Vec3<ffd>,
    axis: Dim3,
    center: ffd,
    sigma: ffd,
}

impl GaussianField {
    /// Creates a Gaussian field profile along the given axis.
    ///
    /// # Parameters
    ///
    /// - `amplitude`: Field vector at the profile center.
    /// - `axis`: Principal axis the profile varies along.
    /// - `center`: Coordinate of the profile center along the axis [m].
    /// - `sigma`: Standard deviation of the profile [m].
    pub fn new(amplitude: Vec3<ffd>, axis: Dim3, center: ffd, sigma: ffd) -> Self {
        assert!(sigma > 0.0, "Gaussian field sigma must be positive.");
        Self {
            amplitude,
            axis,
            center,
            sigma,
        }
    }
}

impl FieldContributor for GaussianField {
    fn evaluate(&self, position: &Point3<ffd>, _time: ffd) -> Vec3<ffd> {
        let offset = position[self.axis] - self.center;
        &self.amplitude * (-offset * offset / (2.0 * self.sigma * self.sigma)).exp()
    }
}

/// An ideal planar undulator field: sinusoidal along the longitudinal
/// axis over a whole number of periods, with half-strength terminating
/// poles over one half-period at each end so the path-integrated kick
/// vanishes, and zero outside the device.
pub struct UndulatorField {
    amplitude: Vec3<ffd>,
    axis: Dim3,
    period: ffd,
    number_of_periods: usize,
    phase: ffd,
}

impl UndulatorField {
    /// Relative strength of the terminating poles.
    const TERMINATION_STRENGTH: ffd = 0.5;

    /// Creates an ideal undulator centered on the local origin.
    ///
    /// # Parameters
    ///
    /// - `amplitude`: Peak field vector of the body poles.
    /// - `axis`: Longitudinal axis of the device.
    /// - `period`: Period length [m].
    /// - `number_of_periods`: Number of whole body periods.
    /// - `phase`: Phase offset of the sinusoid [rad].
    pub fn new(
        amplitude: Vec3<ffd>,
        axis: Dim3,
        period: ffd,
        number_of_periods: usize,
        phase: ffd,
    ) -> Self {
        assert!(period > 0.0, "Undulator period must be positive.");
        assert!(
            number_of_periods > 0,
            "Undulator must have at least one period."
        );
        Self {
            amplitude,
            axis,
            period,
            number_of_periods,
            phase,
        }
    }

    /// Period length of the device [m].
    pub fn period(&self) -> ffd {
        self.period
    }

    /// Length of the sinusoidal body of the device [m].
    pub fn body_length(&self) -> ffd {
        self.period * (self.number_of_periods as ffd)
    }

    /// Total device length including the terminating poles [m].
    pub fn total_length(&self) -> ffd {
        self.body_length() + self.period
    }
}

impl FieldContributor for UndulatorField {
    fn evaluate(&self, position: &Point3<ffd>, _time: ffd) -> Vec3<ffd> {
        let s = position[self.axis];
        let half_body = 0.5 * self.body_length();
        let half_total = 0.5 * self.total_length();

        if s.abs() > half_total {
            return Vec3::zero();
        }

        let oscillation = (2.0 * PI * s / self.period + self.phase).sin();
        if s.abs() <= half_body {
            &self.amplitude * oscillation
        } else {
            // Terminating pole: the sinusoid continues at reduced strength
            // from its zero crossing at the body edge, keeping the entry
            // and exit polarity of the adjacent body poles so their kicks
            // cancel exactly.
            &self.amplitude * (Self::TERMINATION_STRENGTH * oscillation)
        }
    }
}
