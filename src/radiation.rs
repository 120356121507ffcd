//! Computation of the electromagnetic radiation emitted along particle
//! trajectories, observed through retarded fields.

pub mod lienard_wiechert;
pub mod power;
pub mod retarded;
pub mod spectrum;

use crate::error::{SimulationError, SimulationResult};
use crate::geometry::{orthonormal_basis, Point3, Vec3};
use ndarray::Array2;

#[cfg(feature = "serialization")]
use serde::Serialize;

/// Floating-point precision to use for radiation quantities.
#[allow(non_camel_case_types)]
pub type frd = f64;

/// The retarded electric field observed at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct FieldSample {
    /// Observation time [s].
    pub time: frd,
    /// Observed electric field [V/m].
    pub electric_field: Vec3<frd>,
}

/// A regular rectangular grid of observation points.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct SurfaceRectangle {
    center: Point3<frd>,
    normal: Vec3<frd>,
    horizontal: Vec3<frd>,
    vertical: Vec3<frd>,
    width: frd,
    height: frd,
    nx: usize,
    ny: usize,
}

impl SurfaceRectangle {
    /// Creates an observation rectangle centered on the given point,
    /// perpendicular to the given normal.
    ///
    /// # Parameters
    ///
    /// - `center`: Center of the rectangle [m].
    /// - `normal`: Surface normal (need not be normalized).
    /// - `width`: Extent along the in-plane horizontal basis vector [m].
    /// - `height`: Extent along the in-plane vertical basis vector [m].
    /// - `nx`: Number of observation points across the width.
    /// - `ny`: Number of observation points across the height.
    pub fn new(
        center: Point3<frd>,
        normal: Vec3<frd>,
        width: frd,
        height: frd,
        nx: usize,
        ny: usize,
    ) -> SimulationResult<Self> {
        if normal.is_zero() || !normal.is_finite() {
            return Err(SimulationError::Configuration(
                "surface normal must be a non-zero finite vector".to_string(),
            ));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(SimulationError::Configuration(
                "surface extent must be positive".to_string(),
            ));
        }
        if nx == 0 || ny == 0 {
            return Err(SimulationError::Configuration(
                "surface grid must have at least one point per dimension".to_string(),
            ));
        }
        let normal = normal.normalized();
        let (horizontal, vertical) = orthonormal_basis(&normal);
        Ok(Self {
            center,
            normal,
            horizontal,
            vertical,
            width,
            height,
            nx,
            ny,
        })
    }

    /// Returns the number of observation points across the width.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Returns the number of observation points across the height.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Returns the total number of observation points.
    pub fn number_of_points(&self) -> usize {
        self.nx * self.ny
    }

    /// Returns the area associated with one grid point [m^2].
    pub fn cell_area(&self) -> frd {
        (self.width / self.nx as frd) * (self.height / self.ny as frd)
    }

    /// Returns the observation point with the given grid indices.
    pub fn point(&self, ix: usize, iy: usize) -> Point3<frd> {
        let u = if self.nx > 1 {
            -0.5 * self.width + self.width * (ix as frd) / ((self.nx - 1) as frd)
        } else {
            0.0
        };
        let v = if self.ny > 1 {
            -0.5 * self.height + self.height * (iy as frd) / ((self.ny - 1) as frd)
        } else {
            0.0
        };
        &self.center + (&self.horizontal * u + &self.vertical * v)
    }

    /// Returns all observation points in row-major order (vertical index
    /// outermost).
    pub fn points(&self) -> Vec<Point3<frd>> {
        let mut points = Vec::with_capacity(self.number_of_points());
        for iy in 0..self.ny {
            for ix in 0..self.nx {
                points.push(self.point(ix, iy));
            }
        }
        points
    }
}

/// A spectral flux result: photon flux per requested photon energy.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct Spectrum {
    /// Requested photon energies [eV].
    pub photon_energies: Vec<frd>,
    /// Photon flux at each energy [photons/s/mm^2/0.1%bw].
    pub fluxes: Vec<frd>,
}

/// A scalar quantity mapped over an observation rectangle, in row-major
/// (vertical index outermost) layout.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct SurfaceMap {
    /// The observation surface the values are mapped over.
    pub surface: SurfaceRectangle,
    /// The mapped values, indexed by (vertical, horizontal) grid index.
    pub values: Array2<frd>,
}

impl SurfaceMap {
    pub(crate) fn from_flat_values(
        surface: SurfaceRectangle,
        values: Vec<frd>,
    ) -> SimulationResult<Self> {
        let shape = (surface.ny(), surface.nx());
        let values = Array2::from_shape_vec(shape, values).map_err(|err| {
            SimulationError::Configuration(format!(
                "surface map values do not match the grid shape: {}",
                err
            ))
        })?;
        Ok(Self { surface, values })
    }
}
