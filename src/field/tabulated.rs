//! Field contributors sampled on regular 1D/2D/3D grids.

use super::{ffd, FieldContributor};
use crate::error::{SimulationError, SimulationResult};
use crate::geometry::{Dim3, Point3, Vec3};
use ndarray::{Array2, Array3};

/// A field known only through samples on a grid, evaluated by linear
/// interpolation between the nearest samples.
///
/// Positions outside the grid extent yield zero field. Axes the grid
/// does not cover are treated as invariant: the field value does not
/// depend on those coordinates.
pub struct TabulatedField {
    grid: SampleGrid,
}

enum SampleGrid {
    OneDim {
        axis: Dim3,
        coords: Vec<ffd>,
        values: Vec<Vec3<ffd>>,
    },
    TwoDim {
        axes: [Dim3; 2],
        coords: [Vec<ffd>; 2],
        values: Array2<Vec3<ffd>>,
    },
    ThreeDim {
        coords: [Vec<ffd>; 3],
        values: Array3<Vec3<ffd>>,
    },
}

impl TabulatedField {
    /// Creates a tabulated field from samples along a single axis.
    ///
    /// The samples are sorted by coordinate; duplicate coordinates or
    /// fewer than two samples are rejected.
    pub fn from_1d_samples(
        axis: Dim3,
        samples: Vec<(ffd, Vec3<ffd>)>,
    ) -> SimulationResult<Self> {
        if samples.len() < 2 {
            return Err(SimulationError::Configuration(format!(
                "tabulated field needs at least 2 samples, got {}",
                samples.len()
            )));
        }
        let mut samples = samples;
        samples.sort_by(|a, b| ordered(a.0, b.0));

        let mut coords = Vec::with_capacity(samples.len());
        let mut values = Vec::with_capacity(samples.len());
        for (coord, value) in samples {
            if coords.last() == Some(&coord) {
                return Err(SimulationError::Configuration(format!(
                    "duplicate sample coordinate {} in tabulated field",
                    coord
                )));
            }
            coords.push(coord);
            values.push(value);
        }
        Ok(Self {
            grid: SampleGrid::OneDim {
                axis,
                coords,
                values,
            },
        })
    }

    /// Creates a tabulated field from samples on a full 2D tensor-product
    /// grid spanning the two given axes.
    pub fn from_2d_samples(
        axes: [Dim3; 2],
        samples: Vec<([ffd; 2], Vec3<ffd>)>,
    ) -> SimulationResult<Self> {
        if axes[0] == axes[1] {
            return Err(SimulationError::Configuration(
                "tabulated field axes must be distinct".to_string(),
            ));
        }
        let coords = [
            unique_sorted_coords(samples.iter().map(|(position, _)| position[0]))?,
            unique_sorted_coords(samples.iter().map(|(position, _)| position[1]))?,
        ];
        let shape = (coords[0].len(), coords[1].len());
        if samples.len() != shape.0 * shape.1 {
            return Err(SimulationError::Configuration(format!(
                "tabulated field samples do not form a full {}x{} grid ({} rows)",
                shape.0,
                shape.1,
                samples.len()
            )));
        }

        let mut values = Array2::from_elem(shape, Vec3::zero());
        for (position, value) in samples {
            let i = coord_index(&coords[0], position[0]);
            let j = coord_index(&coords[1], position[1]);
            values[[i, j]] = value;
        }
        Ok(Self {
            grid: SampleGrid::TwoDim {
                axes,
                coords,
                values,
            },
        })
    }

    /// Creates a tabulated field from samples on a full 3D tensor-product
    /// grid in (x, y, z) order.
    pub fn from_3d_samples(samples: Vec<([ffd; 3], Vec3<ffd>)>) -> SimulationResult<Self> {
        let coords = [
            unique_sorted_coords(samples.iter().map(|(position, _)| position[0]))?,
            unique_sorted_coords(samples.iter().map(|(position, _)| position[1]))?,
            unique_sorted_coords(samples.iter().map(|(position, _)| position[2]))?,
        ];
        let shape = (coords[0].len(), coords[1].len(), coords[2].len());
        if samples.len() != shape.0 * shape.1 * shape.2 {
            return Err(SimulationError::Configuration(format!(
                "tabulated field samples do not form a full {}x{}x{} grid ({} rows)",
                shape.0,
                shape.1,
                shape.2,
                samples.len()
            )));
        }

        let mut values = Array3::from_elem(shape, Vec3::zero());
        for (position, value) in samples {
            let i = coord_index(&coords[0], position[0]);
            let j = coord_index(&coords[1], position[1]);
            let k = coord_index(&coords[2], position[2]);
            values[[i, j, k]] = value;
        }
        Ok(Self {
            grid: SampleGrid::ThreeDim { coords, values },
        })
    }
}

impl FieldContributor for TabulatedField {
    fn evaluate(&self, position: &Point3<ffd>, _time: ffd) -> Vec3<ffd> {
        match &self.grid {
            SampleGrid::OneDim {
                axis,
                coords,
                values,
            } => match locate(coords, position[*axis]) {
                Some((idx, t)) => lerp(&values[idx], &values[idx + 1], t),
                None => Vec3::zero(),
            },
            SampleGrid::TwoDim {
                axes,
                coords,
                values,
            } => {
                let located = (
                    locate(&coords[0], position[axes[0]]),
                    locate(&coords[1], position[axes[1]]),
                );
                match located {
                    (Some((i, u)), Some((j, v))) => {
                        let lower = lerp(&values[[i, j]], &values[[i + 1, j]], u);
                        let upper = lerp(&values[[i, j + 1]], &values[[i + 1, j + 1]], u);
                        lerp(&lower, &upper, v)
                    }
                    _ => Vec3::zero(),
                }
            }
            SampleGrid::ThreeDim { coords, values } => {
                let located = (
                    locate(&coords[0], position[Dim3::X]),
                    locate(&coords[1], position[Dim3::Y]),
                    locate(&coords[2], position[Dim3::Z]),
                );
                match located {
                    (Some((i, u)), Some((j, v)), Some((k, w))) => {
                        let front_lower = lerp(&values[[i, j, k]], &values[[i + 1, j, k]], u);
                        let front_upper =
                            lerp(&values[[i, j + 1, k]], &values[[i + 1, j + 1, k]], u);
                        let back_lower =
                            lerp(&values[[i, j, k + 1]], &values[[i + 1, j, k + 1]], u);
                        let back_upper =
                            lerp(&values[[i, j + 1, k + 1]], &values[[i + 1, j + 1, k + 1]], u);
                        lerp(
                            &lerp(&front_lower, &front_upper, v),
                            &lerp(&back_lower, &back_upper, v),
                            w,
                        )
                    }
                    _ => Vec3::zero(),
                }
            }
        }
    }
}

fn ordered(a: ffd, b: ffd) -> std::cmp::Ordering {
    a.partial_cmp(&b).expect("NaN in coordinate comparison.")
}

fn unique_sorted_coords<I: Iterator<Item = ffd>>(coords: I) -> SimulationResult<Vec<ffd>> {
    let mut coords: Vec<_> = coords.collect();
    coords.sort_by(|a, b| ordered(*a, *b));
    coords.dedup();
    if coords.len() < 2 {
        return Err(SimulationError::Configuration(format!(
            "tabulated field grid needs at least 2 distinct coordinates per axis, got {}",
            coords.len()
        )));
    }
    Ok(coords)
}

fn coord_index(coords: &[ffd], coord: ffd) -> usize {
    coords
        .binary_search_by(|probe| ordered(*probe, coord))
        .expect("Sample coordinate missing from its own grid.")
}

/// Finds the interval containing the given coordinate and the fractional
/// position within it, or `None` outside the grid extent.
fn locate(coords: &[ffd], coord: ffd) -> Option<(usize, ffd)> {
    let last = coords.len() - 1;
    if coord < coords[0] || coord > coords[last] {
        return None;
    }
    let upper = coords.partition_point(|&probe| probe < coord).max(1).min(last);
    let lower = upper - 1;
    let width = coords[upper] - coords[lower];
    Some(((lower), (coord - coords[lower]) / width))
}

fn lerp(a: &Vec3<ffd>, b: &Vec3<ffd>, t: ffd) -> Vec3<ffd> {
    a * (1.0 - t) + b * t
}
