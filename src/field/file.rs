//! Reading of tabulated field samples from delimited text files.
//!
//! Each row of the file holds one sample point, with whitespace-delimited
//! columns. The column order and grid dimensionality are declared by a
//! format string such as `"Z Bx By Bz"`: position tokens (`X`, `Y`, `Z`)
//! name the gridded axes and component tokens (`Bx`/`Ex`/`Fx`, ...) name
//! the stored vector components. Missing components are zero.

use super::tabulated::TabulatedField;
use super::ffd;
use crate::error::{SimulationError, SimulationResult};
use crate::geometry::{Dim3, Vec3};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq)]
enum ColumnRole {
    Position(Dim3),
    Component(Dim3),
}

/// Parsed form of a field file format string.
#[derive(Clone, Debug)]
pub struct FieldFileFormat {
    columns: Vec<ColumnRole>,
    axes: Vec<Dim3>,
}

impl FieldFileFormat {
    /// Parses a format string into column roles.
    pub fn parse(format: &str) -> SimulationResult<Self> {
        let mut columns = Vec::new();
        let mut axes = Vec::new();
        for token in format.split_whitespace() {
            let role = match token.to_ascii_uppercase().as_str() {
                "X" => ColumnRole::Position(Dim3::X),
                "Y" => ColumnRole::Position(Dim3::Y),
                "Z" => ColumnRole::Position(Dim3::Z),
                "BX" | "EX" | "FX" => ColumnRole::Component(Dim3::X),
                "BY" | "EY" | "FY" => ColumnRole::Component(Dim3::Y),
                "BZ" | "EZ" | "FZ" => ColumnRole::Component(Dim3::Z),
                _ => {
                    return Err(SimulationError::Configuration(format!(
                        "unrecognized field file format token {:?}",
                        token
                    )))
                }
            };
            if let ColumnRole::Position(axis) = role {
                if axes.contains(&axis) {
                    return Err(SimulationError::Configuration(format!(
                        "repeated position column {} in field file format",
                        axis
                    )));
                }
                axes.push(axis);
            }
            columns.push(role);
        }
        if axes.is_empty() || axes.len() > 3 {
            return Err(SimulationError::Configuration(format!(
                "field file format must declare 1 to 3 position columns, got {}",
                axes.len()
            )));
        }
        Ok(Self { columns, axes })
    }

    /// Number of gridded dimensions declared by the format.
    pub fn dimensionality(&self) -> usize {
        self.axes.len()
    }
}

/// Reads tabulated field samples from the given text file.
///
/// # Parameters
///
/// - `file_path`: Path to the whitespace-delimited sample file.
/// - `format`: Column format string, e.g. `"Z Bx By Bz"`.
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: Contains a `TabulatedField` interpolating the file's samples.
/// - `Err`: The file could not be read, the format string is malformed
///   or the rows do not form a full grid.
pub fn read_field_file(file_path: &Path, format: &str) -> SimulationResult<TabulatedField> {
    let format = FieldFileFormat::parse(format)?;
    let file = File::open(file_path)?;
    parse_field_samples(BufReader::new(file), &format)
}

/// Parses field samples from the given reader; see [`read_field_file`].
pub fn parse_field_samples<R: BufRead>(
    reader: R,
    format: &FieldFileFormat,
) -> SimulationResult<TabulatedField> {
    let mut positions: Vec<[ffd; 3]> = Vec::new();
    let mut values: Vec<Vec3<ffd>> = Vec::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut numbers = Vec::with_capacity(format.columns.len());
        for column in trimmed.split_whitespace() {
            let number: ffd = column.parse().map_err(|_| {
                SimulationError::Configuration(format!(
                    "malformed number {:?} on line {} of field file",
                    column,
                    line_idx + 1
                ))
            })?;
            numbers.push(number);
        }
        if numbers.len() != format.columns.len() {
            return Err(SimulationError::Configuration(format!(
                "expected {} columns on line {} of field file, got {}",
                format.columns.len(),
                line_idx + 1,
                numbers.len()
            )));
        }

        let mut position = [0.0; 3];
        let mut value = Vec3::zero();
        for (role, number) in format.columns.iter().zip(numbers) {
            match role {
                ColumnRole::Position(axis) => {
                    position[format.axes.iter().position(|a| a == axis).unwrap()] = number
                }
                ColumnRole::Component(dim) => value[*dim] = number,
            }
        }
        positions.push(position);
        values.push(value);
    }

    let samples = positions.into_iter().zip(values);
    match format.dimensionality() {
        1 => TabulatedField::from_1d_samples(
            format.axes[0],
            samples.map(|(position, value)| (position[0], value)).collect(),
        ),
        2 => TabulatedField::from_2d_samples(
            [format.axes[0], format.axes[1]],
            samples
                .map(|(position, value)| ([position[0], position[1]], value))
                .collect(),
        ),
        _ => {
            // All three axes present; reorder into canonical (x, y, z).
            let order = [
                format.axes.iter().position(|&a| a == Dim3::X).unwrap(),
                format.axes.iter().position(|&a| a == Dim3::Y).unwrap(),
                format.axes.iter().position(|&a| a == Dim3::Z).unwrap(),
            ];
            TabulatedField::from_3d_samples(
                samples
                    .map(|(position, value)| {
                        ([position[order[0]], position[order[1]], position[order[2]]], value)
                    })
                    .collect(),
            )
        }
    }
}
