//! Superposition model for electric and magnetic field configurations.

pub mod analytic;
pub mod file;
pub mod tabulated;

use crate::geometry::{Point3, Rotation3, Vec3};

/// Floating-point precision to use for field data.
#[allow(non_camel_case_types)]
pub type ffd = f64;

/// Whether a contributor produces an electric or a magnetic field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Electric,
    Magnetic,
}

/// Defines the capability of evaluating one field contribution.
///
/// Implementations must be pure: repeated evaluation at the same
/// position and time yields the same vector.
pub trait FieldContributor: Sync + Send {
    /// Evaluates the field contribution at the given position and time.
    ///
    /// # Parameters
    ///
    /// - `position`: Where to evaluate the field [m].
    /// - `time`: When to evaluate the field [s].
    ///
    /// # Returns
    ///
    /// The field vector at the given position and time ([T] for magnetic
    /// contributors, [V/m] for electric ones).
    fn evaluate(&self, position: &Point3<ffd>, time: ffd) -> Vec3<ffd>;
}

/// An externally supplied pure field callback, invoked without
/// inspecting its internals.
pub struct FunctionField {
    function: Box<dyn Fn(&Point3<ffd>, ffd) -> Vec3<ffd> + Sync + Send>,
}

impl FunctionField {
    /// Wraps the given callback as a field contributor.
    pub fn new<C>(function: C) -> Self
    where
        C: Fn(&Point3<ffd>, ffd) -> Vec3<ffd> + Sync + Send + 'static,
    {
        Self {
            function: Box::new(function),
        }
    }
}

impl FieldContributor for FunctionField {
    fn evaluate(&self, position: &Point3<ffd>, time: ffd) -> Vec3<ffd> {
        (self.function)(position, time)
    }
}

/// An affine placement transform (translation + rotation) applied to a
/// contributor's query positions before local evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Displacement of the contributor's local origin [m].
    pub translation: Vec3<ffd>,
    /// Orientation of the contributor's local axes.
    pub rotation: Rotation3<ffd>,
}

impl Placement {
    /// Creates a placement with the given translation and no rotation.
    pub fn translated(translation: Vec3<ffd>) -> Self {
        Self {
            translation,
            rotation: Rotation3::identity(),
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            translation: Vec3::zero(),
            rotation: Rotation3::identity(),
        }
    }
}

struct PlacedContributor {
    contributor: Box<dyn FieldContributor>,
    placement: Placement,
}

impl PlacedContributor {
    fn evaluate(&self, position: &Point3<ffd>, time: ffd) -> Vec3<ffd> {
        if self.placement.rotation.is_identity() {
            let local = (position - &self.placement.translation.to_point3()).to_point3();
            self.contributor.evaluate(&local, time)
        } else {
            let displaced = position.to_vec3() - &self.placement.translation;
            let local = self
                .placement
                .rotation
                .inverse_rotate_vec3(&displaced)
                .to_point3();
            let local_field = self.contributor.evaluate(&local, time);
            self.placement.rotation.rotate_vec3(&local_field)
        }
    }
}

/// The superposition of all registered contributors of one field kind.
#[derive(Default)]
pub struct SuperposedField {
    contributors: Vec<PlacedContributor>,
}

impl SuperposedField {
    /// Registers a contributor with the given placement.
    pub fn add<C: FieldContributor + 'static>(&mut self, contributor: C, placement: Placement) {
        self.contributors.push(PlacedContributor {
            contributor: Box::new(contributor),
            placement,
        });
    }

    /// Removes all registered contributors.
    pub fn clear(&mut self) {
        self.contributors.clear();
    }

    /// Returns the number of registered contributors.
    pub fn number_of_contributors(&self) -> usize {
        self.contributors.len()
    }

    /// Evaluates the vector sum of all contributors at the given
    /// position and time.
    pub fn evaluate(&self, position: &Point3<ffd>, time: ffd) -> Vec3<ffd> {
        self.contributors
            .iter()
            .fold(Vec3::zero(), |sum, placed| sum + placed.evaluate(position, time))
    }
}

/// Stores the electric and magnetic field configuration of a run and
/// evaluates the superposed fields.
///
/// Immutable while a calculation is in progress; contributors are only
/// added or removed between runs.
#[derive(Default)]
pub struct FieldModel {
    electric: SuperposedField,
    magnetic: SuperposedField,
}

impl FieldModel {
    /// Creates an empty field model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a field contributor of the given kind.
    pub fn add_field<C: FieldContributor + 'static>(
        &mut self,
        kind: FieldKind,
        contributor: C,
        placement: Placement,
    ) {
        match kind {
            FieldKind::Electric => self.electric.add(contributor, placement),
            FieldKind::Magnetic => self.magnetic.add(contributor, placement),
        }
    }

    /// Removes all contributors of the given kind.
    pub fn clear_fields(&mut self, kind: FieldKind) {
        match kind {
            FieldKind::Electric => self.electric.clear(),
            FieldKind::Magnetic => self.magnetic.clear(),
        }
    }

    /// Whether no contributor of either kind is registered.
    pub fn is_empty(&self) -> bool {
        self.electric.number_of_contributors() == 0
            && self.magnetic.number_of_contributors() == 0
    }

    /// Evaluates the superposed magnetic field [T] at the given position
    /// and time.
    pub fn evaluate_b(&self, position: &Point3<ffd>, time: ffd) -> Vec3<ffd> {
        self.magnetic.evaluate(position, time)
    }

    /// Evaluates the superposed electric field [V/m] at the given
    /// position and time.
    pub fn evaluate_e(&self, position: &Point3<ffd>, time: ffd) -> Vec3<ffd> {
        self.electric.evaluate(position, time)
    }
}
