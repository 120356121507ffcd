//! Geometric utility objects.

use crate::num::SFloat;
use std::{
    fmt,
    ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub},
};

#[cfg(feature = "serialization")]
use serde::Serialize;

/// Denotes the x-, y- or z-dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub enum Dim3 {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Dim3 {
    /// Creates an array for iterating over the x-, y- and z-dimensions.
    pub fn slice() -> [Self; 3] {
        [Self::X, Self::Y, Self::Z]
    }

    /// Returns the number of the dimension.
    pub fn num(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Dim3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::X => "x",
                Self::Y => "y",
                Self::Z => "z",
            }
        )
    }
}

use Dim3::{X, Y, Z};

/// A 3D vector.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct Vec3<F>([F; 3]);

impl<F: SFloat> Vec3<F> {
    /// Creates a new 3D vector given the three components.
    pub fn new(x: F, y: F, z: F) -> Self {
        Self([x, y, z])
    }

    /// Creates a new 3D vector by evaluating the given component
    /// constructor for each dimension.
    pub fn with_each_component<C>(create_component: C) -> Self
    where
        C: Fn(Dim3) -> F,
    {
        Self::new(create_component(X), create_component(Y), create_component(Z))
    }

    /// Creates a new zero vector.
    pub fn zero() -> Self {
        Self::new(F::zero(), F::zero(), F::zero())
    }

    /// Creates a new unit vector along the given dimension.
    pub fn unit_along(dim: Dim3) -> Self {
        Self::with_each_component(|d| if d == dim { F::one() } else { F::zero() })
    }

    /// Constructs a new point from the vector components.
    pub fn to_point3(&self) -> Point3<F> {
        Point3::with_each_component(|dim| self[dim])
    }

    /// Computes the squared length of the vector.
    pub fn squared_length(&self) -> F {
        self[X] * self[X] + self[Y] * self[Y] + self[Z] * self[Z]
    }

    /// Computes the length of the vector.
    pub fn length(&self) -> F {
        self.squared_length().sqrt()
    }

    /// Whether the vector is the zero vector.
    pub fn is_zero(&self) -> bool {
        self[X] == F::zero() && self[Y] == F::zero() && self[Z] == F::zero()
    }

    /// Whether all components of the vector are finite.
    pub fn is_finite(&self) -> bool {
        self[X].is_finite() && self[Y].is_finite() && self[Z].is_finite()
    }

    /// Computes the dot product of the vector with another vector.
    pub fn dot(&self, other: &Self) -> F {
        self[X] * other[X] + self[Y] * other[Y] + self[Z] * other[Z]
    }

    /// Computes the cross product of the vector with another vector.
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self[Y] * other[Z] - self[Z] * other[Y],
            self[Z] * other[X] - self[X] * other[Z],
            self[X] * other[Y] - self[Y] * other[X],
        )
    }

    /// Constructs a new vector with the same direction but unit length.
    ///
    /// Panics for the zero vector.
    pub fn normalized(&self) -> Self {
        let length = self.length();
        assert!(length != F::zero());
        self * length.recip()
    }

    /// Normalizes the vector to have unit length.
    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// Reverses the direction of the vector.
    pub fn reverse(&mut self) {
        self[X] = -self[X];
        self[Y] = -self[Y];
        self[Z] = -self[Z];
    }
}

impl<F: SFloat> Index<Dim3> for Vec3<F> {
    type Output = F;
    fn index(&self, dim: Dim3) -> &Self::Output {
        &self.0[dim as usize]
    }
}

impl<F: SFloat> IndexMut<Dim3> for Vec3<F> {
    fn index_mut(&mut self, dim: Dim3) -> &mut Self::Output {
        &mut self.0[dim as usize]
    }
}

impl<'a, F: SFloat> Add<&'a Vec3<F>> for &'a Vec3<F> {
    type Output = Vec3<F>;
    fn add(self, other: Self) -> Self::Output {
        Self::Output::new(self[X] + other[X], self[Y] + other[Y], self[Z] + other[Z])
    }
}

impl<F: SFloat> Add<Vec3<F>> for &Vec3<F> {
    type Output = Vec3<F>;
    fn add(self, other: Vec3<F>) -> Self::Output {
        self + &other
    }
}

impl<F: SFloat> Add<Vec3<F>> for Vec3<F> {
    type Output = Self;
    fn add(self, other: Self) -> Self::Output {
        &self + &other
    }
}

impl<F: SFloat> Add<&Vec3<F>> for Vec3<F> {
    type Output = Self;
    fn add(self, other: &Self) -> Self::Output {
        &self + other
    }
}

impl<'a, F: SFloat> Sub<&'a Vec3<F>> for &'a Vec3<F> {
    type Output = Vec3<F>;
    fn sub(self, other: Self) -> Self::Output {
        Self::Output::new(self[X] - other[X], self[Y] - other[Y], self[Z] - other[Z])
    }
}

impl<F: SFloat> Sub<Vec3<F>> for &Vec3<F> {
    type Output = Vec3<F>;
    fn sub(self, other: Vec3<F>) -> Self::Output {
        self - &other
    }
}

impl<F: SFloat> Sub<Vec3<F>> for Vec3<F> {
    type Output = Self;
    fn sub(self, other: Self) -> Self::Output {
        &self - &other
    }
}

impl<F: SFloat> Sub<&Vec3<F>> for Vec3<F> {
    type Output = Self;
    fn sub(self, other: &Self) -> Self::Output {
        &self - other
    }
}

impl<F: SFloat> Mul<F> for &Vec3<F> {
    type Output = Vec3<F>;
    fn mul(self, factor: F) -> Self::Output {
        Self::Output::new(factor * self[X], factor * self[Y], factor * self[Z])
    }
}

impl<F: SFloat> Mul<F> for Vec3<F> {
    type Output = Self;
    fn mul(self, factor: F) -> Self::Output {
        &self * factor
    }
}

impl<F: SFloat> Div<F> for &Vec3<F> {
    type Output = Vec3<F>;
    fn div(self, divisor: F) -> Self::Output {
        #![allow(clippy::suspicious_arithmetic_impl)]
        self * divisor.recip()
    }
}

impl<F: SFloat> Div<F> for Vec3<F> {
    type Output = Self;
    fn div(self, divisor: F) -> Self::Output {
        &self / divisor
    }
}

impl<F: SFloat> Neg for &Vec3<F> {
    type Output = Vec3<F>;
    fn neg(self) -> Self::Output {
        Self::Output::new(-self[X], -self[Y], -self[Z])
    }
}

impl<F: SFloat> Neg for Vec3<F> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        -&self
    }
}

impl<F: SFloat> fmt::Display for Vec3<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self[X], self[Y], self[Z])
    }
}

/// A 3D spatial coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct Point3<F>([F; 3]);

impl<F: SFloat> Point3<F> {
    /// Creates a new 3D point given the three coordinates.
    pub fn new(x: F, y: F, z: F) -> Self {
        Self([x, y, z])
    }

    /// Creates a new 3D point by evaluating the given component
    /// constructor for each dimension.
    pub fn with_each_component<C>(create_component: C) -> Self
    where
        C: Fn(Dim3) -> F,
    {
        Self::new(create_component(X), create_component(Y), create_component(Z))
    }

    /// Creates a new point at the origin.
    pub fn origin() -> Self {
        Self::new(F::zero(), F::zero(), F::zero())
    }

    /// Constructs a new vector from the point coordinates.
    pub fn to_vec3(&self) -> Vec3<F> {
        Vec3::with_each_component(|dim| self[dim])
    }

    /// Whether all coordinates of the point are finite.
    pub fn is_finite(&self) -> bool {
        self[X].is_finite() && self[Y].is_finite() && self[Z].is_finite()
    }
}

impl<F: SFloat> Index<Dim3> for Point3<F> {
    type Output = F;
    fn index(&self, dim: Dim3) -> &Self::Output {
        &self.0[dim as usize]
    }
}

impl<F: SFloat> IndexMut<Dim3> for Point3<F> {
    fn index_mut(&mut self, dim: Dim3) -> &mut Self::Output {
        &mut self.0[dim as usize]
    }
}

impl<'a, F: SFloat> Sub<&'a Point3<F>> for &'a Point3<F> {
    type Output = Vec3<F>;
    fn sub(self, other: Self) -> Self::Output {
        Self::Output::new(self[X] - other[X], self[Y] - other[Y], self[Z] - other[Z])
    }
}

impl<F: SFloat> Sub<Point3<F>> for Point3<F> {
    type Output = Vec3<F>;
    fn sub(self, other: Self) -> Self::Output {
        &self - &other
    }
}

impl<'a, F: SFloat> Add<&'a Vec3<F>> for &'a Point3<F> {
    type Output = Point3<F>;
    fn add(self, vector: &'a Vec3<F>) -> Self::Output {
        Self::Output::new(self[X] + vector[X], self[Y] + vector[Y], self[Z] + vector[Z])
    }
}

impl<F: SFloat> Add<Vec3<F>> for &Point3<F> {
    type Output = Point3<F>;
    fn add(self, vector: Vec3<F>) -> Self::Output {
        self + &vector
    }
}

impl<F: SFloat> Add<Vec3<F>> for Point3<F> {
    type Output = Self;
    fn add(self, vector: Vec3<F>) -> Self::Output {
        &self + &vector
    }
}

impl<F: SFloat> fmt::Display for Point3<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self[X], self[Y], self[Z])
    }
}

/// An axis-aligned rectangular region of 3D space.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct BoundingBox<F> {
    lower: Point3<F>,
    upper: Point3<F>,
}

impl<F: SFloat> BoundingBox<F> {
    /// Creates a new bounding box from the given corners, with coordinates
    /// reordered so that `lower` is the componentwise minimum.
    pub fn new(corner_a: Point3<F>, corner_b: Point3<F>) -> Self {
        Self {
            lower: Point3::with_each_component(|dim| F::min(corner_a[dim], corner_b[dim])),
            upper: Point3::with_each_component(|dim| F::max(corner_a[dim], corner_b[dim])),
        }
    }

    /// Returns the lower corner of the bounding box.
    pub fn lower(&self) -> &Point3<F> {
        &self.lower
    }

    /// Returns the upper corner of the bounding box.
    pub fn upper(&self) -> &Point3<F> {
        &self.upper
    }

    /// Whether the given point lies inside the box (boundaries included).
    pub fn contains(&self, point: &Point3<F>) -> bool {
        Dim3::slice()
            .iter()
            .all(|&dim| point[dim] >= self.lower[dim] && point[dim] <= self.upper[dim])
    }
}

/// A proper rotation of 3D space, stored as the rows of the rotation matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct Rotation3<F> {
    rows: [Vec3<F>; 3],
}

impl<F: SFloat> Rotation3<F> {
    /// Creates the identity rotation.
    pub fn identity() -> Self {
        Self {
            rows: [Vec3::unit_along(X), Vec3::unit_along(Y), Vec3::unit_along(Z)],
        }
    }

    /// Creates a rotation from extrinsic Euler angles [rad], applied
    /// about the x-, then y-, then z-axis.
    pub fn from_euler_angles(angle_x: F, angle_y: F, angle_z: F) -> Self {
        let (sx, cx) = angle_x.sin_cos();
        let (sy, cy) = angle_y.sin_cos();
        let (sz, cz) = angle_z.sin_cos();
        Self {
            rows: [
                Vec3::new(cy * cz, sx * sy * cz - cx * sz, cx * sy * cz + sx * sz),
                Vec3::new(cy * sz, sx * sy * sz + cx * cz, cx * sy * sz - sx * cz),
                Vec3::new(-sy, sx * cy, cx * cy),
            ],
        }
    }

    /// Whether this is the identity rotation.
    pub fn is_identity(&self) -> bool {
        self == &Self::identity()
    }

    /// Applies the rotation to the given vector.
    pub fn rotate_vec3(&self, vector: &Vec3<F>) -> Vec3<F> {
        Vec3::with_each_component(|dim| self.rows[dim.num()].dot(vector))
    }

    /// Applies the inverse rotation to the given vector.
    pub fn inverse_rotate_vec3(&self, vector: &Vec3<F>) -> Vec3<F> {
        Vec3::with_each_component(|dim| {
            self.rows[X.num()][dim] * vector[X]
                + self.rows[Y.num()][dim] * vector[Y]
                + self.rows[Z.num()][dim] * vector[Z]
        })
    }

    /// Applies the rotation to the given point.
    pub fn rotate_point3(&self, point: &Point3<F>) -> Point3<F> {
        self.rotate_vec3(&point.to_vec3()).to_point3()
    }
}

impl<F: SFloat> Default for Rotation3<F> {
    fn default() -> Self {
        Self::identity()
    }
}

/// Constructs an orthonormal basis (u, v) for the plane with the given
/// unit normal, such that (u, v, normal) is right-handed.
pub fn orthonormal_basis<F: SFloat>(normal: &Vec3<F>) -> (Vec3<F>, Vec3<F>) {
    let nine_tenths = F::from_f64(0.9).unwrap();

    // Any axis not close to parallel with the normal works as a seed.
    let seed = if num::Float::abs(normal[X]) < nine_tenths {
        Vec3::unit_along(X)
    } else {
        Vec3::unit_along(Y)
    };

    let u = (&seed - normal * seed.dot(normal)).normalized();
    let v = normal.cross(&u);
    (u, v)
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cross_product_is_right_handed() {
        let x: Vec3<f64> = Vec3::unit_along(X);
        let y = Vec3::unit_along(Y);
        assert_eq!(x.cross(&y), Vec3::unit_along(Z));
        assert_eq!(y.cross(&x), -Vec3::unit_along(Z));
    }

    #[test]
    fn rotation_preserves_length_and_inverts() {
        let rotation = Rotation3::from_euler_angles(0.3, -1.1, 2.4);
        let vector = Vec3::new(1.0, -2.0, 0.5);
        let rotated = rotation.rotate_vec3(&vector);
        assert_relative_eq!(rotated.length(), vector.length(), max_relative = 1e-14);
        let restored = rotation.inverse_rotate_vec3(&rotated);
        assert_relative_eq!(restored[X], vector[X], epsilon = 1e-14);
        assert_relative_eq!(restored[Y], vector[Y], epsilon = 1e-14);
        assert_relative_eq!(restored[Z], vector[Z], epsilon = 1e-14);
    }

    #[test]
    fn orthonormal_basis_is_orthonormal() {
        let normal = Vec3::new(0.3, -0.2, 0.93).normalized();
        let (u, v) = orthonormal_basis(&normal);
        assert_relative_eq!(u.length(), 1.0, max_relative = 1e-14);
        assert_relative_eq!(v.length(), 1.0, max_relative = 1e-14);
        assert_relative_eq!(u.dot(&normal), 0.0, epsilon = 1e-14);
        assert_relative_eq!(v.dot(&normal), 0.0, epsilon = 1e-14);
        assert_relative_eq!(u.dot(&v), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn bounding_box_reorders_corners() {
        let bounds = BoundingBox::new(Point3::new(1.0, -1.0, 2.0), Point3::new(-1.0, 1.0, 0.0));
        assert!(bounds.contains(&Point3::origin()));
        assert!(!bounds.contains(&Point3::new(0.0, 0.0, 2.5)));
    }
}
