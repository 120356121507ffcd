//! Utilities related to numbers.

use std::fmt;

/// Floating point marker trait for easier control over trait bounds.
pub trait SFloat:
    Sync + Send + num::Float + num::cast::FromPrimitive + fmt::Debug + fmt::Display + 'static
{
}

impl SFloat for f32 {}
impl SFloat for f64 {}
