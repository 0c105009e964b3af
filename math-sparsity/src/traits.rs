//! Scalar trait for the numeric kernels
//!
//! Patterns are purely structural; only the QR kernel and the payload helpers
//! touch numbers. They are written against [`RealField`], implemented for
//! `f64` and `f32`.

use num_traits::{Float, FromPrimitive, NumAssign};
use std::fmt::Debug;

/// Trait for real scalar types used by the numeric kernels.
///
/// Householder reflectors here are real (`H = I - beta v vᵀ`), so the trait
/// only asks for ordered floating-point arithmetic.
pub trait RealField:
    Float + NumAssign + FromPrimitive + Copy + Send + Sync + Debug + 'static
{
    /// Squared magnitude x²
    fn norm_sqr(&self) -> Self;

    /// Magnitude |x|
    fn norm(&self) -> Self {
        self.abs()
    }
}

impl RealField for f64 {
    #[inline]
    fn norm_sqr(&self) -> f64 {
        *self * *self
    }
}

impl RealField for f32 {
    #[inline]
    fn norm_sqr(&self) -> f32 {
        *self * *self
    }
}
