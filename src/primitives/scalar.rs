//! Scalar abstraction shared by every layer.
//!
//! ## Purpose
//!
//! This module defines [`Real`], the numeric-ops interface all fitting code is
//! written against. Square roots, trigonometry and epsilons are reached
//! through `nalgebra::RealField`, whose backend (std or `libm`) is selected by
//! the `std` cargo feature; the accumulation and fit logic never calls a
//! platform math function directly.
//!
//! ## Design notes
//!
//! * **f32 and f64**: the only implementors; tolerances are per-type consts.
//! * **Conversions**: literals go through [`Real::lit`] (`nalgebra::convert`),
//!   logging goes through `num_traits::ToPrimitive`.

use nalgebra::RealField;
use num_traits::ToPrimitive;

/// Floating-point scalar usable by the fitting engine.
pub trait Real: RealField + Copy + ToPrimitive {
    /// Relative tolerance under which two eigenvalues (or a pivot) are
    /// considered equal to zero or to each other.
    const SPECTRAL_TOLERANCE: f64;

    /// Machine epsilon of the type.
    fn machine_epsilon() -> Self;

    /// Convert an `f64` literal.
    #[inline]
    fn lit(v: f64) -> Self {
        nalgebra::convert(v)
    }

    /// [`Real::SPECTRAL_TOLERANCE`] as a value of the type.
    #[inline]
    fn spectral_tolerance() -> Self {
        Self::lit(Self::SPECTRAL_TOLERANCE)
    }

    /// Lossy conversion for diagnostics and error payloads.
    #[inline]
    fn to_f64_lossy(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl Real for f64 {
    const SPECTRAL_TOLERANCE: f64 = 1e-10;

    #[inline]
    fn machine_epsilon() -> Self {
        f64::EPSILON
    }
}

impl Real for f32 {
    const SPECTRAL_TOLERANCE: f64 = 1e-5;

    #[inline]
    fn machine_epsilon() -> Self {
        f32::EPSILON
    }
}
