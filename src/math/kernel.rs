//! Kernel functions for distance-based weighting.
//!
//! ## Purpose
//!
//! This module provides the radial profiles used by
//! [`DistWeightFunc`](crate::math::weight::DistWeightFunc). A kernel maps a
//! normalized distance `x = |q| / t` to a weight and gives its closed-form
//! first derivative, which the derivative extension layer needs.
//!
//! ## Key concepts
//!
//! * **Compact support**: every kernel is zero for `x >= 1`.
//! * **Boundary continuity**: `Smooth` is C¹, `Wendland` C², `CompactExp` C^∞
//!   at `x = 1`; `Constant` is discontinuous and has a zero derivative.
//!
//! ## Invariants
//!
//! * `f(0) = 1` and `f(x) >= 0` for all `x >= 0`.

use crate::primitives::scalar::Real;

/// Radial weighting profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightKernel {
    /// Bisquare `(1 - x²)²` (default).
    #[default]
    Smooth,

    /// Wendland `(1 - x)⁴ (4x + 1)`.
    Wendland,

    /// Compact exponential `exp(1 - 1 / (1 - x²))`.
    CompactExp,

    /// Box kernel `1`.
    Constant,
}

impl WeightKernel {
    /// Kernel value at normalized distance `x >= 0`.
    #[inline]
    pub fn f<T: Real>(&self, x: T) -> T {
        let one = T::one();
        if x >= one {
            return T::zero();
        }
        match self {
            WeightKernel::Smooth => {
                let v = one - x * x;
                v * v
            }
            WeightKernel::Wendland => {
                let v = one - x;
                let v2 = v * v;
                v2 * v2 * (T::lit(4.0) * x + one)
            }
            WeightKernel::CompactExp => (one - one / (one - x * x)).exp(),
            WeightKernel::Constant => one,
        }
    }

    /// First derivative of the kernel at normalized distance `x >= 0`.
    #[inline]
    pub fn df<T: Real>(&self, x: T) -> T {
        let one = T::one();
        if x >= one {
            return T::zero();
        }
        match self {
            WeightKernel::Smooth => -T::lit(4.0) * x * (one - x * x),
            WeightKernel::Wendland => {
                let v = one - x;
                -T::lit(20.0) * x * v * v * v
            }
            WeightKernel::CompactExp => {
                let v = one - x * x;
                -self.f(x) * T::lit(2.0) * x / (v * v)
            }
            WeightKernel::Constant => T::zero(),
        }
    }

    /// Whether [`WeightKernel::df`] carries information for derivative fits.
    #[inline]
    pub const fn is_differentiable(&self) -> bool {
        !matches!(self, WeightKernel::Constant)
    }
}
