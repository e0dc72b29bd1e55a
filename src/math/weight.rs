//! Distance-based weighting function.
//!
//! ## Purpose
//!
//! [`DistWeightFunc`] turns a neighbor position into the scalar weight the
//! accumulation protocol uses: `w = k(|x - c| / t)` for an evaluation center
//! `c`, a scale `t` and a [`WeightKernel`] `k`. It also owns the change of
//! coordinates between global positions and the local frame centered at `c`
//! in which all sums are accumulated.
//!
//! ## Key concepts
//!
//! * **Local coordinates**: `q = x - c`.
//! * **Derivatives**: `∂w/∂t = -k'(x) x / t` and
//!   `∂w/∂c = -k'(x) q / (t |q|)`, with `x = |q| / t`.
//!
//! ## Invariants
//!
//! * The scale is strictly positive and finite, the center finite.
//! * `w = 0` whenever `|q| >= t`.
//!
//! ## Non-goals
//!
//! * This module does not select neighbors; samples outside the support are
//!   simply given a zero weight.

use nalgebra::SVector;

use crate::engine::validator::Validator;
use crate::math::kernel::WeightKernel;
use crate::primitives::derivative::ScalarDerivative;
use crate::primitives::errors::FitError;
use crate::primitives::scalar::Real;

/// Weight of one neighbor and, on request, its derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightEval<T: Real, const N: usize> {
    /// Weight value.
    pub w: T,
    /// Derivatives of the weight (zero where not requested).
    pub dw: ScalarDerivative<T, N>,
}

/// Radial weighting function centered at an evaluation point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistWeightFunc<T: Real, const N: usize> {
    center: SVector<T, N>,
    scale: T,
    kernel: WeightKernel,
}

impl<T: Real, const N: usize> DistWeightFunc<T, N> {
    /// Create a weighting function, validating the center and the scale.
    pub fn new(center: SVector<T, N>, scale: T, kernel: WeightKernel) -> Result<Self, FitError> {
        Validator::validate_scale(scale)?;
        Validator::validate_point(&center, "center")?;
        Ok(Self {
            center,
            scale,
            kernel,
        })
    }

    /// Evaluation center.
    #[inline]
    pub fn center(&self) -> &SVector<T, N> {
        &self.center
    }

    /// Support radius.
    #[inline]
    pub fn scale(&self) -> T {
        self.scale
    }

    /// Radial profile.
    #[inline]
    pub fn kernel(&self) -> WeightKernel {
        self.kernel
    }

    /// Express a global position in the local frame.
    #[inline]
    pub fn to_local(&self, x: &SVector<T, N>) -> SVector<T, N> {
        x - self.center
    }

    /// Express a local position in the global frame.
    #[inline]
    pub fn to_global(&self, q: &SVector<T, N>) -> SVector<T, N> {
        q + self.center
    }

    /// Weight of a neighbor given in local coordinates.
    #[inline]
    pub fn weight(&self, q: &SVector<T, N>) -> T {
        self.kernel.f(q.norm() / self.scale)
    }

    /// Weight and the requested derivatives of a neighbor in local coordinates.
    pub fn evaluate(&self, q: &SVector<T, N>, scale_der: bool, space_der: bool) -> WeightEval<T, N> {
        let d = q.norm();
        let x = d / self.scale;
        let w = self.kernel.f(x);
        let mut dw = ScalarDerivative::zeros();
        if w > T::zero() && (scale_der || space_der) {
            let df = self.kernel.df(x);
            if scale_der {
                dw.dt = -df * x / self.scale;
            }
            if space_der && d > T::zero() {
                dw.dp = q * (-df / (self.scale * d));
            }
        }
        WeightEval { w, dw }
    }
}
