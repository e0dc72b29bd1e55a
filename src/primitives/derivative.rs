//! Derivative selection markers and containers.
//!
//! ## Purpose
//!
//! Derivative extension components differentiate fitted quantities with
//! respect to the scale `t` of the weighting function and/or the position `p`
//! of its evaluation center. This module defines the marker types selecting
//! which of the two is computed, and small value types carrying a scalar's or
//! a vector's derivative in both directions.
//!
//! ## Key concepts
//!
//! * **ScalarDerivative**: `(∂s/∂t, ∇ₚs)`.
//! * **VectorDerivative**: `(∂v/∂t, ∂v/∂p)`, the `N×N` block holding
//!   `∂vᵢ/∂pⱼ` at row `i`, column `j`.
//!
//! ## Invariants
//!
//! * Parts not selected by the [`DerivativeType`] stay zero.

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use nalgebra::{SMatrix, SVector};

use crate::primitives::scalar::Real;

// ============================================================================
// Derivative Selection
// ============================================================================

/// Selects the derivatives computed by a derivative extension component.
pub trait DerivativeType: Debug + Default + Clone + Copy + Send + Sync + 'static {
    /// Differentiate with respect to the scale.
    const SCALE: bool;
    /// Differentiate with respect to the evaluation position.
    const SPACE: bool;
}

/// Derivatives with respect to the scale only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScaleDer;

/// Derivatives with respect to the evaluation position only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SpaceDer;

/// Derivatives with respect to both scale and position.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScaleSpaceDer;

impl DerivativeType for ScaleDer {
    const SCALE: bool = true;
    const SPACE: bool = false;
}

impl DerivativeType for SpaceDer {
    const SCALE: bool = false;
    const SPACE: bool = true;
}

impl DerivativeType for ScaleSpaceDer {
    const SCALE: bool = true;
    const SPACE: bool = true;
}

// ============================================================================
// Scalar Derivative
// ============================================================================

/// Derivative of a scalar quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarDerivative<T: Real, const N: usize> {
    /// Derivative with respect to the scale.
    pub dt: T,
    /// Gradient with respect to the evaluation position.
    pub dp: SVector<T, N>,
}

impl<T: Real, const N: usize> ScalarDerivative<T, N> {
    /// Zero derivative.
    #[inline]
    pub fn zeros() -> Self {
        Self {
            dt: T::zero(),
            dp: SVector::zeros(),
        }
    }

    /// Build from parts.
    #[inline]
    pub fn new(dt: T, dp: SVector<T, N>) -> Self {
        Self { dt, dp }
    }
}

impl<T: Real, const N: usize> Default for ScalarDerivative<T, N> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T: Real, const N: usize> Add for ScalarDerivative<T, N> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.dt + rhs.dt, self.dp + rhs.dp)
    }
}

impl<T: Real, const N: usize> Sub for ScalarDerivative<T, N> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.dt - rhs.dt, self.dp - rhs.dp)
    }
}

impl<T: Real, const N: usize> Neg for ScalarDerivative<T, N> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.dt, -self.dp)
    }
}

impl<T: Real, const N: usize> Mul<T> for ScalarDerivative<T, N> {
    type Output = Self;
    #[inline]
    fn mul(self, s: T) -> Self {
        Self::new(self.dt * s, self.dp * s)
    }
}

impl<T: Real, const N: usize> Div<T> for ScalarDerivative<T, N> {
    type Output = Self;
    #[inline]
    fn div(self, s: T) -> Self {
        Self::new(self.dt / s, self.dp / s)
    }
}

impl<T: Real, const N: usize> AddAssign for ScalarDerivative<T, N> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.dt += rhs.dt;
        self.dp += rhs.dp;
    }
}

// ============================================================================
// Vector Derivative
// ============================================================================

/// Derivative of a vector quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorDerivative<T: Real, const N: usize> {
    /// Derivative with respect to the scale.
    pub dt: SVector<T, N>,
    /// Jacobian with respect to the evaluation position.
    pub dp: SMatrix<T, N, N>,
}

impl<T: Real, const N: usize> VectorDerivative<T, N> {
    /// Zero derivative.
    #[inline]
    pub fn zeros() -> Self {
        Self {
            dt: SVector::zeros(),
            dp: SMatrix::zeros(),
        }
    }

    /// Build from parts.
    #[inline]
    pub fn new(dt: SVector<T, N>, dp: SMatrix<T, N, N>) -> Self {
        Self { dt, dp }
    }

    /// Derivative of `v * s` for a constant vector `v` and a varying scalar `s`.
    #[inline]
    pub fn outer(v: &SVector<T, N>, ds: &ScalarDerivative<T, N>) -> Self {
        Self::new(v * ds.dt, v * ds.dp.transpose())
    }

    /// Derivative of `u · v` for a constant `u` and this varying `v`.
    #[inline]
    pub fn dot(&self, u: &SVector<T, N>) -> ScalarDerivative<T, N> {
        ScalarDerivative::new(u.dot(&self.dt), self.dp.transpose() * u)
    }
}

impl<T: Real, const N: usize> Default for VectorDerivative<T, N> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T: Real, const N: usize> Add for VectorDerivative<T, N> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.dt + rhs.dt, self.dp + rhs.dp)
    }
}

impl<T: Real, const N: usize> Sub for VectorDerivative<T, N> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.dt - rhs.dt, self.dp - rhs.dp)
    }
}

impl<T: Real, const N: usize> Mul<T> for VectorDerivative<T, N> {
    type Output = Self;
    #[inline]
    fn mul(self, s: T) -> Self {
        Self::new(self.dt * s, self.dp * s)
    }
}

impl<T: Real, const N: usize> Div<T> for VectorDerivative<T, N> {
    type Output = Self;
    #[inline]
    fn div(self, s: T) -> Self {
        Self::new(self.dt / s, self.dp / s)
    }
}

impl<T: Real, const N: usize> AddAssign for VectorDerivative<T, N> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.dt += rhs.dt;
        self.dp += rhs.dp;
    }
}
