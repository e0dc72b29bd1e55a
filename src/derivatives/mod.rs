//! Layer 4: Derivatives
//!
//! # Purpose
//!
//! This layer extends primitive fits with derivatives with respect to the
//! scale `t` and the evaluation position `p`:
//! - [`OrientedSphereDer`]: algebraic sphere parameters and normal field
//! - [`CovariancePlaneDer`]: plane normal through eigenvector perturbation
//! - [`GlsDer`]: GLS descriptors and the geometric variation
//!
//! # Key concepts
//!
//! * **Fixed frame**: derivatives only account for the variation of the
//!   weights; coefficients stay expressed around the current evaluation
//!   center. Moving the evaluation point inside that frame is what adds the
//!   `2 uq I` term to the normal Jacobian.
//! * **Selection**: a [`DerivativeType`](crate::primitives::derivative::DerivativeType)
//!   marker chooses the scale part, the space part or both; unselected parts
//!   are zero.
//!
//! # Architecture
//!
//! ```text
//! Layer 7: Adapters / API
//!   ↓
//! Layer 6: Engine
//!   ↓
//! Layer 5: Curvature
//!   ↓
//! Layer 4: Derivatives ← You are here
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

use nalgebra::SVector;

use crate::algorithms::sphere::AlgebraicSphere;
use crate::primitives::derivative::{ScalarDerivative, VectorDerivative};
use crate::primitives::scalar::Real;

/// GLS descriptor derivatives.
pub mod gls;

/// Covariance plane derivatives.
pub mod plane;

/// Oriented sphere derivatives.
pub mod sphere;

pub use gls::GlsDer;
pub use plane::CovariancePlaneDer;
pub use sphere::OrientedSphereDer;

// ============================================================================
// Outputs
// ============================================================================

/// Derivatives of the algebraic sphere coefficients.
///
/// They refer to `sphere`, the coefficients before Pratt normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereDerivatives<T: Real, const N: usize> {
    /// Coefficients the derivatives refer to.
    pub sphere: AlgebraicSphere<T, N>,
    /// Derivative of `uc`.
    pub duc: ScalarDerivative<T, N>,
    /// Derivative of `ul`.
    pub dul: VectorDerivative<T, N>,
    /// Derivative of `uq`.
    pub duq: ScalarDerivative<T, N>,
    /// Whether the scale part is populated.
    pub scale: bool,
    /// Whether the space part is populated.
    pub space: bool,
}

impl<T: Real, const N: usize> SphereDerivatives<T, N> {
    /// Derivative of the field gradient at the evaluation point.
    pub fn gradient_derivative(&self) -> VectorDerivative<T, N> {
        let mut dgrad = self.dul;
        if self.space {
            for i in 0..N {
                dgrad.dp[(i, i)] += T::lit(2.0) * self.sphere.uq;
            }
        }
        dgrad
    }

    /// Derivative of the field value at the evaluation point.
    pub fn field_derivative(&self) -> ScalarDerivative<T, N> {
        let mut dfield = self.duc;
        if self.space {
            dfield.dp += self.sphere.ul;
        }
        dfield
    }

    /// Derivative of the squared Pratt norm `|ul|² - 4 uc uq`.
    pub fn pratt_norm_squared_derivative(&self) -> ScalarDerivative<T, N> {
        let s = &self.sphere;
        self.dul.dot(&s.ul) * T::lit(2.0) - (self.duc * s.uq + self.duq * s.uc) * T::lit(4.0)
    }
}

/// Derivatives of a fitted plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneDerivatives<T: Real, const N: usize> {
    /// Derivative of the plane point (the weighted barycenter).
    pub dpoint: VectorDerivative<T, N>,
    /// Derivative of the unit normal.
    pub dnormal: VectorDerivative<T, N>,
}

/// Primitive normal at the evaluation point and its derivative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalDerivative<T: Real, const N: usize> {
    /// Unit normal.
    pub normal: SVector<T, N>,
    /// Derivative of the unit normal; `dp[(i, j)] = ∂nᵢ/∂pⱼ`.
    pub dnormal: VectorDerivative<T, N>,
}

/// Derivatives of the GLS descriptors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlsDerivatives<T: Real, const N: usize> {
    /// Derivative of `tau`.
    pub dtau: ScalarDerivative<T, N>,
    /// Derivative of `eta`.
    pub deta: VectorDerivative<T, N>,
    /// Derivative of `kappa`.
    pub dkappa: ScalarDerivative<T, N>,
    /// Scale-normalized derivative of `tau`.
    pub dtau_normalized: ScalarDerivative<T, N>,
    /// Scale-normalized derivative of `eta` (`t · deta`).
    pub deta_normalized: VectorDerivative<T, N>,
    /// Scale-normalized derivative of `kappa` (`t² · dkappa`).
    pub dkappa_normalized: ScalarDerivative<T, N>,
}

impl<T: Real, const N: usize> GlsDerivatives<T, N> {
    /// Geometric variation along the scale, weighting each normalized
    /// descriptor derivative.
    pub fn geom_var_weighted(&self, w_tau: T, w_eta: T, w_kappa: T) -> T {
        let dtau = self.dtau_normalized.dt;
        let dkappa = self.dkappa_normalized.dt;
        w_tau * dtau * dtau + w_eta * self.deta_normalized.dt.norm_squared() + w_kappa * dkappa * dkappa
    }

    /// Geometric variation with unit weights.
    pub fn geom_var(&self) -> T {
        self.geom_var_weighted(T::one(), T::one(), T::one())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Derivative of `g / |g|` given the derivative of `g`.
pub(crate) fn unit_vector_derivative<T: Real, const N: usize>(
    g: &SVector<T, N>,
    dg: &VectorDerivative<T, N>,
) -> Option<VectorDerivative<T, N>> {
    let norm = g.norm();
    if norm <= T::machine_epsilon() {
        return None;
    }
    let proj = dg.dot(g);
    Some(*dg / norm - VectorDerivative::outer(g, &proj) / (norm * norm * norm))
}
