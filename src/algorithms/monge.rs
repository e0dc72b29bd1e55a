//! Monge patch: quadratic height field over a fitted plane.
//!
//! ## Purpose
//!
//! A Monge patch describes the surface as a height above a tangent plane,
//! `h(u) = ½ uᵀ H u + g·u + c`, where `u` are the coordinates of a point in
//! an orthonormal tangent basis. It captures curvature that a plane cannot
//! and is projected onto vertically (along the frame normal).
//!
//! ## Design notes
//!
//! * **Two passes**: the frame (origin, normal, tangent basis) comes from the
//!   plane published in pass 0, after which [`MongeFit`] asks for another
//!   pass; the height field is accumulated in that frame during pass 1.
//! * **Solver**: weighted least squares on the monomials
//!   `[u_i u_j (i ≤ j), u_i, 1]`, QR with SVD fallback.
//!
//! ## Invariants
//!
//! * Never [`FitStatus::Stable`] after a single pass.
//! * The frame is kept across `start_new_pass` and cleared by `init`.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use nalgebra::{DMatrix, DVector, SVector};

use crate::algorithms::plane::Plane;
use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::{publish, FitState};
use crate::math::linalg;
use crate::primitives::capabilities::Capabilities;
use crate::primitives::sample::Sample;
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

// ============================================================================
// Frame
// ============================================================================

/// Local frame of a height field.
#[derive(Debug, Clone, PartialEq)]
pub struct MongeFrame<T: Real, const N: usize> {
    /// Origin of the frame.
    pub origin: SVector<T, N>,
    /// Unit normal (height direction).
    pub normal: SVector<T, N>,
    /// Orthonormal tangent basis, `N × (N - 1)`.
    pub basis: DMatrix<T>,
}

impl<T: Real, const N: usize> MongeFrame<T, N> {
    /// Frame of a plane.
    pub fn from_plane(plane: &Plane<T, N>) -> Self {
        Self {
            origin: plane.point,
            normal: plane.normal,
            basis: plane.tangent_basis(),
        }
    }

    /// Tangent coordinates and height of a global point.
    pub fn coordinates(&self, x: &SVector<T, N>) -> (DVector<T>, T) {
        let d = x - self.origin;
        let u = self.basis.tr_mul(&DVector::from_column_slice(d.as_slice()));
        (u, self.normal.dot(&d))
    }

    /// Global point at tangent coordinates `u` and height `h`.
    pub fn point(&self, u: &DVector<T>, h: T) -> SVector<T, N> {
        let t = &self.basis * u;
        self.origin + SVector::<T, N>::from_fn(|i, _| t[i]) + self.normal * h
    }
}

/// Number of monomials of a quadratic in `m` variables.
#[inline]
const fn monomial_count(m: usize) -> usize {
    m * (m + 1) / 2 + m + 1
}

/// Monomials `[u_i u_j (i ≤ j), u_i, 1]`.
fn monomials<T: Real>(u: &DVector<T>) -> DVector<T> {
    let m = u.len();
    let mut values = Vec::with_capacity(monomial_count(m));
    for i in 0..m {
        for j in i..m {
            values.push(u[i] * u[j]);
        }
    }
    values.extend(u.iter().copied());
    values.push(T::one());
    DVector::from_vec(values)
}

// ============================================================================
// Monge Patch
// ============================================================================

/// Quadratic height field `h(u) = ½ uᵀ H u + g·u + c` over a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MongePatch<T: Real, const N: usize> {
    /// Frame the heights are measured in.
    pub frame: MongeFrame<T, N>,
    /// Symmetric Hessian `H`, `(N - 1) × (N - 1)`.
    pub hessian: DMatrix<T>,
    /// Linear coefficients `g`.
    pub gradient: DVector<T>,
    /// Constant height `c`.
    pub offset: T,
}

impl<T: Real, const N: usize> MongePatch<T, N> {
    fn from_coefficients(frame: MongeFrame<T, N>, coeffs: &DVector<T>) -> Self {
        let m = N - 1;
        let mut hessian = DMatrix::zeros(m, m);
        let mut k = 0;
        for i in 0..m {
            for j in i..m {
                if i == j {
                    hessian[(i, i)] = coeffs[k] * T::lit(2.0);
                } else {
                    hessian[(i, j)] = coeffs[k];
                    hessian[(j, i)] = coeffs[k];
                }
                k += 1;
            }
        }
        let gradient = DVector::from_fn(m, |i, _| coeffs[k + i]);
        let offset = coeffs[k + m];
        Self {
            frame,
            hessian,
            gradient,
            offset,
        }
    }

    /// Height at tangent coordinates `u`.
    pub fn height(&self, u: &DVector<T>) -> T {
        (u.transpose() * &self.hessian * u)[(0, 0)] * T::lit(0.5) + self.gradient.dot(u) + self.offset
    }

    /// Vertical projection of `x` onto the patch.
    pub fn project(&self, x: &SVector<T, N>) -> SVector<T, N> {
        let (u, _) = self.frame.coordinates(x);
        let h = self.height(&u);
        self.frame.point(&u, h)
    }
}

// ============================================================================
// Monge Fit
// ============================================================================

/// Two-pass Monge patch fit; requires a plane.
#[derive(Debug, Clone, PartialEq)]
pub struct MongeFit<T: Real, const N: usize> {
    frame: Option<MongeFrame<T, N>>,
    count: usize,
    normal_matrix: DMatrix<T>,
    rhs: DVector<T>,
}

impl<T: Real, const N: usize> Default for MongeFit<T, N> {
    fn default() -> Self {
        let k = monomial_count(N - 1);
        Self {
            frame: None,
            count: 0,
            normal_matrix: DMatrix::zeros(k, k),
            rhs: DVector::zeros(k),
        }
    }
}

impl<T: Real, const N: usize> MongeFit<T, N> {
    /// Frame fixed at the end of the first pass.
    pub fn frame(&self) -> Option<&MongeFrame<T, N>> {
        self.frame.as_ref()
    }

    fn clear_sums(&mut self) {
        self.count = 0;
        self.normal_matrix.fill(T::zero());
        self.rhs.fill(T::zero());
    }
}

impl<T: Real, const N: usize> Component<T, N> for MongeFit<T, N> {
    const PROVIDES: Capabilities = Capabilities::MONGE_PATCH;
    const REQUIRES: Capabilities = Capabilities::PLANE;
    const NAME: &'static str = "MongeFit";

    fn start_new_pass(&mut self) {
        self.clear_sums();
    }

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        if state.acc.pass == 0 {
            return match state.plane.fresh() {
                Some(plane) => {
                    self.frame = Some(MongeFrame::from_plane(plane));
                    FitStatus::NeedAnotherPass
                }
                None => FitStatus::Unstable,
            };
        }

        let Some(frame) = self.frame.clone() else {
            return FitStatus::Unstable;
        };
        if self.count < monomial_count(N - 1) {
            return FitStatus::Unstable;
        }
        let Some(coeffs) = linalg::solve_normal(&self.normal_matrix, &self.rhs) else {
            return FitStatus::Unstable;
        };
        let patch = MongePatch::from_coefficients(frame, &coeffs);
        publish(&mut state.monge, patch, Capabilities::MONGE_PATCH)
    }
}

impl<T: Real, const N: usize, S: Sample<T, N>> Accumulate<T, N, S> for MongeFit<T, N> {
    fn add_local_neighbor(&mut self, nb: &Neighbor<T, N>, _sample: &S, state: &FitState<T, N>) {
        let Some(frame) = &self.frame else {
            return;
        };
        if state.acc.pass == 0 {
            return;
        }
        let x = state.weight_func().to_global(&nb.q);
        let (u, h) = frame.coordinates(&x);
        let phi = monomials(&u);
        self.normal_matrix += &phi * phi.transpose() * nb.w;
        self.rhs += &phi * (h * nb.w);
        self.count += 1;
    }
}
