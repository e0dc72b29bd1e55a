//! Algebraic sphere fit for normals known up to sign.
//!
//! ## Key concepts
//!
//! The gradient `∇f = ul + 2 uq q` is aligned with the normals while the sign
//! of each normal is ignored: maximize `Σw (n·∇f)²` subject to
//! `Σw |∇f|² = 1`. With `v = [ul, 2 uq]` and `b = [n, n·q]` this is the
//! generalized symmetric eigenproblem
//!
//! ```text
//! A v = λ B v,   A = Σw b bᵀ,   B = [ W·I   P  ]
//!                                   [ Pᵀ    PP ]
//! ```
//!
//! solved for the largest eigenvalue. `uc` is then chosen so that the
//! weighted mean of `f` over the neighbors vanishes.

use nalgebra::{DMatrix, SMatrix, SVector};

use crate::algorithms::sphere::AlgebraicSphere;
use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::{publish, FitState};
use crate::math::linalg;
use crate::primitives::capabilities::Capabilities;
use crate::primitives::sample::OrientedSample;
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

/// Algebraic sphere fit insensitive to the sign of the normals.
#[derive(Debug, Clone, PartialEq)]
pub struct UnorientedSphereFit<T: Real, const N: usize> {
    sum_nn: SMatrix<T, N, N>,
    sum_dot_pn_n: SVector<T, N>,
    sum_dot_pn2: T,
}

impl<T: Real, const N: usize> Default for UnorientedSphereFit<T, N> {
    fn default() -> Self {
        Self {
            sum_nn: SMatrix::zeros(),
            sum_dot_pn_n: SVector::zeros(),
            sum_dot_pn2: T::zero(),
        }
    }
}

impl<T: Real, const N: usize> UnorientedSphereFit<T, N> {
    /// Moment matrix `A = Σw b bᵀ`.
    fn moment_matrix(&self) -> DMatrix<T> {
        DMatrix::from_fn(N + 1, N + 1, |i, j| match (i < N, j < N) {
            (true, true) => self.sum_nn[(i, j)],
            (true, false) => self.sum_dot_pn_n[i],
            (false, true) => self.sum_dot_pn_n[j],
            (false, false) => self.sum_dot_pn2,
        })
    }
}

/// Gradient-energy matrix `B`.
fn gradient_matrix<T: Real, const N: usize>(state: &FitState<T, N>) -> DMatrix<T> {
    let acc = &state.acc;
    DMatrix::from_fn(N + 1, N + 1, |i, j| match (i < N, j < N) {
        (true, true) if i == j => acc.sum_w,
        (true, true) => T::zero(),
        (true, false) => acc.sum_p[i],
        (false, true) => acc.sum_p[j],
        (false, false) => acc.sum_dot_pp(),
    })
}

impl<T: Real, const N: usize> Component<T, N> for UnorientedSphereFit<T, N> {
    const PROVIDES: Capabilities = Capabilities::ALGEBRAIC_SPHERE;
    const NAME: &'static str = "UnorientedSphereFit";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        if state.acc.count < N || !state.acc.has_weight() {
            return FitStatus::Unstable;
        }

        let a = self.moment_matrix();
        let b = gradient_matrix(state);
        let Some(eig) = linalg::generalized_symmetric_eigen(&a, &b) else {
            return FitStatus::Unstable;
        };
        let top = eig.values.len() - 1;
        if eig.values[top] - eig.values[top - 1] <= T::spectral_tolerance() * eig.values[top].abs() {
            return FitStatus::Unstable;
        }

        let v = eig.vectors.column(top);
        let mut ul = SVector::<T, N>::from_fn(|i, _| v[i]);
        let mut uq = v[N] * T::lit(0.5);
        if state.acc.normal_count > 0 && ul.dot(&state.acc.sum_n) < T::zero() {
            ul = -ul;
            uq = -uq;
        }
        let uc = -(ul.dot(&state.acc.sum_p) + uq * state.acc.sum_dot_pp()) / state.acc.sum_w;

        let Some(sphere) = AlgebraicSphere::new(uc, ul, uq, *state.center()).normalized() else {
            return FitStatus::Unstable;
        };
        publish(&mut state.sphere, sphere, Capabilities::ALGEBRAIC_SPHERE)
    }
}

impl<T: Real, const N: usize, S: OrientedSample<T, N>> Accumulate<T, N, S> for UnorientedSphereFit<T, N> {
    fn add_local_neighbor(&mut self, nb: &Neighbor<T, N>, sample: &S, _state: &FitState<T, N>) {
        let n = sample.normal();
        let dot_pn = n.dot(&nb.q);
        self.sum_nn += n * n.transpose() * nb.w;
        self.sum_dot_pn_n += n * (dot_pn * nb.w);
        self.sum_dot_pn2 += dot_pn * dot_pn * nb.w;
    }
}
