//! Algebraic sphere fit from positions only.
//!
//! Minimizes the algebraic residual `Σw f(q)²` over `u = [uc, ul, uq]`
//! under the Pratt normalization `|ul|² - 4 uc uq = 1`, which excludes the
//! trivial solution without favoring spheres over planes. Moments are
//! accumulated in coordinates divided by the scale so that the moment matrix
//! stays well conditioned whatever the units of the input.

use nalgebra::{DMatrix, SMatrix, SVector};

use crate::algorithms::sphere::AlgebraicSphere;
use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::{publish, FitState};
use crate::math::linalg;
use crate::primitives::capabilities::Capabilities;
use crate::primitives::sample::Sample;
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

/// Pratt-normalized algebraic sphere fit.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereFit<T: Real, const N: usize> {
    // Moments of q̃ = q / t up to order four.
    sum_w: T,
    sum_q: SVector<T, N>,
    sum_qq: SMatrix<T, N, N>,
    sum_q2_q: SVector<T, N>,
    sum_q4: T,
}

impl<T: Real, const N: usize> Default for SphereFit<T, N> {
    fn default() -> Self {
        Self {
            sum_w: T::zero(),
            sum_q: SVector::zeros(),
            sum_qq: SMatrix::zeros(),
            sum_q2_q: SVector::zeros(),
            sum_q4: T::zero(),
        }
    }
}

impl<T: Real, const N: usize> SphereFit<T, N> {
    /// Moment matrix `Σw b bᵀ` with `b = [1, q̃, |q̃|²]`.
    fn moment_matrix(&self) -> DMatrix<T> {
        let last = N + 1;
        let sum_q2 = self.sum_qq.trace();
        DMatrix::from_fn(N + 2, N + 2, |i, j| {
            let (i, j) = if i <= j { (i, j) } else { (j, i) };
            match (i, j) {
                (0, 0) => self.sum_w,
                (0, j) if j == last => sum_q2,
                (0, j) => self.sum_q[j - 1],
                (i, j) if i == last && j == last => self.sum_q4,
                (i, j) if j == last => self.sum_q2_q[i - 1],
                (i, j) => self.sum_qq[(i - 1, j - 1)],
            }
        })
    }
}

/// Pratt constraint matrix and its inverse.
fn pratt_constraint<T: Real>(size: usize) -> (DMatrix<T>, DMatrix<T>) {
    let last = size - 1;
    let mut c = DMatrix::identity(size, size);
    let mut c_inv = DMatrix::identity(size, size);
    c[(0, 0)] = T::zero();
    c[(last, last)] = T::zero();
    c[(0, last)] = -T::lit(2.0);
    c[(last, 0)] = -T::lit(2.0);
    c_inv[(0, 0)] = T::zero();
    c_inv[(last, last)] = T::zero();
    c_inv[(0, last)] = -T::lit(0.5);
    c_inv[(last, 0)] = -T::lit(0.5);
    (c, c_inv)
}

impl<T: Real, const N: usize> Component<T, N> for SphereFit<T, N> {
    const PROVIDES: Capabilities = Capabilities::ALGEBRAIC_SPHERE;
    const NAME: &'static str = "SphereFit";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        if state.acc.count < N + 1 || !state.acc.has_weight() {
            return FitStatus::Unstable;
        }

        let (c, c_inv) = pratt_constraint::<T>(N + 2);
        let Some(u) = linalg::pratt_constrained_min(&self.moment_matrix(), &c, &c_inv) else {
            return FitStatus::Unstable;
        };

        let t = state.scale();
        let uc = u[0];
        let ul = SVector::<T, N>::from_fn(|i, _| u[i + 1] / t);
        let uq = u[N + 1] / (t * t);

        let Some(mut sphere) = AlgebraicSphere::new(uc, ul, uq, *state.center()).normalized() else {
            return FitStatus::Unstable;
        };
        // Orient the gradient outward (or along the normals when present).
        let flip = if state.acc.normal_count > 0 {
            sphere.ul.dot(&state.acc.sum_n) < T::zero()
        } else {
            sphere.uq < T::zero()
        };
        if flip {
            sphere.uc = -sphere.uc;
            sphere.ul = -sphere.ul;
            sphere.uq = -sphere.uq;
        }
        publish(&mut state.sphere, sphere, Capabilities::ALGEBRAIC_SPHERE)
    }
}

impl<T: Real, const N: usize, S: Sample<T, N>> Accumulate<T, N, S> for SphereFit<T, N> {
    fn add_local_neighbor(&mut self, nb: &Neighbor<T, N>, _sample: &S, state: &FitState<T, N>) {
        let q = nb.q / state.scale();
        let q2 = q.norm_squared();
        self.sum_w += nb.w;
        self.sum_q += q * nb.w;
        self.sum_qq += q * q.transpose() * nb.w;
        self.sum_q2_q += q * (q2 * nb.w);
        self.sum_q4 += q2 * q2 * nb.w;
    }
}
