//! Principal curvatures from the covariance of normals and positions.
//!
//! ## Purpose
//!
//! Around a smooth surface the normals vary linearly with the position,
//! `n(q) ≈ n̄ + J (q - q̄)`, where `J` is the shape operator. Both estimators
//! regress `J` by weighted least squares in a tangent basis `B`:
//!
//! ```text
//! S = (Bᵀ Cnq B) (Bᵀ Cqq B)⁻¹
//! Cnq = Σw n qᵀ / W - n̄ q̄ᵀ
//! Cqq = Σw q qᵀ / W - q̄ q̄ᵀ
//! ```
//!
//! [`NormalCovarianceCurvature`] takes `B` from the mean normal,
//! [`ProjectedNormalCovarianceCurvature`] from a fitted plane.
//!
//! ## Invariants
//!
//! * Both need oriented samples and at least `N` neighbors.

use nalgebra::{DMatrix, SMatrix, SVector};

use crate::curvature::Curvature;
use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::{publish, FitState};
use crate::math::linalg;
use crate::primitives::capabilities::Capabilities;
use crate::primitives::sample::OrientedSample;
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

// ============================================================================
// Shared Regression
// ============================================================================

/// `Σ w n qᵀ`, the only sum not kept by the shared state.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NormalPositionMoments<T: Real, const N: usize> {
    sum_nq: SMatrix<T, N, N>,
}

impl<T: Real, const N: usize> Default for NormalPositionMoments<T, N> {
    fn default() -> Self {
        Self {
            sum_nq: SMatrix::zeros(),
        }
    }
}

impl<T: Real, const N: usize> NormalPositionMoments<T, N> {
    #[inline]
    fn add(&mut self, q: &SVector<T, N>, n: &SVector<T, N>, w: T) {
        self.sum_nq += n * q.transpose() * w;
    }

    /// Regressed shape operator in `basis`, then its curvatures.
    fn curvature(&self, state: &FitState<T, N>, basis: &DMatrix<T>) -> Option<Curvature<T, N>> {
        let acc = &state.acc;
        if acc.count < N || acc.normal_count < N {
            return None;
        }
        let cqq = acc.covariance()?;
        let mean_q = acc.mean_position_local()?;
        let mean_n = acc.sum_n / acc.sum_w;
        let cnq = self.sum_nq / acc.sum_w - mean_n * mean_q.transpose();

        let tqq = linalg::project_onto_basis(&cqq, basis);
        let tnq = linalg::project_onto_basis(&cnq, basis);
        let tqq_inv = tqq.try_inverse()?;
        let shape = tnq * tqq_inv;
        Curvature::from_tangent_shape(&shape, basis)
    }
}

// ============================================================================
// Mean-Normal Frame
// ============================================================================

/// Normal/position regression in the tangent frame of the mean normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalCovarianceCurvature<T: Real, const N: usize> {
    moments: NormalPositionMoments<T, N>,
}

impl<T: Real, const N: usize> Default for NormalCovarianceCurvature<T, N> {
    fn default() -> Self {
        Self {
            moments: NormalPositionMoments::default(),
        }
    }
}

impl<T: Real, const N: usize> Component<T, N> for NormalCovarianceCurvature<T, N> {
    const PROVIDES: Capabilities = Capabilities::PRINCIPAL_CURVATURES;
    const NAME: &'static str = "NormalCovarianceCurvature";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        if !state.acc.has_weight() {
            return FitStatus::Unstable;
        }
        let mean_normal = state.acc.sum_n / state.acc.sum_w;
        let norm = mean_normal.norm();
        if norm <= T::machine_epsilon() {
            return FitStatus::Unstable;
        }
        let basis = linalg::tangent_basis(&(mean_normal / norm));
        match self.moments.curvature(state, &basis) {
            Some(curvature) => publish(&mut state.curvature, curvature, Capabilities::PRINCIPAL_CURVATURES),
            None => FitStatus::Unstable,
        }
    }
}

impl<T: Real, const N: usize, S: OrientedSample<T, N>> Accumulate<T, N, S> for NormalCovarianceCurvature<T, N> {
    #[inline]
    fn add_local_neighbor(&mut self, nb: &Neighbor<T, N>, sample: &S, _state: &FitState<T, N>) {
        self.moments.add(&nb.q, &sample.normal(), nb.w);
    }
}

// ============================================================================
// Plane Frame
// ============================================================================

/// Normal/position regression in the tangent frame of a fitted plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedNormalCovarianceCurvature<T: Real, const N: usize> {
    moments: NormalPositionMoments<T, N>,
}

impl<T: Real, const N: usize> Default for ProjectedNormalCovarianceCurvature<T, N> {
    fn default() -> Self {
        Self {
            moments: NormalPositionMoments::default(),
        }
    }
}

impl<T: Real, const N: usize> Component<T, N> for ProjectedNormalCovarianceCurvature<T, N> {
    const PROVIDES: Capabilities = Capabilities::PRINCIPAL_CURVATURES;
    const REQUIRES: Capabilities = Capabilities::PLANE;
    const NAME: &'static str = "ProjectedNormalCovarianceCurvature";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        let Some(plane) = state.plane.fresh() else {
            return FitStatus::Unstable;
        };
        let basis = plane.tangent_basis();
        match self.moments.curvature(state, &basis) {
            Some(curvature) => publish(&mut state.curvature, curvature, Capabilities::PRINCIPAL_CURVATURES),
            None => FitStatus::Unstable,
        }
    }
}

impl<T: Real, const N: usize, S: OrientedSample<T, N>> Accumulate<T, N, S>
    for ProjectedNormalCovarianceCurvature<T, N>
{
    #[inline]
    fn add_local_neighbor(&mut self, nb: &Neighbor<T, N>, sample: &S, _state: &FitState<T, N>) {
        self.moments.add(&nb.q, &sample.normal(), nb.w);
    }
}
