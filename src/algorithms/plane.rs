//! Hyperplane primitive and plane fits.
//!
//! ## Purpose
//!
//! This module provides the [`Plane`] primitive (a point and a unit normal,
//! co-dimension 1 in any ambient dimension) and two ways of fitting it:
//!
//! * [`CovariancePlaneFit`]: the normal is the direction of least variance
//!   of the weighted positions.
//! * [`MeanPlaneFit`]: oriented samples only; the normal is the normalized
//!   weighted mean normal.
//!
//! ## Design notes
//!
//! * The covariance fit keeps its sorted spectrum so that the derivative
//!   extension can reuse it.
//! * When the neighbors carry normals, the covariance normal is oriented to
//!   agree with their weighted sum.
//!
//! ## Invariants
//!
//! * `Plane::normal` has unit length.
//! * The covariance fit is [`FitStatus::Unstable`] with fewer than `N`
//!   neighbors or when the two smallest eigenvalues are not separated.

use nalgebra::{DMatrix, SVector};

use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::{publish, FitState};
use crate::math::linalg::{self, SortedEigen};
use crate::primitives::capabilities::Capabilities;
use crate::primitives::sample::{OrientedSample, Sample};
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

// ============================================================================
// Plane
// ============================================================================

/// Hyperplane through `point` orthogonal to `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane<T: Real, const N: usize> {
    /// A point of the plane (the weighted barycenter for fitted planes).
    pub point: SVector<T, N>,
    /// Unit normal.
    pub normal: SVector<T, N>,
}

impl<T: Real, const N: usize> Plane<T, N> {
    /// Create a plane; the normal is normalized.
    pub fn new(point: SVector<T, N>, normal: SVector<T, N>) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    /// Signed distance of `x` to the plane (positive on the normal side).
    #[inline]
    pub fn signed_distance(&self, x: &SVector<T, N>) -> T {
        self.normal.dot(&(x - self.point))
    }

    /// Orthogonal projection of `x` onto the plane.
    #[inline]
    pub fn project(&self, x: &SVector<T, N>) -> SVector<T, N> {
        x - self.normal * self.signed_distance(x)
    }

    /// Orthonormal basis of the plane directions, stored column-wise.
    pub fn tangent_basis(&self) -> DMatrix<T> {
        linalg::tangent_basis(&self.normal)
    }
}

/// Flip `normal` when it disagrees with the accumulated normals.
fn orient_with_normals<T: Real, const N: usize>(normal: SVector<T, N>, state: &FitState<T, N>) -> SVector<T, N> {
    if state.acc.normal_count > 0 && normal.dot(&state.acc.sum_n) < T::zero() {
        -normal
    } else {
        normal
    }
}

// ============================================================================
// Covariance Plane Fit
// ============================================================================

/// Plane fit by weighted principal component analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct CovariancePlaneFit<T: Real, const N: usize> {
    spectrum: Option<SortedEigen<T>>,
}

impl<T: Real, const N: usize> Default for CovariancePlaneFit<T, N> {
    fn default() -> Self {
        Self { spectrum: None }
    }
}

impl<T: Real, const N: usize> CovariancePlaneFit<T, N> {
    /// Sorted eigendecomposition of the covariance from the last finalize.
    pub fn spectrum(&self) -> Option<&SortedEigen<T>> {
        self.spectrum.as_ref()
    }
}

impl<T: Real, const N: usize> Component<T, N> for CovariancePlaneFit<T, N> {
    const PROVIDES: Capabilities = Capabilities::PLANE;
    const NAME: &'static str = "CovariancePlaneFit";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        self.spectrum = None;
        if state.acc.count < N {
            return FitStatus::Unstable;
        }
        let (Some(cov), Some(mean)) = (state.acc.covariance(), state.acc.mean_position_local()) else {
            return FitStatus::Unstable;
        };

        let eig = linalg::symmetric_eigen(linalg::to_dynamic(&cov));
        let lambda_max = eig.max_value();
        let gap = eig.values[1] - eig.values[0];
        if lambda_max <= state.acc.covariance_noise_floor() || gap <= T::spectral_tolerance() * lambda_max {
            return FitStatus::Unstable;
        }

        let smallest: SVector<T, N> = eig.vector(0);
        let normal = orient_with_normals(smallest, state);
        self.spectrum = Some(eig);

        let plane = Plane {
            point: state.weight_func().to_global(&mean),
            normal,
        };
        publish(&mut state.plane, plane, Capabilities::PLANE)
    }
}

impl<T: Real, const N: usize, S: Sample<T, N>> Accumulate<T, N, S> for CovariancePlaneFit<T, N> {
    #[inline]
    fn add_local_neighbor(&mut self, _nb: &Neighbor<T, N>, _sample: &S, _state: &FitState<T, N>) {}
}

// ============================================================================
// Mean Plane Fit
// ============================================================================

/// Plane through the weighted barycenter, orthogonal to the mean normal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeanPlaneFit;

impl<T: Real, const N: usize> Component<T, N> for MeanPlaneFit {
    const PROVIDES: Capabilities = Capabilities::PLANE;
    const NAME: &'static str = "MeanPlaneFit";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        let Some(mean) = state.acc.mean_position_local() else {
            return FitStatus::Unstable;
        };
        let norm = state.acc.sum_n.norm();
        if norm <= T::machine_epsilon() * state.acc.sum_w {
            return FitStatus::Unstable;
        }
        let plane = Plane {
            point: state.weight_func().to_global(&mean),
            normal: state.acc.sum_n / norm,
        };
        publish(&mut state.plane, plane, Capabilities::PLANE)
    }
}

impl<T: Real, const N: usize, S: OrientedSample<T, N>> Accumulate<T, N, S> for MeanPlaneFit {
    #[inline]
    fn add_local_neighbor(&mut self, _nb: &Neighbor<T, N>, _sample: &S, _state: &FitState<T, N>) {}
}
