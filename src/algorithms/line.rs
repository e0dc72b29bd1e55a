//! Line primitive and its covariance fit.
//!
//! The direction of a [`CovarianceLineFit`] is the eigenvector of the
//! largest eigenvalue of the weighted covariance; the fit is
//! [`FitStatus::Unstable`] with fewer than `N` neighbors, when the neighbors
//! collapse to a point, or when the two largest eigenvalues are not
//! separated (no dominant direction).

use nalgebra::SVector;

use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::{publish, FitState};
use crate::math::linalg;
use crate::primitives::capabilities::Capabilities;
use crate::primitives::sample::Sample;
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

/// Line through `point` along the unit vector `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line<T: Real, const N: usize> {
    /// A point of the line (the weighted barycenter for fitted lines).
    pub point: SVector<T, N>,
    /// Unit direction.
    pub direction: SVector<T, N>,
}

impl<T: Real, const N: usize> Line<T, N> {
    /// Create a line; the direction is normalized.
    pub fn new(point: SVector<T, N>, direction: SVector<T, N>) -> Self {
        Self {
            point,
            direction: direction.normalize(),
        }
    }

    /// Orthogonal projection of `x` onto the line.
    #[inline]
    pub fn project(&self, x: &SVector<T, N>) -> SVector<T, N> {
        self.point + self.direction * self.direction.dot(&(x - self.point))
    }

    /// Distance of `x` to the line.
    #[inline]
    pub fn distance(&self, x: &SVector<T, N>) -> T {
        (x - self.project(x)).norm()
    }
}

/// Line fit by weighted principal component analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CovarianceLineFit;

impl<T: Real, const N: usize> Component<T, N> for CovarianceLineFit {
    const PROVIDES: Capabilities = Capabilities::LINE;
    const NAME: &'static str = "CovarianceLineFit";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        if state.acc.count < N {
            return FitStatus::Unstable;
        }
        let (Some(cov), Some(mean)) = (state.acc.covariance(), state.acc.mean_position_local()) else {
            return FitStatus::Unstable;
        };

        let eig = linalg::symmetric_eigen(linalg::to_dynamic(&cov));
        let lambda_max = eig.max_value();
        let gap = lambda_max - eig.values[N - 2];
        if lambda_max <= state.acc.covariance_noise_floor() || gap <= T::spectral_tolerance() * lambda_max {
            return FitStatus::Unstable;
        }

        let line = Line {
            point: state.weight_func().to_global(&mean),
            direction: eig.vector(N - 1),
        };
        publish(&mut state.line, line, Capabilities::LINE)
    }
}

impl<T: Real, const N: usize, S: Sample<T, N>> Accumulate<T, N, S> for CovarianceLineFit {
    #[inline]
    fn add_local_neighbor(&mut self, _nb: &Neighbor<T, N>, _sample: &S, _state: &FitState<T, N>) {}
}
