//! Principal curvatures from the spatial Jacobian of the primitive normal.
//!
//! Requires a component publishing [`Capabilities::NORMAL_DERIVATIVE`], such
//! as `OrientedSphereDer<_, _, SpaceDer>` or `CovariancePlaneDer<_, _, SpaceDer>`.

use crate::curvature::Curvature;
use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::{publish, FitState};
use crate::primitives::capabilities::Capabilities;
use crate::primitives::sample::Sample;
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

/// Curvature estimator reading the normal Jacobian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalDerivativesCurvature;

impl<T: Real, const N: usize> Component<T, N> for NormalDerivativesCurvature {
    const PROVIDES: Capabilities = Capabilities::PRINCIPAL_CURVATURES;
    const REQUIRES: Capabilities = Capabilities::NORMAL_DERIVATIVE;
    const NAME: &'static str = "NormalDerivativesCurvature";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        let Some(nd) = state.normal_derivative.fresh() else {
            return FitStatus::Unstable;
        };
        match Curvature::from_shape_operator(&nd.dnormal.dp, &nd.normal) {
            Some(curvature) => publish(&mut state.curvature, curvature, Capabilities::PRINCIPAL_CURVATURES),
            None => FitStatus::Unstable,
        }
    }
}

impl<T: Real, const N: usize, S: Sample<T, N>> Accumulate<T, N, S> for NormalDerivativesCurvature {
    #[inline]
    fn add_local_neighbor(&mut self, _nb: &Neighbor<T, N>, _sample: &S, _state: &FitState<T, N>) {}
}
