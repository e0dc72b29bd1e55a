//! Weighted mean position and mean normal.
//!
//! ## Purpose
//!
//! The simplest components: they divide the shared sums `Σ w q` and `Σ w n`
//! by `Σ w` and publish the weighted barycenter and the weighted average
//! normal.
//!
//! ## Invariants
//!
//! * Both report [`FitStatus::Unstable`] when `Σ w` is negligible.
//! * The mean normal is not renormalized.

use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::{publish, FitState};
use crate::primitives::capabilities::Capabilities;
use crate::primitives::sample::{OrientedSample, Sample};
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

// ============================================================================
// Mean Position
// ============================================================================

/// Weighted barycenter of the neighbors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeanPosition;

impl<T: Real, const N: usize> Component<T, N> for MeanPosition {
    const PROVIDES: Capabilities = Capabilities::MEAN_POSITION;
    const NAME: &'static str = "MeanPosition";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        match state.acc.mean_position_local() {
            Some(mean) => {
                let global = state.weight_func().to_global(&mean);
                publish(&mut state.mean_position, global, Capabilities::MEAN_POSITION)
            }
            None => FitStatus::Unstable,
        }
    }
}

impl<T: Real, const N: usize, S: Sample<T, N>> Accumulate<T, N, S> for MeanPosition {
    #[inline]
    fn add_local_neighbor(&mut self, _nb: &Neighbor<T, N>, _sample: &S, _state: &FitState<T, N>) {}
}

// ============================================================================
// Mean Normal
// ============================================================================

/// Weighted average of the neighbor normals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeanNormal;

impl<T: Real, const N: usize> Component<T, N> for MeanNormal {
    const PROVIDES: Capabilities = Capabilities::MEAN_NORMAL;
    const NAME: &'static str = "MeanNormal";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        if !state.acc.has_weight() || state.acc.normal_count == 0 {
            return FitStatus::Unstable;
        }
        let mean = state.acc.sum_n / state.acc.sum_w;
        publish(&mut state.mean_normal, mean, Capabilities::MEAN_NORMAL)
    }
}

impl<T: Real, const N: usize, S: OrientedSample<T, N>> Accumulate<T, N, S> for MeanNormal {
    #[inline]
    fn add_local_neighbor(&mut self, _nb: &Neighbor<T, N>, _sample: &S, _state: &FitState<T, N>) {}
}
