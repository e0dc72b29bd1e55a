//! Growing Least Squares (GLS) descriptors of an algebraic sphere.
//!
//! ## Purpose
//!
//! The GLS descriptors summarize a Pratt-normalized algebraic sphere fitted
//! at scale `t` around an evaluation point:
//!
//! * `tau`: field value at the evaluation point (signed algebraic distance),
//! * `eta`: unit gradient at the evaluation point,
//! * `kappa`: signed curvature `2 uq`.
//!
//! Their scale-normalized versions `tau / t` and `kappa · t` are comparable
//! across scales, which makes them usable as multi-scale shape signatures.
//!
//! ## Invariants
//!
//! * `eta` has unit length.

use nalgebra::SVector;

use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::{publish, FitState};
use crate::primitives::capabilities::Capabilities;
use crate::primitives::sample::Sample;
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

/// GLS descriptors at one scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlsParameters<T: Real, const N: usize> {
    /// Scale the sphere was fitted at.
    pub t: T,
    /// Algebraic distance of the evaluation point.
    pub tau: T,
    /// Unit gradient at the evaluation point.
    pub eta: SVector<T, N>,
    /// Signed curvature.
    pub kappa: T,
}

impl<T: Real, const N: usize> GlsParameters<T, N> {
    /// `tau / t`.
    #[inline]
    pub fn tau_normalized(&self) -> T {
        self.tau / self.t
    }

    /// Same as `eta`; the gradient direction is scale free.
    #[inline]
    pub fn eta_normalized(&self) -> SVector<T, N> {
        self.eta
    }

    /// `kappa · t`.
    #[inline]
    pub fn kappa_normalized(&self) -> T {
        self.kappa * self.t
    }

    /// Squared distance between the scale-normalized descriptors of two
    /// fits, with a weight per descriptor.
    pub fn compare(&self, other: &Self, w_tau: T, w_eta: T, w_kappa: T) -> T {
        let d_tau = self.tau_normalized() - other.tau_normalized();
        let d_eta = (self.eta - other.eta).norm_squared();
        let d_kappa = self.kappa_normalized() - other.kappa_normalized();
        w_tau * d_tau * d_tau + w_eta * d_eta + w_kappa * d_kappa * d_kappa
    }
}

/// Computes the GLS descriptors of the fitted algebraic sphere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlsParam;

impl<T: Real, const N: usize> Component<T, N> for GlsParam {
    const PROVIDES: Capabilities = Capabilities::GLS_PARAMETERS;
    const REQUIRES: Capabilities = Capabilities::ALGEBRAIC_SPHERE;
    const NAME: &'static str = "GlsParam";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        let Some(sphere) = state.sphere.fresh() else {
            return FitStatus::Unstable;
        };
        let norm = sphere.pratt_norm();
        let ul_norm = sphere.ul.norm();
        if norm <= T::machine_epsilon() || ul_norm <= T::machine_epsilon() {
            return FitStatus::Unstable;
        }
        // Descriptors are read at the evaluation point, the basis center.
        let params = GlsParameters {
            t: state.scale(),
            tau: sphere.uc / norm,
            eta: sphere.ul / ul_norm,
            kappa: T::lit(2.0) * sphere.uq / norm,
        };
        publish(&mut state.gls, params, Capabilities::GLS_PARAMETERS)
    }
}

impl<T: Real, const N: usize, S: Sample<T, N>> Accumulate<T, N, S> for GlsParam {
    #[inline]
    fn add_local_neighbor(&mut self, _nb: &Neighbor<T, N>, _sample: &S, _state: &FitState<T, N>) {}
}
