//! Derivatives of the GLS descriptors.
//!
//! ## Key concepts
//!
//! With `s = (uc, ul, uq)` the raw sphere and `ρ` its Pratt norm, the
//! descriptors are `tau = f(p) / ρ`, `eta = ∇f(p) / |∇f(p)|` and
//! `kappa = 2 uq / ρ`. Their derivatives follow from the raw coefficient
//! derivatives and `dρ = d(ρ²) / 2ρ`.
//!
//! The scale part of the normalized descriptors feeds the geometric
//! variation used to detect characteristic scales.

use crate::derivatives::{unit_vector_derivative, GlsDerivatives};
use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::{publish, FitState};
use crate::primitives::capabilities::Capabilities;
use crate::primitives::sample::Sample;
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

/// Computes the derivatives of the GLS descriptors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlsDer;

impl<T: Real, const N: usize> Component<T, N> for GlsDer {
    const PROVIDES: Capabilities = Capabilities::GLS_DERIVATIVES;
    const REQUIRES: Capabilities = Capabilities::SPHERE_DERIVATIVE.union(Capabilities::GLS_PARAMETERS);
    const NAME: &'static str = "GlsDer";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        let (Some(der), Some(_)) = (state.sphere_derivatives.fresh().copied(), state.gls.fresh()) else {
            return FitStatus::Unstable;
        };
        let sphere = der.sphere;
        let rho = sphere.pratt_norm();
        if rho <= T::machine_epsilon() {
            return FitStatus::Unstable;
        }
        let rho2 = rho * rho;
        let drho = der.pratt_norm_squared_derivative() / (T::lit(2.0) * rho);

        let dtau = (der.field_derivative() * rho - drho * sphere.uc) / rho2;
        let dkappa = (der.duq * rho - drho * sphere.uq) * T::lit(2.0) / rho2;
        let Some(deta) = unit_vector_derivative(&sphere.ul, &der.gradient_derivative()) else {
            return FitStatus::Unstable;
        };

        let t = state.scale();
        let derivatives = GlsDerivatives {
            dtau,
            deta,
            dkappa,
            dtau_normalized: dtau,
            deta_normalized: deta * t,
            dkappa_normalized: dkappa * (t * t),
        };
        publish(&mut state.gls_derivatives, derivatives, Capabilities::GLS_DERIVATIVES)
    }
}

impl<T: Real, const N: usize, S: Sample<T, N>> Accumulate<T, N, S> for GlsDer {
    #[inline]
    fn add_local_neighbor(&mut self, _nb: &Neighbor<T, N>, _sample: &S, _state: &FitState<T, N>) {}
}
