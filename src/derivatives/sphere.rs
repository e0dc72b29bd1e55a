//! Derivatives of the oriented algebraic sphere fit.
//!
//! ## Key concepts
//!
//! The closed form of [`OrientedSphereFit`] is differentiated through its
//! weighted sums with the quotient rule. With `d` a derivative in the
//! selected directions:
//!
//! ```text
//! d num = dPN - (W (Nnᵀ dP + Pᵀ dNn) - dW P·Nn) / W²
//! d den = dPP - (2 W Pᵀ dP - dW P·P) / W²
//! d uq  = (den d num - num d den) / (2 den²)
//! d ul  = (dNn - ul dW - 2 (uq dP + P d uq)) / W
//! d uc  = -(Pᵀ d ul + PP d uq + ulᵀ dP + uq dPP + uc dW) / W
//! ```
//!
//! The normal Jacobian follows from differentiating `∇f / |∇f|` at the
//! evaluation point, with `d∇f = d ul + 2 uq I` in space.

use core::marker::PhantomData;

use crate::algorithms::sphere::OrientedSphereFit;
use crate::derivatives::{unit_vector_derivative, NormalDerivative, SphereDerivatives};
use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::{publish, FitState};
use crate::primitives::capabilities::Capabilities;
use crate::primitives::derivative::{DerivativeType, ScalarDerivative, VectorDerivative};
use crate::primitives::sample::OrientedSample;
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

/// Oriented sphere fit with derivatives selected by `D`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedSphereDer<T: Real, const N: usize, D: DerivativeType> {
    base: OrientedSphereFit<T, N>,
    d_sum_dot_pn: ScalarDerivative<T, N>,
    d_sum_dot_pp: ScalarDerivative<T, N>,
    _der: PhantomData<D>,
}

impl<T: Real, const N: usize, D: DerivativeType> Default for OrientedSphereDer<T, N, D> {
    fn default() -> Self {
        Self {
            base: OrientedSphereFit::default(),
            d_sum_dot_pn: ScalarDerivative::zeros(),
            d_sum_dot_pp: ScalarDerivative::zeros(),
            _der: PhantomData,
        }
    }
}

impl<T: Real, const N: usize, D: DerivativeType> OrientedSphereDer<T, N, D> {
    /// Underlying sphere fit.
    pub fn base(&self) -> &OrientedSphereFit<T, N> {
        &self.base
    }

    fn derivatives(&self, state: &FitState<T, N>) -> Option<SphereDerivatives<T, N>> {
        let raw = *self.base.raw_sphere()?;
        let solve = *self.base.solve()?;
        let acc = &state.acc;
        let der = &state.deriv;

        let w = acc.sum_w;
        let w2 = w * w;
        let p = acc.sum_p;
        let nn = acc.sum_n;
        let pp = acc.sum_dot_pp();
        let (uc, ul, uq) = (raw.uc, raw.ul, raw.uq);

        let dw = der.d_sum_w;
        let dp = der.d_sum_p;
        let dn = der.d_sum_n;

        let duq = if solve.planar {
            ScalarDerivative::zeros()
        } else {
            let (num, den) = (solve.num, solve.den);
            let dnum = self.d_sum_dot_pn
                - ((dp.dot(&nn) + dn.dot(&p)) * w - dw * p.dot(&nn)) / w2;
            let dden = self.d_sum_dot_pp - (dp.dot(&p) * (T::lit(2.0) * w) - dw * p.norm_squared()) / w2;
            (dnum * den - dden * num) / (T::lit(2.0) * den * den)
        };

        let dul = (dn
            - VectorDerivative::outer(&ul, &dw)
            - (dp * uq + VectorDerivative::outer(&p, &duq)) * T::lit(2.0))
            / w;

        let duc = -(dul.dot(&p) + duq * pp + dp.dot(&ul) + self.d_sum_dot_pp * uq + dw * uc) / w;

        Some(SphereDerivatives {
            sphere: raw,
            duc,
            dul,
            duq,
            scale: D::SCALE,
            space: D::SPACE,
        })
    }
}

impl<T: Real, const N: usize, D: DerivativeType> Component<T, N> for OrientedSphereDer<T, N, D> {
    const PROVIDES: Capabilities = {
        let base = Capabilities::ALGEBRAIC_SPHERE.union(Capabilities::SPHERE_DERIVATIVE);
        if D::SPACE {
            base.union(Capabilities::NORMAL_DERIVATIVE)
        } else {
            base
        }
    };
    const SCALE_DERIVATIVE: bool = D::SCALE;
    const SPACE_DERIVATIVE: bool = D::SPACE;
    const NAME: &'static str = "OrientedSphereDer";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        let status = self.base.finalize(state);
        if !status.is_ready() || self.base.raw_sphere().is_none() {
            return status;
        }
        let Some(derivatives) = self.derivatives(state) else {
            return FitStatus::Unstable;
        };

        let mut status = status.combine(publish(
            &mut state.sphere_derivatives,
            derivatives,
            Capabilities::SPHERE_DERIVATIVE,
        ));

        if D::SPACE {
            let grad = derivatives.sphere.ul;
            match unit_vector_derivative(&grad, &derivatives.gradient_derivative()) {
                Some(dnormal) => {
                    let normal = NormalDerivative {
                        normal: grad.normalize(),
                        dnormal,
                    };
                    status = status.combine(publish(
                        &mut state.normal_derivative,
                        normal,
                        Capabilities::NORMAL_DERIVATIVE,
                    ));
                }
                None => status = status.combine(FitStatus::Unstable),
            }
        }
        status
    }
}

impl<T: Real, const N: usize, D: DerivativeType, S: OrientedSample<T, N>> Accumulate<T, N, S>
    for OrientedSphereDer<T, N, D>
{
    fn add_local_neighbor(&mut self, nb: &Neighbor<T, N>, sample: &S, state: &FitState<T, N>) {
        self.base.add_local_neighbor(nb, sample, state);
        self.d_sum_dot_pn += nb.dw * sample.normal().dot(&nb.q);
        self.d_sum_dot_pp += nb.dw * nb.q.norm_squared();
    }
}
