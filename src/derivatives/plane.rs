//! Derivatives of the covariance plane fit.
//!
//! ## Key concepts
//!
//! With `m = P / W` and `C = Σw q qᵀ / W - m mᵀ`, a weight variation gives
//!
//! ```text
//! dm = (dP - m dW) / W
//! dC = dΣw q qᵀ / W - (Σw q qᵀ) dW / W² - (dm mᵀ + m dmᵀ)
//! ```
//!
//! and the normal (eigenvector `v₀` of the smallest eigenvalue `λ₀`) moves by
//! first-order perturbation:
//!
//! ```text
//! dn = Σ_{i≠0} vᵢ (vᵢᵀ dC n) / (λ₀ - λᵢ)
//! ```

use core::marker::PhantomData;

use nalgebra::{SMatrix, SVector};

use crate::algorithms::plane::CovariancePlaneFit;
use crate::derivatives::{NormalDerivative, PlaneDerivatives};
use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::{publish, FitState};
use crate::primitives::capabilities::Capabilities;
use crate::primitives::derivative::{DerivativeType, VectorDerivative};
use crate::primitives::sample::Sample;
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

/// Covariance plane fit with derivatives selected by `D`.
#[derive(Debug, Clone, PartialEq)]
pub struct CovariancePlaneDer<T: Real, const N: usize, D: DerivativeType> {
    base: CovariancePlaneFit<T, N>,
    // Σ ∂w/∂t q qᵀ and Σ ∂w/∂pⱼ q qᵀ for every j.
    d_sum_pp_dt: SMatrix<T, N, N>,
    d_sum_pp_dp: [SMatrix<T, N, N>; N],
    _der: PhantomData<D>,
}

impl<T: Real, const N: usize, D: DerivativeType> Default for CovariancePlaneDer<T, N, D> {
    fn default() -> Self {
        Self {
            base: CovariancePlaneFit::default(),
            d_sum_pp_dt: SMatrix::zeros(),
            d_sum_pp_dp: [SMatrix::zeros(); N],
            _der: PhantomData,
        }
    }
}

impl<T: Real, const N: usize, D: DerivativeType> CovariancePlaneDer<T, N, D> {
    /// Underlying plane fit.
    pub fn base(&self) -> &CovariancePlaneFit<T, N> {
        &self.base
    }

    /// Covariance derivative for one direction, given the derivative of
    /// `Σw`, `Σw q` and `Σw q qᵀ` in that direction.
    fn covariance_derivative(
        state: &FitState<T, N>,
        dw: T,
        dp: &SVector<T, N>,
        dpp: &SMatrix<T, N, N>,
    ) -> (SVector<T, N>, SMatrix<T, N, N>) {
        let w = state.acc.sum_w;
        let m = state.acc.sum_p / w;
        let dm = (dp - m * dw) / w;
        let dc = dpp / w - state.acc.sum_pp * (dw / (w * w)) - (dm * m.transpose() + m * dm.transpose());
        (dm, dc)
    }

    /// First-order variation of the normal for a covariance variation.
    fn normal_variation(&self, normal: &SVector<T, N>, dc: &SMatrix<T, N, N>) -> Option<SVector<T, N>> {
        let eig = self.base.spectrum()?;
        let dcn = dc * normal;
        let mut dn = SVector::zeros();
        for i in 1..N {
            let v: SVector<T, N> = eig.vector(i);
            dn += v * (v.dot(&dcn) / (eig.values[0] - eig.values[i]));
        }
        Some(dn)
    }

    fn derivatives(&self, state: &FitState<T, N>, normal: &SVector<T, N>) -> Option<PlaneDerivatives<T, N>> {
        let der = &state.deriv;
        let mut dpoint = VectorDerivative::zeros();
        let mut dnormal = VectorDerivative::zeros();

        if D::SCALE {
            let (dm, dc) = Self::covariance_derivative(state, der.d_sum_w.dt, &der.d_sum_p.dt, &self.d_sum_pp_dt);
            dpoint.dt = dm;
            dnormal.dt = self.normal_variation(normal, &dc)?;
        }
        if D::SPACE {
            for j in 0..N {
                let dp_j: SVector<T, N> = der.d_sum_p.dp.column(j).into_owned();
                let (dm, dc) = Self::covariance_derivative(state, der.d_sum_w.dp[j], &dp_j, &self.d_sum_pp_dp[j]);
                dpoint.dp.set_column(j, &dm);
                dnormal.dp.set_column(j, &self.normal_variation(normal, &dc)?);
            }
        }
        Some(PlaneDerivatives { dpoint, dnormal })
    }
}

impl<T: Real, const N: usize, D: DerivativeType> Component<T, N> for CovariancePlaneDer<T, N, D> {
    const PROVIDES: Capabilities = {
        let base = Capabilities::PLANE.union(Capabilities::PLANE_DERIVATIVE);
        if D::SPACE {
            base.union(Capabilities::NORMAL_DERIVATIVE)
        } else {
            base
        }
    };
    const SCALE_DERIVATIVE: bool = D::SCALE;
    const SPACE_DERIVATIVE: bool = D::SPACE;
    const NAME: &'static str = "CovariancePlaneDer";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        let status = self.base.finalize(state);
        let Some(plane) = state.plane.fresh().copied() else {
            return status;
        };
        if self.base.spectrum().is_none() {
            return status;
        }
        let Some(derivatives) = self.derivatives(state, &plane.normal) else {
            return FitStatus::Unstable;
        };

        let mut status = status.combine(publish(
            &mut state.plane_derivatives,
            derivatives,
            Capabilities::PLANE_DERIVATIVE,
        ));
        if D::SPACE {
            let normal = NormalDerivative {
                normal: plane.normal,
                dnormal: derivatives.dnormal,
            };
            status = status.combine(publish(
                &mut state.normal_derivative,
                normal,
                Capabilities::NORMAL_DERIVATIVE,
            ));
        }
        status
    }
}

impl<T: Real, const N: usize, D: DerivativeType, S: Sample<T, N>> Accumulate<T, N, S>
    for CovariancePlaneDer<T, N, D>
{
    fn add_local_neighbor(&mut self, nb: &Neighbor<T, N>, sample: &S, state: &FitState<T, N>) {
        self.base.add_local_neighbor(nb, sample, state);
        let qq = nb.q * nb.q.transpose();
        if D::SCALE {
            self.d_sum_pp_dt += qq * nb.dw.dt;
        }
        if D::SPACE {
            for (j, dpp) in self.d_sum_pp_dp.iter_mut().enumerate() {
                *dpp += qq * nb.dw.dp[j];
            }
        }
    }
}
