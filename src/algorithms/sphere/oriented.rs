//! Algebraic sphere fit from positions and oriented normals.
//!
//! ## Key concepts
//!
//! The field is fitted so that its gradient matches the neighbor normals in
//! the weighted least-squares sense. With `W = Σw`, `P = Σw q`,
//! `Nn = Σw n`, `PP = Σw |q|²` and `PN = Σw n·q`:
//!
//! ```text
//! num = PN - P·Nn / W        den = PP - P·P / W
//! uq  = num / (2 den)
//! ul  = (Nn - 2 uq P) / W
//! uc  = -(ul·P + uq PP) / W
//! ```
//!
//! When `den` vanishes relative to `PP` the neighbors have no spatial spread
//! and the fit falls back to a plane (`uq = 0`).

use crate::algorithms::sphere::AlgebraicSphere;
use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::{publish, FitState};
use crate::primitives::capabilities::Capabilities;
use crate::primitives::sample::OrientedSample;
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

/// Intermediate quantities of the closed-form solve, before normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OrientedSolve<T: Real> {
    pub num: T,
    pub den: T,
    pub planar: bool,
}

/// Closed-form algebraic sphere fit for oriented samples.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedSphereFit<T: Real, const N: usize> {
    sum_dot_pn: T,
    raw: Option<AlgebraicSphere<T, N>>,
    solve: Option<OrientedSolve<T>>,
}

impl<T: Real, const N: usize> Default for OrientedSphereFit<T, N> {
    fn default() -> Self {
        Self {
            sum_dot_pn: T::zero(),
            raw: None,
            solve: None,
        }
    }
}

impl<T: Real, const N: usize> OrientedSphereFit<T, N> {
    /// `Σ w n·q`.
    #[inline]
    pub fn sum_dot_pn(&self) -> T {
        self.sum_dot_pn
    }

    /// Coefficients before Pratt normalization, from the last finalize.
    pub fn raw_sphere(&self) -> Option<&AlgebraicSphere<T, N>> {
        self.raw.as_ref()
    }

    pub(crate) fn solve(&self) -> Option<&OrientedSolve<T>> {
        self.solve.as_ref()
    }
}

impl<T: Real, const N: usize> Component<T, N> for OrientedSphereFit<T, N> {
    const PROVIDES: Capabilities = Capabilities::ALGEBRAIC_SPHERE;
    const NAME: &'static str = "OrientedSphereFit";

    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
        self.raw = None;
        self.solve = None;
        let acc = &state.acc;
        if acc.count < N || !acc.has_weight() {
            return FitStatus::Unstable;
        }

        let w = acc.sum_w;
        let sum_dot_pp = acc.sum_dot_pp();
        let num = self.sum_dot_pn - acc.sum_p.dot(&acc.sum_n) / w;
        let den = sum_dot_pp - acc.sum_p.norm_squared() / w;

        let spread = sum_dot_pp.max(acc.sum_p.norm_squared() / w);
        let planar = den.abs() <= T::machine_epsilon() * spread;
        let uq = if planar { T::zero() } else { T::lit(0.5) * num / den };
        let ul = (acc.sum_n - acc.sum_p * (T::lit(2.0) * uq)) / w;
        let uc = -(ul.dot(&acc.sum_p) + uq * sum_dot_pp) / w;

        let raw = AlgebraicSphere::new(uc, ul, uq, *state.center());
        let Some(sphere) = raw.normalized() else {
            return FitStatus::Unstable;
        };
        self.raw = Some(raw);
        self.solve = Some(OrientedSolve { num, den, planar });
        publish(&mut state.sphere, sphere, Capabilities::ALGEBRAIC_SPHERE)
    }
}

impl<T: Real, const N: usize, S: OrientedSample<T, N>> Accumulate<T, N, S> for OrientedSphereFit<T, N> {
    #[inline]
    fn add_local_neighbor(&mut self, nb: &Neighbor<T, N>, sample: &S, _state: &FitState<T, N>) {
        self.sum_dot_pn += sample.normal().dot(&nb.q) * nb.w;
    }
}
