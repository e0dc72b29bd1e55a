//! Shared fit state: accumulated sums and published outputs.
//!
//! ## Purpose
//!
//! [`FitState`] is the blackboard every component of a composite reads from
//! and writes to. It holds
//!
//! * the weighting function of the current evaluation,
//! * the sums shared by all components ([`AccumulationState`]),
//! * the weight-derivative sums, maintained only when a composed component
//!   asks for them ([`DerivativeAccumulation`]),
//! * one typed [`Slot`] per [`Capabilities`] tag.
//!
//! ## Design notes
//!
//! * **Local frame**: every sum is expressed in coordinates relative to the
//!   evaluation center (`q = x - c`).
//! * **Fixed frame derivatives**: derivative sums only differentiate the
//!   weights; the local frame is kept fixed at the current center.
//! * **Publishing**: components write their outputs through [`publish`],
//!   which turns a second write in the same finalize into
//!   [`FitStatus::ConflictErrorFound`].
//! * **Fresh reads**: a consumer reads its requirements with [`Slot::fresh`],
//!   so a provider that failed in the current finalize is never mistaken for
//!   the success of an earlier pass.
//!
//! ## Invariants
//!
//! * `count`, `sum_w`, the sums and the derivative sums are reset together.
//! * `pass` is only advanced by `start_new_pass` and reset by `init`.

use nalgebra::{SMatrix, SVector};
use tracing::warn;

use crate::algorithms::gls::GlsParameters;
use crate::algorithms::line::Line;
use crate::algorithms::monge::MongePatch;
use crate::algorithms::plane::Plane;
use crate::algorithms::sphere::AlgebraicSphere;
use crate::curvature::Curvature;
use crate::derivatives::{GlsDerivatives, NormalDerivative, PlaneDerivatives, SphereDerivatives};
use crate::math::weight::DistWeightFunc;
use crate::primitives::buffer::{Slot, SlotConflict};
use crate::primitives::capabilities::Capabilities;
use crate::primitives::derivative::{ScalarDerivative, VectorDerivative};
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

// ============================================================================
// Accumulation
// ============================================================================

/// Weighted sums shared by every component.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulationState<T: Real, const N: usize> {
    /// Number of neighbors with a strictly positive weight.
    pub count: usize,
    /// `Σ w`.
    pub sum_w: T,
    /// `Σ w q`.
    pub sum_p: SVector<T, N>,
    /// `Σ w q qᵀ`.
    pub sum_pp: SMatrix<T, N, N>,
    /// `Σ w n` over neighbors carrying a normal.
    pub sum_n: SVector<T, N>,
    /// Number of accumulated neighbors that carried a normal.
    pub normal_count: usize,
    /// Index of the current pass, starting at 0.
    pub pass: usize,
}

impl<T: Real, const N: usize> AccumulationState<T, N> {
    /// Empty sums at pass 0.
    pub fn new() -> Self {
        Self {
            count: 0,
            sum_w: T::zero(),
            sum_p: SVector::zeros(),
            sum_pp: SMatrix::zeros(),
            sum_n: SVector::zeros(),
            normal_count: 0,
            pass: 0,
        }
    }

    /// Forget the sums, keep the pass index.
    pub fn clear_sums(&mut self) {
        let pass = self.pass;
        *self = Self::new();
        self.pass = pass;
    }

    /// Add one weighted neighbor in local coordinates.
    #[inline]
    pub fn add(&mut self, q: &SVector<T, N>, w: T, normal: Option<&SVector<T, N>>) {
        self.count += 1;
        self.sum_w += w;
        self.sum_p += q * w;
        self.sum_pp += q * q.transpose() * w;
        if let Some(n) = normal {
            self.sum_n += n * w;
            self.normal_count += 1;
        }
    }

    /// Whether the total weight is large enough to normalize by.
    #[inline]
    pub fn has_weight(&self) -> bool {
        self.sum_w > T::machine_epsilon()
    }

    /// `Σ w |q|²`.
    #[inline]
    pub fn sum_dot_pp(&self) -> T {
        self.sum_pp.trace()
    }

    /// Magnitude under which a covariance eigenvalue is rounding noise.
    pub fn covariance_noise_floor(&self) -> T {
        if !self.has_weight() {
            return T::zero();
        }
        T::machine_epsilon() * T::lit(16.0) * self.sum_dot_pp() / self.sum_w
    }

    /// Weighted barycenter in local coordinates.
    pub fn mean_position_local(&self) -> Option<SVector<T, N>> {
        self.has_weight().then(|| self.sum_p / self.sum_w)
    }

    /// Weighted covariance `Σw q qᵀ / W - q̄ q̄ᵀ`.
    pub fn covariance(&self) -> Option<SMatrix<T, N, N>> {
        let mean = self.mean_position_local()?;
        Some(self.sum_pp / self.sum_w - mean * mean.transpose())
    }
}

impl<T: Real, const N: usize> Default for AccumulationState<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Derivatives of the shared sums with respect to the weights.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeAccumulation<T: Real, const N: usize> {
    /// `Σ dw`.
    pub d_sum_w: ScalarDerivative<T, N>,
    /// `Σ q dw`.
    pub d_sum_p: VectorDerivative<T, N>,
    /// `Σ n dw`.
    pub d_sum_n: VectorDerivative<T, N>,
}

impl<T: Real, const N: usize> DerivativeAccumulation<T, N> {
    /// Zero sums.
    pub fn new() -> Self {
        Self {
            d_sum_w: ScalarDerivative::zeros(),
            d_sum_p: VectorDerivative::zeros(),
            d_sum_n: VectorDerivative::zeros(),
        }
    }

    /// Add the weight derivative of one neighbor.
    #[inline]
    pub fn add(&mut self, q: &SVector<T, N>, dw: &ScalarDerivative<T, N>, normal: Option<&SVector<T, N>>) {
        self.d_sum_w += *dw;
        self.d_sum_p += VectorDerivative::outer(q, dw);
        if let Some(n) = normal {
            self.d_sum_n += VectorDerivative::outer(n, dw);
        }
    }
}

impl<T: Real, const N: usize> Default for DerivativeAccumulation<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Fit State
// ============================================================================

/// Accumulated sums, weighting function and output slots of a fit.
#[derive(Debug, Clone)]
pub struct FitState<T: Real, const N: usize> {
    weight: DistWeightFunc<T, N>,

    /// Shared sums.
    pub acc: AccumulationState<T, N>,
    /// Weight-derivative sums.
    pub deriv: DerivativeAccumulation<T, N>,

    /// [`Capabilities::MEAN_POSITION`], global coordinates.
    pub mean_position: Slot<SVector<T, N>>,
    /// [`Capabilities::MEAN_NORMAL`].
    pub mean_normal: Slot<SVector<T, N>>,
    /// [`Capabilities::PLANE`].
    pub plane: Slot<Plane<T, N>>,
    /// [`Capabilities::LINE`].
    pub line: Slot<Line<T, N>>,
    /// [`Capabilities::ALGEBRAIC_SPHERE`].
    pub sphere: Slot<AlgebraicSphere<T, N>>,
    /// [`Capabilities::MONGE_PATCH`].
    pub monge: Slot<MongePatch<T, N>>,
    /// [`Capabilities::SPHERE_DERIVATIVE`].
    pub sphere_derivatives: Slot<SphereDerivatives<T, N>>,
    /// [`Capabilities::PLANE_DERIVATIVE`].
    pub plane_derivatives: Slot<PlaneDerivatives<T, N>>,
    /// [`Capabilities::NORMAL_DERIVATIVE`].
    pub normal_derivative: Slot<NormalDerivative<T, N>>,
    /// [`Capabilities::PRINCIPAL_CURVATURES`].
    pub curvature: Slot<Curvature<T, N>>,
    /// [`Capabilities::GLS_PARAMETERS`].
    pub gls: Slot<GlsParameters<T, N>>,
    /// [`Capabilities::GLS_DERIVATIVES`].
    pub gls_derivatives: Slot<GlsDerivatives<T, N>>,
}

impl<T: Real, const N: usize> FitState<T, N> {
    /// Fresh state for a weighting function.
    pub fn new(weight: DistWeightFunc<T, N>) -> Self {
        Self {
            weight,
            acc: AccumulationState::new(),
            deriv: DerivativeAccumulation::new(),
            mean_position: Slot::new(),
            mean_normal: Slot::new(),
            plane: Slot::new(),
            line: Slot::new(),
            sphere: Slot::new(),
            monge: Slot::new(),
            sphere_derivatives: Slot::new(),
            plane_derivatives: Slot::new(),
            normal_derivative: Slot::new(),
            curvature: Slot::new(),
            gls: Slot::new(),
            gls_derivatives: Slot::new(),
        }
    }

    /// Weighting function of the current evaluation.
    #[inline]
    pub fn weight_func(&self) -> &DistWeightFunc<T, N> {
        &self.weight
    }

    /// Evaluation center.
    #[inline]
    pub fn center(&self) -> &SVector<T, N> {
        self.weight.center()
    }

    /// Support radius.
    #[inline]
    pub fn scale(&self) -> T {
        self.weight.scale()
    }

    /// Install a new weighting function and reset everything.
    pub(crate) fn set_weight_func(&mut self, weight: DistWeightFunc<T, N>) {
        *self = Self::new(weight);
    }

    /// Reset sums, slots and the pass index.
    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.weight);
    }

    /// Clear the sums and advance the pass index, keeping the slots.
    pub(crate) fn start_new_pass(&mut self) {
        self.acc.clear_sums();
        self.acc.pass += 1;
        self.deriv = DerivativeAccumulation::new();
    }

    /// Drop the write marks of every slot.
    pub(crate) fn begin_finalize(&mut self) {
        self.mean_position.begin_finalize();
        self.mean_normal.begin_finalize();
        self.plane.begin_finalize();
        self.line.begin_finalize();
        self.sphere.begin_finalize();
        self.monge.begin_finalize();
        self.sphere_derivatives.begin_finalize();
        self.plane_derivatives.begin_finalize();
        self.normal_derivative.begin_finalize();
        self.curvature.begin_finalize();
        self.gls.begin_finalize();
        self.gls_derivatives.begin_finalize();
    }

    /// Tags whose slot was written during the current finalize.
    pub fn written(&self) -> Capabilities {
        let mut caps = Capabilities::empty();
        caps.set(Capabilities::MEAN_POSITION, self.mean_position.is_written());
        caps.set(Capabilities::MEAN_NORMAL, self.mean_normal.is_written());
        caps.set(Capabilities::PLANE, self.plane.is_written());
        caps.set(Capabilities::LINE, self.line.is_written());
        caps.set(Capabilities::ALGEBRAIC_SPHERE, self.sphere.is_written());
        caps.set(Capabilities::MONGE_PATCH, self.monge.is_written());
        caps.set(Capabilities::SPHERE_DERIVATIVE, self.sphere_derivatives.is_written());
        caps.set(Capabilities::PLANE_DERIVATIVE, self.plane_derivatives.is_written());
        caps.set(Capabilities::NORMAL_DERIVATIVE, self.normal_derivative.is_written());
        caps.set(Capabilities::PRINCIPAL_CURVATURES, self.curvature.is_written());
        caps.set(Capabilities::GLS_PARAMETERS, self.gls.is_written());
        caps.set(Capabilities::GLS_DERIVATIVES, self.gls_derivatives.is_written());
        caps
    }
}

/// Write a component output, reporting a second write in the same finalize.
pub fn publish<V>(slot: &mut Slot<V>, value: V, tag: Capabilities) -> FitStatus {
    match slot.write(value) {
        Ok(()) => FitStatus::Stable,
        Err(SlotConflict) => {
            warn!(capability = ?tag, "output slot written twice in one finalize");
            FitStatus::ConflictErrorFound
        }
    }
}
