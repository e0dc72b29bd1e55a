//! The fit object: accumulation protocol and multi-pass driver.
//!
//! ## Purpose
//!
//! [`Fit`] binds a weighting function to a composite of components and
//! drives the protocol
//!
//! ```text
//! init → add_neighbor* → finalize ─┬─ Stable / Unstable / Conflict → read outputs
//!                                   └─ NeedAnotherPass → start_new_pass → add_neighbor* → finalize ...
//! ```
//!
//! ## Design notes
//!
//! * **Static chain**: the composite `C` is fixed by the type; instantiating
//!   a `Fit` whose chain has an unmet requirement or a dependency cycle does
//!   not compile.
//! * **Silent filtering**: neighbors with a non-positive weight or
//!   non-finite coordinates are skipped without error.
//! * **Re-streaming**: [`Fit::compute`] takes a cloneable iterator so it can
//!   replay the neighbors for as many passes as the chain asks for, up to
//!   `max_passes`.
//!
//! ## Invariants
//!
//! * `finalize` is idempotent: it does not consume the sums.
//! * `start_new_pass` keeps every published output readable.
//! * A `Stable` status implies every provided output was written in the
//!   last finalize.
//!
//! ## Non-goals
//!
//! * This module does not discover neighbors.

use nalgebra::SVector;
use tracing::{debug, trace, warn};

use crate::algorithms::gls::GlsParameters;
use crate::algorithms::line::Line;
use crate::algorithms::monge::MongePatch;
use crate::algorithms::plane::Plane;
use crate::algorithms::sphere::AlgebraicSphere;
use crate::curvature::Curvature;
use crate::derivatives::{GlsDerivatives, NormalDerivative, PlaneDerivatives, SphereDerivatives};
use crate::engine::component::{Accumulate, Component, Neighbor};
use crate::engine::state::FitState;
use crate::engine::validator::Validator;
use crate::math::weight::DistWeightFunc;
use crate::primitives::errors::FitError;
use crate::primitives::sample::Sample;
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

/// Default bound on the number of passes run by [`Fit::compute`].
pub const DEFAULT_MAX_PASSES: usize = 16;

// ============================================================================
// Fit
// ============================================================================

/// A statically composed local fit.
///
/// `C` is a single [`Component`] or a tuple of components.
///
/// A chain whose requirements are not met cannot be instantiated:
///
/// ```compile_fail
/// use pointfit_rs::prelude::*;
/// use nalgebra::Vector3;
///
/// // GLS descriptors read an algebraic sphere that nothing provides.
/// let w = DistWeightFunc::new(Vector3::<f64>::zeros(), 1.0, WeightKernel::Smooth).unwrap();
/// let _fit = Fit::<f64, 3, GlsParam>::new(w);
/// ```
///
/// Neither can a fit in fewer than two dimensions:
///
/// ```compile_fail
/// use pointfit_rs::prelude::*;
/// use nalgebra::Vector1;
///
/// let w = DistWeightFunc::new(Vector1::<f64>::zeros(), 1.0, WeightKernel::Smooth).unwrap();
/// let _fit = Fit::<f64, 1, CovariancePlaneFit<f64, 1>>::new(w);
/// ```
#[derive(Debug, Clone)]
pub struct Fit<T: Real, const N: usize, C> {
    components: C,
    state: FitState<T, N>,
    status: FitStatus,
    max_passes: usize,
}

impl<T: Real, const N: usize, C: Component<T, N>> Fit<T, N, C> {
    const REQUIREMENTS_MET: () = assert!(
        C::REQUIRES.is_empty(),
        "fit composition requires a capability that no component provides"
    );

    const DIMENSION_SUPPORTED: () = assert!(N >= 2, "local fits need an ambient dimension of at least 2");

    /// Derivative chains get no information from a kernel with a null
    /// derivative.
    fn check_kernel(weight: &DistWeightFunc<T, N>) {
        if (C::SCALE_DERIVATIVE || C::SPACE_DERIVATIVE) && !weight.kernel().is_differentiable() {
            warn!(
                component = C::NAME,
                kernel = ?weight.kernel(),
                "derivative chain with a non-differentiable kernel: weight derivatives vanish"
            );
        }
    }

    /// Create a fit for a weighting function.
    pub fn new(weight: DistWeightFunc<T, N>) -> Self {
        let () = C::CHECK;
        let () = Self::REQUIREMENTS_MET;
        let () = Self::DIMENSION_SUPPORTED;
        Self::check_kernel(&weight);
        Self {
            components: C::default(),
            state: FitState::new(weight),
            status: FitStatus::Undefined,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// Set the pass bound of [`Fit::compute`].
    pub fn set_max_passes(&mut self, max_passes: usize) -> Result<(), FitError> {
        Validator::validate_max_passes(max_passes)?;
        self.max_passes = max_passes;
        Ok(())
    }

    // ========================================================================
    // Protocol
    // ========================================================================

    /// Restart the fit: clear sums, outputs, pass index and component state.
    pub fn init(&mut self) {
        self.state.reset();
        self.components.init();
        self.status = FitStatus::Undefined;
    }

    /// Install a new weighting function and restart the fit.
    pub fn set_weight_func(&mut self, weight: DistWeightFunc<T, N>) {
        Self::check_kernel(&weight);
        self.state.set_weight_func(weight);
        self.components.init();
        self.status = FitStatus::Undefined;
    }

    /// Stream one neighbor.
    ///
    /// Returns `false` when the neighbor was skipped (outside the support or
    /// non-finite).
    pub fn add_neighbor<S>(&mut self, sample: &S) -> bool
    where
        S: Sample<T, N>,
        C: Accumulate<T, N, S>,
    {
        let x = sample.position();
        let normal = sample.try_normal();
        let finite = x.iter().all(|v| v.is_finite())
            && normal.map_or(true, |n| n.iter().all(|v| v.is_finite()));
        if !finite {
            trace!(reason = "non-finite", "neighbor skipped");
            return false;
        }

        let q = self.state.weight_func().to_local(&x);
        let eval = self
            .state
            .weight_func()
            .evaluate(&q, C::SCALE_DERIVATIVE, C::SPACE_DERIVATIVE);
        if eval.w <= T::zero() {
            trace!(reason = "outside support", "neighbor skipped");
            return false;
        }

        self.state.acc.add(&q, eval.w, normal.as_ref());
        if C::SCALE_DERIVATIVE || C::SPACE_DERIVATIVE {
            self.state.deriv.add(&q, &eval.dw, normal.as_ref());
        }

        let nb = Neighbor {
            q,
            w: eval.w,
            dw: eval.dw,
        };
        self.components.add_local_neighbor(&nb, sample, &self.state);
        true
    }

    /// Compute and publish every output of the chain.
    pub fn finalize(&mut self) -> FitStatus {
        self.state.begin_finalize();
        let status = self.components.finalize(&mut self.state);
        debug_assert!(
            !status.is_stable() || self.state.written().contains(C::PROVIDES),
            "stable fit left a provided output unwritten"
        );
        debug!(
            status = ?status,
            pass = self.state.acc.pass,
            neighbors = self.state.acc.count,
            component = C::NAME,
            "fit finalized"
        );
        self.status = status;
        status
    }

    /// Clear the sums for another sweep over the same neighbors, keeping the
    /// published outputs.
    pub fn start_new_pass(&mut self) {
        self.state.start_new_pass();
        self.components.start_new_pass();
        debug!(pass = self.state.acc.pass, "new pass started");
    }

    /// Run the complete protocol over a re-iterable neighbor sequence.
    ///
    /// Passes are repeated while the chain reports
    /// [`FitStatus::NeedAnotherPass`], at most `max_passes` times.
    pub fn compute<'a, S, I>(&mut self, samples: I) -> FitStatus
    where
        S: Sample<T, N> + 'a,
        I: IntoIterator<Item = &'a S> + Clone,
        C: Accumulate<T, N, S>,
    {
        self.init();
        let mut status = FitStatus::Undefined;
        for pass in 0..self.max_passes {
            if pass > 0 {
                self.start_new_pass();
            }
            for sample in samples.clone() {
                self.add_neighbor(sample);
            }
            status = self.finalize();
            if !status.needs_another_pass() {
                return status;
            }
        }
        warn!(
            max_passes = self.max_passes,
            "fit still needs another pass after exhausting the pass bound"
        );
        status
    }

    /// Run the complete protocol over neighbors given as identifiers into a
    /// sample slice (as returned by a spatial index).
    pub fn compute_with_ids<S>(&mut self, ids: &[usize], samples: &[S]) -> Result<FitStatus, FitError>
    where
        S: Sample<T, N>,
        C: Accumulate<T, N, S>,
    {
        for &id in ids {
            Validator::validate_index(id, samples.len())?;
        }
        Ok(self.compute(ids.iter().map(|&id| &samples[id])))
    }

    // ========================================================================
    // Projection
    // ========================================================================

    /// Project a point onto the most specific fitted primitive: Monge patch,
    /// algebraic sphere, plane, then line.
    pub fn project(&self, p: &SVector<T, N>) -> Option<SVector<T, N>> {
        if let Some(patch) = self.state.monge.get() {
            return Some(patch.project(p));
        }
        if let Some(sphere) = self.state.sphere.get() {
            return Some(sphere.project(p));
        }
        if let Some(plane) = self.state.plane.get() {
            return Some(plane.project(p));
        }
        self.state.line.get().map(|line| line.project(p))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Status of the last finalize.
    #[inline]
    pub fn status(&self) -> FitStatus {
        self.status
    }

    /// Whether the last finalize was stable.
    #[inline]
    pub fn is_stable(&self) -> bool {
        self.status.is_stable()
    }

    /// Weighting function.
    #[inline]
    pub fn weight_func(&self) -> &DistWeightFunc<T, N> {
        self.state.weight_func()
    }

    /// Pass bound of [`Fit::compute`].
    #[inline]
    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Shared sums and published outputs.
    #[inline]
    pub fn state(&self) -> &FitState<T, N> {
        &self.state
    }

    /// The component chain.
    #[inline]
    pub fn components(&self) -> &C {
        &self.components
    }

    /// Number of neighbors accumulated in the current pass.
    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.state.acc.count
    }

    /// Index of the current pass.
    #[inline]
    pub fn current_pass(&self) -> usize {
        self.state.acc.pass
    }

    /// Weighted barycenter, global coordinates.
    pub fn mean_position(&self) -> Option<&SVector<T, N>> {
        self.state.mean_position.get()
    }

    /// Weighted mean normal.
    pub fn mean_normal(&self) -> Option<&SVector<T, N>> {
        self.state.mean_normal.get()
    }

    /// Fitted plane.
    pub fn plane(&self) -> Option<&Plane<T, N>> {
        self.state.plane.get()
    }

    /// Fitted line.
    pub fn line(&self) -> Option<&Line<T, N>> {
        self.state.line.get()
    }

    /// Fitted algebraic sphere.
    pub fn sphere(&self) -> Option<&AlgebraicSphere<T, N>> {
        self.state.sphere.get()
    }

    /// Fitted Monge patch.
    pub fn monge_patch(&self) -> Option<&MongePatch<T, N>> {
        self.state.monge.get()
    }

    /// Derivatives of the algebraic sphere.
    pub fn sphere_derivatives(&self) -> Option<&SphereDerivatives<T, N>> {
        self.state.sphere_derivatives.get()
    }

    /// Derivatives of the plane.
    pub fn plane_derivatives(&self) -> Option<&PlaneDerivatives<T, N>> {
        self.state.plane_derivatives.get()
    }

    /// Normal of the primitive at the evaluation point and its derivative.
    pub fn normal_derivative(&self) -> Option<&NormalDerivative<T, N>> {
        self.state.normal_derivative.get()
    }

    /// Principal curvatures.
    pub fn curvature(&self) -> Option<&Curvature<T, N>> {
        self.state.curvature.get()
    }

    /// GLS descriptors.
    pub fn gls(&self) -> Option<&GlsParameters<T, N>> {
        self.state.gls.get()
    }

    /// Derivatives of the GLS descriptors.
    pub fn gls_derivatives(&self) -> Option<&GlsDerivatives<T, N>> {
        self.state.gls_derivatives.get()
    }
}
