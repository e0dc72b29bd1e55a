//! High-level API for configuring local fits.
//!
//! ## Purpose
//!
//! This module provides the user-facing entry point of the crate. It
//! implements a fluent builder that collects the weighting parameters of a
//! fit and instantiates a [`Fit`] for a chosen component chain.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with sensible defaults for the kernel and
//!   the pass bound.
//! * **Validated**: Parameters are validated when `.build()` is called.
//! * **Static chain**: The component chain is a type parameter of `build`;
//!   an unsatisfied chain is rejected at compile time.
//!
//! ### Configuration Flow
//!
//! 1. Create a [`FitBuilder`] via `FitBuilder::new()`.
//! 2. Chain configuration methods (`.center()`, `.scale()`, etc.).
//! 3. Call `.build::<Chain>()` to get a [`Fit`].

// External dependencies
use nalgebra::SVector;

// Internal dependencies
use crate::engine::component::Component;
use crate::engine::fit::DEFAULT_MAX_PASSES;
use crate::engine::validator::Validator;
use crate::primitives::scalar::Real;

// Publicly re-exported types
pub use crate::adapters::batch::BatchFitter;
pub use crate::engine::fit::Fit;
pub use crate::math::kernel::WeightKernel;
pub use crate::math::weight::DistWeightFunc;
pub use crate::primitives::errors::FitError;
pub use crate::primitives::status::FitStatus;

// ============================================================================
// Fit Builder
// ============================================================================

/// Fluent builder for a [`Fit`].
#[derive(Debug, Clone)]
pub struct FitBuilder<T: Real, const N: usize> {
    /// Evaluation center.
    pub center: Option<SVector<T, N>>,

    /// Support radius of the weighting function.
    pub scale: Option<T>,

    /// Radial profile of the weighting function.
    pub kernel: Option<WeightKernel>,

    /// Pass bound of `compute`.
    pub max_passes: Option<usize>,

    /// Tracks if any parameter was set multiple times (for validation)
    #[doc(hidden)]
    pub(crate) duplicate_param: Option<&'static str>,
}

impl<T: Real, const N: usize> Default for FitBuilder<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Real, const N: usize> FitBuilder<T, N> {
    /// Create a new builder with default parameters.
    pub fn new() -> Self {
        Self {
            center: None,
            scale: None,
            kernel: None,
            max_passes: None,
            duplicate_param: None,
        }
    }

    /// Set the evaluation center.
    pub fn center(mut self, center: SVector<T, N>) -> Self {
        if self.center.is_some() {
            self.duplicate_param = Some("center");
        }
        self.center = Some(center);
        self
    }

    /// Set the support radius.
    pub fn scale(mut self, scale: T) -> Self {
        if self.scale.is_some() {
            self.duplicate_param = Some("scale");
        }
        self.scale = Some(scale);
        self
    }

    /// Set the radial profile (default: [`WeightKernel::Smooth`]).
    pub fn kernel(mut self, kernel: WeightKernel) -> Self {
        if self.kernel.is_some() {
            self.duplicate_param = Some("kernel");
        }
        self.kernel = Some(kernel);
        self
    }

    /// Set the pass bound of `compute` (default: 16).
    pub fn max_passes(mut self, max_passes: usize) -> Self {
        if self.max_passes.is_some() {
            self.duplicate_param = Some("max_passes");
        }
        self.max_passes = Some(max_passes);
        self
    }

    /// Validate the parameters and build the weighting function.
    pub fn weight_func(&self) -> Result<DistWeightFunc<T, N>, FitError> {
        Validator::validate_no_duplicates(self.duplicate_param)?;
        let (Some(center), Some(scale)) = (self.center, self.scale) else {
            return Err(FitError::MissingWeightFunction);
        };
        DistWeightFunc::new(center, scale, self.kernel.unwrap_or_default())
    }

    /// Validate the parameters and build a fit for the chain `C`.
    pub fn build<C: Component<T, N>>(self) -> Result<Fit<T, N, C>, FitError> {
        let weight = self.weight_func()?;
        let mut fit = Fit::new(weight);
        fit.set_max_passes(self.max_passes.unwrap_or(DEFAULT_MAX_PASSES))?;
        Ok(fit)
    }
}
