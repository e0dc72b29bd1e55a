//! Batch adapter fitting many evaluation points.
//!
//! ## Purpose
//!
//! This module fits the same component chain at every point of a query set.
//! Neighbors are supplied by a caller-provided query closure (a spatial index
//! lookup) returning identifiers into the sample slice.
//!
//! ## Design notes
//!
//! * **One fit per query**: every query gets its own [`Fit`]; no state is
//!   shared between queries.
//! * **Parallelism**: with the `parallel` feature and `.parallel(true)`,
//!   queries are distributed with rayon. Each fit remains a sequential
//!   reduction, so both paths give identical results.
//!
//! ## Invariants
//!
//! * Output order matches query order.
//! * The first configuration or identifier error aborts the batch.
//!
//! ## Non-goals
//!
//! * This adapter does not build spatial indices.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use nalgebra::SVector;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

// Internal dependencies
use crate::engine::component::Accumulate;
use crate::engine::fit::{Fit, DEFAULT_MAX_PASSES};
use crate::engine::validator::Validator;
use crate::math::kernel::WeightKernel;
use crate::math::weight::DistWeightFunc;
use crate::primitives::errors::FitError;
use crate::primitives::sample::Sample;
use crate::primitives::scalar::Real;

// ============================================================================
// Batch Fitter
// ============================================================================

/// Fits a component chain at every point of a query set.
#[derive(Debug, Clone)]
pub struct BatchFitter<T: Real, const N: usize> {
    /// Support radius shared by every query.
    pub scale: Option<T>,

    /// Radial profile.
    pub kernel: Option<WeightKernel>,

    /// Pass bound of each fit.
    pub max_passes: Option<usize>,

    /// Distribute queries over the rayon thread pool.
    pub parallel: bool,

    /// Tracks if any parameter was set multiple times (for validation)
    #[doc(hidden)]
    pub(crate) duplicate_param: Option<&'static str>,
}

impl<T: Real, const N: usize> Default for BatchFitter<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Real, const N: usize> BatchFitter<T, N> {
    /// Create a batch fitter with default parameters.
    pub fn new() -> Self {
        Self {
            scale: None,
            kernel: None,
            max_passes: None,
            parallel: false,
            duplicate_param: None,
        }
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

    /// Set the pass bound of each fit (default: 16).
    pub fn max_passes(mut self, max_passes: usize) -> Self {
        if self.max_passes.is_some() {
            self.duplicate_param = Some("max_passes");
        }
        self.max_passes = Some(max_passes);
        self
    }

    /// Enable or disable parallel execution.
    ///
    /// Without the `parallel` feature, queries always run sequentially.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fit the chain `C` at every query point.
    ///
    /// `neighbors` maps a query point to identifiers into `samples`.
    pub fn fit_all<C, S, Q>(
        &self,
        queries: &[SVector<T, N>],
        samples: &[S],
        neighbors: Q,
    ) -> Result<Vec<Fit<T, N, C>>, FitError>
    where
        C: Accumulate<T, N, S> + Send,
        S: Sample<T, N> + Sync,
        Q: Fn(&SVector<T, N>) -> Vec<usize> + Sync,
    {
        Validator::validate_no_duplicates(self.duplicate_param)?;
        let scale = self.scale.ok_or(FitError::MissingWeightFunction)?;
        Validator::validate_scale(scale)?;
        let kernel = self.kernel.unwrap_or_default();
        let max_passes = self.max_passes.unwrap_or(DEFAULT_MAX_PASSES);
        Validator::validate_max_passes(max_passes)?;

        let fit_one = |query: &SVector<T, N>| -> Result<Fit<T, N, C>, FitError> {
            let weight = DistWeightFunc::new(*query, scale, kernel)?;
            let mut fit = Fit::new(weight);
            fit.set_max_passes(max_passes)?;
            let ids = neighbors(query);
            fit.compute_with_ids(&ids, samples)?;
            Ok(fit)
        };

        debug!(queries = queries.len(), parallel = self.parallel, "batch fit started");

        #[cfg(feature = "parallel")]
        {
            if self.parallel {
                return queries.par_iter().map(fit_one).collect();
            }
        }

        queries.iter().map(fit_one).collect()
    }
}
