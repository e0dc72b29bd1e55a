//! Input validation for fit configuration and neighbor resolution.
//!
//! ## Purpose
//!
//! This module checks the parameters a fit is configured with (scale,
//! evaluation center, pass bound, duplicated builder calls) and the neighbor
//! identifiers resolved through `compute_with_ids`.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Generics**: Validation is generic over [`Real`] types.
//!
//! ## Invariants
//!
//! * A weighting function that passed validation has a strictly positive,
//!   finite scale and a finite center.
//!
//! ## Non-goals
//!
//! * This module does not validate streamed samples; non-finite neighbors
//!   are skipped by the accumulation protocol instead.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::format;

// External dependencies
use nalgebra::SVector;

// Internal dependencies
use crate::primitives::errors::FitError;
use crate::primitives::scalar::Real;

/// Largest accepted pass bound for multi-pass fits.
pub const MAX_PASSES_LIMIT: usize = 1024;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for fit configuration.
///
/// All methods return `Result<(), FitError>` and fail fast upon identifying
/// the first violation.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Weighting Function
    // ========================================================================

    /// Validate the support radius of a weighting function.
    pub fn validate_scale<T: Real>(scale: T) -> Result<(), FitError> {
        if !scale.is_finite() || scale <= T::zero() {
            return Err(FitError::InvalidScale(scale.to_f64_lossy()));
        }
        Ok(())
    }

    /// Validate that every coordinate of a point is finite.
    pub fn validate_point<T: Real, const N: usize>(
        point: &SVector<T, N>,
        name: &str,
    ) -> Result<(), FitError> {
        if let Some((i, v)) = point.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(FitError::InvalidEvaluationPoint(format!(
                "{}[{}]={}",
                name,
                i,
                v.to_f64_lossy()
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Fit Parameters
    // ========================================================================

    /// Validate the bound on the number of passes of `compute`.
    pub fn validate_max_passes(max_passes: usize) -> Result<(), FitError> {
        if max_passes == 0 || max_passes > MAX_PASSES_LIMIT {
            return Err(FitError::InvalidMaxPasses {
                got: max_passes,
                max: MAX_PASSES_LIMIT,
            });
        }
        Ok(())
    }

    /// Validate that no builder parameter was set twice.
    pub fn validate_no_duplicates(duplicate_param: Option<&'static str>) -> Result<(), FitError> {
        if let Some(parameter) = duplicate_param {
            return Err(FitError::DuplicateParameter { parameter });
        }
        Ok(())
    }

    // ========================================================================
    // Neighbor Resolution
    // ========================================================================

    /// Validate that a neighbor identifier resolves into a sample slice.
    #[inline]
    pub fn validate_index(index: usize, len: usize) -> Result<(), FitError> {
        if index >= len {
            return Err(FitError::IndexOutOfBounds { index, len });
        }
        Ok(())
    }
}
