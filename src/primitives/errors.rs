//! Error types for fit configuration and neighbor resolution.
//!
//! ## Purpose
//!
//! This module defines [`FitError`], the single error type returned by the
//! fallible configuration entry points of the crate (builder validation,
//! weight-function construction, identifier-based neighbor resolution).
//!
//! ## Design notes
//!
//! * **Configuration only**: Numerical outcomes (instability, additional
//!   passes, slot conflicts) are reported through
//!   [`FitStatus`](crate::primitives::status::FitStatus), never as errors.
//! * **Compile-time composition**: An invalid component chain never reaches
//!   this type; it is rejected when the composite type is instantiated.
//! * **no_std**: `Display` is always available, `std::error::Error` only with
//!   the `std` feature.
//!
//! ## Non-goals
//!
//! * This module does not recover from errors or apply fallbacks.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(feature = "std")]
use std::string::String;

use core::fmt;

// ============================================================================
// FitError
// ============================================================================

/// Errors raised while configuring a fit or resolving its neighbors.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// The weighting scale is not strictly positive and finite.
    InvalidScale(f64),

    /// The evaluation point contains a non-finite coordinate.
    InvalidEvaluationPoint(String),

    /// The maximum number of passes is outside the accepted range.
    InvalidMaxPasses {
        /// Requested number of passes.
        got: usize,
        /// Largest accepted number of passes.
        max: usize,
    },

    /// A builder parameter was set more than once.
    DuplicateParameter {
        /// Name of the parameter.
        parameter: &'static str,
    },

    /// A fit was built without a weighting function.
    MissingWeightFunction,

    /// A neighbor identifier does not resolve to a sample.
    IndexOutOfBounds {
        /// Offending identifier.
        index: usize,
        /// Number of samples available.
        len: usize,
    },
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::InvalidScale(t) => {
                write!(f, "Invalid scale: {} (must be > 0 and finite)", t)
            }
            FitError::InvalidEvaluationPoint(msg) => {
                write!(f, "Invalid evaluation point: {}", msg)
            }
            FitError::InvalidMaxPasses { got, max } => {
                write!(f, "Invalid max_passes: {} (must be in [1, {}])", got, max)
            }
            FitError::DuplicateParameter { parameter } => {
                write!(f, "Parameter '{}' was set more than once", parameter)
            }
            FitError::MissingWeightFunction => {
                write!(f, "No weighting function: call .center() and .scale() before .build()")
            }
            FitError::IndexOutOfBounds { index, len } => {
                write!(f, "Neighbor index {} out of bounds for {} samples", index, len)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FitError {}
