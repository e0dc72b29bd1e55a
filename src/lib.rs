//! # pointfit: Composable local fitting on point clouds
//!
//! Weighted least-squares fitting of planes, lines, algebraic spheres and
//! height-field patches on point-cloud neighborhoods, with derivatives,
//! Growing Least Squares descriptors and curvature estimators.
//!
//! ## What is a local fit?
//!
//! Given an evaluation point `p` and a scale `t`, every neighbor `x` is
//! weighted by `w = k(|x - p| / t)` for a compactly supported kernel `k`. The
//! weighted sums of positions (and normals, when available) are accumulated
//! in a frame centered at `p`, and a primitive is fitted to them in closed
//! form or by a small eigen/least-squares solve.
//!
//! **Typical uses:**
//! - Normal estimation and denoising by projection
//! - Curvature estimation on point clouds and mesh vertices
//! - Multi-scale shape analysis with GLS descriptors
//!
//! **How a fit runs:**
//!
//! 1. `init` with a weighting function
//! 2. `add_neighbor` for every candidate sample (zero-weight samples are
//!    ignored)
//! 3. `finalize`, which reports a [`FitStatus`](prelude::FitStatus)
//! 4. On `NeedAnotherPass`, `start_new_pass` and stream the neighbors again
//!
//! ## Composition
//!
//! A fit is a chain of components given as a tuple type. Each component
//! declares the quantities it provides and requires; a chain with an unmet
//! requirement does not compile, and components are finalized providers
//! first whatever their position in the tuple.
//!
//! ## Quick Start
//!
//! ```rust
//! use pointfit_rs::prelude::*;
//! use nalgebra::Vector3;
//!
//! // Samples on the unit sphere with outward normals.
//! let mut points = Vec::new();
//! for i in 0..20 {
//!     for j in 0..40 {
//!         let theta = 0.05 + 1.2 * i as f64 / 19.0;
//!         let phi = std::f64::consts::TAU * j as f64 / 40.0;
//!         let n = Vector3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
//!         points.push(PointPositionNormal::new(n, n));
//!     }
//! }
//!
//! // Sphere fit and GLS descriptors around the north pole.
//! let mut fit = FitBuilder::new()
//!     .center(Vector3::new(0.0, 0.0, 1.0))
//!     .scale(1.0)
//!     .build::<(OrientedSphereFit<f64, 3>, GlsParam)>()?;
//!
//! let status = fit.compute(&points);
//! assert!(status.is_stable());
//!
//! let radius = fit.sphere().and_then(|s| s.radius()).unwrap();
//! assert!((radius - 1.0).abs() < 1e-6);
//! # Result::<(), FitError>::Ok(())
//! ```
//!
//! A chain whose requirements are not met is rejected by the compiler: see
//! [`Fit`](prelude::Fit).
//!
//! ## Derivatives and curvature
//!
//! ```rust
//! use pointfit_rs::prelude::*;
//! use nalgebra::Vector3;
//!
//! # let mut points = Vec::new();
//! # for i in 0..20 {
//! #     for j in 0..40 {
//! #         let theta = 0.05 + 1.2 * i as f64 / 19.0;
//! #         let phi = std::f64::consts::TAU * j as f64 / 40.0;
//! #         let n = Vector3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
//! #         points.push(PointPositionNormal::new(n, n));
//! #     }
//! # }
//! type Chain = (OrientedSphereDer<f64, 3, SpaceDer>, NormalDerivativesCurvature);
//!
//! let mut fit = FitBuilder::new()
//!     .center(Vector3::new(0.0, 0.0, 1.0))
//!     .scale(1.0)
//!     .build::<Chain>()?;
//! fit.compute(&points);
//!
//! let k = fit.curvature().unwrap();
//! assert!((k.mean - 1.0).abs() < 1e-6);
//! # Result::<(), FitError>::Ok(())
//! ```
//!
//! ## Feature flags
//!
//! - `std` (default): standard library support; without it the crate is
//!   `no_std` + `alloc`.
//! - `parallel`: rayon-parallel batch fitting.
//! - `dev`: exposes the internal layers under `internals`.
//!
//! ## References
//!
//! - Guennebaud, G. & Gross, M. (2007). "Algebraic Point Set Surfaces"
//! - Mellado, N., Guennebaud, G., Barla, P., Reuter, P. & Schlick, C. (2012). "Growing Least Squares for the Analysis of Manifolds in Scale-Space"
//! - Pratt, V. (1987). "Direct Least-Squares Fitting of Algebraic Surfaces"
//!
//! ## License
//!
//! See the repository for license information and contribution guidelines.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

#[cfg(not(feature = "std"))]
#[macro_use]
extern crate alloc;

// ============================================================================
// Internal Modules
// ============================================================================

// Layer 1: Primitives - vocabulary types.
//
// Contains the scalar abstraction, errors, fit statuses, capability tags and
// their const composition checks, sample contracts and output slots.
mod primitives;

// Layer 2: Math - pure mathematical functions.
//
// Contains kernel functions, the distance weighting function and the
// nalgebra linear algebra backend.
mod math;

// Layer 3: Algorithms - primitive fits.
//
// Contains mean, plane, line, algebraic sphere and Monge patch fits, and the
// GLS descriptors.
mod algorithms;

// Layer 4: Derivatives - scale and space derivatives of the fits.
mod derivatives;

// Layer 5: Curvature - principal curvature estimators.
mod curvature;

// Layer 6: Engine - fitting protocol.
//
// Contains the component contract, the shared fit state and the multi-pass
// `Fit` driver.
mod engine;

// Layer 7: Adapters - execution over query sets.
mod adapters;

// High-level fluent API.
//
// Provides the `FitBuilder` for configuring a fit.
mod api;

// ============================================================================
// Prelude
// ============================================================================

/// Standard prelude.
///
/// This module is intended to be wildcard-imported for convenient access
/// to the most commonly used types:
///
/// ```
/// use pointfit_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::{
        BatchFitter, DistWeightFunc, Fit, FitBuilder, FitError, FitStatus, WeightKernel,
    };

    // Components
    pub use crate::algorithms::gls::{GlsParam, GlsParameters};
    pub use crate::algorithms::line::{CovarianceLineFit, Line};
    pub use crate::algorithms::mean::{MeanNormal, MeanPosition};
    pub use crate::algorithms::monge::{MongeFit, MongeFrame, MongePatch};
    pub use crate::algorithms::plane::{CovariancePlaneFit, MeanPlaneFit, Plane};
    pub use crate::algorithms::sphere::{AlgebraicSphere, OrientedSphereFit, SphereFit, UnorientedSphereFit};
    pub use crate::curvature::{
        Curvature, NormalCovarianceCurvature, NormalDerivativesCurvature, ProjectedNormalCovarianceCurvature,
    };
    pub use crate::derivatives::{
        CovariancePlaneDer, GlsDer, GlsDerivatives, NormalDerivative, OrientedSphereDer, PlaneDerivatives,
        SphereDerivatives,
    };

    // Extension points
    pub use crate::engine::component::{Accumulate, Component, Neighbor};
    pub use crate::engine::state::{publish, FitState};
    pub use crate::primitives::capabilities::Capabilities;
    pub use crate::primitives::derivative::{
        DerivativeType, ScalarDerivative, ScaleDer, ScaleSpaceDer, SpaceDer, VectorDerivative,
    };
    pub use crate::primitives::sample::{OrientedSample, PointPosition, PointPositionNormal, Sample};
    pub use crate::primitives::scalar::Real;
}

// ============================================================================
// Testing re-exports
// ============================================================================

/// Internal modules for development and testing.
///
/// This module re-exports internal modules for development and testing purposes.
/// It is only available with the `dev` feature enabled.
///
/// **Warning**: These are internal implementation details and may change without notice.
/// Do not use in production code.
#[cfg(feature = "dev")]
pub mod internals {
    /// Internal primitive types and utilities.
    pub mod primitives {
        pub use crate::primitives::*;
    }
    /// Internal math functions.
    pub mod math {
        pub use crate::math::*;
    }
    /// Internal primitive fits.
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    /// Internal derivative components.
    pub mod derivatives {
        pub use crate::derivatives::*;
    }
    /// Internal curvature estimators.
    pub mod curvature {
        pub use crate::curvature::*;
    }
    /// Internal fitting engine.
    pub mod engine {
        pub use crate::engine::*;
    }
    /// Internal adapters.
    pub mod adapters {
        pub use crate::adapters::*;
    }
    /// Internal API.
    pub mod api {
        pub use crate::api::*;
    }
}
