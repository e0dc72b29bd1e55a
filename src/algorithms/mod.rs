//! Layer 3: Algorithms
//!
//! # Purpose
//!
//! This layer provides the primitive fit components:
//! - Weighted mean position and mean normal
//! - Plane fits (covariance, mean normal) and the line fit
//! - Algebraic sphere fits (oriented, unoriented, Pratt)
//! - The two-pass Monge patch
//! - Growing Least Squares descriptors
//!
//! Every component reads the shared sums of the fit state and publishes its
//! primitive in global coordinates.
//!
//! # Architecture
//!
//! ```text
//! Layer 7: Adapters / API
//!   ↓
//! Layer 6: Engine
//!   ↓
//! Layer 5: Curvature
//!   ↓
//! Layer 4: Derivatives
//!   ↓
//! Layer 3: Algorithms ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Growing Least Squares descriptors.
pub mod gls;

/// Line primitive and fit.
pub mod line;

/// Mean position and mean normal.
pub mod mean;

/// Monge patch primitive and fit.
pub mod monge;

/// Plane primitive and fits.
pub mod plane;

/// Algebraic sphere primitive and fits.
pub mod sphere;
