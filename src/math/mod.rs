//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides the mathematical building blocks the fits are made of:
//! - Kernel functions for distance-based weighting
//! - The weighting function and the local coordinate frame
//! - The nalgebra linear-algebra backend (eigen, QR/SVD, tangent frames)
//!
//! These are reusable mathematical building blocks with no fit-specific logic.
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
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Kernel (weight) functions for distance-based weighting.
pub mod kernel;

/// Linear algebra backend.
pub mod linalg;

/// Distance-based weighting function.
pub mod weight;
