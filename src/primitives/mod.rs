//! Layer 1: Primitives
//!
//! # Purpose
//!
//! This layer provides the vocabulary shared by every other layer:
//! - The scalar abstraction (`Real`)
//! - Errors and fit statuses
//! - Capability tags and the const composition helpers
//! - Sample accessor contracts
//! - Derivative markers and containers
//! - Output slots
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
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Output slots.
pub mod buffer;

/// Capability tags and composition checks.
pub mod capabilities;

/// Derivative markers and containers.
pub mod derivative;

/// Error types.
pub mod errors;

/// Sample accessor contracts.
pub mod sample;

/// Scalar abstraction.
pub mod scalar;

/// Fit status.
pub mod status;
