//! Layer 6: Engine
//!
//! # Purpose
//!
//! This layer drives the fitting protocol:
//! - The component contract and its tuple composition
//! - The shared fit state and its output slots
//! - The [`Fit`](fit::Fit) object: init, neighbor accumulation, finalize and
//!   the multi-pass loop
//! - Parameter validation
//!
//! # Architecture
//!
//! ```text
//! Layer 7: Adapters / API
//!   ↓
//! Layer 6: Engine ← You are here
//!   ↓
//! Layer 5: Curvature
//!   ↓
//! Layer 4: Derivatives
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Component contract and tuple composition.
pub mod component;

/// Fit object and multi-pass driver.
pub mod fit;

/// Accumulated sums and output slots.
pub mod state;

/// Parameter validation.
pub mod validator;
