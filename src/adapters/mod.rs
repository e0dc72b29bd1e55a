//! Layer 7: Adapters
//!
//! # Purpose
//!
//! This layer runs fits over whole query sets:
//! - Batch fitting, sequential or rayon-parallel
//!
//! # Architecture
//!
//! ```text
//! Layer 7: Adapters / API ← You are here
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
//! Layer 1: Primitives
//! ```

/// Batch fitting of many query points.
pub mod batch;
