//! Sample accessor contracts.
//!
//! ## Purpose
//!
//! The engine never owns point data. It reads neighbors through the
//! [`Sample`] trait (position, optional normal) and, for techniques that
//! consume orientation, through [`OrientedSample`], which guarantees a normal.
//!
//! ## Design notes
//!
//! * **Static attribute checks**: components that need normals are only
//!   implemented for `S: OrientedSample`, so streaming position-only samples
//!   into them fails to compile.
//! * **Ready-made samples**: [`PointPosition`], [`PointPositionNormal`] and
//!   bare `SVector`s cover the common layouts; references forward to the
//!   referenced sample.

use nalgebra::SVector;

use crate::primitives::scalar::Real;

/// Read access to a neighbor position and, optionally, its normal.
pub trait Sample<T: Real, const N: usize> {
    /// Position of the sample.
    fn position(&self) -> SVector<T, N>;

    /// Normal of the sample, if it carries one.
    #[inline]
    fn try_normal(&self) -> Option<SVector<T, N>> {
        None
    }
}

/// A sample that always carries a normal.
pub trait OrientedSample<T: Real, const N: usize>: Sample<T, N> {
    /// Normal of the sample.
    fn normal(&self) -> SVector<T, N>;
}

impl<T: Real, const N: usize> Sample<T, N> for SVector<T, N> {
    #[inline]
    fn position(&self) -> SVector<T, N> {
        *self
    }
}

impl<T: Real, const N: usize, S: Sample<T, N> + ?Sized> Sample<T, N> for &S {
    #[inline]
    fn position(&self) -> SVector<T, N> {
        (**self).position()
    }

    #[inline]
    fn try_normal(&self) -> Option<SVector<T, N>> {
        (**self).try_normal()
    }
}

impl<T: Real, const N: usize, S: OrientedSample<T, N> + ?Sized> OrientedSample<T, N> for &S {
    #[inline]
    fn normal(&self) -> SVector<T, N> {
        (**self).normal()
    }
}

// ============================================================================
// Provided Samples
// ============================================================================

/// Position-only sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointPosition<T: Real, const N: usize> {
    /// Position.
    pub pos: SVector<T, N>,
}

impl<T: Real, const N: usize> PointPosition<T, N> {
    /// Create a position-only sample.
    #[inline]
    pub fn new(pos: SVector<T, N>) -> Self {
        Self { pos }
    }
}

impl<T: Real, const N: usize> Sample<T, N> for PointPosition<T, N> {
    #[inline]
    fn position(&self) -> SVector<T, N> {
        self.pos
    }
}

/// Sample with a position and a normal.
///
/// Whether the normal is oriented is a property of the data set; the
/// unoriented sphere fit ignores its sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointPositionNormal<T: Real, const N: usize> {
    /// Position.
    pub pos: SVector<T, N>,
    /// Normal (unit length expected).
    pub normal: SVector<T, N>,
}

impl<T: Real, const N: usize> PointPositionNormal<T, N> {
    /// Create an oriented sample.
    #[inline]
    pub fn new(pos: SVector<T, N>, normal: SVector<T, N>) -> Self {
        Self { pos, normal }
    }
}

impl<T: Real, const N: usize> Sample<T, N> for PointPositionNormal<T, N> {
    #[inline]
    fn position(&self) -> SVector<T, N> {
        self.pos
    }

    #[inline]
    fn try_normal(&self) -> Option<SVector<T, N>> {
        Some(self.normal)
    }
}

impl<T: Real, const N: usize> OrientedSample<T, N> for PointPositionNormal<T, N> {
    #[inline]
    fn normal(&self) -> SVector<T, N> {
        self.normal
    }
}
