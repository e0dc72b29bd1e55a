//! Algebraic sphere primitive and its fits.
//!
//! ## Purpose
//!
//! An algebraic sphere is the zero set of the scalar field
//! `f(x) = uc + ul·q + uq |q|²` with `q = x - basis_center`. It describes a
//! sphere when `uq ≠ 0` and degenerates continuously to a plane as
//! `uq → 0`, which makes it a robust local surface model.
//!
//! Three fits are provided:
//!
//! * [`OrientedSphereFit`]: closed form from positions and oriented normals.
//! * [`UnorientedSphereFit`]: generalized eigenproblem, normals up to sign.
//! * [`SphereFit`]: positions only, under the Pratt normalization.
//!
//! ## Key concepts
//!
//! * **Pratt norm**: `|ul|² - 4 uc uq`; with a unit Pratt norm the field
//!   approximates the signed distance near the surface.
//! * **Basis center**: fits are expressed around the evaluation center.
//!
//! ## Invariants
//!
//! * Published spheres are Pratt-normalized.
//!
//! ## Non-goals
//!
//! * Higher-order algebraic surfaces.

use nalgebra::SVector;

use crate::primitives::scalar::Real;

/// Closed-form oriented fit.
pub mod oriented;

/// Pratt-normalized fit from positions only.
pub mod pratt;

/// Generalized-eigenproblem fit for unoriented normals.
pub mod unoriented;

pub use oriented::OrientedSphereFit;
pub use pratt::SphereFit;
pub use unoriented::UnorientedSphereFit;

// ============================================================================
// Algebraic Sphere
// ============================================================================

/// Scalar field `uc + ul·q + uq |q|²`, `q = x - basis_center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlgebraicSphere<T: Real, const N: usize> {
    /// Constant coefficient.
    pub uc: T,
    /// Linear coefficients.
    pub ul: SVector<T, N>,
    /// Quadratic coefficient.
    pub uq: T,
    /// Origin of the local coordinates the coefficients refer to.
    pub basis_center: SVector<T, N>,
}

impl<T: Real, const N: usize> AlgebraicSphere<T, N> {
    /// Create a sphere from its coefficients.
    pub fn new(uc: T, ul: SVector<T, N>, uq: T, basis_center: SVector<T, N>) -> Self {
        Self {
            uc,
            ul,
            uq,
            basis_center,
        }
    }

    /// Field of the geometric sphere of `center` and `radius`, expressed
    /// around `basis_center`, with unit Pratt norm and outward gradient.
    pub fn from_center_radius(center: &SVector<T, N>, radius: T, basis_center: SVector<T, N>) -> Self {
        let c = center - basis_center;
        let half = T::lit(0.5) / radius;
        Self {
            uc: (c.norm_squared() - radius * radius) * half,
            ul: c * (-T::lit(2.0) * half),
            uq: half,
            basis_center,
        }
    }

    /// Squared Pratt norm `|ul|² - 4 uc uq`.
    #[inline]
    pub fn pratt_norm_squared(&self) -> T {
        self.ul.norm_squared() - T::lit(4.0) * self.uc * self.uq
    }

    /// Pratt norm, zero for degenerate (imaginary) fields.
    #[inline]
    pub fn pratt_norm(&self) -> T {
        self.pratt_norm_squared().max(T::zero()).sqrt()
    }

    /// Same zero set with a unit Pratt norm; `None` when the norm vanishes.
    pub fn normalized(&self) -> Option<Self> {
        let norm = self.pratt_norm();
        if norm <= T::machine_epsilon() {
            return None;
        }
        Some(Self {
            uc: self.uc / norm,
            ul: self.ul / norm,
            uq: self.uq / norm,
            basis_center: self.basis_center,
        })
    }

    /// Whether the field is (numerically) linear.
    #[inline]
    pub fn is_plane(&self) -> bool {
        self.uq.abs() <= T::spectral_tolerance() * self.ul.norm()
    }

    /// Express `x` in the local coordinates of the field.
    #[inline]
    fn local(&self, x: &SVector<T, N>) -> SVector<T, N> {
        x - self.basis_center
    }

    /// Field value at `x`.
    #[inline]
    pub fn potential(&self, x: &SVector<T, N>) -> T {
        let q = self.local(x);
        self.uc + self.ul.dot(&q) + self.uq * q.norm_squared()
    }

    /// Field gradient at `x`.
    #[inline]
    pub fn gradient(&self, x: &SVector<T, N>) -> SVector<T, N> {
        self.ul + self.local(x) * (T::lit(2.0) * self.uq)
    }

    /// Unit field gradient at `x` (the surface normal on the zero set).
    pub fn normal(&self, x: &SVector<T, N>) -> SVector<T, N> {
        self.gradient(x).normalize()
    }

    /// Sphere center; `None` for a plane.
    pub fn center(&self) -> Option<SVector<T, N>> {
        if self.is_plane() {
            return None;
        }
        Some(self.basis_center - self.ul / (T::lit(2.0) * self.uq))
    }

    /// Sphere radius; `None` for a plane or an imaginary sphere.
    pub fn radius(&self) -> Option<T> {
        if self.is_plane() {
            return None;
        }
        let c = self.ul / (-T::lit(2.0) * self.uq);
        let r2 = c.norm_squared() - self.uc / self.uq;
        (r2 >= T::zero()).then(|| r2.sqrt())
    }

    /// Signed curvature `2 uq / pratt`: `+1/r` when the gradient points
    /// outward.
    pub fn curvature(&self) -> T {
        let norm = self.pratt_norm();
        if norm <= T::machine_epsilon() {
            return T::zero();
        }
        T::lit(2.0) * self.uq / norm
    }

    /// Project `x` onto the zero set.
    ///
    /// Exact for real spheres and planes; an imaginary sphere falls back to a
    /// single Newton step along the gradient.
    pub fn project(&self, x: &SVector<T, N>) -> SVector<T, N> {
        if let (Some(center), Some(radius)) = (self.center(), self.radius()) {
            let dir = x - center;
            let d = dir.norm();
            if d > T::zero() {
                return center + dir * (radius / d);
            }
        }
        let g = self.gradient(x);
        let g2 = g.norm_squared();
        if g2 <= T::zero() {
            return *x;
        }
        x - g * (self.potential(x) / g2)
    }
}
