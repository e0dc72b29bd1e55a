//! Linear algebra backend for the fitting algorithms.
//!
//! ## Purpose
//!
//! This module wraps the nalgebra decompositions the fits rely on: sorted
//! symmetric eigendecompositions, the generalized symmetric eigenproblem,
//! the Pratt-constrained algebraic fit, normal-equation solves and tangent
//! frames.
//!
//! ## Design notes
//!
//! * Small fixed-size matrices are converted to `DMatrix` before decomposing,
//!   so the same code serves every ambient dimension `N`.
//! * Eigenpairs are always returned sorted by ascending eigenvalue.
//! * Normal equations use QR first and fall back to SVD for rank-deficient
//!   systems.
//! * Generic over [`Real`]; tolerances come from
//!   [`Real::SPECTRAL_TOLERANCE`].

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::cmp::Ordering::Equal;
use nalgebra::{DMatrix, DVector, SMatrix, SVector};

// Internal dependencies
use crate::primitives::scalar::Real;

// ============================================================================
// Conversions
// ============================================================================

/// Copy a fixed-size matrix into a dynamically sized one.
#[inline]
pub fn to_dynamic<T: Real, const R: usize, const C: usize>(m: &SMatrix<T, R, C>) -> DMatrix<T> {
    DMatrix::from_fn(R, C, |i, j| m[(i, j)])
}

/// Extract column `j` of a dynamic matrix with `N` rows.
#[inline]
pub fn column<T: Real, const N: usize>(m: &DMatrix<T>, j: usize) -> SVector<T, N> {
    SVector::from_fn(|i, _| m[(i, j)])
}

// ============================================================================
// Symmetric Eigendecomposition
// ============================================================================

/// Eigenpairs sorted by ascending eigenvalue.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedEigen<T: Real> {
    /// Eigenvalues, ascending.
    pub values: Vec<T>,
    /// Eigenvectors stored column-wise, in the order of `values`.
    pub vectors: DMatrix<T>,
}

impl<T: Real> SortedEigen<T> {
    /// Smallest eigenvalue.
    #[inline]
    pub fn min_value(&self) -> T {
        self.values[0]
    }

    /// Largest eigenvalue.
    #[inline]
    pub fn max_value(&self) -> T {
        self.values[self.values.len() - 1]
    }

    /// Eigenvector `i` as a fixed-size vector.
    #[inline]
    pub fn vector<const N: usize>(&self, i: usize) -> SVector<T, N> {
        column(&self.vectors, i)
    }
}

/// Sort eigenpairs by ascending eigenvalue.
fn sort_pairs<T: Real>(values: &DVector<T>, vectors: &DMatrix<T>) -> SortedEigen<T> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Equal));

    let sorted_values = order.iter().map(|&i| values[i]).collect();
    let sorted_vectors = DMatrix::from_fn(vectors.nrows(), n, |r, c| vectors[(r, order[c])]);
    SortedEigen {
        values: sorted_values,
        vectors: sorted_vectors,
    }
}

/// Eigendecomposition of a symmetric matrix.
pub fn symmetric_eigen<T: Real>(m: DMatrix<T>) -> SortedEigen<T> {
    let eig = m.symmetric_eigen();
    sort_pairs(&eig.eigenvalues, &eig.eigenvectors)
}

/// Generalized symmetric eigenproblem `A u = λ B u` with `B` positive definite.
///
/// Eigenvectors are `B`-orthonormal (`uᵀ B u = 1`). Returns `None` when `B`
/// is not numerically positive definite.
pub fn generalized_symmetric_eigen<T: Real>(a: &DMatrix<T>, b: &DMatrix<T>) -> Option<SortedEigen<T>> {
    let n = b.nrows();
    let chol = b.clone().cholesky()?;
    let l_inv = chol.l().solve_lower_triangular(&DMatrix::identity(n, n))?;

    let mut reduced = &l_inv * a * l_inv.transpose();
    // Symmetrize against rounding before the symmetric solver.
    reduced = (&reduced + reduced.transpose()) * T::lit(0.5);

    let eig = symmetric_eigen(reduced);
    let vectors = l_inv.transpose() * eig.vectors;
    Some(SortedEigen {
        values: eig.values,
        vectors,
    })
}

// ============================================================================
// Pratt-Constrained Algebraic Fit
// ============================================================================

/// Minimize `uᵀ A u` subject to `uᵀ C u = 1` for a positive semi-definite
/// moment matrix `A` and an indefinite constraint `C` (inverse `c_inv`).
///
/// The problem `A u = η C u` is made symmetric through the square root
/// `Y = A^{1/2}`: the eigenvectors `y` of `Y C⁻¹ Y` map back to `u = Y⁻¹ y`,
/// and the smallest positive `η` is the constrained minimum. When `A` has a
/// single vanishing eigenvalue the data is interpolated exactly and the
/// corresponding eigenvector is the solution.
///
/// Returns `None` when `A` has more than one vanishing eigenvalue (the fit is
/// underdetermined) or no admissible solution exists.
pub fn pratt_constrained_min<T: Real>(
    a: &DMatrix<T>,
    c: &DMatrix<T>,
    c_inv: &DMatrix<T>,
) -> Option<DVector<T>> {
    let n = a.nrows();
    let eig = symmetric_eigen(a.clone());
    let lambda_max = eig.max_value();
    if lambda_max <= T::zero() {
        return None;
    }

    let tol = T::spectral_tolerance() * lambda_max;
    let null_count = eig.values.iter().filter(|&&v| v <= tol).count();

    let u = match null_count {
        0 => {
            let sqrt_vals: Vec<T> = eig.values.iter().map(|&v| v.sqrt()).collect();
            let y = DMatrix::from_fn(n, n, |i, j| {
                (0..n).fold(T::zero(), |acc, k| {
                    acc + eig.vectors[(i, k)] * sqrt_vals[k] * eig.vectors[(j, k)]
                })
            });
            let y_inv = DMatrix::from_fn(n, n, |i, j| {
                (0..n).fold(T::zero(), |acc, k| {
                    acc + eig.vectors[(i, k)] * eig.vectors[(j, k)] / sqrt_vals[k]
                })
            });

            let mut m = &y * c_inv * &y;
            m = (&m + m.transpose()) * T::lit(0.5);
            let reduced = symmetric_eigen(m);
            let scale = reduced
                .values
                .iter()
                .fold(T::zero(), |acc, &v| acc.max(v.abs()));
            let floor = T::spectral_tolerance() * scale;
            let idx = reduced.values.iter().position(|&v| v > floor)?;
            &y_inv * reduced.vectors.column(idx)
        }
        1 => eig.vectors.column(0).into_owned(),
        _ => return None,
    };

    let norm2 = (u.transpose() * c * &u)[(0, 0)];
    if norm2 <= T::zero() {
        return None;
    }
    Some(u / norm2.sqrt())
}

// ============================================================================
// Normal Equations
// ============================================================================

/// Solve the normal equations `XᵀWX β = XᵀWy`.
///
/// Uses QR decomposition and falls back to SVD when QR fails.
pub fn solve_normal<T: Real>(xtwx: &DMatrix<T>, xtwy: &DVector<T>) -> Option<DVector<T>> {
    if let Some(solution) = xtwx.clone().qr().solve(xtwy) {
        return Some(solution);
    }

    xtwx.clone()
        .svd(true, true)
        .solve(xtwy, T::machine_epsilon() * T::lit(100.0))
        .ok()
}

// ============================================================================
// Tangent Frames
// ============================================================================

/// Orthonormal basis of the hyperplane orthogonal to a unit vector.
///
/// Built from the Householder reflection exchanging `normal` with the
/// coordinate axis it is most aligned with; the result is an `N × (N - 1)`
/// matrix whose columns span the tangent space.
pub fn tangent_basis<T: Real, const N: usize>(normal: &SVector<T, N>) -> DMatrix<T> {
    let k = normal.iamax();
    let sign = if normal[k] >= T::zero() {
        T::one()
    } else {
        -T::one()
    };

    let mut v = *normal;
    v[k] += sign;
    let vv = v.norm_squared();
    let two = T::lit(2.0);

    DMatrix::from_fn(N, N - 1, |i, c| {
        let j = if c < k { c } else { c + 1 };
        let delta = if i == j { T::one() } else { T::zero() };
        delta - two * v[i] * v[j] / vv
    })
}

/// Express a fixed-size linear map in a tangent basis: `Bᵀ M B`.
pub fn project_onto_basis<T: Real, const N: usize>(m: &SMatrix<T, N, N>, basis: &DMatrix<T>) -> DMatrix<T> {
    basis.transpose() * to_dynamic(m) * basis
}
