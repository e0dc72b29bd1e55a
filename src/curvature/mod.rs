//! Layer 5: Curvature
//!
//! # Purpose
//!
//! This layer estimates principal curvatures and directions from the
//! outputs of the lower layers. Three interchangeable estimators publish the
//! same [`Curvature`] output:
//! - [`NormalDerivativesCurvature`]: from the Jacobian of the primitive normal
//! - [`NormalCovarianceCurvature`]: from the regression of normals on
//!   positions in the mean-normal tangent frame
//! - [`ProjectedNormalCovarianceCurvature`]: the same regression in the
//!   tangent frame of a fitted plane
//!
//! # Key concepts
//!
//! * **Shape operator**: the derivative of the unit normal restricted to the
//!   tangent space. It is expressed in an orthonormal tangent basis built by
//!   a Householder reflection, so the same code serves every dimension.
//! * **Sign**: with outward normals a sphere of radius `r` has `k = +1/r`.
//!
//! # Architecture
//!
//! ```text
//! Layer 7: Adapters / API
//!   ↓
//! Layer 6: Engine
//!   ↓
//! Layer 5: Curvature ← You are here
//!   ↓
//! Layer 4: Derivatives
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

use nalgebra::{DMatrix, SMatrix, SVector};

use crate::math::linalg;
use crate::primitives::scalar::Real;

/// Regression of normals on positions.
pub mod normal_covariance;

/// Curvature from the normal Jacobian.
pub mod normal_derivatives;

pub use normal_covariance::{NormalCovarianceCurvature, ProjectedNormalCovarianceCurvature};
pub use normal_derivatives::NormalDerivativesCurvature;

/// Principal curvatures, principal directions, mean and Gaussian curvature.
///
/// In dimension `N` there are `N - 1` principal curvatures; `k_min` and
/// `k_max` are the extreme ones, `mean` their average and `gaussian` their
/// product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curvature<T: Real, const N: usize> {
    /// Smallest principal curvature.
    pub k_min: T,
    /// Largest principal curvature.
    pub k_max: T,
    /// Unit direction of `k_min`.
    pub dir_min: SVector<T, N>,
    /// Unit direction of `k_max`.
    pub dir_max: SVector<T, N>,
    /// Mean curvature.
    pub mean: T,
    /// Gaussian curvature.
    pub gaussian: T,
}

impl<T: Real, const N: usize> Curvature<T, N> {
    /// Curvatures from a shape operator expressed in a tangent basis.
    ///
    /// `shape` is `(N-1)×(N-1)`, `basis` is `N×(N-1)` with orthonormal
    /// columns. The shape operator is symmetrized before decomposing.
    pub fn from_tangent_shape(shape: &DMatrix<T>, basis: &DMatrix<T>) -> Option<Self> {
        let dim = shape.nrows();
        if dim == 0 || shape.ncols() != dim || basis.ncols() != dim || basis.nrows() != N {
            return None;
        }
        if shape.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let sym = (shape + shape.transpose()) * T::lit(0.5);
        let eig = linalg::symmetric_eigen(sym);
        let directions = basis * &eig.vectors;

        let count = T::lit(dim as f64);
        let mean = eig.values.iter().fold(T::zero(), |acc, &k| acc + k) / count;
        let gaussian = eig.values.iter().fold(T::one(), |acc, &k| acc * k);

        Some(Self {
            k_min: eig.min_value(),
            k_max: eig.max_value(),
            dir_min: linalg::column(&directions, 0),
            dir_max: linalg::column(&directions, dim - 1),
            mean,
            gaussian,
        })
    }

    /// Curvatures from the full normal Jacobian `∂n/∂p` at a point with unit
    /// normal `normal`.
    pub fn from_shape_operator(jacobian: &SMatrix<T, N, N>, normal: &SVector<T, N>) -> Option<Self> {
        let basis = linalg::tangent_basis(normal);
        let shape = linalg::project_onto_basis(jacobian, &basis);
        Self::from_tangent_shape(&shape, &basis)
    }
}
