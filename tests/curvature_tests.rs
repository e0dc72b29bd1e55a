//! Tests for the principal curvature estimators.
//!
//! ## Test Organization
//!
//! 1. **Sphere** - All estimators on a sphere of radius 2
//! 2. **Cylinder** - One curved and one flat direction
//! 3. **Scale Invariance** - Uniform scaling of the input
//! 4. **Degenerate** - Missing inputs

use approx::assert_relative_eq;
use nalgebra::Vector3;
use pointfit_rs::prelude::*;

type Point = PointPositionNormal<f64, 3>;

fn sphere_cap(radius: f64) -> Vec<Point> {
    let mut points = Vec::new();
    for i in 0..15 {
        for j in 0..30 {
            let theta = 0.02 + 0.9 * i as f64 / 14.0;
            let phi = std::f64::consts::TAU * j as f64 / 30.0;
            let n = Vector3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
            points.push(PointPositionNormal::new(n * radius, n));
        }
    }
    points
}

/// Cylinder of the given radius around the `y` axis, symmetric around the
/// top line `x = 0`.
fn cylinder_patch(radius: f64) -> Vec<Point> {
    let mut points = Vec::new();
    for i in -10..=10 {
        for j in -10..=10 {
            let angle = i as f64 * 0.05;
            let y = j as f64 * 0.05;
            let n = Vector3::new(angle.sin(), 0.0, angle.cos());
            let pos = Vector3::new(n.x * radius, y, n.z * radius);
            points.push(PointPositionNormal::new(pos, n));
        }
    }
    points
}

fn curvature_of<C: Accumulate<f64, 3, Point>>(points: &[Point], center: Vector3<f64>, scale: f64) -> Curvature<f64, 3> {
    let mut fit = FitBuilder::new().center(center).scale(scale).build::<C>().unwrap();
    assert_eq!(fit.compute(points), FitStatus::Stable);
    *fit.curvature().unwrap()
}

fn assert_umbilic(k: &Curvature<f64, 3>, expected: f64) {
    assert_relative_eq!(k.k_min, expected, epsilon = 1e-8);
    assert_relative_eq!(k.k_max, expected, epsilon = 1e-8);
    assert_relative_eq!(k.mean, expected, epsilon = 1e-8);
    assert_relative_eq!(k.gaussian, expected * expected, epsilon = 1e-8);
}

// ============================================================================
// Sphere Tests
// ============================================================================

/// Curvature from the Jacobian of the fitted sphere normal.
#[test]
fn test_normal_derivatives_curvature_sphere() {
    let points = sphere_cap(2.0);
    let k = curvature_of::<(OrientedSphereDer<f64, 3, SpaceDer>, NormalDerivativesCurvature)>(
        &points,
        Vector3::new(0.0, 0.0, 2.0),
        1.0,
    );
    assert_umbilic(&k, 0.5);

    // Principal directions are tangent and orthonormal.
    let n = Vector3::new(0.0, 0.0, 1.0);
    assert_relative_eq!(k.dir_min.dot(&n), 0.0, epsilon = 1e-10);
    assert_relative_eq!(k.dir_max.dot(&n), 0.0, epsilon = 1e-10);
    assert_relative_eq!(k.dir_min.dot(&k.dir_max), 0.0, epsilon = 1e-10);
    assert_relative_eq!(k.dir_max.norm(), 1.0, epsilon = 1e-10);
}

/// Curvature from the normal/position covariance.
#[test]
fn test_normal_covariance_curvature_sphere() {
    let points = sphere_cap(2.0);
    let k = curvature_of::<NormalCovarianceCurvature<f64, 3>>(&points, Vector3::new(0.0, 0.0, 2.0), 1.0);
    assert_umbilic(&k, 0.5);
}

/// Same, in the tangent frame of a fitted plane.
#[test]
fn test_projected_normal_covariance_curvature_sphere() {
    let points = sphere_cap(2.0);
    let k = curvature_of::<(CovariancePlaneFit<f64, 3>, ProjectedNormalCovarianceCurvature<f64, 3>)>(
        &points,
        Vector3::new(0.0, 0.0, 2.0),
        1.0,
    );
    assert_umbilic(&k, 0.5);
}

/// The estimators agree on the sign convention: inward normals give
/// negative curvature.
#[test]
fn test_curvature_sign_follows_normals() {
    let points: Vec<_> = sphere_cap(2.0)
        .into_iter()
        .map(|p| PointPositionNormal::new(p.pos, -p.normal))
        .collect();
    let center = Vector3::new(0.0, 0.0, 2.0);

    let k = curvature_of::<(OrientedSphereDer<f64, 3, SpaceDer>, NormalDerivativesCurvature)>(&points, center, 1.0);
    assert_umbilic(&k, -0.5);
    let k = curvature_of::<NormalCovarianceCurvature<f64, 3>>(&points, center, 1.0);
    assert_umbilic(&k, -0.5);
}

// ============================================================================
// Cylinder Tests
// ============================================================================

/// The normal covariance separates the curved and the flat direction.
#[test]
fn test_normal_covariance_curvature_cylinder() {
    let radius = 1.5;
    let points = cylinder_patch(radius);
    let k = curvature_of::<NormalCovarianceCurvature<f64, 3>>(&points, Vector3::new(0.0, 0.0, radius), 0.8);

    assert_relative_eq!(k.k_min, 0.0, epsilon = 1e-8);
    assert_relative_eq!(k.k_max, 1.0 / radius, epsilon = 1e-8);
    assert_relative_eq!(k.gaussian, 0.0, epsilon = 1e-8);
    assert_relative_eq!(k.mean, 0.5 / radius, epsilon = 1e-8);
    assert_relative_eq!(k.dir_max.x.abs(), 1.0, epsilon = 1e-8);
    assert_relative_eq!(k.dir_min.y.abs(), 1.0, epsilon = 1e-8);
}

// ============================================================================
// Scale Invariance Tests
// ============================================================================

/// Mean curvature of the radius-2 cap scaled by `lambda`, evaluated at the
/// scaled north pole with a scaled support.
fn scaled_mean_curvature<C: Accumulate<f64, 3, Point>>(lambda: f64) -> f64 {
    let points: Vec<_> = sphere_cap(2.0)
        .into_iter()
        .map(|p| PointPositionNormal::new(p.pos * lambda, p.normal))
        .collect();
    curvature_of::<C>(&points, Vector3::new(0.0, 0.0, 2.0 * lambda), lambda).mean
}

fn assert_curvature_scales<C: Accumulate<f64, 3, Point>>() {
    let reference = scaled_mean_curvature::<C>(1.0);
    for &lambda in &[0.01, 100.0] {
        let k = scaled_mean_curvature::<C>(lambda);
        assert_relative_eq!(k * lambda, reference, max_relative = 1e-6);
    }
}

/// Every estimator scales its curvature by `1/lambda` when positions and
/// support scale by `lambda`.
#[test]
fn test_curvature_scale_invariance() {
    assert_curvature_scales::<(OrientedSphereDer<f64, 3, SpaceDer>, NormalDerivativesCurvature)>();
    assert_curvature_scales::<(CovariancePlaneDer<f64, 3, SpaceDer>, NormalDerivativesCurvature)>();
    assert_curvature_scales::<NormalCovarianceCurvature<f64, 3>>();
    assert_curvature_scales::<(CovariancePlaneFit<f64, 3>, ProjectedNormalCovarianceCurvature<f64, 3>)>();

    // The sphere based estimators are exact at every scale.
    assert_relative_eq!(
        scaled_mean_curvature::<(OrientedSphereDer<f64, 3, SpaceDer>, NormalDerivativesCurvature)>(100.0) * 100.0,
        0.5,
        epsilon = 1e-8
    );
    assert_relative_eq!(
        scaled_mean_curvature::<NormalCovarianceCurvature<f64, 3>>(0.01) * 0.01,
        0.5,
        epsilon = 1e-8
    );
}

// ============================================================================
// Degenerate Tests
// ============================================================================

/// Too few oriented neighbors leave the curvature unpublished.
#[test]
fn test_normal_covariance_too_few_samples() {
    let points = sphere_cap(1.0);
    let mut fit = FitBuilder::new()
        .center(Vector3::new(0.0, 0.0, 1.0))
        .scale(1.0)
        .build::<NormalCovarianceCurvature<f64, 3>>()
        .unwrap();

    assert_eq!(fit.compute(&points[..2]), FitStatus::Unstable);
    assert!(fit.curvature().is_none());
}
