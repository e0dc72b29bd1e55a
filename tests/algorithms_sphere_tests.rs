//! Tests for the algebraic sphere fits.
//!
//! ## Test Organization
//!
//! 1. **Primitive** - Field, center, radius, projection
//! 2. **Oriented Fit** - Closed form with normals
//! 3. **Unoriented Fit** - Normals known up to sign
//! 4. **Pratt Fit** - Positions only
//! 5. **Noisy Data** - Least-squares fits away from interpolation
//! 6. **Two Dimensions** - Circle fits
//! 7. **Scale Invariance** - Uniform scaling of the input

use approx::assert_relative_eq;
use nalgebra::{Vector2, Vector3};
use pointfit_rs::prelude::*;
use rand::prelude::*;

/// Samples on a sphere cap around `+z`, outward normals.
fn sphere_cap(center: Vector3<f64>, radius: f64) -> Vec<PointPositionNormal<f64, 3>> {
    let mut points = Vec::new();
    for i in 0..15 {
        for j in 0..30 {
            let theta = 0.02 + 0.9 * i as f64 / 14.0;
            let phi = std::f64::consts::TAU * j as f64 / 30.0;
            let n = Vector3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
            points.push(PointPositionNormal::new(center + n * radius, n));
        }
    }
    points
}

/// Same cap with seeded radial noise of relative amplitude `noise`; normals
/// stay exact.
fn noisy_sphere_cap(center: Vector3<f64>, radius: f64, noise: f64, seed: u64) -> Vec<PointPositionNormal<f64, 3>> {
    let mut rng = StdRng::seed_from_u64(seed);
    sphere_cap(center, radius)
        .into_iter()
        .map(|p| {
            let r = radius * (1.0 + rng.random_range(-noise..noise));
            PointPositionNormal::new(center + p.normal * r, p.normal)
        })
        .collect()
}

fn north_pole_fit<C: Component<f64, 3>>(center: Vector3<f64>, radius: f64, scale: f64) -> Fit<f64, 3, C> {
    FitBuilder::new()
        .center(center + Vector3::new(0.0, 0.0, radius))
        .scale(scale)
        .build::<C>()
        .unwrap()
}

// ============================================================================
// Primitive Tests
// ============================================================================

/// A sphere built from center and radius reports them back.
#[test]
fn test_algebraic_sphere_from_center_radius() {
    let center = Vector3::new(1.0, -2.0, 0.5);
    let sphere = AlgebraicSphere::from_center_radius(&center, 3.0, Vector3::new(0.5, 0.5, 0.5));

    assert_relative_eq!(sphere.pratt_norm(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(sphere.center().unwrap(), center, epsilon = 1e-12);
    assert_relative_eq!(sphere.radius().unwrap(), 3.0, epsilon = 1e-12);
    assert_relative_eq!(sphere.curvature(), 1.0 / 3.0, epsilon = 1e-12);

    let on_surface = center + Vector3::new(0.0, 3.0, 0.0);
    assert_relative_eq!(sphere.potential(&on_surface), 0.0, epsilon = 1e-12);
    assert_relative_eq!(sphere.normal(&on_surface), Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    // Unit Pratt norm makes the field a signed distance near the surface.
    let outside = center + Vector3::new(0.0, 3.001, 0.0);
    assert_relative_eq!(sphere.potential(&outside), 0.001, epsilon = 1e-6);
}

/// Projection maps to the closest point of the sphere.
#[test]
fn test_algebraic_sphere_project() {
    let center = Vector3::new(0.0, 0.0, 0.0);
    let sphere = AlgebraicSphere::from_center_radius(&center, 2.0, Vector3::new(0.0, 0.0, 2.0));

    let projected = sphere.project(&Vector3::new(1.0, 1.0, 1.0));
    let expected = Vector3::new(1.0, 1.0, 1.0).normalize() * 2.0;
    assert_relative_eq!(projected, expected, epsilon = 1e-12);
}

/// A linear field behaves as a plane.
#[test]
fn test_algebraic_sphere_plane_limit() {
    let sphere = AlgebraicSphere::new(-1.0, Vector3::new(0.0, 0.0, 1.0), 0.0, Vector3::zeros());

    assert!(sphere.is_plane());
    assert!(sphere.center().is_none());
    assert!(sphere.radius().is_none());
    assert_relative_eq!(sphere.curvature(), 0.0);
    let projected = sphere.project(&Vector3::new(0.3, 0.4, 2.5));
    assert_relative_eq!(projected, Vector3::new(0.3, 0.4, 1.0), epsilon = 1e-12);
}

// ============================================================================
// Oriented Fit Tests
// ============================================================================

/// Exact sphere samples with normals give back the sphere.
#[test]
fn test_oriented_sphere_exact() {
    let center = Vector3::new(0.3, -0.2, 0.1);
    let points = sphere_cap(center, 2.0);
    let mut fit = north_pole_fit::<OrientedSphereFit<f64, 3>>(center, 2.0, 1.5);

    assert_eq!(fit.compute(&points), FitStatus::Stable);
    let sphere = fit.sphere().unwrap();
    assert_relative_eq!(sphere.center().unwrap(), center, epsilon = 1e-8);
    assert_relative_eq!(sphere.radius().unwrap(), 2.0, epsilon = 1e-8);
    assert_relative_eq!(sphere.curvature(), 0.5, epsilon = 1e-8);
    assert_relative_eq!(sphere.pratt_norm(), 1.0, epsilon = 1e-12);
}

/// Planar samples degrade to a plane instead of failing.
#[test]
fn test_oriented_sphere_planar_data() {
    let normal = Vector3::new(0.0, 0.0, 1.0);
    let mut points = Vec::new();
    for i in -4..=4 {
        for j in -4..=4 {
            points.push(PointPositionNormal::new(
                Vector3::new(i as f64 * 0.1, j as f64 * 0.1, 0.0),
                normal,
            ));
        }
    }
    let mut fit = FitBuilder::new()
        .center(Vector3::zeros())
        .scale(1.0)
        .build::<OrientedSphereFit<f64, 3>>()
        .unwrap();

    assert_eq!(fit.compute(&points), FitStatus::Stable);
    let sphere = fit.sphere().unwrap();
    assert!(sphere.is_plane());
    let projected = fit.project(&Vector3::new(0.1, 0.2, 0.7)).unwrap();
    assert_relative_eq!(projected, Vector3::new(0.1, 0.2, 0.0), epsilon = 1e-10);
}

/// Fewer neighbors than the dimension is unstable.
#[test]
fn test_oriented_sphere_too_few_samples() {
    let points = sphere_cap(Vector3::zeros(), 1.0);
    let mut fit = north_pole_fit::<OrientedSphereFit<f64, 3>>(Vector3::zeros(), 1.0, 1.0);
    assert_eq!(fit.compute(&points[..2]), FitStatus::Unstable);
}

// ============================================================================
// Unoriented Fit Tests
// ============================================================================

/// Random normal signs do not change the fitted sphere.
#[test]
fn test_unoriented_sphere_ignores_normal_sign() {
    let center = Vector3::new(0.0, 0.5, 0.0);
    let points: Vec<_> = sphere_cap(center, 1.5)
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let sign = if i % 3 == 0 { -1.0 } else { 1.0 };
            PointPositionNormal::new(p.pos, p.normal * sign)
        })
        .collect();
    let mut fit = north_pole_fit::<UnorientedSphereFit<f64, 3>>(center, 1.5, 1.2);

    assert_eq!(fit.compute(&points), FitStatus::Stable);
    let sphere = fit.sphere().unwrap();
    assert_relative_eq!(sphere.center().unwrap(), center, epsilon = 1e-8);
    assert_relative_eq!(sphere.radius().unwrap(), 1.5, epsilon = 1e-8);
}

/// With consistent normals the gradient follows them.
#[test]
fn test_unoriented_sphere_orientation() {
    let points = sphere_cap(Vector3::zeros(), 1.0);
    let mut fit = north_pole_fit::<UnorientedSphereFit<f64, 3>>(Vector3::zeros(), 1.0, 1.0);
    fit.compute(&points);

    let sphere = fit.sphere().unwrap();
    let n = sphere.normal(&Vector3::new(0.0, 0.0, 1.0));
    assert_relative_eq!(n, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-8);
    assert!(sphere.curvature() > 0.0);
}

// ============================================================================
// Pratt Fit Tests
// ============================================================================

/// Exact sphere samples without normals give back the sphere.
#[test]
fn test_pratt_sphere_exact() {
    let center = Vector3::new(-0.4, 0.2, 0.3);
    let positions: Vec<Vector3<f64>> = sphere_cap(center, 0.8).iter().map(|p| p.pos).collect();
    let mut fit = north_pole_fit::<SphereFit<f64, 3>>(center, 0.8, 0.7);

    assert_eq!(fit.compute(&positions), FitStatus::Stable);
    let sphere = fit.sphere().unwrap();
    assert_relative_eq!(sphere.center().unwrap(), center, epsilon = 1e-7);
    assert_relative_eq!(sphere.radius().unwrap(), 0.8, epsilon = 1e-7);
    // Outward orientation without normals.
    assert!(sphere.uq > 0.0);

    let x = center + Vector3::new(0.1, 0.1, 1.0);
    let projected = fit.project(&x).unwrap();
    assert_relative_eq!((projected - center).norm(), 0.8, epsilon = 1e-7);
    assert_relative_eq!((projected - center).normalize(), (x - center).normalize(), epsilon = 1e-7);
}

/// The Pratt fit needs at least `N + 1` neighbors.
#[test]
fn test_pratt_sphere_too_few_samples() {
    let positions: Vec<Vector3<f64>> = sphere_cap(Vector3::zeros(), 1.0).iter().take(3).map(|p| p.pos).collect();
    let mut fit = north_pole_fit::<SphereFit<f64, 3>>(Vector3::zeros(), 1.0, 2.0);
    assert_eq!(fit.compute(&positions), FitStatus::Unstable);
}

// ============================================================================
// Noisy Data Tests
// ============================================================================

/// Radial noise of 1% keeps the Pratt fit close to the sphere.
#[test]
fn test_pratt_sphere_noisy() {
    let center = Vector3::new(0.2, -0.1, 0.4);
    let positions: Vec<Vector3<f64>> = noisy_sphere_cap(center, 1.0, 0.01, 7).iter().map(|p| p.pos).collect();
    let mut fit = north_pole_fit::<SphereFit<f64, 3>>(center, 1.0, 1.2);

    assert_eq!(fit.compute(&positions), FitStatus::Stable);
    let sphere = fit.sphere().unwrap();
    assert_relative_eq!(sphere.radius().unwrap(), 1.0, epsilon = 2e-2);
    assert_relative_eq!(sphere.center().unwrap(), center, epsilon = 3e-2);
    assert_relative_eq!(sphere.pratt_norm(), 1.0, epsilon = 1e-10);
    assert!(sphere.uq > 0.0);

    // Noisy samples stay close to the zero set.
    for p in &positions {
        assert!(sphere.potential(p).abs() < 3e-2);
    }
}

/// Radial noise of 1% and random normal signs keep the unoriented fit
/// close to the sphere.
#[test]
fn test_unoriented_sphere_noisy() {
    let center = Vector3::new(-0.3, 0.0, 0.2);
    let points: Vec<_> = noisy_sphere_cap(center, 1.0, 0.01, 11)
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let sign = if i % 4 == 1 { -1.0 } else { 1.0 };
            PointPositionNormal::new(p.pos, p.normal * sign)
        })
        .collect();
    let mut fit = north_pole_fit::<UnorientedSphereFit<f64, 3>>(center, 1.0, 1.2);

    assert_eq!(fit.compute(&points), FitStatus::Stable);
    let sphere = fit.sphere().unwrap();
    assert_relative_eq!(sphere.radius().unwrap(), 1.0, epsilon = 2e-2);
    assert_relative_eq!(sphere.center().unwrap(), center, epsilon = 3e-2);
}

// ============================================================================
// Two Dimensions Tests
// ============================================================================

/// All three fits recover a circle in the plane.
#[test]
fn test_sphere_fits_2d_circle() {
    let center = Vector2::new(0.5, -1.0);
    let radius = 2.0;
    let points: Vec<PointPositionNormal<f64, 2>> = (0..61)
        .map(|i| {
            let angle = std::f64::consts::FRAC_PI_2 - 1.0 + 2.0 * i as f64 / 60.0;
            let n = Vector2::new(angle.cos(), angle.sin());
            PointPositionNormal::new(center + n * radius, n)
        })
        .collect();
    let positions: Vec<Vector2<f64>> = points.iter().map(|p| p.pos).collect();
    let builder = || {
        FitBuilder::new()
            .center(center + Vector2::new(0.0, radius))
            .scale(2.5)
    };

    let mut oriented = builder().build::<OrientedSphereFit<f64, 2>>().unwrap();
    assert_eq!(oriented.compute(&points), FitStatus::Stable);
    let mut unoriented = builder().build::<UnorientedSphereFit<f64, 2>>().unwrap();
    assert_eq!(unoriented.compute(&points), FitStatus::Stable);
    let mut pratt = builder().build::<SphereFit<f64, 2>>().unwrap();
    assert_eq!(pratt.compute(&positions), FitStatus::Stable);

    for sphere in [oriented.sphere(), unoriented.sphere(), pratt.sphere()] {
        let sphere = sphere.unwrap();
        assert_relative_eq!(sphere.center().unwrap(), center, epsilon = 1e-7);
        assert_relative_eq!(sphere.radius().unwrap(), radius, epsilon = 1e-7);
        assert_relative_eq!(sphere.curvature(), 1.0 / radius, epsilon = 1e-7);
    }

    let projected = pratt.project(&Vector2::new(3.0, 1.0)).unwrap();
    assert_relative_eq!((projected - center).norm(), radius, epsilon = 1e-7);
}

// ============================================================================
// Scale Invariance Tests
// ============================================================================

/// Scaling positions and scale by λ scales the radius by λ and the
/// curvature by 1/λ.
#[test]
fn test_sphere_scale_invariance() {
    let base = sphere_cap(Vector3::new(0.1, 0.2, -0.3), 1.3);
    for &lambda in &[0.01, 1.0, 250.0] {
        let points: Vec<_> = base
            .iter()
            .map(|p| PointPositionNormal::new(p.pos * lambda, p.normal))
            .collect();
        let positions: Vec<Vector3<f64>> = points.iter().map(|p| p.pos).collect();
        let center = Vector3::new(0.1, 0.2, -0.3) * lambda;

        let mut oriented = north_pole_fit::<OrientedSphereFit<f64, 3>>(center, 1.3 * lambda, lambda);
        oriented.compute(&points);
        let sphere = oriented.sphere().unwrap();
        assert_relative_eq!(sphere.radius().unwrap(), 1.3 * lambda, max_relative = 1e-8);
        assert_relative_eq!(sphere.curvature(), 1.0 / (1.3 * lambda), max_relative = 1e-8);

        let mut pratt = north_pole_fit::<SphereFit<f64, 3>>(center, 1.3 * lambda, lambda);
        pratt.compute(&positions);
        let sphere = pratt.sphere().unwrap();
        assert_relative_eq!(sphere.radius().unwrap(), 1.3 * lambda, max_relative = 1e-7);
        assert_relative_eq!(sphere.curvature(), 1.0 / (1.3 * lambda), max_relative = 1e-7);
    }
}
