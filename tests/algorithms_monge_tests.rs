//! Tests for the two-pass Monge patch fit.
//!
//! ## Test Organization
//!
//! 1. **Protocol** - Pass sequencing driven by the caller
//! 2. **Height Field** - Recovered quadratic on a paraboloid
//! 3. **Pass Bound** - Behavior when passes run out

use approx::assert_relative_eq;
use nalgebra::Vector3;
use pointfit_rs::prelude::*;

const A: f64 = 0.6;
const B: f64 = -0.25;

/// Grid on the paraboloid `z = A x² + B y²` with upward normals.
fn paraboloid() -> Vec<PointPositionNormal<f64, 3>> {
    let mut points = Vec::new();
    for i in -6..=6 {
        for j in -6..=6 {
            let x = i as f64 / 12.0;
            let y = j as f64 / 12.0;
            let z = A * x * x + B * y * y;
            let n = Vector3::new(-2.0 * A * x, -2.0 * B * y, 1.0).normalize();
            points.push(PointPositionNormal::new(Vector3::new(x, y, z), n));
        }
    }
    points
}

type Monge = (CovariancePlaneFit<f64, 3>, MongeFit<f64, 3>);

fn monge_fit() -> Fit<f64, 3, Monge> {
    FitBuilder::new()
        .center(Vector3::zeros())
        .scale(1.0)
        .build::<Monge>()
        .unwrap()
}

// ============================================================================
// Protocol Tests
// ============================================================================

/// The first pass only fixes the frame and asks for another pass.
#[test]
fn test_monge_manual_passes() {
    let points = paraboloid();
    let mut fit = monge_fit();

    for p in &points {
        assert!(fit.add_neighbor(p));
    }
    assert_eq!(fit.finalize(), FitStatus::NeedAnotherPass);
    assert!(fit.plane().is_some());
    assert!(fit.monge_patch().is_none());
    assert!(fit.components().1.frame().is_some());

    fit.start_new_pass();
    assert_eq!(fit.current_pass(), 1);
    // The plane from the first pass stays readable between passes.
    assert!(fit.plane().is_some());

    for p in &points {
        fit.add_neighbor(p);
    }
    assert_eq!(fit.finalize(), FitStatus::Stable);
    assert!(fit.monge_patch().is_some());
}

/// `compute` runs both passes.
#[test]
fn test_monge_compute_is_stable() {
    let mut fit = monge_fit();
    assert_eq!(fit.compute(&paraboloid()), FitStatus::Stable);
    assert_eq!(fit.current_pass(), 1);
}

/// `init` drops the frame of the previous fit.
#[test]
fn test_monge_init_clears_frame() {
    let mut fit = monge_fit();
    fit.compute(&paraboloid());
    fit.init();

    assert!(fit.components().1.frame().is_none());
    assert!(fit.monge_patch().is_none());
    assert_eq!(fit.status(), FitStatus::Undefined);
}

// ============================================================================
// Height Field Tests
// ============================================================================

/// The Hessian of a paraboloid is recovered up to a rotation of the
/// tangent frame.
#[test]
fn test_monge_paraboloid_hessian() {
    let mut fit = monge_fit();
    fit.compute(&paraboloid());

    let patch = fit.monge_patch().unwrap();
    assert_relative_eq!(patch.frame.normal, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-10);

    let h = &patch.hessian;
    assert_eq!(h.shape(), (2, 2));
    assert_relative_eq!(h.trace(), 2.0 * A + 2.0 * B, epsilon = 1e-8);
    assert_relative_eq!(h.determinant(), 4.0 * A * B, epsilon = 1e-8);
    assert_relative_eq!(patch.gradient.norm(), 0.0, epsilon = 1e-8);
}

/// Projection is vertical and lands on the paraboloid.
#[test]
fn test_monge_projection() {
    let mut fit = monge_fit();
    fit.compute(&paraboloid());

    let projected = fit.project(&Vector3::new(0.1, -0.2, 3.0)).unwrap();
    let expected = Vector3::new(0.1, -0.2, A * 0.01 + B * 0.04);
    assert_relative_eq!(projected, expected, epsilon = 1e-8);
}

// ============================================================================
// Pass Bound Tests
// ============================================================================

/// A single allowed pass leaves the fit waiting for another one.
#[test]
fn test_monge_single_pass_bound() {
    let mut fit = monge_fit();
    fit.set_max_passes(1).unwrap();

    assert_eq!(fit.compute(&paraboloid()), FitStatus::NeedAnotherPass);
    assert!(fit.monge_patch().is_none());
}

/// Too few neighbors for the quadratic is unstable after the second pass.
#[test]
fn test_monge_too_few_samples() {
    let points: Vec<_> = paraboloid().into_iter().filter(|p| p.pos.y == 0.0).take(5).collect();
    let tilted: Vec<_> = points
        .iter()
        .map(|p| PointPositionNormal::new(p.pos + Vector3::new(0.0, 0.01 * p.pos.x, 0.0), p.normal))
        .collect();
    let mut fit = monge_fit();
    assert_eq!(fit.compute(&tilted), FitStatus::Unstable);
}
