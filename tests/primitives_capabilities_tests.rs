//! Tests for the static description of components and chains.
//!
//! ## Test Organization
//!
//! 1. **Components** - Provided and required capabilities
//! 2. **Chains** - Union of outputs and deferred requirements
//! 3. **Derivative Flags** - Weight derivative requests

use nalgebra::Vector3;
use pointfit_rs::prelude::*;

fn provides<C: Component<f64, 3>>() -> Capabilities {
    C::PROVIDES
}

fn requires<C: Component<f64, 3>>() -> Capabilities {
    C::REQUIRES
}

// ============================================================================
// Component Tests
// ============================================================================

/// Primitive fits require nothing.
#[test]
fn test_primitive_capabilities() {
    assert_eq!(provides::<OrientedSphereFit<f64, 3>>(), Capabilities::ALGEBRAIC_SPHERE);
    assert_eq!(provides::<CovariancePlaneFit<f64, 3>>(), Capabilities::PLANE);
    assert_eq!(provides::<CovarianceLineFit>(), Capabilities::LINE);
    assert!(requires::<OrientedSphereFit<f64, 3>>().is_empty());
    assert!(requires::<MeanPosition>().is_empty());
}

/// Extensions require the primitive they read.
#[test]
fn test_extension_capabilities() {
    assert_eq!(requires::<GlsParam>(), Capabilities::ALGEBRAIC_SPHERE);
    assert_eq!(
        requires::<GlsDer>(),
        Capabilities::SPHERE_DERIVATIVE | Capabilities::GLS_PARAMETERS
    );
    assert_eq!(requires::<MongeFit<f64, 3>>(), Capabilities::PLANE);
    assert_eq!(requires::<NormalDerivativesCurvature>(), Capabilities::NORMAL_DERIVATIVE);
    assert_eq!(requires::<ProjectedNormalCovarianceCurvature<f64, 3>>(), Capabilities::PLANE);
}

/// The normal Jacobian is only provided with a space derivative.
#[test]
fn test_derivative_capabilities() {
    let scale = provides::<OrientedSphereDer<f64, 3, ScaleDer>>();
    let space = provides::<OrientedSphereDer<f64, 3, SpaceDer>>();
    assert!(scale.contains(Capabilities::ALGEBRAIC_SPHERE | Capabilities::SPHERE_DERIVATIVE));
    assert!(!scale.contains(Capabilities::NORMAL_DERIVATIVE));
    assert!(space.contains(Capabilities::NORMAL_DERIVATIVE));
    assert!(provides::<CovariancePlaneDer<f64, 3, ScaleSpaceDer>>().contains(Capabilities::PLANE_DERIVATIVE));
}

// ============================================================================
// Chain Tests
// ============================================================================

/// A chain provides the union of its members' outputs and requires what
/// none of them provides.
#[test]
fn test_chain_capabilities() {
    type Chain = (OrientedSphereFit<f64, 3>, GlsParam);
    assert_eq!(
        provides::<Chain>(),
        Capabilities::ALGEBRAIC_SPHERE | Capabilities::GLS_PARAMETERS
    );
    assert!(requires::<Chain>().is_empty());

    type Partial = (GlsParam, GlsDer);
    assert_eq!(
        requires::<Partial>(),
        Capabilities::ALGEBRAIC_SPHERE | Capabilities::SPHERE_DERIVATIVE
    );
}

// ============================================================================
// Derivative Flag Tests
// ============================================================================

/// A chain requests the weight derivatives any member needs.
#[test]
fn test_chain_derivative_flags() {
    type Plain = (OrientedSphereFit<f64, 3>, GlsParam);
    type Scale = (OrientedSphereDer<f64, 3, ScaleDer>, GlsParam, GlsDer);
    assert!(!<Plain as Component<f64, 3>>::SCALE_DERIVATIVE);
    assert!(<Scale as Component<f64, 3>>::SCALE_DERIVATIVE);
    assert!(!<Scale as Component<f64, 3>>::SPACE_DERIVATIVE);
}

/// Weight derivatives stay zero in the state unless requested.
#[test]
fn test_state_derivative_sums() {
    let point = PointPositionNormal::new(Vector3::new(0.1, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));

    let mut plain = FitBuilder::new()
        .center(Vector3::zeros())
        .scale(1.0)
        .build::<OrientedSphereFit<f64, 3>>()
        .unwrap();
    plain.add_neighbor(&point);
    assert_eq!(plain.state().deriv.d_sum_w.dt, 0.0);

    let mut scaled = FitBuilder::new()
        .center(Vector3::zeros())
        .scale(1.0)
        .build::<OrientedSphereDer<f64, 3, ScaleDer>>()
        .unwrap();
    scaled.add_neighbor(&point);
    assert!(scaled.state().deriv.d_sum_w.dt > 0.0);
    assert_eq!(scaled.state().deriv.d_sum_w.dp, Vector3::zeros());
}
