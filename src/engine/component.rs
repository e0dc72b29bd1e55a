//! Fit components and their static composition.
//!
//! ## Purpose
//!
//! A fit is assembled from independently written components: a primitive
//! fit, an extension reading that primitive, a derivative layer, a curvature
//! estimator. This module defines the two traits a component implements and
//! the tuple implementations that chain several of them into one composite.
//!
//! ## Design notes
//!
//! * **Component** carries the static description (provided and required
//!   [`Capabilities`], whether weight derivatives are needed) and the
//!   lifecycle hooks `init`, `start_new_pass` and `finalize`.
//! * **Accumulate** is generic over the sample type, so a component that
//!   reads normals is only implemented for `S: OrientedSample` and streaming
//!   position-only samples into it does not compile.
//! * **Tuples** `(A, B, ...)` of up to eight members are themselves
//!   components. Their finalize order is a topological sort of the members'
//!   requirements computed by a `const fn`; a cycle aborts compilation
//!   through [`Component::CHECK`].
//! * **Nesting**: requirements a tuple cannot satisfy internally are exposed
//!   as its own `REQUIRES` and deferred to the enclosing composite.
//! * **No short-circuit**: every member is finalized and the statuses are
//!   merged by severity.
//!
//! ## Invariants
//!
//! * A member is finalized after every member providing one of its
//!   requirements.
//! * All members receive every neighbor, in declaration order.

use nalgebra::SVector;
use tracing::warn;

use crate::engine::state::FitState;
use crate::primitives::capabilities::{finalize_order, overlapping_writers, unresolved, Capabilities};
use crate::primitives::derivative::ScalarDerivative;
use crate::primitives::sample::Sample;
use crate::primitives::scalar::Real;
use crate::primitives::status::FitStatus;

// ============================================================================
// Neighbor
// ============================================================================

/// A neighbor as seen by components: local position, weight and, when
/// requested by the composite, the weight derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<T: Real, const N: usize> {
    /// Position relative to the evaluation center.
    pub q: SVector<T, N>,
    /// Weight, strictly positive.
    pub w: T,
    /// Weight derivatives (zero unless requested).
    pub dw: ScalarDerivative<T, N>,
}

// ============================================================================
// Component Traits
// ============================================================================

/// Static description and lifecycle of a fit component.
pub trait Component<T: Real, const N: usize>: Default {
    /// Outputs written during `finalize`.
    const PROVIDES: Capabilities;

    /// Outputs of other components read during `finalize`.
    const REQUIRES: Capabilities = Capabilities::empty();

    /// Whether neighbors must carry the weight derivative with respect to
    /// the scale.
    const SCALE_DERIVATIVE: bool = false;

    /// Whether neighbors must carry the weight derivative with respect to
    /// the evaluation position.
    const SPACE_DERIVATIVE: bool = false;

    /// Name used in diagnostics.
    const NAME: &'static str;

    /// Compile-time consistency check of the component.
    ///
    /// Composites force the checks of their members; a failing check is a
    /// const-evaluation panic.
    const CHECK: () = ();

    /// Reset all private state.
    fn init(&mut self) {
        *self = Self::default();
    }

    /// Prepare for re-streaming the neighbors; sums are cleared, state
    /// derived from earlier passes may be kept.
    fn start_new_pass(&mut self) {
        self.init();
    }

    /// Compute and publish the outputs from the accumulated sums.
    fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus;
}

/// Neighbor accumulation for a given sample type.
pub trait Accumulate<T: Real, const N: usize, S: Sample<T, N>>: Component<T, N> {
    /// Add one neighbor. Shared sums in `state` already include it.
    fn add_local_neighbor(&mut self, nb: &Neighbor<T, N>, sample: &S, state: &FitState<T, N>);
}

// ============================================================================
// Tuple Composition
// ============================================================================

macro_rules! impl_component_tuple {
    ($k:literal; $($idx:tt $name:ident),+) => {
        impl<T: Real, const N: usize, $($name: Component<T, N>),+> Component<T, N> for ($($name,)+) {
            const PROVIDES: Capabilities = Capabilities::empty()$(.union($name::PROVIDES))+;

            const REQUIRES: Capabilities =
                unresolved::<$k>(&[$($name::PROVIDES),+], &[$($name::REQUIRES),+]);

            const SCALE_DERIVATIVE: bool = false $(|| $name::SCALE_DERIVATIVE)+;

            const SPACE_DERIVATIVE: bool = false $(|| $name::SPACE_DERIVATIVE)+;

            const NAME: &'static str = "composite";

            const CHECK: () = {
                $(let () = <$name as Component<T, N>>::CHECK;)+
                let _ = finalize_order::<$k>(
                    &[$($name::PROVIDES),+],
                    &[$($name::REQUIRES),+],
                    Self::REQUIRES,
                );
            };

            fn init(&mut self) {
                $(self.$idx.init();)+
            }

            fn start_new_pass(&mut self) {
                $(self.$idx.start_new_pass();)+
            }

            fn finalize(&mut self, state: &mut FitState<T, N>) -> FitStatus {
                let order = const {
                    finalize_order::<$k>(
                        &[$($name::PROVIDES),+],
                        &[$($name::REQUIRES),+],
                        Self::REQUIRES,
                    )
                };
                let mut status = FitStatus::Stable;
                for i in order {
                    let member = match i {
                        $($idx => self.$idx.finalize(state),)+
                        _ => FitStatus::Undefined,
                    };
                    status = status.combine(member);
                }
                if status == FitStatus::ConflictErrorFound {
                    warn!(
                        overlap = ?overlapping_writers::<$k>(&[$($name::PROVIDES),+]),
                        "chain members provide the same output"
                    );
                }
                status
            }
        }

        impl<T: Real, const N: usize, S: Sample<T, N>, $($name: Accumulate<T, N, S>),+> Accumulate<T, N, S>
            for ($($name,)+)
        {
            #[inline]
            fn add_local_neighbor(&mut self, nb: &Neighbor<T, N>, sample: &S, state: &FitState<T, N>) {
                $(self.$idx.add_local_neighbor(nb, sample, state);)+
            }
        }
    };
}

impl_component_tuple!(1; 0 A);
impl_component_tuple!(2; 0 A, 1 B);
impl_component_tuple!(3; 0 A, 1 B, 2 C);
impl_component_tuple!(4; 0 A, 1 B, 2 C, 3 D);
impl_component_tuple!(5; 0 A, 1 B, 2 C, 3 D, 4 E);
impl_component_tuple!(6; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
impl_component_tuple!(7; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
impl_component_tuple!(8; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);
