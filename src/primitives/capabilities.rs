//! Capability tags and compile-time composition checks.
//!
//! ## Purpose
//!
//! This module defines [`Capabilities`], the set of computed quantities a fit
//! component can provide or require, and the `const fn` machinery that
//! validates a component chain and derives its finalize order while the
//! composite type is being compiled.
//!
//! ## Design notes
//!
//! * **One tag, one slot**: every tag names exactly one typed output slot of
//!   [`FitState`](crate::engine::state::FitState); providing a tag means
//!   writing that slot during `finalize`.
//! * **Const evaluation**: [`finalize_order`] and [`unresolved`] are `const fn`
//!   so that a missing requirement or a dependency cycle aborts compilation
//!   (post-monomorphization const panic) instead of producing a runtime value.
//! * **Writer overlap**: [`overlapping_writers`] reports tags provided by more
//!   than one member. Overlap is detected at runtime as `ConflictErrorFound`;
//!   composites use the helper to name the shared tags in the log.
//!
//! ## Invariants
//!
//! * `finalize_order` returns a permutation in which every member comes after
//!   the members providing its requirements.
//!
//! ## Non-goals
//!
//! * This module does not inspect slot contents.

bitflags::bitflags! {
    /// Set of computed quantities provided or required by a fit component.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        /// Weighted barycenter of the neighbor positions.
        const MEAN_POSITION = 1 << 0;
        /// Weighted average of the neighbor normals.
        const MEAN_NORMAL = 1 << 1;
        /// Fitted hyperplane.
        const PLANE = 1 << 2;
        /// Fitted line.
        const LINE = 1 << 3;
        /// Fitted algebraic sphere.
        const ALGEBRAIC_SPHERE = 1 << 4;
        /// Quadratic height field over a tangent frame.
        const MONGE_PATCH = 1 << 5;
        /// Derivatives of the algebraic sphere parameters.
        const SPHERE_DERIVATIVE = 1 << 6;
        /// Derivatives of the plane point and normal.
        const PLANE_DERIVATIVE = 1 << 7;
        /// Jacobian of the primitive normal at the evaluation point.
        const NORMAL_DERIVATIVE = 1 << 8;
        /// Principal curvatures and directions.
        const PRINCIPAL_CURVATURES = 1 << 9;
        /// Growing-least-squares descriptors (tau, eta, kappa).
        const GLS_PARAMETERS = 1 << 10;
        /// Derivatives of the growing-least-squares descriptors.
        const GLS_DERIVATIVES = 1 << 11;
    }
}

// ============================================================================
// Const Composition Helpers
// ============================================================================

/// Union of the tags provided by every member except `skip`.
const fn provided_by_others<const K: usize>(provides: &[Capabilities; K], skip: usize) -> Capabilities {
    let mut acc = Capabilities::empty();
    let mut j = 0;
    while j < K {
        if j != skip {
            acc = acc.union(provides[j]);
        }
        j += 1;
    }
    acc
}

/// Requirements of a chain that no member of the chain provides.
///
/// A member's own tags never satisfy its own requirements.
pub const fn unresolved<const K: usize>(
    provides: &[Capabilities; K],
    requires: &[Capabilities; K],
) -> Capabilities {
    let mut missing = Capabilities::empty();
    let mut i = 0;
    while i < K {
        let others = provided_by_others(provides, i);
        missing = missing.union(requires[i].difference(others));
        i += 1;
    }
    missing
}

/// Tags provided by more than one member of a chain.
pub const fn overlapping_writers<const K: usize>(provides: &[Capabilities; K]) -> Capabilities {
    let mut overlap = Capabilities::empty();
    let mut seen = Capabilities::empty();
    let mut i = 0;
    while i < K {
        overlap = overlap.union(seen.intersection(provides[i]));
        seen = seen.union(provides[i]);
        i += 1;
    }
    overlap
}

/// Finalize order of a chain: providers before consumers.
///
/// Requirements in `external` are assumed to be satisfied by an enclosing
/// chain. Among the members ready at each step, the one declared first is
/// picked, so an already well-ordered chain keeps its declaration order.
///
/// # Panics
///
/// Panics (at compile time when used in a const item) if the members form a
/// dependency cycle.
pub const fn finalize_order<const K: usize>(
    provides: &[Capabilities; K],
    requires: &[Capabilities; K],
    external: Capabilities,
) -> [usize; K] {
    let mut order = [0usize; K];
    let mut placed = [false; K];
    let mut available = external;
    let mut step = 0;
    while step < K {
        let mut picked = K;
        let mut i = 0;
        while i < K {
            if !placed[i] && available.contains(requires[i]) {
                picked = i;
                break;
            }
            i += 1;
        }
        if picked == K {
            panic!("fit composition has a capability cycle: no member can be finalized first");
        }
        placed[picked] = true;
        order[step] = picked;
        available = available.union(provides[picked]);
        step += 1;
    }
    order
}
