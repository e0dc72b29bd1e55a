//! Fit status reported by `finalize`.
//!
//! ## Purpose
//!
//! This module defines [`FitStatus`], the outcome of one `finalize` call, and
//! the severity ordering used to merge the statuses of composed components.
//!
//! ## Key concepts
//!
//! * **Stable**: every output the composite provides was written exactly once
//!   during the current `finalize`.
//! * **Unstable**: not enough (independent) samples, or an ill-conditioned
//!   system; outputs may be missing or unreliable.
//! * **NeedAnotherPass**: a component needs the neighbors streamed again.
//! * **ConflictErrorFound**: two components wrote the same output slot.
//!
//! ## Invariants
//!
//! * Merging is commutative and associative; the most severe status wins:
//!   `ConflictErrorFound > Undefined > Unstable > NeedAnotherPass > Stable`.

use core::fmt;

/// Outcome of a fit `finalize` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FitStatus {
    /// Nothing has been finalized since the last `init`.
    #[default]
    Undefined,

    /// The fit ran but the data is insufficient or ill-conditioned.
    Unstable,

    /// The fit is complete and reliable.
    Stable,

    /// Stream the same neighbors again after `start_new_pass`.
    NeedAnotherPass,

    /// Two composed components wrote the same output slot.
    ConflictErrorFound,
}

impl FitStatus {
    /// Severity rank used when merging statuses (higher wins).
    #[inline]
    pub const fn severity(self) -> u8 {
        match self {
            FitStatus::Stable => 0,
            FitStatus::NeedAnotherPass => 1,
            FitStatus::Unstable => 2,
            FitStatus::Undefined => 3,
            FitStatus::ConflictErrorFound => 4,
        }
    }

    /// Merge two statuses, keeping the most severe one.
    #[inline]
    pub const fn combine(self, other: FitStatus) -> FitStatus {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    /// Whether the fit is complete and reliable.
    #[inline]
    pub const fn is_stable(self) -> bool {
        matches!(self, FitStatus::Stable)
    }

    /// Whether outputs can be read (possibly with reduced reliability).
    #[inline]
    pub const fn is_ready(self) -> bool {
        matches!(self, FitStatus::Stable | FitStatus::Unstable)
    }

    /// Whether the caller must start another pass.
    #[inline]
    pub const fn needs_another_pass(self) -> bool {
        matches!(self, FitStatus::NeedAnotherPass)
    }
}

impl fmt::Display for FitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FitStatus::Undefined => "undefined",
            FitStatus::Unstable => "unstable",
            FitStatus::Stable => "stable",
            FitStatus::NeedAnotherPass => "need another pass",
            FitStatus::ConflictErrorFound => "conflict error found",
        };
        f.write_str(name)
    }
}
