//! Output slots written by fit components.
//!
//! ## Purpose
//!
//! Every quantity a component publishes (a primitive, a descriptor, a
//! derivative) lives in a [`Slot`]. A slot keeps its last value across passes
//! and records whether it has already been written during the current
//! `finalize` call, which is how two components writing the same quantity
//! are caught.
//!
//! ## Design notes
//!
//! * **Write-once per finalize**: a second [`Slot::write`] in the same
//!   finalize is refused and leaves the first value in place.
//! * **Persistent values**: [`Slot::begin_finalize`] only clears the write
//!   mark, so values from a previous pass stay readable. `init` replaces the
//!   slots altogether.
//!
//! ## Invariants
//!
//! * `is_written()` implies `get().is_some()`.

/// A second write to the same slot in one finalize call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotConflict;

/// Storage for one published fit output.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<V> {
    value: Option<V>,
    written: bool,
}

impl<V> Slot<V> {
    /// Create an empty slot.
    #[inline]
    pub const fn new() -> Self {
        Self {
            value: None,
            written: false,
        }
    }

    /// Current value, possibly from an earlier pass.
    #[inline]
    pub fn get(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Value written during the current finalize call, if any.
    #[inline]
    pub fn fresh(&self) -> Option<&V> {
        if self.written {
            self.value.as_ref()
        } else {
            None
        }
    }

    /// Whether the slot was written during the current finalize call.
    #[inline]
    pub fn is_written(&self) -> bool {
        self.written
    }

    /// Publish a value, refusing a second write in the same finalize call.
    #[inline]
    pub fn write(&mut self, value: V) -> Result<(), SlotConflict> {
        if self.written {
            return Err(SlotConflict);
        }
        self.value = Some(value);
        self.written = true;
        Ok(())
    }

    /// Start a new finalize call: keep the value, drop the write mark.
    #[inline]
    pub fn begin_finalize(&mut self) {
        self.written = false;
    }
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self::new()
    }
}
