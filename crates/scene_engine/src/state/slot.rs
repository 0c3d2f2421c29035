//! Category slot registry
//!
//! Every category of traversal state is identified by a [`StateSlot`]
//! handed out by a process-wide counter. Slots are never reused and never
//! unregistered; the number of slots only grows.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

static NEXT_SLOT: AtomicUsize = AtomicUsize::new(0);

/// Handle identifying one category of traversal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateSlot(usize);

impl StateSlot {
    /// Position of this slot in per-slot tables
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

/// Issue a fresh slot. Safe to call from any thread.
pub fn register_category() -> StateSlot {
    StateSlot(NEXT_SLOT.fetch_add(1, Ordering::Relaxed))
}

/// Number of slots issued so far in this process
pub fn registered_slot_count() -> usize {
    NEXT_SLOT.load(Ordering::Relaxed)
}

/// A slot registered on first use, for use in `static` items.
///
/// ```
/// use scene_engine::state::{LazySlot, StateSlot};
///
/// fn my_category_slot() -> StateSlot {
///     static SLOT: LazySlot = LazySlot::new();
///     SLOT.get()
/// }
///
/// assert_eq!(my_category_slot(), my_category_slot());
/// ```
#[derive(Debug)]
pub struct LazySlot(OnceLock<StateSlot>);

impl LazySlot {
    /// An unregistered slot
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// The slot, registering it exactly once on first call
    pub fn get(&self) -> StateSlot {
        *self.0.get_or_init(register_category)
    }
}

impl Default for LazySlot {
    fn default() -> Self {
        Self::new()
    }
}
