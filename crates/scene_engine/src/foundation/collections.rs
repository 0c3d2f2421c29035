//! Specialized collection types

pub use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable handle to a state element stored in a traversal arena.
    ///
    /// Handles are never reused while the element they name is alive, so
    /// comparing two handles is an identity comparison of the elements.
    pub struct ElementId;
}

/// Arena holding values addressed by [`ElementId`]
pub type ElementArena<T> = SlotMap<ElementId, T>;
