//! Read-only window onto a traversal state

use std::fmt;

use super::defaults::StateDefaults;
use super::element::{Category, StateElement};
use super::slot::StateSlot;
use super::traversal::ElementNode;
use crate::foundation::collections::{ElementArena, ElementId};

/// Read-only view of the current elements of a traversal state.
///
/// Reading through a view never materializes or pushes anything. Slots that
/// have not been touched yet read their value from the defaults. While a
/// hook runs, the element the hook belongs to is detached from the view;
/// hooks get that element as `self` instead.
#[derive(Clone, Copy)]
pub struct StateView<'a> {
    pub(crate) arena: &'a ElementArena<ElementNode>,
    pub(crate) slots: &'a [Option<ElementId>],
    pub(crate) defaults: &'a StateDefaults,
    pub(crate) depth: usize,
}

impl<'a> StateView<'a> {
    /// Current traversal depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the traversal tracks this category at all
    pub fn is_enabled(&self, slot: StateSlot) -> bool {
        self.defaults.is_enabled(slot)
    }

    /// Current element for a slot, `None` if the category is disabled
    pub fn current(&self, slot: StateSlot) -> Option<&'a dyn StateElement> {
        match self.slots.get(slot.index()).copied().flatten() {
            Some(id) => self.arena.get(id).map(|node| &*node.element),
            None => self.defaults.element(slot),
        }
    }

    /// Current element of a category, typed
    pub fn get<E: Category>(&self) -> Option<&'a E> {
        self.current(E::slot())?.downcast_ref::<E>()
    }
}

impl fmt::Debug for StateView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateView")
            .field("depth", &self.depth)
            .field("live_elements", &self.arena.len())
            .finish()
    }
}
