//! Per-action category defaults

use super::element::{Category, StateElement};
use super::slot::StateSlot;

/// The set of categories an action type tracks, with their initial values.
///
/// Built once per action type and then shared read-only by every traversal
/// of that type. A category with no element here is disabled for the action:
/// traversals report it as absent and never allocate anything for it.
///
/// This is the only place elements may be installed into a slot directly;
/// traversal states only change elements through their stack discipline.
#[derive(Debug, Default)]
pub struct StateDefaults {
    elements: Vec<Option<Box<dyn StateElement>>>,
}

impl StateDefaults {
    /// Defaults with every category disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the default element for a slot, enabling the category
    pub fn set_element(&mut self, slot: StateSlot, element: Box<dyn StateElement>) {
        let index = slot.index();
        if index >= self.elements.len() {
            self.elements.resize_with(index + 1, || None);
        }
        self.elements[index] = Some(element);
    }

    /// Enable a category with the given default element
    pub fn enable<E: Category>(&mut self, element: E) {
        self.set_element(E::slot(), Box::new(element));
    }

    /// Builder form of [`enable`](Self::enable)
    #[must_use]
    pub fn with<E: Category>(mut self, element: E) -> Self {
        self.enable(element);
        self
    }

    /// Default element for a slot, `None` if the category is disabled
    pub fn element(&self, slot: StateSlot) -> Option<&dyn StateElement> {
        self.elements.get(slot.index())?.as_deref()
    }

    /// Default element of a category, typed
    pub fn get<E: Category>(&self) -> Option<&E> {
        self.element(E::slot())?.downcast_ref::<E>()
    }

    /// Whether a category is tracked
    pub fn is_enabled(&self, slot: StateSlot) -> bool {
        self.element(slot).is_some()
    }

    /// Number of enabled categories
    pub fn enabled_count(&self) -> usize {
        self.elements.iter().filter(|element| element.is_some()).count()
    }

    pub(crate) fn slot_capacity(&self) -> usize {
        self.elements.len()
    }
}
