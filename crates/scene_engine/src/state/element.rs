//! The element abstraction: one category of traversal state

use std::any::Any;
use std::fmt;

use super::slot::StateSlot;
use super::view::StateView;
use crate::render::RenderBackend;

/// Upcast helper so element trait objects can be downcast to their concrete type
pub trait AsAny {
    /// `self` as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// `self` as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// One independently stackable category of traversal state.
///
/// Elements only hold the category value. Stack bookkeeping (the element
/// below, the touched list, the depth the element became current at) is
/// kept by [`TraversalState`](super::TraversalState) next to the element.
///
/// The hooks run when a category changes because of traversal, never
/// because of an explicit setter:
///
/// - `on_push` runs on a freshly created element right after it was stacked
///   on top of `below`. The usual job is to inherit `below`'s value.
/// - `on_pop` runs on the element that is about to become current again,
///   with the element being popped off above it. Both are still linked while
///   the hook runs, as are all other elements popped by the same `pop`.
pub trait StateElement: AsAny + fmt::Debug + Send + Sync {
    /// Fresh instance of this category carrying its default value and
    /// configuration
    fn create_default(&self) -> Box<dyn StateElement>;

    /// Called once after this element was lazily pushed above `below`
    fn on_push(&mut self, below: &dyn StateElement, cx: &mut HookContext<'_>) {
        let _ = (below, cx);
    }

    /// Called once when `popped` is unwound and this element becomes current
    fn on_pop(&mut self, popped: &dyn StateElement, cx: &mut HookContext<'_>) {
        let _ = (popped, cx);
    }

    /// The base category element inside a specialised element that shares
    /// the base's slot. Typed access for the base category reaches it here.
    fn base(&self) -> Option<&dyn StateElement> {
        None
    }

    /// Mutable counterpart of [`base`](Self::base)
    fn base_mut(&mut self) -> Option<&mut dyn StateElement> {
        None
    }
}

impl<'a> dyn StateElement + 'a {
    /// Downcast to a concrete element type, falling back along
    /// [`base`](StateElement::base) for specialised elements
    pub fn downcast_ref<E: StateElement + 'static>(&self) -> Option<&E> {
        match self.as_any().downcast_ref::<E>() {
            Some(element) => Some(element),
            None => self.base()?.downcast_ref::<E>(),
        }
    }

    /// Mutable [`downcast_ref`](Self::downcast_ref)
    pub fn downcast_mut<E: StateElement + 'static>(&mut self) -> Option<&mut E> {
        if (*self).as_any().is::<E>() {
            return (*self).as_any_mut().downcast_mut::<E>();
        }
        self.base_mut()?.downcast_mut::<E>()
    }
}

/// A concrete element type bound to the slot of its category.
///
/// Implementations usually register through a [`LazySlot`](super::LazySlot).
/// A specialised element may return another category's slot to share it; it
/// then exposes the base element through [`StateElement::base`] and
/// [`StateElement::base_mut`] so the base category's accessors keep working.
pub trait Category: StateElement + Sized + 'static {
    /// Slot this category is stored under
    fn slot() -> StateSlot;
}

/// What a hook may look at and talk to while it runs
pub struct HookContext<'a> {
    pub(crate) state: StateView<'a>,
    pub(crate) backend: Option<&'a mut (dyn RenderBackend + 'static)>,
}

impl<'a> HookContext<'a> {
    /// Read-only view of the traversal state as it is while the hook runs
    pub fn state(&self) -> &StateView<'a> {
        &self.state
    }

    /// The graphics backend, if the traversal has one
    pub fn backend(&mut self) -> Option<&mut (dyn RenderBackend + 'static)> {
        self.backend.as_deref_mut()
    }

    /// Run `issue` against the backend when there is one
    pub fn with_backend(&mut self, issue: impl FnOnce(&mut dyn RenderBackend)) {
        if let Some(backend) = self.backend.as_deref_mut() {
            issue(backend);
        }
    }
}

impl fmt::Debug for HookContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("depth", &self.state.depth())
            .field("has_backend", &self.backend.is_some())
            .finish()
    }
}

/// Stand-in kept in an element's arena entry while its hook runs
#[derive(Debug)]
pub(crate) struct Detached;

impl StateElement for Detached {
    fn create_default(&self) -> Box<dyn StateElement> {
        Box::new(Detached)
    }
}
