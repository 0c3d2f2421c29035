//! The lazy stack-of-stacks traversal state

use std::fmt;
use std::sync::Arc;

use super::defaults::StateDefaults;
use super::element::{Category, Detached, HookContext, StateElement};
use super::slot::StateSlot;
use super::view::StateView;
use crate::foundation::collections::{ElementArena, ElementId};
use crate::render::RenderBackend;

/// Arena entry wrapping an element with its stack bookkeeping
#[derive(Debug)]
pub(crate) struct ElementNode {
    pub(crate) element: Box<dyn StateElement>,
    pub(crate) slot: StateSlot,
    /// Traversal depth this element became current at, 0 for materialized defaults
    pub(crate) depth: usize,
    /// Element of the same category this one was pushed above
    pub(crate) next_in_stack: Option<ElementId>,
    /// Element pushed before this one in any category
    pub(crate) next_touched: Option<ElementId>,
}

#[derive(Clone, Copy)]
enum Hook {
    Push,
    Pop,
}

/// Per-traversal state: one independent stack per enabled category.
///
/// `push` only bumps the depth. A category is copied onto a new level the
/// first time it is fetched for mutation at that level, and `pop` only
/// unwinds the categories that were actually copied since the matching push.
/// Categories nobody touches cost nothing per level.
pub struct TraversalState {
    defaults: Arc<StateDefaults>,
    arena: ElementArena<ElementNode>,
    slots: Vec<Option<ElementId>>,
    depth: usize,
    touched: Option<ElementId>,
    popping: bool,
    backend: Option<Box<dyn RenderBackend>>,
}

impl TraversalState {
    /// State over the given defaults, already pushed once
    pub fn new(defaults: Arc<StateDefaults>) -> Self {
        let slots = vec![None; defaults.slot_capacity()];
        let mut state = Self {
            defaults,
            arena: ElementArena::with_key(),
            slots,
            depth: 0,
            touched: None,
            popping: false,
            backend: None,
        };
        state.push();
        state
    }

    /// State whose side-effecting categories talk to `backend`
    pub fn with_backend(defaults: Arc<StateDefaults>, backend: Box<dyn RenderBackend>) -> Self {
        let mut state = Self::new(defaults);
        state.backend = Some(backend);
        state
    }

    /// Current traversal depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The defaults this state was built from
    pub fn defaults(&self) -> &Arc<StateDefaults> {
        &self.defaults
    }

    /// Whether a category is tracked by this state
    pub fn is_enabled(&self, slot: StateSlot) -> bool {
        self.defaults.is_enabled(slot)
    }

    /// Identity of the element currently stored at `slot`, without syncing it
    pub fn element_id(&self, slot: StateSlot) -> Option<ElementId> {
        self.slots.get(slot.index()).copied().flatten()
    }

    /// Number of elements currently allocated across all stacks
    pub fn live_elements(&self) -> usize {
        self.arena.len()
    }

    /// Read-only view of the current elements
    pub fn view(&self) -> StateView<'_> {
        StateView {
            arena: &self.arena,
            slots: &self.slots,
            defaults: &self.defaults,
            depth: self.depth,
        }
    }

    /// Current element of a category for reading. Never pushes.
    pub fn element<E: Category>(&self) -> Option<&E> {
        self.view().get::<E>()
    }

    /// Current element of a slot, synced to the current depth so it may be
    /// modified. `None` when the category is disabled for this state.
    pub fn get_element(&mut self, slot: StateSlot) -> Option<&mut dyn StateElement> {
        let id = self.sync_slot(slot)?;
        let element: &mut dyn StateElement = self.arena[id].element.as_mut();
        Some(element)
    }

    /// Typed [`get_element`](Self::get_element).
    ///
    /// # Panics
    ///
    /// If the element stored at `E::slot()` is not an `E`.
    pub fn element_mut<E: Category>(&mut self) -> Option<&mut E> {
        let id = self.sync_slot(E::slot())?;
        Some(expect_category::<E>(self.arena[id].element.as_mut()))
    }

    /// Typed mutable element together with the backend, for setters that
    /// have to issue a command when the value changes
    pub fn element_mut_with_backend<E: Category>(
        &mut self,
    ) -> Option<(&mut E, Option<&mut (dyn RenderBackend + 'static)>)> {
        let id = self.sync_slot(E::slot())?;
        let element = expect_category::<E>(self.arena[id].element.as_mut());
        Some((element, self.backend.as_deref_mut()))
    }

    /// Enter a new level. Copies nothing.
    pub fn push(&mut self) {
        self.depth += 1;
    }

    /// Leave the current level, restoring every category modified since the
    /// matching [`push`](Self::push).
    ///
    /// # Panics
    ///
    /// When called at depth 0.
    pub fn pop(&mut self) {
        assert!(self.depth > 0, "TraversalState::pop called at depth 0");
        self.depth -= 1;
        self.popping = true;

        // Notify first so hooks still see every popped element linked.
        let mut cursor = self.touched;
        while let Some(id) = cursor {
            let node = &self.arena[id];
            if node.depth <= self.depth {
                break;
            }
            cursor = node.next_touched;
            if let Some(below) = node.next_in_stack {
                self.run_hook(below, id, Hook::Pop);
            }
        }

        while let Some(id) = self.touched {
            if self.arena[id].depth <= self.depth {
                break;
            }
            let Some(node) = self.arena.remove(id) else {
                break;
            };
            self.touched = node.next_touched;
            self.slots[node.slot.index()] = node.next_in_stack;
        }

        self.popping = false;
    }

    /// Drop every element and start over at depth 1
    pub fn reset(&mut self) {
        self.arena.clear();
        self.slots.clear();
        self.slots.resize(self.defaults.slot_capacity(), None);
        self.depth = 0;
        self.touched = None;
        self.popping = false;
        self.push();
    }

    /// The backend side-effecting categories talk to
    pub fn backend_mut(&mut self) -> Option<&mut (dyn RenderBackend + 'static)> {
        self.backend.as_deref_mut()
    }

    /// Remove the backend, handing it back to the caller
    pub fn take_backend(&mut self) -> Option<Box<dyn RenderBackend>> {
        self.backend.take()
    }

    /// Make the element at `slot` current for this depth, pushing lazily
    fn sync_slot(&mut self, slot: StateSlot) -> Option<ElementId> {
        debug_assert!(!self.popping, "state element fetched while a pop is in progress");
        let default = self.defaults.element(slot)?;
        let index = slot.index();

        let current = match self.slots[index] {
            Some(id) => id,
            None => {
                let id = self.arena.insert(ElementNode {
                    element: default.create_default(),
                    slot,
                    depth: 0,
                    next_in_stack: None,
                    next_touched: None,
                });
                self.slots[index] = Some(id);
                id
            }
        };
        if self.arena[current].depth >= self.depth {
            return Some(current);
        }

        let pushed = self.arena.insert(ElementNode {
            element: default.create_default(),
            slot,
            depth: self.depth,
            next_in_stack: Some(current),
            next_touched: self.touched,
        });
        self.touched = Some(pushed);
        self.slots[index] = Some(pushed);
        self.run_hook(pushed, current, Hook::Push);
        Some(pushed)
    }

    /// Run a hook on `target` against `other`, with a view of everything else
    fn run_hook(&mut self, target: ElementId, other: ElementId, hook: Hook) {
        let mut element = std::mem::replace(&mut self.arena[target].element, Box::new(Detached));
        {
            let other = self.arena[other].element.as_ref();
            let mut cx = HookContext {
                state: StateView {
                    arena: &self.arena,
                    slots: &self.slots,
                    defaults: &self.defaults,
                    depth: self.depth,
                },
                backend: self.backend.as_deref_mut(),
            };
            match hook {
                Hook::Push => element.on_push(other, &mut cx),
                Hook::Pop => element.on_pop(other, &mut cx),
            }
        }
        self.arena[target].element = element;
    }
}

fn expect_category<E: Category>(element: &mut dyn StateElement) -> &mut E {
    match element.downcast_mut::<E>() {
        Some(element) => element,
        None => panic!(
            "element stored at {} is not a {}",
            E::slot(),
            std::any::type_name::<E>()
        ),
    }
}

impl fmt::Debug for TraversalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalState")
            .field("depth", &self.depth)
            .field("enabled", &self.defaults.enabled_count())
            .field("live_elements", &self.arena.len())
            .field("has_backend", &self.backend.is_some())
            .finish()
    }
}
