//! # Traversal state
//!
//! Accumulated rendering state as a stack of stacks. Each category of state
//! (model matrix, color, texture, ...) is registered once under a
//! [`StateSlot`] and gets its own stack inside a [`TraversalState`]. The
//! stacks are lazy: entering a level costs nothing until a category is
//! fetched for mutation there, and leaving a level only unwinds the
//! categories that were actually changed.
//!
//! Which categories a traversal tracks, and their initial values, is fixed
//! by a shared [`StateDefaults`] per action type.

mod defaults;
mod element;
pub mod elements;
mod slot;
mod traversal;
mod view;

pub use defaults::StateDefaults;
pub use element::{AsAny, Category, HookContext, StateElement};
pub use slot::{register_category, registered_slot_count, LazySlot, StateSlot};
pub use traversal::TraversalState;
pub use view::StateView;
