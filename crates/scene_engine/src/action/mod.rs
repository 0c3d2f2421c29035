//! # Actions
//!
//! An action is one kind of traversal over a scene: rendering, picking,
//! computing bounds, searching. Every action type owns a
//! [`DispatchTable`] saying what to do per node type and a
//! [`StateDefaults`](crate::state::StateDefaults) saying which state
//! categories it tracks. Both are built once per action type and shared by
//! all instances.
//!
//! ```text
//! apply(root)
//!   reset state, clear path
//!   begin_apply
//!   traverse(root)
//!     path.push(node)
//!     dispatch_table.resolve(node type)(action, node)
//!       group:    state.push, traverse children, state.pop
//!       property: write state categories
//!       shape:    read state categories, enumerate triangles
//!     path.pop
//!   end_apply
//! ```

mod bounding_box;
mod dispatch;
mod pick;
mod render;
mod search;

pub use bounding_box::BoundingBoxAction;
pub use dispatch::{DispatchTable, Handler};
pub use pick::{PickAction, PickedPoint};
pub use render::{RenderAction, RenderStats};
pub use search::{SearchAction, SearchInterest, SearchTarget};

use std::rc::Rc;

use crate::scene::{NodeRef, Path, Switch, GROUP_TYPE, NODE_TYPE, PROPERTY_TYPE, SWITCH_TYPE};
use crate::state::TraversalState;

/// Traversal bookkeeping shared by every action
#[derive(Debug)]
pub struct ActionCore {
    state: TraversalState,
    path: Path,
    terminated: bool,
}

impl ActionCore {
    /// Bookkeeping over `state`, with an empty path and not terminated
    pub fn new(state: TraversalState) -> Self {
        Self {
            state,
            path: Path::new(),
            terminated: false,
        }
    }
}

/// A traversal over a scene.
///
/// Implementors provide the shared dispatch table and access to their
/// [`ActionCore`]; everything else has a default.
pub trait Action: Sized + 'static {
    /// The dispatch table shared by all instances of this action type
    fn dispatch_table() -> &'static DispatchTable<Self>;

    /// Shared traversal bookkeeping
    fn core(&self) -> &ActionCore;

    /// Mutable counterpart of [`core`](Self::core)
    fn core_mut(&mut self) -> &mut ActionCore;

    /// Called after the state was reset, before the root is traversed
    fn begin_apply(&mut self) {}

    /// Called after the root was traversed
    fn end_apply(&mut self) {}

    /// Traversal state of the current apply
    fn state(&self) -> &TraversalState {
        &self.core().state
    }

    fn state_mut(&mut self) -> &mut TraversalState {
        &mut self.core_mut().state
    }

    /// Path from the root to the node being traversed
    fn path(&self) -> &Path {
        &self.core().path
    }

    /// Stop the traversal. Nodes not yet visited are skipped.
    fn terminate(&mut self) {
        self.core_mut().terminated = true;
    }

    /// Whether [`terminate`](Self::terminate) was called during this apply
    fn is_terminated(&self) -> bool {
        self.core().terminated
    }

    /// Visit `node` with this action's handler for its type
    fn traverse(&mut self, node: &NodeRef) {
        let handler = Self::dispatch_table().resolve(node.node_type());
        self.core_mut().path.push(Rc::clone(node));
        log::trace!(
            "{} at depth {}",
            node.node_type(),
            self.core().path.len()
        );
        handler(self, node);
        self.core_mut().path.pop();
    }

    /// Run the action over the scene rooted at `root`
    fn apply(&mut self, root: &NodeRef) {
        {
            let core = self.core_mut();
            core.state.reset();
            core.path.clear();
            core.terminated = false;
        }
        self.begin_apply();
        self.traverse(root);
        self.end_apply();
        log::debug!(
            "{} applied to {}{}",
            std::any::type_name::<Self>(),
            root.node_type(),
            if self.is_terminated() { " (terminated)" } else { "" }
        );
    }
}

/// Handler that does nothing
pub fn ignore_node<A: Action>(_action: &mut A, _node: &NodeRef) {}

/// Group handler: children in order inside one pushed state level
pub fn traverse_group<A: Action>(action: &mut A, node: &NodeRef) {
    let Some(group) = node.as_group() else {
        return;
    };
    action.state_mut().push();
    for child in group.children() {
        action.traverse(&child);
        if action.is_terminated() {
            break;
        }
    }
    action.state_mut().pop();
}

/// Switch handler: only the selected children, inside one pushed level
pub fn traverse_switch<A: Action>(action: &mut A, node: &NodeRef) {
    let Some(switch) = node.downcast_ref::<Switch>() else {
        traverse_group(action, node);
        return;
    };
    action.state_mut().push();
    for index in switch.selected() {
        let Ok(child) = switch.group().get(index) else {
            break;
        };
        action.traverse(&child);
        if action.is_terminated() {
            break;
        }
    }
    action.state_mut().pop();
}

/// Property handler: let the node write its categories
pub fn apply_property<A: Action>(action: &mut A, node: &NodeRef) {
    if let Some(property) = node.as_property() {
        property.apply(action.state_mut());
    }
}

/// Register the handlers every built-in action shares: nothing for unknown
/// nodes, group and switch traversal, and property application
pub fn register_standard_handlers<A: Action>(table: &DispatchTable<A>) {
    table.register(&NODE_TYPE, ignore_node::<A>);
    table.register(&GROUP_TYPE, traverse_group::<A>);
    table.register(&SWITCH_TYPE, traverse_switch::<A>);
    table.register(&PROPERTY_TYPE, apply_property::<A>);
}
