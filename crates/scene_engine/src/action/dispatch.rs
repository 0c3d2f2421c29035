//! Per-action dispatch tables keyed by node type

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::scene::{NodeRef, NodeType, NodeTypeId};

/// What an action does when it reaches a node of some type
pub type Handler<A> = fn(&mut A, &NodeRef);

/// Maps node types to handlers for one action type.
///
/// Lookups fall back along the node type's parent chain, so a handler
/// registered for a base type serves every derived type without its own
/// entry. Resolved lookups are cached per type; registering a handler
/// invalidates the cache.
pub struct DispatchTable<A> {
    action: &'static str,
    registered: Mutex<HashMap<NodeTypeId, Handler<A>>>,
    resolved: Mutex<HashMap<NodeTypeId, Handler<A>>>,
    hierarchy_walks: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<A> DispatchTable<A> {
    /// Empty table. `action` names the action type in diagnostics.
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            registered: Mutex::new(HashMap::new()),
            resolved: Mutex::new(HashMap::new()),
            hierarchy_walks: AtomicUsize::new(0),
        }
    }

    /// Install `handler` for `node_type` and everything deriving from it
    /// that has no closer handler
    pub fn register(&self, node_type: &'static NodeType, handler: Handler<A>) {
        lock(&self.registered).insert(node_type.id(), handler);
        lock(&self.resolved).clear();
        log::debug!("{}: registered handler for {}", self.action, node_type);
    }

    /// Whether `node_type` has a handler of its own
    pub fn is_registered(&self, node_type: &'static NodeType) -> bool {
        lock(&self.registered).contains_key(&node_type.id())
    }

    /// Handler for `node_type`, or `None` when neither it nor any ancestor
    /// has one
    pub fn try_resolve(&self, node_type: &'static NodeType) -> Option<Handler<A>> {
        let id = node_type.id();
        if let Some(handler) = lock(&self.resolved).get(&id) {
            return Some(*handler);
        }

        self.hierarchy_walks.fetch_add(1, Ordering::Relaxed);
        let handler = {
            let registered = lock(&self.registered);
            node_type
                .ancestors()
                .find_map(|ty| registered.get(&ty.id()).copied())?
        };
        lock(&self.resolved).insert(id, handler);
        Some(handler)
    }

    /// Handler for `node_type`.
    ///
    /// # Panics
    ///
    /// When no handler is reachable from `node_type`. Every built-in action
    /// registers one for [`NODE_TYPE`](crate::scene::NODE_TYPE), so this only
    /// happens for tables that were set up without a root handler.
    pub fn resolve(&self, node_type: &'static NodeType) -> Handler<A> {
        match self.try_resolve(node_type) {
            Some(handler) => handler,
            None => panic!(
                "{}: no handler reachable for node type {}",
                self.action, node_type
            ),
        }
    }

    /// Number of lookups that had to walk the type hierarchy
    pub fn hierarchy_walks(&self) -> usize {
        self.hierarchy_walks.load(Ordering::Relaxed)
    }
}

impl<A> fmt::Debug for DispatchTable<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("action", &self.action)
            .field("registered", &lock(&self.registered).len())
            .field("resolved", &lock(&self.resolved).len())
            .field("hierarchy_walks", &self.hierarchy_walks())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Group, GROUP_TYPE, NODE_TYPE, SWITCH_TYPE};
    use std::rc::Rc;

    #[derive(Default)]
    struct Visits(Vec<&'static str>);

    fn on_node(visits: &mut Visits, _node: &NodeRef) {
        visits.0.push("node");
    }

    fn on_group(visits: &mut Visits, _node: &NodeRef) {
        visits.0.push("group");
    }

    #[test]
    fn test_falls_back_to_nearest_ancestor() {
        let table = DispatchTable::<Visits>::new("Visits");
        table.register(&NODE_TYPE, on_node);
        table.register(&GROUP_TYPE, on_group);

        let mut visits = Visits::default();
        let node: NodeRef = Rc::new(Group::new());
        table.resolve(&SWITCH_TYPE)(&mut visits, &node);
        table.resolve(&NODE_TYPE)(&mut visits, &node);

        assert_eq!(visits.0, ["group", "node"]);
    }

    #[test]
    fn test_second_lookup_is_cached() {
        let table = DispatchTable::<Visits>::new("Visits");
        table.register(&GROUP_TYPE, on_group);

        table.resolve(&SWITCH_TYPE);
        assert_eq!(table.hierarchy_walks(), 1);
        table.resolve(&SWITCH_TYPE);
        assert_eq!(table.hierarchy_walks(), 1);
    }

    #[test]
    fn test_registration_invalidates_cache() {
        let table = DispatchTable::<Visits>::new("Visits");
        table.register(&GROUP_TYPE, on_group);
        table.resolve(&SWITCH_TYPE);

        table.register(&SWITCH_TYPE, on_node);
        let mut visits = Visits::default();
        let node: NodeRef = Rc::new(Group::new());
        table.resolve(&SWITCH_TYPE)(&mut visits, &node);

        assert_eq!(table.hierarchy_walks(), 2);
        assert_eq!(visits.0, ["node"]);
        assert!(table.is_registered(&SWITCH_TYPE));
    }

    #[test]
    fn test_unreachable_type_has_no_handler() {
        let table = DispatchTable::<Visits>::new("Visits");
        table.register(&GROUP_TYPE, on_group);
        assert!(table.try_resolve(&NODE_TYPE).is_none());
    }

    #[test]
    #[should_panic(expected = "no handler reachable")]
    fn test_resolve_without_handler_panics() {
        let table = DispatchTable::<Visits>::new("Visits");
        table.resolve(&GROUP_TYPE);
    }
}
