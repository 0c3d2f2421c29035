//! Finding nodes in a scene

use std::sync::{Arc, OnceLock};

use super::{traverse_group, traverse_switch, Action, ActionCore, DispatchTable};
use crate::scene::{same_node, NodeRef, NodeType, Path, GROUP_TYPE, NODE_TYPE, SWITCH_TYPE};
use crate::state::{StateDefaults, TraversalState};

/// What a search looks for
#[derive(Debug, Clone)]
pub enum SearchTarget {
    /// Nodes of this type or a type deriving from it
    Type(&'static NodeType),
    /// This very node
    Node(NodeRef),
    /// Nodes with this name
    Name(String),
}

impl SearchTarget {
    fn matches(&self, node: &NodeRef) -> bool {
        match self {
            SearchTarget::Type(ty) => node.is_a(*ty),
            SearchTarget::Node(target) => same_node(node, target),
            SearchTarget::Name(name) => node.name() == Some(name.as_str()),
        }
    }
}

/// Which matches a search keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchInterest {
    /// The first match in traversal order; the search stops there
    #[default]
    First,
    /// The last match in traversal order
    Last,
    /// Every match, in traversal order
    All,
}

/// Collects paths to the nodes matching a [`SearchTarget`].
///
/// Switches are searched the way they traverse unless
/// [`search_all_children`](Self::search_all_children) is set.
#[derive(Debug)]
pub struct SearchAction {
    core: ActionCore,
    target: SearchTarget,
    interest: SearchInterest,
    search_all_children: bool,
    paths: Vec<Path>,
}

impl SearchAction {
    /// A search tracks no state categories
    pub fn defaults() -> Arc<StateDefaults> {
        static DEFAULTS: OnceLock<Arc<StateDefaults>> = OnceLock::new();
        Arc::clone(DEFAULTS.get_or_init(|| Arc::new(StateDefaults::new())))
    }

    /// Search for `target`, collecting paths as `interest` asks
    pub fn new(target: SearchTarget, interest: SearchInterest) -> Self {
        Self {
            core: ActionCore::new(TraversalState::new(Self::defaults())),
            target,
            interest,
            search_all_children: false,
            paths: Vec::new(),
        }
    }

    /// Look into every child of a switch, not only the selected ones
    #[must_use]
    pub fn search_all_children(mut self, all: bool) -> Self {
        self.search_all_children = all;
        self
    }

    pub fn target(&self) -> &SearchTarget {
        &self.target
    }

    pub fn interest(&self) -> SearchInterest {
        self.interest
    }

    /// Matching paths from the last traversal
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// The single result for `First` and `Last` searches
    pub fn found(&self) -> Option<&Path> {
        self.paths.first()
    }

    fn check(&mut self, node: &NodeRef) {
        if !self.target.matches(node) {
            return;
        }
        let path = self.path().clone();
        match self.interest {
            SearchInterest::First => {
                self.paths.push(path);
                self.terminate();
            }
            SearchInterest::Last => {
                self.paths.clear();
                self.paths.push(path);
            }
            SearchInterest::All => self.paths.push(path),
        }
    }
}

fn visit_node(action: &mut SearchAction, node: &NodeRef) {
    action.check(node);
}

fn visit_group(action: &mut SearchAction, node: &NodeRef) {
    action.check(node);
    if !action.is_terminated() {
        traverse_group(action, node);
    }
}

fn visit_switch(action: &mut SearchAction, node: &NodeRef) {
    action.check(node);
    if action.is_terminated() {
        return;
    }
    if action.search_all_children {
        traverse_group(action, node);
    } else {
        traverse_switch(action, node);
    }
}

impl Action for SearchAction {
    fn dispatch_table() -> &'static DispatchTable<Self> {
        static TABLE: OnceLock<DispatchTable<SearchAction>> = OnceLock::new();
        TABLE.get_or_init(|| {
            let table = DispatchTable::new("SearchAction");
            table.register(&NODE_TYPE, visit_node);
            table.register(&GROUP_TYPE, visit_group);
            table.register(&SWITCH_TYPE, visit_switch);
            table
        })
    }

    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn begin_apply(&mut self) {
        self.paths.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Group, MaterialNode, Quad, Switch, SwitchChoice, QUAD_TYPE, SHAPE_TYPE};
    use std::rc::Rc;

    fn quad() -> NodeRef {
        Rc::new(Quad::unit())
    }

    #[test]
    fn test_first_stops_at_first_match() {
        let first = quad();
        let root: NodeRef = Rc::new(Group::with_children([Rc::clone(&first), quad(), quad()]));

        let mut action = SearchAction::new(SearchTarget::Type(&SHAPE_TYPE), SearchInterest::First);
        action.apply(&root);

        assert!(action.is_terminated());
        assert_eq!(action.paths().len(), 1);
        assert!(same_node(action.found().unwrap().tail().unwrap(), &first));
    }

    #[test]
    fn test_last_and_all() {
        let last = quad();
        let nested: NodeRef = Rc::new(Group::with_children([quad(), Rc::new(MaterialNode::rgb(1.0, 1.0, 1.0))]));
        let root: NodeRef = Rc::new(Group::with_children([quad(), nested, Rc::clone(&last)]));

        let mut action = SearchAction::new(SearchTarget::Type(&QUAD_TYPE), SearchInterest::Last);
        action.apply(&root);
        assert!(same_node(action.found().unwrap().tail().unwrap(), &last));

        let mut action = SearchAction::new(SearchTarget::Type(&QUAD_TYPE), SearchInterest::All);
        action.apply(&root);
        let depths: Vec<_> = action.paths().iter().map(Path::len).collect();
        assert_eq!(depths, [2, 3, 2]);
    }

    #[test]
    fn test_search_by_identity_and_name() {
        let target = quad();
        let root: NodeRef = Rc::new(Group::with_children([
            quad(),
            Rc::new(Group::named("lid")) as NodeRef,
            Rc::clone(&target),
        ]));

        let mut by_node = SearchAction::new(SearchTarget::Node(Rc::clone(&target)), SearchInterest::First);
        by_node.apply(&root);
        assert_eq!(by_node.found().unwrap().len(), 2);

        let mut by_name = SearchAction::new(SearchTarget::Name("lid".into()), SearchInterest::All);
        by_name.apply(&root);
        assert_eq!(by_name.paths().len(), 1);
    }

    #[test]
    fn test_switch_children_searched_on_request() {
        let hidden = quad();
        let switch: NodeRef = Rc::new(Switch::with_children([Rc::clone(&hidden)], SwitchChoice::None));
        let root: NodeRef = Rc::new(Group::with_children([switch]));

        let mut action = SearchAction::new(SearchTarget::Node(Rc::clone(&hidden)), SearchInterest::First);
        action.apply(&root);
        assert!(action.paths().is_empty());

        let mut action = SearchAction::new(SearchTarget::Node(hidden), SearchInterest::First)
            .search_all_children(true);
        action.apply(&root);
        assert_eq!(action.paths().len(), 1);
    }
}
