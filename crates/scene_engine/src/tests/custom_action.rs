//! Extending the engine from outside the built-in set
//!
//! A new node type and a new action, registered the same way the built-in
//! ones are, and checked against dispatch fallback and caching.

use std::rc::Rc;
use std::sync::{Arc, OnceLock};

use crate::action::{register_standard_handlers, Action, ActionCore, BoundingBoxAction, DispatchTable};
use crate::scene::{Group, Node, NodeRef, NodeType, Quad, Switch, SwitchChoice, NODE_TYPE};
use crate::state::{StateDefaults, TraversalState};

static LABEL_TYPE: NodeType = NodeType::derived("Label", &NODE_TYPE);
static HEADING_TYPE: NodeType = NodeType::derived("Heading", &LABEL_TYPE);

#[derive(Debug)]
struct Label {
    text: String,
    heading: bool,
}

impl Label {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            heading: false,
        }
    }

    fn heading(text: &str) -> Self {
        Self {
            text: text.to_string(),
            heading: true,
        }
    }
}

impl Node for Label {
    fn node_type(&self) -> &'static NodeType {
        if self.heading {
            &HEADING_TYPE
        } else {
            &LABEL_TYPE
        }
    }

    fn name(&self) -> Option<&str> {
        Some(&self.text)
    }
}

/// Collects label text in traversal order
#[derive(Debug)]
struct CollectLabels {
    core: ActionCore,
    texts: Vec<String>,
}

impl CollectLabels {
    fn new() -> Self {
        Self {
            core: ActionCore::new(TraversalState::new(Arc::new(StateDefaults::new()))),
            texts: Vec::new(),
        }
    }
}

fn collect_label(action: &mut CollectLabels, node: &NodeRef) {
    if let Some(label) = node.downcast_ref::<Label>() {
        action.texts.push(label.text.clone());
    }
}

impl Action for CollectLabels {
    fn dispatch_table() -> &'static DispatchTable<Self> {
        static TABLE: OnceLock<DispatchTable<CollectLabels>> = OnceLock::new();
        TABLE.get_or_init(|| {
            let table = DispatchTable::new("CollectLabels");
            register_standard_handlers(&table);
            table.register(&LABEL_TYPE, collect_label);
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
        self.texts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled_scene() -> NodeRef {
        let switch: NodeRef = Rc::new(Switch::with_children(
            [
                Rc::new(Label::new("hidden")) as NodeRef,
                Rc::new(Label::new("shown")),
            ],
            SwitchChoice::Child(1),
        ));
        Rc::new(Group::with_children([
            Rc::new(Label::heading("title")) as NodeRef,
            Rc::new(Quad::unit()),
            switch,
            Rc::new(Label::new("footer")),
        ]))
    }

    #[test]
    fn test_derived_type_falls_back_and_resolution_is_cached() {
        let table = CollectLabels::dispatch_table();
        let scene = labelled_scene();

        let mut action = CollectLabels::new();
        action.apply(&scene);
        assert_eq!(action.texts, ["title", "shown", "footer"]);
        assert!(!table.is_registered(&HEADING_TYPE));

        let walks = table.hierarchy_walks();
        for _ in 0..3 {
            action.apply(&scene);
        }
        assert_eq!(table.hierarchy_walks(), walks);
        assert_eq!(action.texts.len(), 3);
    }

    #[test]
    fn test_unknown_node_type_is_ignored_by_builtin_actions() {
        let root: NodeRef = Rc::new(Group::with_children([
            Rc::new(Label::new("note")) as NodeRef,
            Rc::new(Quad::unit()),
        ]));

        let mut bounds = BoundingBoxAction::new();
        bounds.apply(&root);
        assert!(!bounds.bounding_box().is_empty());
    }
}
