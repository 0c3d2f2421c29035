//! Paths from a traversal root down to a node

use std::fmt;

use super::node::{same_node, NodeRef};

/// Chain of nodes from the root of a traversal to a node below it.
///
/// Actions keep the path of the node currently being traversed; results
/// such as pick hits and search matches hold copies of it.
#[derive(Clone, Default)]
pub struct Path {
    nodes: Vec<NodeRef>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, node: NodeRef) {
        self.nodes.push(node);
    }

    pub(crate) fn pop(&mut self) -> Option<NodeRef> {
        self.nodes.pop()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node: the root the traversal started at
    pub fn head(&self) -> Option<&NodeRef> {
        self.nodes.first()
    }

    /// Last node: the node the path leads to
    pub fn tail(&self) -> Option<&NodeRef> {
        self.nodes.last()
    }

    pub fn get(&self, index: usize) -> Option<&NodeRef> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeRef> {
        self.nodes.iter()
    }

    /// Whether `node` lies on this path
    pub fn contains(&self, node: &NodeRef) -> bool {
        self.nodes.iter().any(|candidate| same_node(candidate, node))
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.nodes.len() == other.nodes.len()
            && self.nodes.iter().zip(&other.nodes).all(|(a, b)| same_node(a, b))
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.nodes.iter().map(|node| node.name().unwrap_or(node.node_type().name())))
            .finish()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a NodeRef;
    type IntoIter = std::slice::Iter<'a, NodeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
