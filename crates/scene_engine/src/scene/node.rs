//! Node trait and the static node type hierarchy

use std::fmt;
use std::rc::Rc;

use super::group::Group;
use super::properties::PropertyNode;
use super::shapes::TriangleShape;
use crate::state::AsAny;

/// Shared handle to a node. Nodes may appear under several parents.
pub type NodeRef = Rc<dyn Node>;

/// Runtime type of a node, linked to its parent type.
///
/// Node types are declared as `static` items and identified by address, so
/// every node type must have exactly one static:
///
/// ```
/// use scene_engine::scene::{NodeType, SHAPE_TYPE};
///
/// static SPHERE_TYPE: NodeType = NodeType::derived("Sphere", &SHAPE_TYPE);
///
/// assert!(SPHERE_TYPE.is_a(&SHAPE_TYPE));
/// assert!(!SHAPE_TYPE.is_a(&SPHERE_TYPE));
/// ```
pub struct NodeType {
    name: &'static str,
    parent: Option<&'static NodeType>,
}

/// Hashable identity of a [`NodeType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeTypeId(usize);

impl NodeType {
    /// A type with no parent. Only the base [`NODE_TYPE`] should be one.
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// A type deriving from `parent`
    pub const fn derived(name: &'static str, parent: &'static NodeType) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static NodeType> {
        self.parent
    }

    pub fn id(&'static self) -> NodeTypeId {
        NodeTypeId(self as *const NodeType as usize)
    }

    /// This type followed by its parent, grandparent and so on
    pub fn ancestors(&'static self) -> impl Iterator<Item = &'static NodeType> {
        std::iter::successors(Some(self), |ty| ty.parent)
    }

    /// Whether this type is `other` or derives from it
    pub fn is_a(&'static self, other: &'static NodeType) -> bool {
        self.ancestors().any(|ty| std::ptr::eq(ty, other))
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Base of every node type
pub static NODE_TYPE: NodeType = NodeType::root("Node");

/// A node in the scene.
///
/// Nodes are immutable through the trait; node kinds that can be edited
/// after being shared use interior mutability. The `as_*` accessors expose
/// the capabilities generic traversal code needs without downcasting.
pub trait Node: AsAny + fmt::Debug {
    /// Runtime type, used for action dispatch
    fn node_type(&self) -> &'static NodeType;

    /// Optional user-facing name
    fn name(&self) -> Option<&str> {
        None
    }

    /// Child list of grouping nodes
    fn as_group(&self) -> Option<&Group> {
        None
    }

    /// State-changing behavior of property nodes
    fn as_property(&self) -> Option<&dyn PropertyNode> {
        None
    }

    /// Triangle geometry of shape nodes
    fn as_shape(&self) -> Option<&dyn TriangleShape> {
        None
    }
}

impl dyn Node {
    /// Downcast to a concrete node type
    pub fn downcast_ref<T: Node + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Whether this node's type is `ty` or derives from it
    pub fn is_a(&self, ty: &'static NodeType) -> bool {
        self.node_type().is_a(ty)
    }
}

/// Identity comparison of two node handles
pub fn same_node(a: &NodeRef, b: &NodeRef) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{GROUP_TYPE, SWITCH_TYPE};

    static LEAF_TYPE: NodeType = NodeType::derived("Leaf", &NODE_TYPE);

    #[derive(Debug)]
    struct Leaf;

    impl Node for Leaf {
        fn node_type(&self) -> &'static NodeType {
            &LEAF_TYPE
        }
    }

    #[test]
    fn test_ancestors_walk_to_root() {
        let names: Vec<_> = SWITCH_TYPE.ancestors().map(NodeType::name).collect();
        assert_eq!(names, ["Switch", "Group", "Node"]);
    }

    #[test]
    fn test_ids_are_distinct_per_static() {
        assert_eq!(GROUP_TYPE.id(), GROUP_TYPE.id());
        assert_ne!(GROUP_TYPE.id(), SWITCH_TYPE.id());
    }

    #[test]
    fn test_node_identity() {
        let a: NodeRef = Rc::new(Leaf);
        let b: NodeRef = Rc::new(Leaf);

        assert!(same_node(&a, &Rc::clone(&a)));
        assert!(!same_node(&a, &b));
        assert!(a.downcast_ref::<Leaf>().is_some());
        assert!(a.is_a(&NODE_TYPE));
        assert!(!a.is_a(&GROUP_TYPE));
    }
}
