//! Scene description
//!
//! A scene is a tree (more precisely a DAG, since nodes may be shared) of
//! [`Node`]s held as [`NodeRef`]s:
//!
//! ```text
//! Group
//!  ├── CameraNode
//!  ├── TransformNode      property: changes state for later siblings
//!  ├── MaterialNode
//!  ├── Quad               shape: reads state, yields triangles
//!  └── Switch
//!       └── ...
//! ```
//!
//! Nodes describe; they do not traverse themselves. Actions walk the tree
//! and look up what to do for each node through its [`NodeType`].

mod group;
mod node;
mod path;
mod properties;
mod shapes;

pub use group::{Children, Group, Switch, SwitchChoice, GROUP_TYPE, SWITCH_TYPE};
pub use node::{same_node, Node, NodeRef, NodeType, NodeTypeId, NODE_TYPE};
pub use path::Path;
pub use properties::{
    BlendModeNode, CameraNode, CullModeNode, MaterialNode, PropertyNode, TextureNode,
    TransformNode, BLEND_MODE_TYPE, CAMERA_TYPE, CULL_MODE_TYPE, MATERIAL_TYPE, PROPERTY_TYPE,
    TEXTURE_TYPE, TRANSFORM_TYPE,
};
pub use shapes::{
    GeneratedTriangle, IndexedTriangleSet, Quad, TriangleSet, TriangleShape, TriangleVertex,
    Vertex, VertexAttributes, INDEXED_TRIANGLE_SET_TYPE, QUAD_TYPE, SHAPE_TYPE, TRIANGLE_SET_TYPE,
};

/// Errors from building or editing a scene
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Child index outside the group
    #[error("Index {index} out of range for group of {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    /// Vertex or index count not a multiple of three
    #[error("{len} entries do not form whole triangles")]
    IncompleteTriangle { len: usize },

    /// Triangle index pointing past the vertex pool
    #[error("Vertex index {index} out of range for {vertex_count} vertices")]
    InvalidVertexIndex { index: u32, vertex_count: usize },
}
