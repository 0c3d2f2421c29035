//! Property nodes: nodes that change traversal state for later siblings

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use super::node::{Node, NodeType, NODE_TYPE};
use crate::foundation::math::{Mat4, Mat4Ext, Transform, Vec3, Vec4};
use crate::render::{BlendMode, CullMode, Texture};
use crate::state::elements::{
    BlendModeElement, CameraElement, ColorElement, CullModeElement, ModelMatrixElement,
    TextureElement,
};
use crate::state::TraversalState;

/// Base type of all property nodes
pub static PROPERTY_TYPE: NodeType = NodeType::derived("Property", &NODE_TYPE);
/// Type of [`TransformNode`]
pub static TRANSFORM_TYPE: NodeType = NodeType::derived("Transform", &PROPERTY_TYPE);
/// Type of [`MaterialNode`]
pub static MATERIAL_TYPE: NodeType = NodeType::derived("Material", &PROPERTY_TYPE);
/// Type of [`BlendModeNode`]
pub static BLEND_MODE_TYPE: NodeType = NodeType::derived("BlendMode", &PROPERTY_TYPE);
/// Type of [`TextureNode`]
pub static TEXTURE_TYPE: NodeType = NodeType::derived("Texture", &PROPERTY_TYPE);
/// Type of [`CullModeNode`]
pub static CULL_MODE_TYPE: NodeType = NodeType::derived("CullMode", &PROPERTY_TYPE);
/// Type of [`CameraNode`]
pub static CAMERA_TYPE: NodeType = NodeType::derived("Camera", &PROPERTY_TYPE);

/// A node whose traversal writes one or more state categories.
///
/// `apply` is called by every action that dispatches properties. Categories
/// the action does not track are silently skipped by the element setters.
pub trait PropertyNode: Node {
    /// Write this node's values into the current state level
    fn apply(&self, state: &mut TraversalState);
}

/// Post-multiplies the model matrix
#[derive(Debug)]
pub struct TransformNode {
    matrix: Cell<Mat4>,
}

impl TransformNode {
    /// Create from a decomposed transform
    pub fn new(transform: &Transform) -> Self {
        Self::from_matrix(transform.to_matrix())
    }

    /// Create from an arbitrary matrix
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            matrix: Cell::new(matrix),
        }
    }

    /// Create a pure translation
    pub fn from_translation(translation: Vec3) -> Self {
        Self::from_matrix(Mat4::new_translation(&translation))
    }

    /// Matrix multiplied into the model matrix
    pub fn matrix(&self) -> Mat4 {
        self.matrix.get()
    }

    /// Replace the matrix with `transform` composed as T * R * S.
    /// Later traversals see the new value.
    pub fn set_transform(&self, transform: &Transform) {
        self.matrix.set(transform.to_matrix());
    }

    /// Replace the matrix
    pub fn set_matrix(&self, matrix: Mat4) {
        self.matrix.set(matrix);
    }
}

impl Node for TransformNode {
    fn node_type(&self) -> &'static NodeType {
        &TRANSFORM_TYPE
    }

    fn as_property(&self) -> Option<&dyn PropertyNode> {
        Some(self)
    }
}

impl PropertyNode for TransformNode {
    fn apply(&self, state: &mut TraversalState) {
        ModelMatrixElement::mult(state, &self.matrix.get());
    }
}

/// Sets the diffuse color
#[derive(Debug)]
pub struct MaterialNode {
    color: Cell<Vec4>,
}

impl MaterialNode {
    /// Create with an RGBA color
    pub fn new(color: Vec4) -> Self {
        Self {
            color: Cell::new(color),
        }
    }

    /// Create an opaque color
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(Vec4::new(r, g, b, 1.0))
    }

    /// Current RGBA color
    pub fn color(&self) -> Vec4 {
        self.color.get()
    }

    /// Change the color; later traversals see the new value
    pub fn set_color(&self, color: Vec4) {
        self.color.set(color);
    }
}

impl Node for MaterialNode {
    fn node_type(&self) -> &'static NodeType {
        &MATERIAL_TYPE
    }

    fn as_property(&self) -> Option<&dyn PropertyNode> {
        Some(self)
    }
}

impl PropertyNode for MaterialNode {
    fn apply(&self, state: &mut TraversalState) {
        ColorElement::set(state, self.color.get());
    }
}

/// Sets the blend mode
#[derive(Debug)]
pub struct BlendModeNode {
    mode: Cell<BlendMode>,
}

impl BlendModeNode {
    /// Create with a blend mode
    pub fn new(mode: BlendMode) -> Self {
        Self {
            mode: Cell::new(mode),
        }
    }

    /// Current blend mode
    pub fn mode(&self) -> BlendMode {
        self.mode.get()
    }

    /// Change the blend mode
    pub fn set_mode(&self, mode: BlendMode) {
        self.mode.set(mode);
    }
}

impl Node for BlendModeNode {
    fn node_type(&self) -> &'static NodeType {
        &BLEND_MODE_TYPE
    }

    fn as_property(&self) -> Option<&dyn PropertyNode> {
        Some(self)
    }
}

impl PropertyNode for BlendModeNode {
    fn apply(&self, state: &mut TraversalState) {
        BlendModeElement::set(state, self.mode.get());
    }
}

/// Binds a texture, or unbinds with `None`
#[derive(Debug, Default)]
pub struct TextureNode {
    texture: RefCell<Option<Arc<Texture>>>,
}

impl TextureNode {
    /// Create binding `texture`, or unbinding when `None`
    pub fn new(texture: Option<Arc<Texture>>) -> Self {
        Self {
            texture: RefCell::new(texture),
        }
    }

    /// Texture this node binds
    pub fn texture(&self) -> Option<Arc<Texture>> {
        self.texture.borrow().clone()
    }

    /// Change the bound texture
    pub fn set_texture(&self, texture: Option<Arc<Texture>>) {
        *self.texture.borrow_mut() = texture;
    }
}

impl Node for TextureNode {
    fn node_type(&self) -> &'static NodeType {
        &TEXTURE_TYPE
    }

    fn as_property(&self) -> Option<&dyn PropertyNode> {
        Some(self)
    }
}

impl PropertyNode for TextureNode {
    fn apply(&self, state: &mut TraversalState) {
        TextureElement::set(state, self.texture());
    }
}

/// Sets which faces are culled
#[derive(Debug)]
pub struct CullModeNode {
    mode: Cell<CullMode>,
}

impl CullModeNode {
    /// Create with a cull mode
    pub fn new(mode: CullMode) -> Self {
        Self {
            mode: Cell::new(mode),
        }
    }

    /// Current cull mode
    pub fn mode(&self) -> CullMode {
        self.mode.get()
    }

    /// Change the cull mode
    pub fn set_mode(&self, mode: CullMode) {
        self.mode.set(mode);
    }
}

impl Node for CullModeNode {
    fn node_type(&self) -> &'static NodeType {
        &CULL_MODE_TYPE
    }

    fn as_property(&self) -> Option<&dyn PropertyNode> {
        Some(self)
    }
}

impl PropertyNode for CullModeNode {
    fn apply(&self, state: &mut TraversalState) {
        CullModeElement::set(state, self.mode.get());
    }
}

/// Sets the view and projection matrices
#[derive(Debug)]
pub struct CameraNode {
    view: Cell<Mat4>,
    projection: Cell<Mat4>,
}

impl CameraNode {
    /// Create from explicit view and projection matrices
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view: Cell::new(view),
            projection: Cell::new(projection),
        }
    }

    /// Perspective camera at `eye` looking at `target`
    pub fn perspective(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(
            Mat4::look_at(eye, target, Vec3::y()),
            Mat4::perspective(fov_y, aspect, near, far),
        )
    }

    /// World to eye matrix
    pub fn view(&self) -> Mat4 {
        self.view.get()
    }

    /// Eye to clip matrix
    pub fn projection(&self) -> Mat4 {
        self.projection.get()
    }

    /// Change the view matrix
    pub fn set_view(&self, view: Mat4) {
        self.view.set(view);
    }

    /// Change the projection matrix
    pub fn set_projection(&self, projection: Mat4) {
        self.projection.set(projection);
    }

    /// Inverse of `projection * view`, for unprojecting picks. `None` when
    /// the camera matrices are singular.
    pub fn inverse_view_projection(&self) -> Option<Mat4> {
        (self.projection.get() * self.view.get()).try_inverse()
    }
}

impl Node for CameraNode {
    fn node_type(&self) -> &'static NodeType {
        &CAMERA_TYPE
    }

    fn as_property(&self) -> Option<&dyn PropertyNode> {
        Some(self)
    }
}

impl PropertyNode for CameraNode {
    fn apply(&self, state: &mut TraversalState) {
        CameraElement::set(state, self.view.get(), self.projection.get());
    }
}
