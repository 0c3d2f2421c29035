//! Backend abstraction for the graphics side effects of a render traversal
//!
//! The traversal engine never talks to a graphics API itself. Side-effecting
//! state elements forward committed values to a [`RenderBackend`], and the
//! render action hands it batches of triangles to draw.

use std::fmt;

use super::texture::TextureId;
use crate::foundation::math::{Mat4, Vec4};
use crate::scene::{GeneratedTriangle, VertexAttributes};

/// Blending modes for subsequent draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// No blending, fragments replace what is there
    #[default]
    Opaque,
    /// Standard alpha blending
    Alpha,
    /// Additive blending for particles and lights
    Additive,
    /// Multiplicative blending
    Multiply,
}

/// Face culling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    /// No culling
    #[default]
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

/// Receiver of the state changes and draws produced by a render traversal.
///
/// Every call corresponds to exactly one committed change; the engine never
/// issues the same state twice for a single depth transition.
pub trait RenderBackend: fmt::Debug {
    /// Start of a render traversal
    fn begin_frame(&mut self) {}

    /// End of a render traversal
    fn end_frame(&mut self) {}

    /// Model-to-world matrix for subsequent draws
    fn load_model_matrix(&mut self, matrix: &Mat4);

    /// World-to-view matrix
    fn load_view_matrix(&mut self, matrix: &Mat4);

    /// View-to-clip matrix
    fn load_projection_matrix(&mut self, matrix: &Mat4);

    /// Base color for subsequent draws
    fn set_color(&mut self, color: &Vec4);

    /// Blend mode for subsequent draws
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Bind a texture, or unbind with `None`
    fn bind_texture(&mut self, texture: Option<TextureId>);

    /// Face culling for subsequent draws
    fn set_cull_mode(&mut self, mode: CullMode);

    /// Draw a batch of triangles using the committed state
    fn draw_triangles(&mut self, triangles: &[GeneratedTriangle], attributes: VertexAttributes);
}
