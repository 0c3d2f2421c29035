//! Recorded render commands
//!
//! [`RecordingBackend`] is a [`RenderBackend`] that performs no graphics work
//! and instead appends every call it receives to a shared [`CommandLog`]. The
//! log stays readable after the backend was moved into a traversal state.

use std::cell::RefCell;
use std::rc::Rc;

use super::backend::{BlendMode, CullMode, RenderBackend};
use super::texture::TextureId;
use crate::foundation::math::{Mat4, Vec4};
use crate::scene::{GeneratedTriangle, VertexAttributes};

/// One call made on a backend
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Start of a render pass
    BeginFrame,
    /// End of a render pass
    EndFrame,
    /// Object to world matrix
    LoadModelMatrix(Mat4),
    /// World to eye matrix
    LoadViewMatrix(Mat4),
    /// Eye to clip matrix
    LoadProjectionMatrix(Mat4),
    /// Diffuse color
    SetColor(Vec4),
    /// Blend mode
    SetBlendMode(BlendMode),
    /// Texture binding by id, `None` unbinds
    BindTexture(Option<TextureId>),
    /// Face culling
    SetCullMode(CullMode),
    /// One shape's triangles in local space
    DrawTriangles {
        /// Triangles in generation order
        triangles: Vec<GeneratedTriangle>,
        /// Attributes present on every vertex
        attributes: VertexAttributes,
    },
}

impl RenderCommand {
    /// Whether this command changes committed state rather than drawing or
    /// framing
    pub fn is_state_change(&self) -> bool {
        !matches!(
            self,
            RenderCommand::BeginFrame | RenderCommand::EndFrame | RenderCommand::DrawTriangles { .. }
        )
    }
}

/// Shared handle onto the commands recorded by a [`RecordingBackend`]
pub type CommandLog = Rc<RefCell<Vec<RenderCommand>>>;

/// Backend that records every call
#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: CommandLog,
}

impl RecordingBackend {
    /// Create a backend with an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto the log, valid after the backend was boxed away
    pub fn log(&self) -> CommandLog {
        Rc::clone(&self.log)
    }

    fn record(&mut self, command: RenderCommand) {
        log::trace!("backend command: {:?}", command);
        self.log.borrow_mut().push(command);
    }
}

impl RenderBackend for RecordingBackend {
    fn begin_frame(&mut self) {
        self.record(RenderCommand::BeginFrame);
    }

    fn end_frame(&mut self) {
        self.record(RenderCommand::EndFrame);
    }

    fn load_model_matrix(&mut self, matrix: &Mat4) {
        self.record(RenderCommand::LoadModelMatrix(*matrix));
    }

    fn load_view_matrix(&mut self, matrix: &Mat4) {
        self.record(RenderCommand::LoadViewMatrix(*matrix));
    }

    fn load_projection_matrix(&mut self, matrix: &Mat4) {
        self.record(RenderCommand::LoadProjectionMatrix(*matrix));
    }

    fn set_color(&mut self, color: &Vec4) {
        self.record(RenderCommand::SetColor(*color));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.record(RenderCommand::SetBlendMode(mode));
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.record(RenderCommand::BindTexture(texture));
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.record(RenderCommand::SetCullMode(mode));
    }

    fn draw_triangles(&mut self, triangles: &[GeneratedTriangle], attributes: VertexAttributes) {
        self.record(RenderCommand::DrawTriangles {
            triangles: triangles.to_vec(),
            attributes,
        });
    }
}
