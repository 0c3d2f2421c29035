//! Built-in state categories
//!
//! Every category comes in a quiet form (`new`) and an emitting form
//! (`emitting`) that forwards committed changes to the traversal's
//! [`RenderBackend`](crate::render::RenderBackend). Actions that draw enable
//! the emitting forms in their defaults; all others use the quiet ones.

mod appearance;
mod matrix;

pub use appearance::{BlendModeElement, ColorElement, CullModeElement, TextureElement};
pub use matrix::{CameraElement, ModelMatrixElement};
