//! # Render boundary
//!
//! The engine's only contact with a graphics API. Side-effecting state
//! elements and the render action talk to a [`RenderBackend`]; textures are
//! carried as opaque [`Texture`] handles.
//!
//! [`RecordingBackend`] implements the trait by logging each call, which is
//! what tests and the demo use in place of a real device.

mod backend;
mod commands;
mod texture;

pub use backend::{BlendMode, CullMode, RenderBackend};
pub use commands::{CommandLog, RecordingBackend, RenderCommand};
pub use texture::{same_texture, Texture, TextureId};
