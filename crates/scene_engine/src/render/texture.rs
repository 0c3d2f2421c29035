//! Opaque texture handles
//!
//! Texture contents and upload live outside the engine. Nodes and state
//! elements only carry shared handles and compare them by identity.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

static NEXT_TEXTURE_ID: AtomicU32 = AtomicU32::new(1);

/// Handle for a texture resource owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// A texture as referenced from the scene
#[derive(Debug)]
pub struct Texture {
    id: TextureId,
    name: String,
}

impl Texture {
    /// New texture with a fresh id, shared for use in nodes
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: TextureId(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
        })
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Identity comparison of optional texture handles
pub fn same_texture(a: Option<&Arc<Texture>>, b: Option<&Arc<Texture>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
