//! Appearance categories: color, blending, texture and face culling

use std::sync::Arc;

use crate::foundation::math::Vec4;
use crate::render::{same_texture, BlendMode, CullMode, Texture};
use crate::state::{Category, HookContext, LazySlot, StateElement, StateSlot, TraversalState};

/// Diffuse base color
#[derive(Debug, Clone, PartialEq)]
pub struct ColorElement {
    color: Vec4,
    emits: bool,
}

impl ColorElement {
    /// Opaque white
    pub const DEFAULT_COLOR: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);

    /// Tracking-only element starting at [`DEFAULT_COLOR`](Self::DEFAULT_COLOR)
    pub fn new() -> Self {
        Self {
            color: Self::DEFAULT_COLOR,
            emits: false,
        }
    }

    /// Element that forwards every change to the render backend
    pub fn emitting() -> Self {
        Self {
            emits: true,
            ..Self::new()
        }
    }

    /// Color held at this level
    pub fn color(&self) -> Vec4 {
        self.color
    }

    /// Current color, or `None` when the state does not track color
    pub fn get(state: &TraversalState) -> Option<Vec4> {
        state.element::<Self>().map(|element| element.color)
    }

    /// Set the color at the current level. Setting the value already in
    /// effect is a no-op and emits nothing.
    pub fn set(state: &mut TraversalState, color: Vec4) {
        let Some((element, backend)) = state.element_mut_with_backend::<Self>() else {
            return;
        };
        if element.color == color {
            return;
        }
        element.color = color;
        if let (true, Some(backend)) = (element.emits, backend) {
            backend.set_color(&color);
        }
    }
}

impl Default for ColorElement {
    fn default() -> Self {
        Self::new()
    }
}

impl StateElement for ColorElement {
    fn create_default(&self) -> Box<dyn StateElement> {
        Box::new(self.clone())
    }

    fn on_push(&mut self, below: &dyn StateElement, _cx: &mut HookContext<'_>) {
        if let Some(below) = below.downcast_ref::<Self>() {
            self.color = below.color;
        }
    }

    fn on_pop(&mut self, popped: &dyn StateElement, cx: &mut HookContext<'_>) {
        let changed = popped
            .downcast_ref::<Self>()
            .map_or(true, |popped| popped.color != self.color);
        if self.emits && changed {
            cx.with_backend(|backend| backend.set_color(&self.color));
        }
    }
}

impl Category for ColorElement {
    fn slot() -> StateSlot {
        static SLOT: LazySlot = LazySlot::new();
        SLOT.get()
    }
}

/// Blend mode for subsequent draws
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlendModeElement {
    mode: BlendMode,
    emits: bool,
}

impl BlendModeElement {
    /// Tracking-only element, opaque
    pub fn new() -> Self {
        Self::default()
    }

    /// Element that forwards every change to the render backend
    pub fn emitting() -> Self {
        Self {
            emits: true,
            ..Self::new()
        }
    }

    /// Blend mode held at this level
    pub fn mode(&self) -> BlendMode {
        self.mode
    }

    /// Current blend mode, if tracked
    pub fn get(state: &TraversalState) -> Option<BlendMode> {
        state.element::<Self>().map(|element| element.mode)
    }

    /// Set the blend mode at the current level
    pub fn set(state: &mut TraversalState, mode: BlendMode) {
        let Some((element, backend)) = state.element_mut_with_backend::<Self>() else {
            return;
        };
        if element.mode == mode {
            return;
        }
        element.mode = mode;
        if let (true, Some(backend)) = (element.emits, backend) {
            backend.set_blend_mode(mode);
        }
    }
}

impl StateElement for BlendModeElement {
    fn create_default(&self) -> Box<dyn StateElement> {
        Box::new(self.clone())
    }

    fn on_push(&mut self, below: &dyn StateElement, _cx: &mut HookContext<'_>) {
        if let Some(below) = below.downcast_ref::<Self>() {
            self.mode = below.mode;
        }
    }

    fn on_pop(&mut self, popped: &dyn StateElement, cx: &mut HookContext<'_>) {
        let changed = popped
            .downcast_ref::<Self>()
            .map_or(true, |popped| popped.mode != self.mode);
        if self.emits && changed {
            let mode = self.mode;
            cx.with_backend(|backend| backend.set_blend_mode(mode));
        }
    }
}

impl Category for BlendModeElement {
    fn slot() -> StateSlot {
        static SLOT: LazySlot = LazySlot::new();
        SLOT.get()
    }
}

/// Bound texture, compared by handle identity only
#[derive(Debug, Clone, Default)]
pub struct TextureElement {
    texture: Option<Arc<Texture>>,
    emits: bool,
}

impl TextureElement {
    /// No texture bound
    pub fn new() -> Self {
        Self::default()
    }

    /// Element that forwards every change to the render backend
    pub fn emitting() -> Self {
        Self {
            emits: true,
            ..Self::new()
        }
    }

    /// Texture bound at this level
    pub fn texture(&self) -> Option<&Arc<Texture>> {
        self.texture.as_ref()
    }

    /// Current binding. The outer `None` means texture is not tracked.
    pub fn get(state: &TraversalState) -> Option<Option<Arc<Texture>>> {
        state.element::<Self>().map(|element| element.texture.clone())
    }

    /// Bind `texture`, or unbind with `None`
    pub fn set(state: &mut TraversalState, texture: Option<Arc<Texture>>) {
        let Some((element, backend)) = state.element_mut_with_backend::<Self>() else {
            return;
        };
        if same_texture(element.texture.as_ref(), texture.as_ref()) {
            return;
        }
        element.texture = texture;
        if let (true, Some(backend)) = (element.emits, backend) {
            backend.bind_texture(element.texture.as_ref().map(|texture| texture.id()));
        }
    }
}

impl StateElement for TextureElement {
    fn create_default(&self) -> Box<dyn StateElement> {
        Box::new(self.clone())
    }

    fn on_push(&mut self, below: &dyn StateElement, _cx: &mut HookContext<'_>) {
        if let Some(below) = below.downcast_ref::<Self>() {
            self.texture = below.texture.clone();
        }
    }

    fn on_pop(&mut self, popped: &dyn StateElement, cx: &mut HookContext<'_>) {
        let changed = popped
            .downcast_ref::<Self>()
            .map_or(true, |popped| !same_texture(popped.texture.as_ref(), self.texture.as_ref()));
        if self.emits && changed {
            let id = self.texture.as_ref().map(|texture| texture.id());
            cx.with_backend(|backend| backend.bind_texture(id));
        }
    }
}

impl Category for TextureElement {
    fn slot() -> StateSlot {
        static SLOT: LazySlot = LazySlot::new();
        SLOT.get()
    }
}

/// Which faces are culled, honored by drawing and by picking
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CullModeElement {
    mode: CullMode,
    emits: bool,
}

impl CullModeElement {
    /// Two-sided: nothing culled
    pub fn new() -> Self {
        Self::default()
    }

    /// Element that forwards every change to the render backend
    pub fn emitting() -> Self {
        Self {
            emits: true,
            ..Self::new()
        }
    }

    /// Cull mode held at this level
    pub fn mode(&self) -> CullMode {
        self.mode
    }

    /// Current cull mode, if tracked
    pub fn get(state: &TraversalState) -> Option<CullMode> {
        state.element::<Self>().map(|element| element.mode)
    }

    /// Set the cull mode at the current level
    pub fn set(state: &mut TraversalState, mode: CullMode) {
        let Some((element, backend)) = state.element_mut_with_backend::<Self>() else {
            return;
        };
        if element.mode == mode {
            return;
        }
        element.mode = mode;
        if let (true, Some(backend)) = (element.emits, backend) {
            backend.set_cull_mode(mode);
        }
    }
}

impl StateElement for CullModeElement {
    fn create_default(&self) -> Box<dyn StateElement> {
        Box::new(self.clone())
    }

    fn on_push(&mut self, below: &dyn StateElement, _cx: &mut HookContext<'_>) {
        if let Some(below) = below.downcast_ref::<Self>() {
            self.mode = below.mode;
        }
    }

    fn on_pop(&mut self, popped: &dyn StateElement, cx: &mut HookContext<'_>) {
        let changed = popped
            .downcast_ref::<Self>()
            .map_or(true, |popped| popped.mode != self.mode);
        if self.emits && changed {
            let mode = self.mode;
            cx.with_backend(|backend| backend.set_cull_mode(mode));
        }
    }
}

impl Category for CullModeElement {
    fn slot() -> StateSlot {
        static SLOT: LazySlot = LazySlot::new();
        SLOT.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RecordingBackend, RenderCommand};
    use crate::state::StateDefaults;

    fn recording_state(defaults: StateDefaults) -> (TraversalState, crate::render::CommandLog) {
        let backend = RecordingBackend::new();
        let log = backend.log();
        (TraversalState::with_backend(Arc::new(defaults), Box::new(backend)), log)
    }

    #[test]
    fn test_unchanged_value_across_pop_is_silent() {
        let (mut state, log) = recording_state(StateDefaults::new().with(ColorElement::emitting()));

        state.push();
        ColorElement::set(&mut state, ColorElement::DEFAULT_COLOR);
        state.pop();

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_texture_change_is_detected_by_identity() {
        let (mut state, log) = recording_state(StateDefaults::new().with(TextureElement::emitting()));
        let first = Texture::new("checker");
        let twin = Texture::new("checker");

        TextureElement::set(&mut state, Some(Arc::clone(&first)));
        TextureElement::set(&mut state, Some(Arc::clone(&first)));
        state.push();
        TextureElement::set(&mut state, Some(Arc::clone(&twin)));
        state.pop();

        assert_eq!(
            *log.borrow(),
            vec![
                RenderCommand::BindTexture(Some(first.id())),
                RenderCommand::BindTexture(Some(twin.id())),
                RenderCommand::BindTexture(Some(first.id())),
            ]
        );
    }

    #[test]
    fn test_blend_and_cull_restore_on_pop() {
        let defaults = StateDefaults::new()
            .with(BlendModeElement::emitting())
            .with(CullModeElement::emitting());
        let (mut state, log) = recording_state(defaults);

        state.push();
        BlendModeElement::set(&mut state, BlendMode::Alpha);
        CullModeElement::set(&mut state, CullMode::Back);
        state.pop();

        assert_eq!(BlendModeElement::get(&state), Some(BlendMode::Opaque));
        assert_eq!(CullModeElement::get(&state), Some(CullMode::None));
        let log = log.borrow();
        assert_eq!(log.len(), 4);
        assert!(log.contains(&RenderCommand::SetBlendMode(BlendMode::Opaque)));
        assert!(log.contains(&RenderCommand::SetCullMode(CullMode::None)));
    }
}
