//! Render traversal

use std::sync::{Arc, OnceLock};

use super::{register_standard_handlers, Action, ActionCore, DispatchTable};
use crate::core::RenderConfig;
use crate::render::RenderBackend;
use crate::scene::{GeneratedTriangle, NodeRef, SHAPE_TYPE};
use crate::state::elements::{
    BlendModeElement, CameraElement, ColorElement, CullModeElement, ModelMatrixElement,
    TextureElement,
};
use crate::state::{StateDefaults, TraversalState};

/// Counters from the last render traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub shapes: usize,
    pub triangles: usize,
}

/// Draws a scene into a [`RenderBackend`].
///
/// State changes reach the backend as they are committed: property nodes
/// trigger commands through the element setters, and leaving a group
/// restores whatever the group changed. Shapes are drawn as one triangle
/// batch each.
#[derive(Debug)]
pub struct RenderAction {
    core: ActionCore,
    config: RenderConfig,
    stats: RenderStats,
    batch: Vec<GeneratedTriangle>,
}

impl RenderAction {
    /// Categories a render traversal tracks, all forwarding to the backend
    pub fn defaults() -> Arc<StateDefaults> {
        static DEFAULTS: OnceLock<Arc<StateDefaults>> = OnceLock::new();
        Arc::clone(DEFAULTS.get_or_init(|| {
            Arc::new(
                StateDefaults::new()
                    .with(ModelMatrixElement::emitting())
                    .with(CameraElement::emitting())
                    .with(ColorElement::emitting())
                    .with(BlendModeElement::emitting())
                    .with(TextureElement::emitting())
                    .with(CullModeElement::emitting()),
            )
        }))
    }

    /// Render into `backend` with the default configuration
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self::with_config(backend, RenderConfig::default())
    }

    pub fn with_config(backend: Box<dyn RenderBackend>, config: RenderConfig) -> Self {
        Self {
            core: ActionCore::new(TraversalState::with_backend(Self::defaults(), backend)),
            config,
            stats: RenderStats::default(),
            batch: Vec::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Counters from the last traversal
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// The backend, unless it was taken
    pub fn backend_mut(&mut self) -> Option<&mut (dyn RenderBackend + 'static)> {
        self.state_mut().backend_mut()
    }

    /// Hand the backend back, leaving the action without one
    pub fn take_backend(&mut self) -> Option<Box<dyn RenderBackend>> {
        self.state_mut().take_backend()
    }

    /// Send every category's starting value, so nothing left over from a
    /// previous frame leaks into this one
    fn prime_backend(&mut self) {
        let state = self.state();
        let model = ModelMatrixElement::get(state);
        let camera = CameraElement::get(state).map(|camera| (*camera.view(), *camera.projection()));
        let color = ColorElement::get(state);
        let blend = BlendModeElement::get(state);
        let texture = TextureElement::get(state).map(|texture| texture.map(|texture| texture.id()));
        let cull = CullModeElement::get(state);

        let Some(backend) = self.backend_mut() else {
            return;
        };
        if let Some(model) = model {
            backend.load_model_matrix(&model);
        }
        if let Some((view, projection)) = camera {
            backend.load_view_matrix(&view);
            backend.load_projection_matrix(&projection);
        }
        if let Some(color) = color {
            backend.set_color(&color);
        }
        if let Some(blend) = blend {
            backend.set_blend_mode(blend);
        }
        if let Some(texture) = texture {
            backend.bind_texture(texture);
        }
        if let Some(cull) = cull {
            backend.set_cull_mode(cull);
        }
    }
}

fn render_shape(action: &mut RenderAction, node: &NodeRef) {
    let Some(shape) = node.as_shape() else {
        return;
    };

    let mut batch = std::mem::take(&mut action.batch);
    batch.clear();
    shape.generate_triangles(action.state(), &mut |triangle| batch.push(*triangle));

    if !batch.is_empty() {
        action.stats.shapes += 1;
        action.stats.triangles += batch.len();
        let attributes = shape.vertex_attributes();
        if let Some(backend) = action.backend_mut() {
            backend.draw_triangles(&batch, attributes);
        }
    }
    action.batch = batch;
}

impl Action for RenderAction {
    fn dispatch_table() -> &'static DispatchTable<Self> {
        static TABLE: OnceLock<DispatchTable<RenderAction>> = OnceLock::new();
        TABLE.get_or_init(|| {
            let table = DispatchTable::new("RenderAction");
            register_standard_handlers(&table);
            table.register(&SHAPE_TYPE, render_shape);
            table
        })
    }

    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn begin_apply(&mut self) {
        self.stats = RenderStats::default();
        if let Some(backend) = self.backend_mut() {
            backend.begin_frame();
        }
        if self.config.prime_backend {
            self.prime_backend();
        }
    }

    fn end_apply(&mut self) {
        if let Some(backend) = self.backend_mut() {
            backend.end_frame();
        }
        log::debug!(
            "rendered {} shapes, {} triangles",
            self.stats.shapes,
            self.stats.triangles
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Vec3, Vec4};
    use crate::render::{RecordingBackend, RenderCommand};
    use crate::scene::{Group, MaterialNode, Quad, TransformNode};
    use std::rc::Rc;

    #[test]
    fn test_frame_is_bracketed_and_primed() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut action = RenderAction::new(Box::new(backend));

        let root: NodeRef = Rc::new(Group::new());
        action.apply(&root);

        let log = log.borrow();
        assert_eq!(log.first(), Some(&RenderCommand::BeginFrame));
        assert_eq!(log.last(), Some(&RenderCommand::EndFrame));
        assert!(log.contains(&RenderCommand::SetColor(ColorElement::DEFAULT_COLOR)));
        assert!(log[1..log.len() - 1].iter().all(RenderCommand::is_state_change));
    }

    #[test]
    fn test_unprimed_frame_only_draws() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let config = RenderConfig::new().with_prime_backend(false);
        let mut action = RenderAction::with_config(Box::new(backend), config);

        let root: NodeRef = Rc::new(Group::with_children([Rc::new(Quad::unit()) as NodeRef]));
        action.apply(&root);

        let log = log.borrow();
        assert_eq!(log.len(), 3);
        assert!(matches!(log[1], RenderCommand::DrawTriangles { ref triangles, .. } if triangles.len() == 2));
        assert_eq!(action.stats(), RenderStats { shapes: 1, triangles: 2 });
    }

    #[test]
    fn test_group_restores_color_for_later_siblings() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let config = RenderConfig::new().with_prime_backend(false);
        let mut action = RenderAction::with_config(Box::new(backend), config);

        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let inner: NodeRef = Rc::new(Group::with_children([
            Rc::new(MaterialNode::new(red)) as NodeRef,
            Rc::new(TransformNode::from_translation(Vec3::new(0.0, 0.0, -1.0))),
            Rc::new(Quad::unit()),
        ]));
        let root: NodeRef = Rc::new(Group::with_children([inner, Rc::new(Quad::unit()) as NodeRef]));
        action.apply(&root);

        let commands: Vec<_> = log
            .borrow()
            .iter()
            .filter(|command| matches!(command, RenderCommand::SetColor(_)))
            .cloned()
            .collect();
        assert_eq!(
            commands,
            [
                RenderCommand::SetColor(red),
                RenderCommand::SetColor(ColorElement::DEFAULT_COLOR),
            ]
        );
    }

    #[test]
    fn test_backend_can_be_taken_back() {
        let mut action = RenderAction::new(Box::new(RecordingBackend::new()));
        assert!(action.take_backend().is_some());

        let root: NodeRef = Rc::new(Quad::unit());
        action.apply(&root);
        assert_eq!(action.stats().triangles, 2);
    }
}
