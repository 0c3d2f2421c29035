//! World-space bounds of a scene

use std::sync::{Arc, OnceLock};

use super::{register_standard_handlers, Action, ActionCore, DispatchTable};
use crate::foundation::math::Mat4;
use crate::geometry::AABB;
use crate::scene::{NodeRef, SHAPE_TYPE};
use crate::state::elements::ModelMatrixElement;
use crate::state::{StateDefaults, TraversalState};

/// Computes the axis-aligned box around every shape in a scene, after each
/// shape's accumulated model matrix
#[derive(Debug)]
pub struct BoundingBoxAction {
    core: ActionCore,
    bounds: AABB,
}

impl BoundingBoxAction {
    /// Categories a bounding box traversal tracks
    pub fn defaults() -> Arc<StateDefaults> {
        static DEFAULTS: OnceLock<Arc<StateDefaults>> = OnceLock::new();
        Arc::clone(
            DEFAULTS.get_or_init(|| Arc::new(StateDefaults::new().with(ModelMatrixElement::new()))),
        )
    }

    pub fn new() -> Self {
        Self {
            core: ActionCore::new(TraversalState::new(Self::defaults())),
            bounds: AABB::empty(),
        }
    }

    /// Bounds from the last traversal; empty if it reached no geometry
    pub fn bounding_box(&self) -> AABB {
        self.bounds
    }
}

impl Default for BoundingBoxAction {
    fn default() -> Self {
        Self::new()
    }
}

fn extend_with_shape(action: &mut BoundingBoxAction, node: &NodeRef) {
    let Some(shape) = node.as_shape() else {
        return;
    };
    let model = ModelMatrixElement::get(action.state()).unwrap_or_else(Mat4::identity);
    let bounds = shape.local_bounds().transformed(&model);
    action.bounds = action.bounds.union(&bounds);
}

impl Action for BoundingBoxAction {
    fn dispatch_table() -> &'static DispatchTable<Self> {
        static TABLE: OnceLock<DispatchTable<BoundingBoxAction>> = OnceLock::new();
        TABLE.get_or_init(|| {
            let table = DispatchTable::new("BoundingBoxAction");
            register_standard_handlers(&table);
            table.register(&SHAPE_TYPE, extend_with_shape);
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
        self.bounds = AABB::empty();
    }
}
