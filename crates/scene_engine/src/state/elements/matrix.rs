//! Matrix categories: the accumulated model matrix and the camera

use crate::foundation::math::Mat4;
use crate::state::{Category, HookContext, LazySlot, StateElement, StateSlot, TraversalState};

/// Accumulated model-to-world matrix
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMatrixElement {
    matrix: Mat4,
    emits: bool,
}

impl ModelMatrixElement {
    /// Identity matrix, no backend commands
    pub fn new() -> Self {
        Self {
            matrix: Mat4::identity(),
            emits: false,
        }
    }

    /// Identity matrix, loads every committed change into the backend
    pub fn emitting() -> Self {
        Self {
            emits: true,
            ..Self::new()
        }
    }

    /// Accumulated object to world matrix at this level
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Current model matrix of a traversal, `None` if not tracked
    pub fn get(state: &TraversalState) -> Option<Mat4> {
        state.element::<Self>().map(|element| element.matrix)
    }

    /// Replace the model matrix
    pub fn set(state: &mut TraversalState, matrix: Mat4) {
        Self::update(state, |current| *current = matrix);
    }

    /// Post-multiply the model matrix, so `matrix` applies to child geometry first
    pub fn mult(state: &mut TraversalState, matrix: &Mat4) {
        Self::update(state, |current| *current *= matrix);
    }

    /// Reset the model matrix to identity
    pub fn make_identity(state: &mut TraversalState) {
        Self::set(state, Mat4::identity());
    }

    fn update(state: &mut TraversalState, change: impl FnOnce(&mut Mat4)) {
        let Some((element, backend)) = state.element_mut_with_backend::<Self>() else {
            return;
        };
        let before = element.matrix;
        change(&mut element.matrix);
        if element.emits && element.matrix != before {
            if let Some(backend) = backend {
                backend.load_model_matrix(&element.matrix);
            }
        }
    }
}

impl Default for ModelMatrixElement {
    fn default() -> Self {
        Self::new()
    }
}

impl StateElement for ModelMatrixElement {
    fn create_default(&self) -> Box<dyn StateElement> {
        Box::new(self.clone())
    }

    fn on_push(&mut self, below: &dyn StateElement, _cx: &mut HookContext<'_>) {
        if let Some(below) = below.downcast_ref::<Self>() {
            self.matrix = below.matrix;
        }
    }

    fn on_pop(&mut self, popped: &dyn StateElement, cx: &mut HookContext<'_>) {
        let changed = popped
            .downcast_ref::<Self>()
            .map_or(true, |popped| popped.matrix != self.matrix);
        if self.emits && changed {
            cx.with_backend(|backend| backend.load_model_matrix(&self.matrix));
        }
    }
}

impl Category for ModelMatrixElement {
    fn slot() -> StateSlot {
        static SLOT: LazySlot = LazySlot::new();
        SLOT.get()
    }
}

/// View and projection matrices of the active camera
#[derive(Debug, Clone, PartialEq)]
pub struct CameraElement {
    view: Mat4,
    projection: Mat4,
    emits: bool,
}

impl CameraElement {
    /// Identity view and projection, no backend commands
    pub fn new() -> Self {
        Self {
            view: Mat4::identity(),
            projection: Mat4::identity(),
            emits: false,
        }
    }

    /// Identity view and projection, loaded into the backend on change
    pub fn emitting() -> Self {
        Self {
            emits: true,
            ..Self::new()
        }
    }

    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// `projection * view`
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Current camera of a traversal, `None` if not tracked
    pub fn get(state: &TraversalState) -> Option<&Self> {
        state.element::<Self>()
    }

    /// Replace both camera matrices
    pub fn set(state: &mut TraversalState, view: Mat4, projection: Mat4) {
        let Some((element, mut backend)) = state.element_mut_with_backend::<Self>() else {
            return;
        };
        let view_changed = element.view != view;
        let projection_changed = element.projection != projection;
        element.view = view;
        element.projection = projection;
        if !element.emits {
            return;
        }
        if let Some(backend) = backend.as_deref_mut() {
            if view_changed {
                backend.load_view_matrix(&element.view);
            }
            if projection_changed {
                backend.load_projection_matrix(&element.projection);
            }
        }
    }
}

impl Default for CameraElement {
    fn default() -> Self {
        Self::new()
    }
}

impl StateElement for CameraElement {
    fn create_default(&self) -> Box<dyn StateElement> {
        Box::new(self.clone())
    }

    fn on_push(&mut self, below: &dyn StateElement, _cx: &mut HookContext<'_>) {
        if let Some(below) = below.downcast_ref::<Self>() {
            self.view = below.view;
            self.projection = below.projection;
        }
    }

    fn on_pop(&mut self, popped: &dyn StateElement, cx: &mut HookContext<'_>) {
        if !self.emits {
            return;
        }
        let (view_changed, projection_changed) = match popped.downcast_ref::<Self>() {
            Some(popped) => (popped.view != self.view, popped.projection != self.projection),
            None => (true, true),
        };
        cx.with_backend(|backend| {
            if view_changed {
                backend.load_view_matrix(&self.view);
            }
            if projection_changed {
                backend.load_projection_matrix(&self.projection);
            }
        });
    }
}

impl Category for CameraElement {
    fn slot() -> StateSlot {
        static SLOT: LazySlot = LazySlot::new();
        SLOT.get()
    }
}
