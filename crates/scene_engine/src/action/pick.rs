//! Ray picking

use std::sync::{Arc, OnceLock};

use super::{register_standard_handlers, Action, ActionCore, DispatchTable};
use crate::core::PickConfig;
use crate::foundation::math::{Mat4, Point3, Vec2, Vec3};
use crate::geometry::triangle::{
    intersect_triangle_culled_with_epsilon, intersect_triangle_with_epsilon, triangle_normal,
    TriangleHit,
};
use crate::geometry::Ray;
use crate::render::CullMode;
use crate::scene::{GeneratedTriangle, NodeRef, Path, SHAPE_TYPE};
use crate::state::elements::{CullModeElement, ModelMatrixElement};
use crate::state::{StateDefaults, TraversalState};

/// A point where the pick ray hit a shape
#[derive(Debug, Clone)]
pub struct PickedPoint {
    /// Path from the picked root to the shape that was hit
    pub path: Path,
    /// Distance along the world ray
    pub t: f32,
    /// Hit point in world space
    pub point: Point3,
    /// Hit point in the shape's local space
    pub local_point: Point3,
    /// Index of the hit triangle within its shape
    pub triangle_index: usize,
    /// Barycentric weight of the triangle's second vertex
    pub u: f32,
    /// Barycentric weight of the triangle's third vertex
    pub v: f32,
    /// Surface normal in world space, interpolated from vertex normals when
    /// the shape has them
    pub normal: Option<Vec3>,
}

/// Finds where a ray hits the triangles of a scene.
///
/// The ray is given in world space. For every shape it is mapped into the
/// shape's local space with the inverse of the accumulated model matrix,
/// without renormalizing, so hit distances stay world-space distances.
/// Each shape contributes at most its closest hit.
#[derive(Debug)]
pub struct PickAction {
    core: ActionCore,
    config: PickConfig,
    ray: Ray,
    picked: Vec<PickedPoint>,
}

impl PickAction {
    /// Categories a pick traversal tracks
    pub fn defaults() -> Arc<StateDefaults> {
        static DEFAULTS: OnceLock<Arc<StateDefaults>> = OnceLock::new();
        Arc::clone(DEFAULTS.get_or_init(|| {
            Arc::new(
                StateDefaults::new()
                    .with(ModelMatrixElement::new())
                    .with(CullModeElement::new()),
            )
        }))
    }

    /// Pick along a world-space ray with the default configuration
    pub fn new(ray: Ray) -> Self {
        Self::with_config(ray, PickConfig::default())
    }

    pub fn with_config(ray: Ray, config: PickConfig) -> Self {
        Self {
            core: ActionCore::new(TraversalState::new(Self::defaults())),
            config,
            ray,
            picked: Vec::new(),
        }
    }

    /// Pick through a point in normalized device coordinates. `None` when
    /// the matrix does not unproject to a usable ray.
    pub fn from_ndc(ndc: Vec2, inverse_view_projection: &Mat4, config: PickConfig) -> Option<Self> {
        Ray::from_ndc(ndc, inverse_view_projection).map(|ray| Self::with_config(ray, config))
    }

    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    /// Aim the next apply along a different ray
    pub fn set_ray(&mut self, ray: Ray) {
        self.ray = ray;
    }

    pub fn config(&self) -> &PickConfig {
        &self.config
    }

    /// Hits from the last traversal, nearest first
    pub fn picked(&self) -> &[PickedPoint] {
        &self.picked
    }

    /// Nearest hit from the last traversal
    pub fn picked_point(&self) -> Option<&PickedPoint> {
        self.picked.first()
    }

    /// Move the hits out, leaving the list empty
    pub fn take_picked(&mut self) -> Vec<PickedPoint> {
        std::mem::take(&mut self.picked)
    }
}

/// Closest hit of `ray` against one triangle list, honoring culling and range
fn closest_hit(
    ray: &Ray,
    cull: CullMode,
    config: &PickConfig,
    generate: impl FnOnce(&mut dyn FnMut(&GeneratedTriangle)),
) -> Option<(TriangleHit, GeneratedTriangle)> {
    let mut best: Option<(TriangleHit, GeneratedTriangle)> = None;
    generate(&mut |triangle| {
        let [p0, p1, p2] = triangle.positions();
        let hit = match cull {
            CullMode::None => intersect_triangle_with_epsilon(ray, &p0, &p1, &p2, config.epsilon),
            CullMode::Back => {
                intersect_triangle_culled_with_epsilon(ray, &p0, &p1, &p2, config.epsilon)
            }
            // Reversed winding turns front faces into back faces.
            CullMode::Front => intersect_triangle_culled_with_epsilon(ray, &p0, &p2, &p1, config.epsilon)
                .map(|hit| TriangleHit { u: hit.v, v: hit.u, ..hit }),
        };
        let Some(hit) = hit else {
            return;
        };
        if hit.t < 0.0 || hit.t > config.max_distance {
            return;
        }
        if best.as_ref().map_or(true, |(closest, _)| hit.t < closest.t) {
            best = Some((hit, *triangle));
        }
    });
    best
}

fn surface_normal(hit: &TriangleHit, triangle: &GeneratedTriangle) -> Option<Vec3> {
    let [a, b, c] = triangle.vertices;
    match (a.normal, b.normal, c.normal) {
        (Some(na), Some(nb), Some(nc)) => {
            let (wa, wb, wc) = hit.weights();
            (na * wa + nb * wb + nc * wc).try_normalize(f32::EPSILON)
        }
        _ => triangle_normal(&a.position, &b.position, &c.position),
    }
}

fn pick_shape(action: &mut PickAction, node: &NodeRef) {
    let Some(shape) = node.as_shape() else {
        return;
    };
    let state = action.state();
    let model = ModelMatrixElement::get(state).unwrap_or_else(Mat4::identity);
    let Some(inverse) = model.try_inverse() else {
        log::warn!("skipping {} with singular model matrix", node.node_type());
        return;
    };

    let local_ray = action.ray.transformed(&inverse);
    match shape.local_bounds().intersect_ray(&local_ray) {
        Some((t_enter, _)) if t_enter <= action.config.max_distance => {}
        _ => return,
    }

    let cull = if action.config.honor_face_culling {
        CullModeElement::get(state).unwrap_or_default()
    } else {
        CullMode::None
    };
    let Some((hit, triangle)) = closest_hit(&local_ray, cull, &action.config, |emit| {
        shape.generate_triangles(state, emit)
    }) else {
        return;
    };

    let [p0, p1, p2] = triangle.positions();
    let local_point = hit.interpolate(&p0, &p1, &p2);
    let normal = surface_normal(&hit, &triangle)
        .and_then(|normal| inverse.transpose().transform_vector(&normal).try_normalize(f32::EPSILON));
    let picked = PickedPoint {
        path: action.path().clone(),
        t: hit.t,
        point: model.transform_point(&local_point),
        local_point,
        triangle_index: triangle.index,
        u: hit.u,
        v: hit.v,
        normal,
    };
    log::trace!("hit {} at t = {}", node.node_type(), picked.t);
    action.picked.push(picked);
}

impl Action for PickAction {
    fn dispatch_table() -> &'static DispatchTable<Self> {
        static TABLE: OnceLock<DispatchTable<PickAction>> = OnceLock::new();
        TABLE.get_or_init(|| {
            let table = DispatchTable::new("PickAction");
            register_standard_handlers(&table);
            table.register(&SHAPE_TYPE, pick_shape);
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
        self.picked.clear();
        if self.ray.is_degenerate() {
            log::warn!("pick ray has no direction, nothing will be hit");
        }
    }

    fn end_apply(&mut self) {
        self.picked.sort_by(|a, b| a.t.total_cmp(&b.t));
        if !self.config.pick_all {
            self.picked.truncate(1);
        }
        log::debug!("picked {} points", self.picked.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{CullModeNode, Group, Quad, Switch, SwitchChoice, TransformNode, TriangleSet};
    use approx::assert_relative_eq;
    use std::rc::Rc;

    fn down_ray(x: f32, y: f32) -> Ray {
        Ray::new(Point3::new(x, y, 5.0), Vec3::new(0.0, 0.0, -1.0))
    }

    fn scene(children: Vec<NodeRef>) -> NodeRef {
        Rc::new(Group::with_children(children))
    }

    #[test]
    fn test_translated_quad_is_hit_in_world_space() {
        let root = scene(vec![
            Rc::new(TransformNode::from_translation(Vec3::new(10.0, 0.0, -2.0))) as NodeRef,
            Rc::new(Quad::unit()),
        ]);
        let mut action = PickAction::new(down_ray(10.25, 0.25));
        action.apply(&root);

        let hit = action.picked_point().unwrap();
        assert_relative_eq!(hit.t, 7.0, epsilon = 1e-5);
        assert_relative_eq!(hit.point, Point3::new(10.25, 0.25, -2.0), epsilon = 1e-5);
        assert_relative_eq!(hit.local_point, Point3::new(0.25, 0.25, 0.0), epsilon = 1e-5);
        assert_relative_eq!(hit.normal.unwrap(), Vec3::z(), epsilon = 1e-5);
    }

    #[test]
    fn test_scaled_shape_keeps_world_distances() {
        let root = scene(vec![
            Rc::new(TransformNode::from_matrix(Mat4::new_scaling(4.0))) as NodeRef,
            Rc::new(Quad::unit()),
        ]);
        let mut action = PickAction::new(down_ray(2.0, 1.0));
        action.apply(&root);

        assert_relative_eq!(action.picked_point().unwrap().t, 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_hits_sorted_nearest_first() {
        let far = scene(vec![
            Rc::new(TransformNode::from_translation(Vec3::new(0.0, 0.0, -3.0))) as NodeRef,
            Rc::new(Quad::unit()),
        ]);
        let root = scene(vec![far, Rc::new(Quad::unit())]);

        let mut action = PickAction::new(down_ray(0.25, 0.25));
        action.apply(&root);
        let distances: Vec<_> = action.picked().iter().map(|hit| hit.t).collect();
        assert_eq!(distances.len(), 2);
        assert_relative_eq!(distances[0], 5.0, epsilon = 1e-5);
        assert_relative_eq!(distances[1], 8.0, epsilon = 1e-5);

        let mut nearest = PickAction::with_config(down_ray(0.25, 0.25), PickConfig::new().with_pick_all(false));
        nearest.apply(&root);
        assert_eq!(nearest.picked().len(), 1);
    }

    #[test]
    fn test_max_distance_limits_hits() {
        let root = scene(vec![Rc::new(Quad::unit()) as NodeRef]);
        let config = PickConfig::new().with_max_distance(4.0);
        let mut action = PickAction::with_config(down_ray(0.25, 0.25), config);
        action.apply(&root);
        assert!(action.picked().is_empty());
    }

    #[test]
    fn test_back_face_culling_is_honored() {
        let up = Ray::new(Point3::new(0.25, 0.25, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let root = scene(vec![Rc::new(CullModeNode::new(CullMode::Back)) as NodeRef, Rc::new(Quad::unit())]);

        let mut culled = PickAction::new(up);
        culled.apply(&root);
        assert!(culled.picked().is_empty());

        let mut two_sided = PickAction::with_config(up, PickConfig::new().with_face_culling(false));
        two_sided.apply(&root);
        assert_eq!(two_sided.picked().len(), 1);
    }

    #[test]
    fn test_front_culling_keeps_back_hits() {
        let up = Ray::new(Point3::new(0.25, 0.25, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let root = scene(vec![Rc::new(CullModeNode::new(CullMode::Front)) as NodeRef, Rc::new(Quad::unit())]);

        let mut action = PickAction::new(up);
        action.apply(&root);
        let hit = action.picked_point().unwrap();
        assert_relative_eq!(hit.t, 5.0, epsilon = 1e-5);
        assert_relative_eq!(hit.local_point, Point3::new(0.25, 0.25, 0.0), epsilon = 1e-5);

        let mut from_front = PickAction::new(down_ray(0.25, 0.25));
        from_front.apply(&root);
        assert!(from_front.picked().is_empty());
    }

    #[test]
    fn test_switch_hides_unselected_children() {
        let quad: NodeRef = Rc::new(Quad::unit());
        let switch = Rc::new(Switch::with_children([quad], SwitchChoice::None));
        let root = scene(vec![switch.clone() as NodeRef]);

        let mut action = PickAction::new(down_ray(0.5, 0.25));
        action.apply(&root);
        assert!(action.picked().is_empty());

        switch.set_choice(SwitchChoice::Child(0));
        action.apply(&root);
        assert_eq!(action.picked().len(), 1);
        assert_eq!(action.picked()[0].path.len(), 3);
    }

    #[test]
    fn test_singular_transform_skips_shape() {
        let root = scene(vec![
            Rc::new(TransformNode::from_matrix(Mat4::zeros())) as NodeRef,
            Rc::new(Quad::unit()),
        ]);
        let mut action = PickAction::new(down_ray(0.0, 0.0));
        action.apply(&root);
        assert!(action.picked().is_empty());
    }

    #[test]
    fn test_flat_normal_without_vertex_normals() {
        let triangle = TriangleSet::from_positions(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
        let root = scene(vec![Rc::new(triangle) as NodeRef]);

        let mut action = PickAction::new(down_ray(0.2, 0.2));
        action.apply(&root);
        let hit = action.picked_point().unwrap();
        assert_relative_eq!(hit.normal.unwrap(), Vec3::z(), epsilon = 1e-5);
        assert_relative_eq!(hit.u, 0.2, epsilon = 1e-5);
        assert_relative_eq!(hit.v, 0.2, epsilon = 1e-5);
    }
}
