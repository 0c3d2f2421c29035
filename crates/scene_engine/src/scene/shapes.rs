//! Shape nodes and the triangle generation protocol

use bitflags::bitflags;

use super::node::{Node, NodeType, NODE_TYPE};
use super::SceneError;
use crate::foundation::math::{Point3, Vec2, Vec3, Vec4};
use crate::geometry::AABB;
use crate::state::TraversalState;

/// Base type of all shapes
pub static SHAPE_TYPE: NodeType = NodeType::derived("Shape", &NODE_TYPE);
/// Type of [`TriangleSet`]
pub static TRIANGLE_SET_TYPE: NodeType = NodeType::derived("TriangleSet", &SHAPE_TYPE);
/// Type of [`IndexedTriangleSet`]
pub static INDEXED_TRIANGLE_SET_TYPE: NodeType =
    NodeType::derived("IndexedTriangleSet", &SHAPE_TYPE);
/// Type of [`Quad`], derived from the indexed set it is built on
pub static QUAD_TYPE: NodeType = NodeType::derived("Quad", &INDEXED_TRIANGLE_SET_TYPE);

bitflags! {
    /// Optional per-vertex attributes present on every vertex of a shape.
    /// Positions are always present.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VertexAttributes: u8 {
        const NORMAL = 1;
        const TEX_COORD = 1 << 1;
        const COLOR = 1 << 2;
    }
}

/// Input vertex of a triangle set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Local-space position
    pub position: Point3,
    /// Unit normal
    pub normal: Option<Vec3>,
    /// Texture coordinate
    pub tex_coord: Option<Vec2>,
    /// Per-vertex RGBA color
    pub color: Option<Vec4>,
}

impl Vertex {
    /// Vertex with a position and no optional attributes
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            normal: None,
            tex_coord: None,
            color: None,
        }
    }

    #[must_use]
    pub fn with_normal(mut self, normal: Vec3) -> Self {
        self.normal = Some(normal);
        self
    }

    #[must_use]
    pub fn with_tex_coord(mut self, tex_coord: Vec2) -> Self {
        self.tex_coord = Some(tex_coord);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = Some(color);
        self
    }

    fn attributes(&self) -> VertexAttributes {
        let mut attributes = VertexAttributes::empty();
        attributes.set(VertexAttributes::NORMAL, self.normal.is_some());
        attributes.set(VertexAttributes::TEX_COORD, self.tex_coord.is_some());
        attributes.set(VertexAttributes::COLOR, self.color.is_some());
        attributes
    }
}

/// One corner of a generated triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleVertex {
    /// Local-space position
    pub position: Point3,
    /// Normal copied from the source vertex
    pub normal: Option<Vec3>,
    /// Texture coordinate copied from the source vertex
    pub tex_coord: Option<Vec2>,
    /// Color copied from the source vertex
    pub color: Option<Vec4>,
    /// Index of the source vertex within its shape
    pub index: usize,
}

impl TriangleVertex {
    fn from_vertex(vertex: &Vertex, index: usize) -> Self {
        Self {
            position: vertex.position,
            normal: vertex.normal,
            tex_coord: vertex.tex_coord,
            color: vertex.color,
            index,
        }
    }
}

/// A triangle handed out by [`TriangleShape::generate_triangles`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratedTriangle {
    /// Index of the triangle within its shape
    pub index: usize,
    /// Corners in winding order
    pub vertices: [TriangleVertex; 3],
}

impl GeneratedTriangle {
    /// Corner positions in winding order
    pub fn positions(&self) -> [Point3; 3] {
        self.vertices.map(|vertex| vertex.position)
    }
}

/// Geometry that can be enumerated as triangles in local space.
///
/// `generate_triangles` reports every triangle exactly once, in a stable
/// order, and may be called any number of times.
pub trait TriangleShape: Node {
    /// Call `emit` once per triangle
    fn generate_triangles(&self, state: &TraversalState, emit: &mut dyn FnMut(&GeneratedTriangle));

    /// Bounds of all vertices in local space
    fn local_bounds(&self) -> AABB;

    /// Attributes every generated vertex carries
    fn vertex_attributes(&self) -> VertexAttributes;

    fn triangle_count(&self) -> usize;
}

fn common_attributes(vertices: &[Vertex]) -> VertexAttributes {
    if vertices.is_empty() {
        return VertexAttributes::empty();
    }
    vertices
        .iter()
        .fold(VertexAttributes::all(), |common, vertex| common & vertex.attributes())
}

fn bounds_of(vertices: &[Vertex]) -> AABB {
    AABB::from_points(vertices.iter().map(|vertex| &vertex.position))
}

/// Triangles as consecutive vertex triples
#[derive(Debug, Clone)]
pub struct TriangleSet {
    vertices: Vec<Vertex>,
    bounds: AABB,
    attributes: VertexAttributes,
}

impl TriangleSet {
    /// Fails when the vertex count is not a multiple of three
    pub fn new(vertices: Vec<Vertex>) -> Result<Self, SceneError> {
        if vertices.len() % 3 != 0 {
            return Err(SceneError::IncompleteTriangle { len: vertices.len() });
        }
        Ok(Self {
            bounds: bounds_of(&vertices),
            attributes: common_attributes(&vertices),
            vertices,
        })
    }

    /// Triangle set with positions only
    pub fn from_positions(positions: &[Point3]) -> Result<Self, SceneError> {
        Self::new(positions.iter().copied().map(Vertex::new).collect())
    }

    /// Vertices, three per triangle
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }
}

impl Node for TriangleSet {
    fn node_type(&self) -> &'static NodeType {
        &TRIANGLE_SET_TYPE
    }

    fn as_shape(&self) -> Option<&dyn TriangleShape> {
        Some(self)
    }
}

impl TriangleShape for TriangleSet {
    fn generate_triangles(&self, _state: &TraversalState, emit: &mut dyn FnMut(&GeneratedTriangle)) {
        for (index, corners) in self.vertices.chunks_exact(3).enumerate() {
            let first = index * 3;
            emit(&GeneratedTriangle {
                index,
                vertices: [
                    TriangleVertex::from_vertex(&corners[0], first),
                    TriangleVertex::from_vertex(&corners[1], first + 1),
                    TriangleVertex::from_vertex(&corners[2], first + 2),
                ],
            });
        }
    }

    fn local_bounds(&self) -> AABB {
        self.bounds
    }

    fn vertex_attributes(&self) -> VertexAttributes {
        self.attributes
    }

    fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Triangles as index triples into a shared vertex pool
#[derive(Debug, Clone)]
pub struct IndexedTriangleSet {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    bounds: AABB,
    attributes: VertexAttributes,
}

impl IndexedTriangleSet {
    /// Fails when an index is outside the vertex pool or the index count is
    /// not a multiple of three
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<Self, SceneError> {
        if indices.len() % 3 != 0 {
            return Err(SceneError::IncompleteTriangle { len: indices.len() });
        }
        if let Some(&index) = indices.iter().find(|&&index| index as usize >= vertices.len()) {
            return Err(SceneError::InvalidVertexIndex {
                index,
                vertex_count: vertices.len(),
            });
        }
        Ok(Self {
            bounds: bounds_of(&vertices),
            attributes: common_attributes(&vertices),
            vertices,
            indices,
        })
    }

    /// Shared vertex pool
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Vertex indices, three per triangle
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    fn corner(&self, index: u32) -> TriangleVertex {
        let index = index as usize;
        TriangleVertex::from_vertex(&self.vertices[index], index)
    }
}

impl Node for IndexedTriangleSet {
    fn node_type(&self) -> &'static NodeType {
        &INDEXED_TRIANGLE_SET_TYPE
    }

    fn as_shape(&self) -> Option<&dyn TriangleShape> {
        Some(self)
    }
}

impl TriangleShape for IndexedTriangleSet {
    fn generate_triangles(&self, _state: &TraversalState, emit: &mut dyn FnMut(&GeneratedTriangle)) {
        for (index, corners) in self.indices.chunks_exact(3).enumerate() {
            emit(&GeneratedTriangle {
                index,
                vertices: [
                    self.corner(corners[0]),
                    self.corner(corners[1]),
                    self.corner(corners[2]),
                ],
            });
        }
    }

    fn local_bounds(&self) -> AABB {
        self.bounds
    }

    fn vertex_attributes(&self) -> VertexAttributes {
        self.attributes
    }

    fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Axis-aligned rectangle in the z = 0 plane spanning `[0, width] x [0, height]`,
/// facing +z, with normals and texture coordinates
#[derive(Debug, Clone)]
pub struct Quad {
    mesh: IndexedTriangleSet,
    width: f32,
    height: f32,
}

impl Quad {
    const INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

    /// Rectangle of the given size with its corner at the origin
    pub fn new(width: f32, height: f32) -> Self {
        let normal = Vec3::z();
        let corner = |x: f32, y: f32| {
            Vertex::new(Point3::new(x * width, y * height, 0.0))
                .with_normal(normal)
                .with_tex_coord(Vec2::new(x, y))
        };
        let vertices = vec![corner(0.0, 0.0), corner(1.0, 0.0), corner(1.0, 1.0), corner(0.0, 1.0)];
        let indices = Self::INDICES.to_vec();
        let attributes = common_attributes(&vertices);
        Self {
            mesh: IndexedTriangleSet {
                bounds: bounds_of(&vertices),
                attributes,
                vertices,
                indices,
            },
            width,
            height,
        }
    }

    /// Unit square
    pub fn unit() -> Self {
        Self::new(1.0, 1.0)
    }

    /// Extent along x
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Extent along y
    pub fn height(&self) -> f32 {
        self.height
    }

    /// The underlying indexed triangle set
    pub fn mesh(&self) -> &IndexedTriangleSet {
        &self.mesh
    }
}

impl Node for Quad {
    fn node_type(&self) -> &'static NodeType {
        &QUAD_TYPE
    }

    fn as_shape(&self) -> Option<&dyn TriangleShape> {
        Some(&self.mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateDefaults;
    use std::sync::Arc;

    fn collect(shape: &dyn TriangleShape) -> Vec<GeneratedTriangle> {
        let state = TraversalState::new(Arc::new(StateDefaults::new()));
        let mut triangles = Vec::new();
        shape.generate_triangles(&state, &mut |triangle| triangles.push(*triangle));
        triangles
    }

    #[test]
    fn test_triangle_set_needs_whole_triangles() {
        let positions = [Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        assert_eq!(
            TriangleSet::from_positions(&positions).unwrap_err(),
            SceneError::IncompleteTriangle { len: 2 }
        );
    }

    #[test]
    fn test_indexed_set_rejects_dangling_index() {
        let vertices = vec![Vertex::new(Point3::origin()); 3];
        assert_eq!(
            IndexedTriangleSet::new(vertices, vec![0, 1, 3]).unwrap_err(),
            SceneError::InvalidVertexIndex { index: 3, vertex_count: 3 }
        );
    }

    #[test]
    fn test_generation_is_restartable() {
        let quad = Quad::new(2.0, 1.0);
        let first = collect(quad.mesh());
        let second = collect(quad.mesh());

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(first[1].index, 1);
        assert_eq!(first[1].vertices[0].index, 1);
    }

    #[test]
    fn test_quad_bounds_and_attributes() {
        let quad = Quad::new(2.0, 3.0);
        let bounds = quad.mesh().local_bounds();

        assert_eq!(bounds.min, Point3::origin());
        assert_eq!(bounds.max, Point3::new(2.0, 3.0, 0.0));
        assert_eq!(
            quad.mesh().vertex_attributes(),
            VertexAttributes::NORMAL | VertexAttributes::TEX_COORD
        );
        assert!(QUAD_TYPE.is_a(&INDEXED_TRIANGLE_SET_TYPE));
    }

    #[test]
    fn test_mixed_attributes_reduce_to_common_set() {
        let set = TriangleSet::new(vec![
            Vertex::new(Point3::origin()).with_color(Vec4::x()),
            Vertex::new(Point3::new(1.0, 0.0, 0.0)).with_color(Vec4::y()).with_normal(Vec3::z()),
            Vertex::new(Point3::new(0.0, 1.0, 0.0)).with_color(Vec4::z()),
        ])
        .unwrap();

        assert_eq!(set.vertex_attributes(), VertexAttributes::COLOR);
        assert_eq!(collect(&set).len(), 1);
    }
}
