//! Geometry used by picking and bounds computation
//!
//! Rays, axis-aligned boxes, and the ray/triangle tests that shapes are
//! picked with. Everything here works in whatever space its inputs are in;
//! callers move rays between spaces with [`Ray::transformed`].

mod aabb;
mod ray;
pub mod triangle;

pub use aabb::AABB;
pub use ray::Ray;
pub use triangle::{
    intersect_triangle,
    intersect_triangle_culled,
    intersect_triangle_culled_with_epsilon,
    intersect_triangle_with_epsilon,
    triangle_normal,
    TriangleHit,
};
