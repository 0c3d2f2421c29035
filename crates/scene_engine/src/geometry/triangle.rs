//! Ray/triangle intersection
//!
//! Möller-Trumbore, "Fast, Minimum Storage Ray/Triangle Intersection".
//! Both variants return the ray parameter `t` and the barycentric weights
//! `(u, v)` of `v1` and `v2`; the weight of `v0` is `1 - u - v`.

use super::Ray;
use crate::foundation::math::{Point3, Vec3};

/// Default determinant threshold below which a ray is treated as parallel
pub const EPSILON: f32 = 1e-6;

/// Result of a successful ray/triangle test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter of the hit; may be negative if the triangle lies behind the origin
    pub t: f32,
    /// Barycentric weight of `v1`
    pub u: f32,
    /// Barycentric weight of `v2`
    pub v: f32,
}

impl TriangleHit {
    /// Barycentric weights of `(v0, v1, v2)`
    pub fn weights(&self) -> (f32, f32, f32) {
        (1.0 - self.u - self.v, self.u, self.v)
    }

    /// Interpolate three per-vertex points with this hit's weights
    pub fn interpolate(&self, p0: &Point3, p1: &Point3, p2: &Point3) -> Point3 {
        let (w0, w1, w2) = self.weights();
        Point3::from(p0.coords * w0 + p1.coords * w1 + p2.coords * w2)
    }
}

/// Two-sided ray/triangle test.
///
/// Returns `None` when the ray is parallel to the triangle's plane
/// (`|det| < epsilon`, which includes zero-length directions) or passes
/// outside the triangle.
pub fn intersect_triangle(ray: &Ray, v0: &Point3, v1: &Point3, v2: &Point3) -> Option<TriangleHit> {
    intersect_triangle_with_epsilon(ray, v0, v1, v2, EPSILON)
}

/// [`intersect_triangle`] with an explicit parallel threshold
pub fn intersect_triangle_with_epsilon(
    ray: &Ray,
    v0: &Point3,
    v1: &Point3,
    v2: &Point3,
    epsilon: f32,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let p = ray.direction.cross(&edge2);
    let det = edge1.dot(&p);
    if det.abs() < epsilon {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = ray.origin - v0;
    let u = s.dot(&p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = ray.direction.dot(&q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(&q) * inv_det;
    Some(TriangleHit { t, u, v })
}

/// Back-face culling ray/triangle test.
///
/// Bounds checks run on the un-normalized values and the division happens
/// last. Triangles whose front face (counter-clockwise winding) points away
/// from the ray are rejected.
pub fn intersect_triangle_culled(ray: &Ray, v0: &Point3, v1: &Point3, v2: &Point3) -> Option<TriangleHit> {
    intersect_triangle_culled_with_epsilon(ray, v0, v1, v2, EPSILON)
}

/// [`intersect_triangle_culled`] with an explicit parallel threshold
pub fn intersect_triangle_culled_with_epsilon(
    ray: &Ray,
    v0: &Point3,
    v1: &Point3,
    v2: &Point3,
    epsilon: f32,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let p = ray.direction.cross(&edge2);
    let det = edge1.dot(&p);
    if det < epsilon {
        return None;
    }

    let s = ray.origin - v0;
    let u = s.dot(&p);
    if u < 0.0 || u > det {
        return None;
    }

    let q = s.cross(&edge1);
    let v = ray.direction.dot(&q);
    if v < 0.0 || u + v > det {
        return None;
    }

    let inv_det = 1.0 / det;
    Some(TriangleHit {
        t: edge2.dot(&q) * inv_det,
        u: u * inv_det,
        v: v * inv_det,
    })
}

/// Counter-clockwise face normal of a triangle, `None` if it is degenerate
pub fn triangle_normal(v0: &Point3, v1: &Point3, v2: &Point3) -> Option<Vec3> {
    (v1 - v0).cross(&(v2 - v0)).try_normalize(f32::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> (Point3, Point3, Point3) {
        (
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_centroid_hit_has_valid_weights() {
        let (v0, v1, v2) = unit_triangle();
        let centroid = Point3::new(1.0 / 3.0, 1.0 / 3.0, 0.0);
        let ray = Ray::new(centroid + Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, -1.0));

        let hit = intersect_triangle(&ray, &v0, &v1, &v2).expect("centroid ray must hit");
        let (w0, w1, w2) = hit.weights();

        assert_relative_eq!(w0 + w1 + w2, 1.0, epsilon = 1e-6);
        for weight in [w0, w1, w2] {
            assert!((0.0..=1.0).contains(&weight));
        }
        assert_relative_eq!(hit.t, 2.0, epsilon = 1e-6);
        assert_relative_eq!(hit.interpolate(&v0, &v1, &v2), centroid, epsilon = 1e-6);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Point3::new(0.2, 0.2, 1.0), Vec3::new(1.0, 0.0, 0.0));

        assert!(intersect_triangle(&ray, &v0, &v1, &v2).is_none());
        assert!(intersect_triangle_culled(&ray, &v0, &v1, &v2).is_none());
    }

    #[test]
    fn test_zero_direction_misses() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::from_parts(Point3::new(0.2, 0.2, 1.0), Vec3::zeros());

        assert!(intersect_triangle(&ray, &v0, &v1, &v2).is_none());
    }

    #[test]
    fn test_edge_hit_sums_to_one() {
        let (v0, v1, v2) = unit_triangle();
        // Midpoint of the hypotenuse between v1 and v2
        let ray = Ray::new(Point3::new(0.5, 0.5, 3.0), Vec3::new(0.0, 0.0, -1.0));

        let hit = intersect_triangle(&ray, &v0, &v1, &v2).expect("edge ray must hit");
        assert_relative_eq!(hit.u + hit.v, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_outside_point_misses() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Point3::new(0.8, 0.8, 3.0), Vec3::new(0.0, 0.0, -1.0));

        assert!(intersect_triangle(&ray, &v0, &v1, &v2).is_none());
    }

    #[test]
    fn test_culling_rejects_back_side_only() {
        let (v0, v1, v2) = unit_triangle();
        let front = Ray::new(Point3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let back = Ray::new(Point3::new(0.25, 0.25, -1.0), Vec3::new(0.0, 0.0, 1.0));

        assert!(intersect_triangle(&back, &v0, &v1, &v2).is_some());
        assert!(intersect_triangle_culled(&back, &v0, &v1, &v2).is_none());

        let two_sided = intersect_triangle(&front, &v0, &v1, &v2).unwrap();
        let culled = intersect_triangle_culled(&front, &v0, &v1, &v2).unwrap();
        assert_relative_eq!(two_sided.t, culled.t, epsilon = 1e-6);
        assert_relative_eq!(two_sided.u, culled.u, epsilon = 1e-6);
        assert_relative_eq!(two_sided.v, culled.v, epsilon = 1e-6);
    }

    #[test]
    fn test_hit_behind_origin_has_negative_t() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Point3::new(0.25, 0.25, -1.0), Vec3::new(0.0, 0.0, -1.0));

        let hit = intersect_triangle(&ray, &v0, &v1, &v2).unwrap();
        assert!(hit.t < 0.0);
    }

    #[test]
    fn test_normal_follows_winding() {
        let (v0, v1, v2) = unit_triangle();
        assert_relative_eq!(triangle_normal(&v0, &v1, &v2).unwrap(), Vec3::z());
        assert!(triangle_normal(&v0, &v0, &v1).is_none());
    }
}
