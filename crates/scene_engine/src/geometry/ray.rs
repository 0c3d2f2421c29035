//! Rays for picking

use crate::foundation::math::{Mat4, Point3, Vec2, Vec3, Vec4};

/// A ray for ray casting and picking
///
/// The direction is not required to be unit length. Picking keeps the
/// direction unnormalized when moving a ray between coordinate spaces so
/// that the ray parameter `t` means the same thing in every space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray
    pub origin: Point3,
    /// The direction of the ray
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray, normalizing the direction.
    ///
    /// A zero-length direction is kept as is; such a ray never intersects
    /// anything.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(f32::EPSILON).unwrap_or(direction),
        }
    }

    /// Creates a ray from the given parts without touching the direction
    pub const fn from_parts(origin: Point3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get a point along the ray at parameter t
    pub fn point_at(&self, t: f32) -> Point3 {
        self.origin + self.direction * t
    }

    /// Map the ray through an affine transform without renormalizing
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point(&self.origin),
            direction: matrix.transform_vector(&self.direction),
        }
    }

    /// Whether the direction is too short to define a ray
    pub fn is_degenerate(&self) -> bool {
        self.direction.magnitude_squared() <= f32::EPSILON * f32::EPSILON
    }

    /// Build a world-space ray through a point in normalized device coordinates.
    ///
    /// `inverse_view_projection` is the inverse of `projection * view`. The
    /// ray starts on the near plane (depth 0) and points towards the far
    /// plane (depth 1). Returns `None` if either unprojected point lands at
    /// infinity.
    pub fn from_ndc(ndc: Vec2, inverse_view_projection: &Mat4) -> Option<Self> {
        let unproject = |depth: f32| {
            let clip = inverse_view_projection * Vec4::new(ndc.x, ndc.y, depth, 1.0);
            if clip.w.abs() <= f32::EPSILON {
                None
            } else {
                Some(Point3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w))
            }
        };

        let near = unproject(0.0)?;
        let far = unproject(1.0)?;
        Some(Self::new(near, far - near))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4Ext;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_normalizes_direction() {
        let ray = Ray::new(Point3::origin(), Vec3::new(0.0, 0.0, -4.0));
        assert_relative_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(ray.point_at(2.0), Point3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_zero_direction_is_degenerate() {
        let ray = Ray::new(Point3::origin(), Vec3::zeros());
        assert!(ray.is_degenerate());
    }

    #[test]
    fn test_transformed_keeps_parameter() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let scale = Mat4::new_scaling(2.0);

        let scaled = ray.transformed(&scale);
        assert_relative_eq!(scaled.point_at(1.0), scale.transform_point(&ray.point_at(1.0)));
    }

    #[test]
    fn test_center_of_screen_looks_forward() {
        let view = Mat4::look_at(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let projection = Mat4::perspective(1.0, 1.0, 0.1, 100.0);
        let inverse = (projection * view).try_inverse().unwrap();

        let ray = Ray::from_ndc(Vec2::zeros(), &inverse).unwrap();
        assert_relative_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-4);
        assert_relative_eq!(ray.origin.z, 9.9, epsilon = 1e-3);
    }
}
