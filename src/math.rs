//! Math utilities for screen projection, measuring and floor ray casts.

use bevy::math::Ray3d;
use bevy::prelude::*;

/// Threshold for considering vectors as parallel or zero-length.
const EPSILON: f32 = 1e-6;

/// Threshold for parallel plane/ray detection.
const PLANE_EPSILON: f32 = 1e-5;

/// Threshold for choosing perpendicular helper vector.
const AXIS_PARALLEL_THRESHOLD: f32 = 0.9;

/// Map a world-space point to pixel coordinates.
///
/// The point goes through the combined view-projection transform, is divided
/// by `w`, and the resulting NDC (`[-1, 1]`, Y up) is mapped to a viewport
/// whose origin is the top-left corner.
pub fn project_to_screen(point: Vec3, view_projection: Mat4, viewport: Vec2) -> Vec2 {
    let ndc = view_projection.project_point3(point);
    Vec2::new(
        (ndc.x + 1.0) * viewport.x / 2.0,
        (-ndc.y + 1.0) * viewport.y / 2.0,
    )
}

/// Distance between two points in whole centimetres.
pub fn distance_cm(a: Vec3, b: Vec3) -> u32 {
    (a.distance(b) * 100.0).round() as u32
}

/// Centre of the segment `a`-`b`.
pub fn midpoint(a: Vec3, b: Vec3) -> Vec3 {
    (a + b) * 0.5
}

/// Unsigned angle between `v` and the world X axis, in radians.
///
/// Returns `None` for a zero-length vector.
pub fn angle_to_x(v: Vec3) -> Option<f32> {
    if v.length_squared() < EPSILON {
        return None;
    }
    let cos = (v.dot(Vec3::X) / v.length()).clamp(-1.0, 1.0);
    Some(cos.acos())
}

/// Build an orthonormal basis (t1, t2) in the plane perpendicular to `axis`.
pub fn axis_basis(axis: Vec3) -> (Vec3, Vec3) {
    let axis = axis.normalize_or_zero();
    if axis.length_squared() < EPSILON {
        return (Vec3::X, Vec3::Z);
    }

    // Pick a helper vector that is not parallel to axis.
    let helper = if axis.abs().dot(Vec3::Y) < AXIS_PARALLEL_THRESHOLD {
        Vec3::Y
    } else {
        Vec3::X
    };

    let t1 = axis.cross(helper).normalize_or_zero();
    let t2 = axis.cross(t1).normalize_or_zero();
    (t1, t2)
}

/// Intersect a ray with a plane. Returns the intersection point, if any.
pub fn ray_plane_intersection(ray: &Ray3d, plane_origin: Vec3, plane_normal: Vec3) -> Option<Vec3> {
    let denom = plane_normal.dot(*ray.direction);
    if denom.abs() < PLANE_EPSILON {
        return None;
    }
    let t = (plane_origin - ray.origin).dot(plane_normal) / denom;
    if t < 0.0 {
        None
    } else {
        Some(ray.origin + *ray.direction * t)
    }
}
