//! Shape trait: the geometric intersection contract.

use lumo_math::{Aabb, Ray, Vec3};

/// Geometry of a ray-shape hit, before a material is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHit {
    pub p: Vec3,
    /// Unit normal
    pub n: Vec3,
    /// World distance from the ray origin
    pub t: f32,
}

/// Trait for geometry that rays can hit.
///
/// All methods work in world space. Rays are expected to carry unit
/// directions, so `t` is a distance.
pub trait Shape: Send + Sync {
    /// World-space bounding box.
    fn bounds(&self) -> Aabb;

    /// Nearest hit in front of the ray origin, if any.
    fn intersect(&self, ray: &Ray) -> Option<ShapeHit>;

    /// True if the shape is hit at a distance below `max_t`.
    fn intersect_p(&self, ray: &Ray, max_t: f32) -> bool;
}
