//! Sphere primitive for ray tracing.

use lumo_core::ParamSet;
use lumo_math::{Aabb, Ray, Transform, Vec3};

use crate::shape::{Shape, ShapeHit};

/// Discriminants down to this value still count as a (grazing) hit.
const DISCRIMINANT_TOLERANCE: f32 = -1e-4;

/// A sphere placed in the world by an object-to-world transform.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    flip_normals: bool,
    object_to_world: Transform,
    world_to_object: Transform,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere. `center` and `radius` are in object space.
    pub fn new(center: Vec3, radius: f32, flip_normals: bool, object_to_world: Transform) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let local_box = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            flip_normals,
            object_to_world,
            world_to_object: object_to_world.inverse(),
            bbox: object_to_world.apply_bounds(&local_box),
        }
    }

    /// Build from `center` (origin), `radius` (1) and `flip_normals` (false).
    pub fn from_params(ps: &ParamSet, object_to_world: Transform) -> Self {
        Self::new(
            ps.get_one_vec3("center", Vec3::ZERO),
            ps.get_one_float("radius", 1.0),
            ps.get_one_bool("flip_normals", false),
            object_to_world,
        )
    }

    /// Smallest non-negative root of the ray-sphere quadratic, in object space.
    fn local_root(&self, local: &Ray) -> Option<f32> {
        let oc = local.origin - self.center;
        let a = local.direction.length_squared();
        let b = 2.0 * oc.dot(local.direction);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < DISCRIMINANT_TOLERANCE || a == 0.0 {
            return None;
        }
        let sqrtd = discriminant.max(0.0).sqrt();

        let near = (-b - sqrtd) / (2.0 * a);
        let far = (-b + sqrtd) / (2.0 * a);
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            Some(far)
        } else {
            // Sphere entirely behind the ray origin
            None
        }
    }

    /// World-space contact point and the world distance to it.
    fn world_contact(&self, ray: &Ray) -> Option<(Vec3, Vec3, f32)> {
        let local = self.world_to_object.apply_ray(ray);
        let root = self.local_root(&local)?;
        let local_p = local.at(root);
        let world_p = self.object_to_world.apply_point(local_p);
        // The transform need not preserve distances; measure again in world space.
        let t = (world_p - ray.origin).length();
        Some((local_p, world_p, t))
    }
}

impl Shape for Sphere {
    fn bounds(&self) -> Aabb {
        self.bbox
    }

    fn intersect(&self, ray: &Ray) -> Option<ShapeHit> {
        let (local_p, world_p, t) = self.world_contact(ray)?;

        let mut local_n = (local_p - self.center) / self.radius;
        if self.flip_normals {
            local_n = -local_n;
        }
        let n = self.object_to_world.apply_normal(local_n).normalize_or_zero();

        Some(ShapeHit { p: world_p, n, t })
    }

    fn intersect_p(&self, ray: &Ray, max_t: f32) -> bool {
        matches!(self.world_contact(ray), Some((_, _, t)) if t < max_t)
    }
}
