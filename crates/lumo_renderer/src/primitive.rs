//! Primitive trait, geometric primitives, and the linear primitive list.

use std::sync::Arc;

use lumo_core::Material;
use lumo_math::{Aabb, Ray};

use crate::shape::Shape;
use crate::surfel::ObjSurfel;

/// Trait for anything a ray can be intersected with: single shapes and aggregates.
pub trait Primitive: Send + Sync {
    /// Nearest hit along the ray.
    fn intersect(&self, ray: &Ray) -> Option<ObjSurfel<'_>>;

    /// True if anything is hit at a distance below `max_t`.
    fn intersect_p(&self, ray: &Ray, max_t: f32) -> bool;

    /// World-space bounding box.
    fn bounds(&self) -> Aabb;
}

/// A shape with a bound material.
pub struct GeometricPrimitive {
    shape: Box<dyn Shape>,
    material: Arc<Material>,
}

impl GeometricPrimitive {
    pub fn new(shape: Box<dyn Shape>, material: Arc<Material>) -> Self {
        Self { shape, material }
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}

impl Primitive for GeometricPrimitive {
    fn intersect(&self, ray: &Ray) -> Option<ObjSurfel<'_>> {
        let hit = self.shape.intersect(ray)?;
        Some(ObjSurfel {
            p: hit.p,
            n: hit.n,
            wo: -ray.direction,
            t: hit.t,
            primitive: self,
        })
    }

    fn intersect_p(&self, ray: &Ray, max_t: f32) -> bool {
        self.shape.intersect_p(ray, max_t)
    }

    fn bounds(&self) -> Aabb {
        self.shape.bounds()
    }
}

/// Keep whichever hit is closer to the ray origin.
pub(crate) fn nearest<'a>(a: Option<ObjSurfel<'a>>, b: Option<ObjSurfel<'a>>) -> Option<ObjSurfel<'a>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.t < a.t { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

/// A flat list of primitives, tested one by one.
pub struct PrimList {
    primitives: Vec<Box<dyn Primitive>>,
    bbox: Aabb,
}

impl PrimList {
    pub fn new(primitives: Vec<Box<dyn Primitive>>) -> Self {
        let bbox = primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &p.bounds()));
        Self { primitives, bbox }
    }

    /// Get the number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

impl Primitive for PrimList {
    fn intersect(&self, ray: &Ray) -> Option<ObjSurfel<'_>> {
        self.primitives
            .iter()
            .fold(None, |closest, p| nearest(closest, p.intersect(ray)))
    }

    fn intersect_p(&self, ray: &Ray, max_t: f32) -> bool {
        self.primitives.iter().any(|p| p.intersect_p(ray, max_t))
    }

    fn bounds(&self) -> Aabb {
        self.bbox
    }
}
