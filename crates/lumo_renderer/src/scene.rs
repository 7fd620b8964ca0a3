//! The assembled, read-only scene handed to integrators.

use lumo_math::{Aabb, Ray};

use crate::background::Background;
use crate::light::Light;
use crate::primitive::Primitive;
use crate::surfel::ObjSurfel;

/// Background, root aggregate and lights of one render.
pub struct Scene {
    pub background: Background,
    pub aggregate: Box<dyn Primitive>,
    pub lights: Vec<Light>,
    bounds: Aabb,
}

impl Scene {
    pub fn new(background: Background, aggregate: Box<dyn Primitive>, lights: Vec<Light>) -> Self {
        let bounds = aggregate.bounds();
        Self {
            background,
            aggregate,
            lights,
            bounds,
        }
    }

    /// Nearest hit along the ray.
    pub fn intersect(&self, ray: &Ray) -> Option<ObjSurfel<'_>> {
        self.aggregate.intersect(ray)
    }

    /// True if anything lies along the ray closer than `max_t`.
    pub fn intersect_p(&self, ray: &Ray, max_t: f32) -> bool {
        self.aggregate.intersect_p(ray, max_t)
    }

    /// World bounds of all geometry.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }
}
