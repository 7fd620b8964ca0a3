//! Surface-contact records.

use lumo_math::Vec3;

use crate::primitive::GeometricPrimitive;

/// A point on a light source, or the bare geometry of a contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surfel {
    /// Contact point
    pub p: Vec3,
    /// Unit direction associated with the point
    pub wo: Vec3,
    /// Distance along the generating ray
    pub t: f32,
}

impl Surfel {
    pub fn new(p: Vec3, wo: Vec3, t: f32) -> Self {
        Self {
            p,
            wo: wo.normalize_or_zero(),
            t,
        }
    }
}

/// Record of a ray hitting a primitive.
#[derive(Clone, Copy)]
pub struct ObjSurfel<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal
    pub n: Vec3,
    /// Unit direction back toward the ray origin
    pub wo: Vec3,
    /// World distance from the ray origin
    pub t: f32,
    /// The primitive that was hit, for material lookup
    pub primitive: &'a GeometricPrimitive,
}

impl<'a> ObjSurfel<'a> {
    /// The geometric part of the record.
    pub fn surfel(&self) -> Surfel {
        Surfel {
            p: self.p,
            wo: self.wo,
            t: self.t,
        }
    }
}

impl std::fmt::Debug for ObjSurfel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjSurfel")
            .field("p", &self.p)
            .field("n", &self.n)
            .field("wo", &self.wo)
            .field("t", &self.t)
            .finish_non_exhaustive()
    }
}
