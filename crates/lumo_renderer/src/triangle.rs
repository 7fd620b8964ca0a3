//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.
//! Triangles index into a shared [`TriangleMesh`] and never copy its data.

use std::sync::Arc;

use lumo_core::TriangleMesh;
use lumo_math::{Aabb, Ray, Vec3, EPS};

use crate::shape::{Shape, ShapeHit};

/// Determinants below this mean the ray runs parallel to the triangle.
const PARALLEL_EPS: f32 = 1e-8;

/// One face of a shared mesh.
pub struct Triangle {
    mesh: Arc<TriangleMesh>,
    face: usize,
    bbox: Aabb,
}

impl Triangle {
    pub fn new(mesh: Arc<TriangleMesh>, face: usize) -> Self {
        let bbox = Aabb::from_point_cloud(&mesh.positions_of(face));
        Self { mesh, face, bbox }
    }

    /// One triangle per face of `mesh`, all sharing the buffer.
    pub fn from_mesh(mesh: &Arc<TriangleMesh>) -> Vec<Triangle> {
        (0..mesh.triangle_count())
            .map(|face| Triangle::new(Arc::clone(mesh), face))
            .collect()
    }

    /// Möller-Trumbore: ray parameter and barycentric (u, v), plus the
    /// interpolated unit normal. Culled back faces count as misses.
    fn hit_params(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        let [v0, v1, v2] = self.mesh.positions_of(self.face);
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < PARALLEL_EPS {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        // Too close to the origin: most likely the surface the ray left from.
        if t < EPS {
            return None;
        }

        let [n0, n1, n2] = self.mesh.normals_of(self.face);
        let n = (n0 * (1.0 - u - v) + n1 * u + n2 * v).normalize_or_zero();

        if self.mesh.backface_cull && n.dot(ray.direction) > 0.0 {
            return None;
        }

        Some((t, n))
    }
}

impl Shape for Triangle {
    fn bounds(&self) -> Aabb {
        self.bbox
    }

    fn intersect(&self, ray: &Ray) -> Option<ShapeHit> {
        let (t, n) = self.hit_params(ray)?;
        Some(ShapeHit {
            p: ray.at(t),
            n,
            t,
        })
    }

    fn intersect_p(&self, ray: &Ray, max_t: f32) -> bool {
        matches!(self.hit_params(ray), Some((t, _)) if t < max_t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle(backface_cull: bool) -> Triangle {
        let mesh = TriangleMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
            Some((vec![Vec3::Z; 3], vec![0, 1, 2])),
            backface_cull,
        )
        .unwrap();
        Triangle::new(Arc::new(mesh), 0)
    }

    #[test]
    fn test_triangle_hit() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = unit_triangle(false).intersect(&ray).unwrap();

        assert!((hit.t - 1.0).abs() < 1e-5);
        assert!((hit.n - Vec3::Z).length() < 1e-5);
        assert!((hit.p - Vec3::new(0.25, 0.25, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_triangle_miss_outside_barycentrics() {
        let ray = Ray::new(Vec3::new(0.75, 0.75, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(unit_triangle(false).intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_parallel_ray() {
        let ray = Ray::new(Vec3::new(-1.0, 0.25, 0.0), Vec3::X);
        assert!(unit_triangle(false).intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_rejects_hits_at_origin() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(unit_triangle(false).intersect(&ray).is_none());
    }

    #[test]
    fn test_backface_cull() {
        let from_below = Ray::new(Vec3::new(0.25, 0.25, -1.0), Vec3::Z);

        assert!(unit_triangle(false).intersect(&from_below).is_some());
        assert!(unit_triangle(true).intersect(&from_below).is_none());
    }

    #[test]
    fn test_normal_interpolation() {
        let mesh = TriangleMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
            Some((vec![Vec3::Z, Vec3::X, Vec3::Z], vec![0, 1, 2])),
            false,
        )
        .unwrap();
        let tri = Triangle::new(Arc::new(mesh), 0);

        // Near vertex 1 (u = 0.9, v = 0.05) its normal dominates.
        let ray = Ray::new(Vec3::new(0.9, 0.05, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = tri.intersect(&ray).unwrap();
        let expected = Vec3::new(0.9, 0.0, 0.1).normalize();
        assert!((hit.n - expected).length() < 1e-4);
        assert!((hit.n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_occlusion_limit() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let tri = unit_triangle(false);

        assert!(tri.intersect_p(&ray, 2.0));
        assert!(!tri.intersect_p(&ray, 0.5));
    }

    #[test]
    fn test_from_mesh_shares_buffer() {
        let mesh = Arc::new(
            TriangleMesh::new(
                vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE],
                vec![0, 1, 2, 1, 3, 2],
                None,
                false,
            )
            .unwrap(),
        );
        let triangles = Triangle::from_mesh(&mesh);

        assert_eq!(triangles.len(), 2);
        assert_eq!(Arc::strong_count(&mesh), 3);
    }
}
