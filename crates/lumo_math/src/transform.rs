// Affine transforms for scene construction and shape intersection.
//
// A Transform carries its forward matrix and inverse together. Composition
// multiplies both, so the pair stays consistent without re-inverting.

use crate::{Aabb, Ray, Vec3};
use glam::Mat4;

/// Pivots smaller than this are treated as zero by the Gauss-Jordan inverse.
const PIVOT_EPS: f32 = 1e-8;

/// An affine transform with its cached inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m: Mat4,
    m_inv: Mat4,
}

/// Invert a 4x4 matrix by Gauss-Jordan elimination with partial pivoting.
///
/// Columns with no usable pivot are left as they are and elimination moves
/// on, so a singular input yields a best-effort matrix instead of an error.
/// The returned flag is `false` when that happened.
pub fn invert_gauss_jordan(m: &Mat4) -> (Mat4, bool) {
    // Row-major working copies: a[row][col].
    let mut a = m.transpose().to_cols_array_2d();
    let mut inv = Mat4::IDENTITY.to_cols_array_2d();
    let mut invertible = true;

    for col in 0..4 {
        let pivot = (col..4).fold(col, |best, row| {
            if a[row][col].abs() > a[best][col].abs() {
                row
            } else {
                best
            }
        });

        if a[pivot][col].abs() < PIVOT_EPS {
            invertible = false;
            continue;
        }

        a.swap(col, pivot);
        inv.swap(col, pivot);

        for row in 0..4 {
            if row == col {
                continue;
            }
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in 0..4 {
                a[row][k] -= factor * a[col][k];
                inv[row][k] -= factor * inv[col][k];
            }
        }
    }

    for row in 0..4 {
        let d = a[row][row];
        if d != 0.0 {
            for k in 0..4 {
                inv[row][k] /= d;
            }
        }
    }

    (Mat4::from_cols_array_2d(&inv).transpose(), invertible)
}

impl Transform {
    /// Build a transform from a forward matrix, deriving the inverse.
    pub fn new(m: Mat4) -> Self {
        let (m_inv, invertible) = invert_gauss_jordan(&m);
        if !invertible {
            log::warn!("Transform matrix is singular; using a partially reduced inverse");
        }
        Self { m, m_inv }
    }

    /// Build a transform from a known forward/inverse pair.
    pub fn with_inverse(m: Mat4, m_inv: Mat4) -> Self {
        Self { m, m_inv }
    }

    pub fn identity() -> Self {
        Self::with_inverse(Mat4::IDENTITY, Mat4::IDENTITY)
    }

    pub fn translate(delta: Vec3) -> Self {
        Self::with_inverse(Mat4::from_translation(delta), Mat4::from_translation(-delta))
    }

    /// Per-axis scale. A zero factor falls back to the permissive inverse.
    pub fn scale(s: Vec3) -> Self {
        if s.x == 0.0 || s.y == 0.0 || s.z == 0.0 {
            return Self::new(Mat4::from_scale(s));
        }
        Self::with_inverse(Mat4::from_scale(s), Mat4::from_scale(s.recip()))
    }

    /// Rotation of `angle_deg` degrees about `axis` (Rodrigues' formula).
    ///
    /// A zero-length axis has no rotation and gives the identity.
    pub fn rotate(angle_deg: f32, axis: Vec3) -> Self {
        let Some(a) = axis.try_normalize() else {
            log::warn!("Rotation axis {} has no direction; using identity", axis);
            return Self::identity();
        };
        let (s, c) = angle_deg.to_radians().sin_cos();
        let k = 1.0 - c;

        let rows = [
            [a.x * a.x * k + c, a.x * a.y * k - a.z * s, a.x * a.z * k + a.y * s, 0.0],
            [a.x * a.y * k + a.z * s, a.y * a.y * k + c, a.y * a.z * k - a.x * s, 0.0],
            [a.x * a.z * k - a.y * s, a.y * a.z * k + a.x * s, a.z * a.z * k + c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let m = Mat4::from_cols_array_2d(&rows).transpose();

        // Orthonormal, so the inverse is the transpose.
        Self::with_inverse(m, m.transpose())
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.m
    }

    pub fn inverse_matrix(&self) -> &Mat4 {
        &self.m_inv
    }

    /// The inverse transform (forward and inverse swapped).
    pub fn inverse(&self) -> Self {
        Self::with_inverse(self.m_inv, self.m)
    }

    /// Composition `self ∘ other`: `other` is applied first.
    pub fn update(&self, other: &Transform) -> Self {
        Self::with_inverse(self.m * other.m, other.m_inv * self.m_inv)
    }

    pub fn is_identity(&self) -> bool {
        self.m == Mat4::IDENTITY
    }

    #[inline]
    pub fn apply_point(&self, p: Vec3) -> Vec3 {
        self.m.transform_point3(p)
    }

    #[inline]
    pub fn apply_vector(&self, v: Vec3) -> Vec3 {
        self.m.transform_vector3(v)
    }

    /// Normals map through the transpose of the inverse's linear part.
    /// The result is not normalized.
    #[inline]
    pub fn apply_normal(&self, n: Vec3) -> Vec3 {
        self.m_inv.transpose().transform_vector3(n)
    }

    /// Maps origin as a point and direction as a vector; the new ray is re-normalized.
    pub fn apply_ray(&self, r: &Ray) -> Ray {
        Ray::new(self.apply_point(r.origin), self.apply_vector(r.direction))
    }

    /// Re-bound all eight transformed corners.
    pub fn apply_bounds(&self, b: &Aabb) -> Aabb {
        if b.is_empty() {
            return *b;
        }
        let corners = b.corners().map(|c| self.apply_point(c));
        Aabb::from_point_cloud(&corners)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    fn sample_transforms() -> Vec<Transform> {
        vec![
            Transform::translate(Vec3::new(10.0, -2.0, 3.0)),
            Transform::scale(Vec3::new(2.0, 0.5, 3.0)),
            Transform::rotate(37.0, Vec3::new(1.0, 2.0, -0.5)),
            Transform::translate(Vec3::new(1.0, 1.0, 1.0))
                .update(&Transform::rotate(90.0, Vec3::Y))
                .update(&Transform::scale(Vec3::new(1.0, 4.0, 0.25))),
        ]
    }

    #[test]
    fn test_point_vector_normal_round_trip() {
        let p = Vec3::new(1.5, -2.0, 0.25);
        for t in sample_transforms() {
            let inv = t.inverse();
            assert!(close(t.apply_point(inv.apply_point(p)), p));
            assert!(close(t.apply_vector(inv.apply_vector(p)), p));
            assert!(close(t.apply_normal(inv.apply_normal(p)), p));
        }
    }

    #[test]
    fn test_forward_times_inverse_is_identity() {
        for t in sample_transforms() {
            let product = *t.matrix() * *t.inverse_matrix();
            assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-4));
        }
    }

    #[test]
    fn test_rotate_about_zero_axis_is_identity() {
        let t = Transform::rotate(60.0, Vec3::ZERO);
        let product = *t.matrix() * *t.inverse_matrix();

        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-6));
        assert!(t.is_identity());
        assert!(close(t.apply_point(Vec3::X), Vec3::X));
    }

    #[test]
    fn test_composition_order() {
        let a = Transform::rotate(90.0, Vec3::Z);
        let b = Transform::translate(Vec3::new(1.0, 0.0, 0.0));
        let p = Vec3::new(1.0, 2.0, 3.0);

        let composed = a.update(&b);
        assert!(close(composed.apply_point(p), a.apply_point(b.apply_point(p))));
        // Translate first, then rotate: (2, 2, 3) -> (-2, 2, 3)
        assert!(close(composed.apply_point(p), Vec3::new(-2.0, 2.0, 3.0)));
    }

    #[test]
    fn test_translation_does_not_move_vectors() {
        let t = Transform::translate(Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(t.apply_vector(Vec3::X), Vec3::X);
        assert_eq!(t.apply_point(Vec3::X), Vec3::new(11.0, 20.0, 30.0));
    }

    #[test]
    fn test_rotation_about_z() {
        let t = Transform::rotate(90.0, Vec3::new(0.0, 0.0, 5.0));
        assert!(close(t.apply_vector(Vec3::X), Vec3::Y));
    }

    #[test]
    fn test_normal_stays_perpendicular_under_nonuniform_scale() {
        let t = Transform::scale(Vec3::new(4.0, 1.0, 1.0));
        let tangent = Vec3::new(1.0, -1.0, 0.0);
        let normal = Vec3::new(1.0, 1.0, 0.0);

        let new_tangent = t.apply_vector(tangent);
        let new_normal = t.apply_normal(normal);
        assert!(new_tangent.dot(new_normal).abs() < 1e-5);
    }

    #[test]
    fn test_apply_ray_renormalizes() {
        let t = Transform::scale(Vec3::new(3.0, 1.0, 1.0));
        let r = t.apply_ray(&Ray::new(Vec3::ONE, Vec3::X));
        assert!((r.direction.length() - 1.0).abs() < 1e-6);
        assert!(close(r.origin, Vec3::new(3.0, 1.0, 1.0)));
    }

    #[test]
    fn test_apply_bounds_uses_all_corners() {
        let b = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        let rotated = Transform::rotate(45.0, Vec3::Z).apply_bounds(&b);

        // The rotated square spans x in [-0.707, 0.707]; two corners alone would miss that.
        assert!(rotated.x.min < -0.7);
        assert!(rotated.x.max > 0.7);
        assert!(rotated.y.max > 1.41);
    }

    #[test]
    fn test_gauss_jordan_matches_closed_form() {
        let m = Mat4::from_cols_array_2d(&[
            [2.0, 0.0, 1.0, 0.0],
            [1.0, 3.0, 0.0, 0.0],
            [0.0, 1.0, 4.0, 0.0],
            [5.0, -1.0, 2.0, 1.0],
        ]);
        let (inv, ok) = invert_gauss_jordan(&m);
        assert!(ok);
        assert!(inv.abs_diff_eq(m.inverse(), 1e-4));
    }

    #[test]
    fn test_gauss_jordan_flags_singular() {
        let (_, ok) = invert_gauss_jordan(&Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)));
        assert!(!ok);

        let t = Transform::scale(Vec3::new(1.0, 0.0, 1.0));
        assert!(t.apply_point(Vec3::ONE).is_finite());
    }
}
