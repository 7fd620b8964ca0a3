//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Built bottom-up: primitives are sorted by the minimum x of their bounds,
//! cut into fixed-size leaves, and neighbouring nodes are paired level by
//! level until a single root remains. An odd node at the end of a level moves
//! up unchanged.

use lumo_math::{Aabb, Ray};

use crate::primitive::{nearest, Primitive};
use crate::surfel::ObjSurfel;

/// Primitives per leaf in the default configuration.
pub const DEFAULT_LEAF_SIZE: usize = 1;

/// BVH node - either a branch with two children or a leaf with primitives.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of primitives.
    Leaf {
        primitives: Vec<Box<dyn Primitive>>,
        bbox: Aabb,
    },
}

impl BvhNode {
    fn leaf(primitives: Vec<Box<dyn Primitive>>) -> Self {
        let bbox = primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &p.bounds()));
        BvhNode::Leaf { primitives, bbox }
    }

    fn branch(left: BvhNode, right: BvhNode) -> Self {
        let bbox = Aabb::surrounding(&left.bbox(), &right.bbox());
        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    fn intersect(&self, ray: &Ray) -> Option<ObjSurfel<'_>> {
        match self {
            BvhNode::Leaf { primitives, bbox } => {
                if !bbox.hit(ray) {
                    return None;
                }
                primitives
                    .iter()
                    .fold(None, |closest, p| nearest(closest, p.intersect(ray)))
            }
            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray) {
                    return None;
                }
                nearest(left.intersect(ray), right.intersect(ray))
            }
        }
    }

    fn intersect_p(&self, ray: &Ray, max_t: f32) -> bool {
        match self {
            BvhNode::Leaf { primitives, bbox } => {
                bbox.intersect_p(ray, max_t) && primitives.iter().any(|p| p.intersect_p(ray, max_t))
            }
            BvhNode::Branch { left, right, bbox } => {
                bbox.intersect_p(ray, max_t)
                    && (left.intersect_p(ray, max_t) || right.intersect_p(ray, max_t))
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// BVH aggregate over a set of primitives.
pub struct BvhAccel {
    root: Option<BvhNode>,
    len: usize,
}

impl BvhAccel {
    /// Build a BVH with at most `leaf_size` primitives per leaf (at least 1).
    pub fn new(primitives: Vec<Box<dyn Primitive>>, leaf_size: usize) -> Self {
        let leaf_size = leaf_size.max(1);
        let len = primitives.len();

        // Sort once on a cached key; bounds can be costly to recompute.
        let mut keyed: Vec<(f32, Box<dyn Primitive>)> = primitives
            .into_iter()
            .map(|p| (p.bounds().x.min, p))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut level: Vec<BvhNode> = Vec::with_capacity(len.div_ceil(leaf_size));
        let mut sorted = keyed.into_iter().map(|(_, p)| p).peekable();
        while sorted.peek().is_some() {
            let chunk: Vec<Box<dyn Primitive>> = sorted.by_ref().take(leaf_size).collect();
            level.push(BvhNode::leaf(chunk));
        }

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            let mut nodes = level.into_iter();
            while let Some(left) = nodes.next() {
                match nodes.next() {
                    Some(right) => next.push(BvhNode::branch(left, right)),
                    None => next.push(left),
                }
            }
            level = next;
        }

        let root = level.pop();
        if let Some(root) = &root {
            log::debug!(
                "Built BVH over {} primitives (leaf size {}, depth {})",
                len,
                leaf_size,
                root.depth()
            );
        }

        Self { root, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree; 0 when empty.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, BvhNode::depth)
    }
}

impl Primitive for BvhAccel {
    fn intersect(&self, ray: &Ray) -> Option<ObjSurfel<'_>> {
        self.root.as_ref()?.intersect(ray)
    }

    fn intersect_p(&self, ray: &Ray, max_t: f32) -> bool {
        self.root
            .as_ref()
            .is_some_and(|root| root.intersect_p(ray, max_t))
    }

    fn bounds(&self) -> Aabb {
        self.root.as_ref().map_or(Aabb::EMPTY, BvhNode::bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{GeometricPrimitive, PrimList};
    use crate::sphere::Sphere;
    use crate::triangle::Triangle;
    use lumo_core::{Material, TriangleMesh};
    use lumo_math::{Transform, Vec3};
    use std::sync::Arc;

    fn sphere(center: Vec3, radius: f32) -> Box<dyn Primitive> {
        Box::new(GeometricPrimitive::new(
            Box::new(Sphere::new(center, radius, false, Transform::identity())),
            Arc::new(Material::default()),
        ))
    }

    /// A mixed scene: a row of spheres, a scaled sphere and a ground quad.
    fn scene_primitives() -> Vec<Box<dyn Primitive>> {
        let mut prims: Vec<Box<dyn Primitive>> = (0..9)
            .map(|i| sphere(Vec3::new(i as f32 * 1.5 - 6.0, (i % 3) as f32 - 1.0, -5.0 - i as f32), 0.6))
            .collect();

        prims.push(Box::new(GeometricPrimitive::new(
            Box::new(Sphere::new(
                Vec3::ZERO,
                1.0,
                false,
                Transform::translate(Vec3::new(0.0, 0.0, -3.0))
                    .update(&Transform::scale(Vec3::new(2.0, 0.5, 0.5))),
            )),
            Arc::new(Material::default()),
        )));

        let ground = Arc::new(
            TriangleMesh::new(
                vec![
                    Vec3::new(-20.0, -2.0, 5.0),
                    Vec3::new(20.0, -2.0, 5.0),
                    Vec3::new(20.0, -2.0, -40.0),
                    Vec3::new(-20.0, -2.0, -40.0),
                ],
                vec![0, 1, 2, 0, 2, 3],
                None,
                false,
            )
            .unwrap(),
        );
        for tri in Triangle::from_mesh(&ground) {
            prims.push(Box::new(GeometricPrimitive::new(
                Box::new(tri),
                Arc::new(Material::default()),
            )));
        }
        prims
    }

    fn probe_rays() -> Vec<Ray> {
        let mut rays = Vec::new();
        for i in -6..=6 {
            for j in -4..=4 {
                let dir = Vec3::new(i as f32 * 0.15, j as f32 * 0.12, -1.0);
                rays.push(Ray::new(Vec3::new(0.0, 0.0, 2.0), dir));
            }
        }
        // Axis-aligned rays exercise the zero-direction slab case.
        rays.push(Ray::new(Vec3::new(-10.0, -1.0, -5.0), Vec3::X));
        rays.push(Ray::new(Vec3::new(0.0, 10.0, -3.0), -Vec3::Y));
        rays
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = BvhAccel::new(Vec::new(), DEFAULT_LEAF_SIZE);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert!(bvh.is_empty());
        assert_eq!(bvh.depth(), 0);
        assert!(bvh.intersect(&ray).is_none());
        assert!(!bvh.intersect_p(&ray, f32::INFINITY));
    }

    #[test]
    fn test_bvh_single_sphere() {
        let bvh = BvhAccel::new(vec![sphere(Vec3::new(0.0, 0.0, -1.0), 0.5)], DEFAULT_LEAF_SIZE);
        assert_eq!(bvh.depth(), 1);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = bvh.intersect(&ray).unwrap();
        assert!((hit.t - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_bvh_odd_count_builds_balanced_levels() {
        let prims: Vec<Box<dyn Primitive>> = (0..5)
            .map(|i| sphere(Vec3::new(i as f32 * 3.0, 0.0, -5.0), 0.5))
            .collect();
        let bvh = BvhAccel::new(prims, 1);

        // 5 leaves -> 3 -> 2 -> 1: the odd leaf is promoted twice.
        assert_eq!(bvh.len(), 5);
        assert_eq!(bvh.depth(), 4);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let prims: Vec<Box<dyn Primitive>> = (0..10)
            .map(|i| sphere(Vec3::new(i as f32, 0.0, -5.0), 0.5))
            .collect();
        let bvh = BvhAccel::new(prims, DEFAULT_LEAF_SIZE);

        // Ray that hits the sphere at x = 5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = bvh.intersect(&ray).unwrap();

        // Hit point should be near z = -4.5 (sphere at z = -5, radius 0.5)
        assert!((hit.p.z - (-4.5)).abs() < 0.01);
    }

    #[test]
    fn test_bvh_matches_list() {
        for leaf_size in [1, 2, 3] {
            let list = PrimList::new(scene_primitives());
            let bvh = BvhAccel::new(scene_primitives(), leaf_size);

            for ray in probe_rays() {
                let a = list.intersect(&ray);
                let b = bvh.intersect(&ray);
                assert_eq!(a.is_some(), b.is_some(), "hit mismatch for {:?}", ray);
                if let (Some(a), Some(b)) = (a, b) {
                    assert!((a.t - b.t).abs() < 1e-4, "t mismatch for {:?}", ray);
                    assert!((a.p - b.p).length() < 1e-3);
                }

                for max_t in [0.5, 3.0, 7.5, 100.0] {
                    assert_eq!(
                        list.intersect_p(&ray, max_t),
                        bvh.intersect_p(&ray, max_t),
                        "occlusion mismatch for {:?} at {}",
                        ray,
                        max_t
                    );
                }
            }
        }
    }

    #[test]
    fn test_bvh_bounds_cover_all_primitives() {
        let prims = scene_primitives();
        let boxes: Vec<Aabb> = prims.iter().map(|p| p.bounds()).collect();
        let bvh = BvhAccel::new(prims, DEFAULT_LEAF_SIZE);

        for b in &boxes {
            assert!(bvh.bounds().contains_box(b));
        }
    }
}
