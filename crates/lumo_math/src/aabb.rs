use crate::{Interval, Ray, Vec3, EPS, INV_ZERO};

/// Axis-aligned bounding box used by shapes and the acceleration structures.
///
/// An AABB is three per-axis intervals. The default box is empty
/// (`min = +inf`, `max = -inf` on every axis) so it can seed a union.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Self { x, y, z }
    }

    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let lo = a.min(b);
        let hi = a.max(b);
        Self {
            x: Interval::new(lo.x, hi.x),
            y: Interval::new(lo.y, hi.y),
            z: Interval::new(lo.z, hi.z),
        }
    }

    /// Bound a point cloud and pad the result by `EPS` on every side.
    ///
    /// Every box derived from geometry goes through here, so flat shapes
    /// lying in an axis plane still get a volume the slab test can hit.
    pub fn from_point_cloud(points: &[Vec3]) -> Self {
        let mut bbox = Aabb::EMPTY;
        for &p in points {
            bbox = bbox.include_point(p);
        }
        if bbox.is_empty() {
            return bbox;
        }
        Self {
            x: bbox.x.pad(EPS),
            y: bbox.y.pad(EPS),
            z: bbox.z.pad(EPS),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Grow the box to include `p`.
    pub fn include_point(&self, p: Vec3) -> Self {
        Self {
            x: self.x.include(p.x),
            y: self.y.include(p.y),
            z: self.z.include(p.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// True when any axis is empty.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// True when `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        other.is_empty()
            || (self.x.contains_interval(&other.x)
                && self.y.contains_interval(&other.y)
                && self.z.contains_interval(&other.z))
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min(), self.max());
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Length of the min-to-max diagonal; zero for an empty box.
    pub fn diagonal(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max() - self.min()).length()
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    /// Slab test: the parametric interval over which the ray's line is inside the box.
    ///
    /// Returns `None` when the line misses the box. The interval may lie partly
    /// or wholly behind the origin; callers decide how to treat negative `t`.
    pub fn ray_interval(&self, r: &Ray) -> Option<(f32, f32)> {
        if self.is_empty() {
            return None;
        }

        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let d = r.direction[axis];
            let o = r.origin[axis];

            // A zero component never clips on that axis unless the origin is outside the slab.
            let inv = if d == 0.0 { INV_ZERO } else { 1.0 / d };
            let mut t0 = (slab.min - o) * inv;
            let mut t1 = (slab.max - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        Some((t_enter, t_exit))
    }

    /// True if the ray enters the box somewhere ahead of its origin.
    pub fn hit(&self, r: &Ray) -> bool {
        matches!(self.ray_interval(r), Some((_, t_exit)) if t_exit >= 0.0)
    }

    /// True if the ray's segment `[0, max_t)` overlaps the box.
    pub fn intersect_p(&self, r: &Ray, max_t: f32) -> bool {
        matches!(self.ray_interval(r), Some((t_enter, t_exit)) if t_exit >= 0.0 && t_enter < max_t)
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
