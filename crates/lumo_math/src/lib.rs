// Re-export glam for convenience
pub use glam::*;

// Lumo math types
mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::{invert_gauss_jordan, Transform};

/// RGB color with components nominally in [0, 1].
pub type Color = Vec3;

/// Shared tolerance for ray offsets, box padding and shadow distances.
pub const EPS: f32 = 1e-3;

/// Reciprocal used for a zero ray-direction component in slab tests.
///
/// Large but finite, so `0 * INV_ZERO` stays a number instead of NaN.
pub const INV_ZERO: f32 = 1e18;

/// Linear interpolation between two colors.
#[inline]
pub fn lerp_color(t: f32, a: Color, b: Color) -> Color {
    a * (1.0 - t) + b * t
}

/// Clamp every channel of a color to [0, 1].
#[inline]
pub fn clamp_color(c: Color) -> Color {
    c.clamp(Vec3::ZERO, Vec3::ONE)
}
