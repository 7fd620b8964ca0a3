//! Screen-space background colors.

use lumo_core::{ParamSet, SceneError};
use lumo_math::{lerp_color, Color};

use crate::error::Result;

/// A rectangle with one color per corner, sampled by bilinear interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Background {
    pub top_left: Color,
    pub top_right: Color,
    pub bottom_left: Color,
    pub bottom_right: Color,
}

impl Default for Background {
    fn default() -> Self {
        Self::solid(Color::ZERO)
    }
}

impl Background {
    pub fn solid(color: Color) -> Self {
        Self {
            top_left: color,
            top_right: color,
            bottom_left: color,
            bottom_right: color,
        }
    }

    /// Build from a `background` directive of type `colors`.
    ///
    /// A single `color` fills everything; otherwise the corners are read
    /// from `tl`, `tr`, `bl` and `br` (black when missing).
    pub fn from_params(ps: &ParamSet) -> Result<Self> {
        let kind = ps.get_one_string("type", "colors");
        if kind != "colors" {
            return Err(SceneError::unknown_type("background", &kind).into());
        }

        if ps.contains("color") {
            return Ok(Self::solid(ps.get_one_color("color", Color::ZERO)));
        }
        Ok(Self {
            top_left: ps.get_one_color("tl", Color::ZERO),
            top_right: ps.get_one_color("tr", Color::ZERO),
            bottom_left: ps.get_one_color("bl", Color::ZERO),
            bottom_right: ps.get_one_color("br", Color::ZERO),
        })
    }

    /// Color at normalized screen position: `v` runs top to bottom, `u` left to right.
    pub fn sample(&self, v: f32, u: f32) -> Color {
        let top = lerp_color(u, self.top_left, self.top_right);
        let bottom = lerp_color(u, self.bottom_left, self.bottom_right);
        lerp_color(v, top, bottom)
    }

    /// Color behind pixel (`row`, `col`) of a `width` x `height` image.
    pub fn sample_pixel(&self, row: u32, col: u32, width: u32, height: u32) -> Color {
        let v = row as f32 / height.max(1) as f32;
        let u = col as f32 / width.max(1) as f32;
        self.sample(v, u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> Background {
        Background {
            top_left: Color::X,
            top_right: Color::Y,
            bottom_left: Color::Z,
            bottom_right: Color::ONE,
        }
    }

    #[test]
    fn test_corners_are_exact() {
        let bg = corners();
        assert_eq!(bg.sample(0.0, 0.0), Color::X);
        assert_eq!(bg.sample(0.0, 1.0), Color::Y);
        assert_eq!(bg.sample(1.0, 0.0), Color::Z);
        assert_eq!(bg.sample(1.0, 1.0), Color::ONE);
    }

    #[test]
    fn test_bilinear_center() {
        let c = corners().sample(0.5, 0.5);
        assert!((c - Color::new(0.5, 0.5, 0.5)).length() < 1e-6);
    }

    #[test]
    fn test_from_params_single_color() {
        let ps = ParamSet::new().with("type", "colors").with("color", vec![0.2, 0.4, 0.6]);
        let bg = Background::from_params(&ps).unwrap();
        assert!((bg.sample(0.3, 0.7) - Color::new(0.2, 0.4, 0.6)).length() < 1e-6);
    }

    #[test]
    fn test_from_params_integer_corners() {
        let ps = ParamSet::new()
            .with("tl", vec![255, 0, 0])
            .with("br", vec![0, 0, 255]);
        let bg = Background::from_params(&ps).unwrap();
        assert_eq!(bg.top_left, Color::X);
        assert_eq!(bg.bottom_right, Color::Z);
        assert_eq!(bg.top_right, Color::ZERO);
    }

    #[test]
    fn test_unknown_background_type() {
        let ps = ParamSet::new().with("type", "image");
        assert!(Background::from_params(&ps).is_err());
    }
}
