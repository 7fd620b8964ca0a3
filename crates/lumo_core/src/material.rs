//! Surface materials.
//!
//! Materials are a closed set of variants. Integrators read what they need
//! through [`Material::flat_color`] and [`Material::shading`] instead of
//! inspecting the variant.

use lumo_math::Color;

use crate::error::{Result, SceneError};
use crate::param::ParamSet;

/// Blinn-Phong reflectance coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinnPhong {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    /// Weight of the mirror-reflected ray.
    pub mirror: Color,
    /// Specular exponent; zero disables the highlight.
    pub glossiness: f32,
}

impl Default for BlinnPhong {
    fn default() -> Self {
        Self {
            ambient: Color::ZERO,
            diffuse: Color::splat(0.5),
            specular: Color::ZERO,
            mirror: Color::ZERO,
            glossiness: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Constant color, no lighting.
    Flat { color: Color },
    BlinnPhong(BlinnPhong),
}

impl Default for Material {
    fn default() -> Self {
        Material::Flat {
            color: Color::splat(0.5), // Grey default
        }
    }
}

impl Material {
    /// Build a material from a `material` directive.
    ///
    /// `type` is `flat` (reads `color`) or `blinn` (reads `ambient`, `diffuse`,
    /// `specular`, `mirror` and `glossiness`).
    pub fn from_params(ps: &ParamSet) -> Result<Self> {
        let kind = ps.get_one_string("type", "flat");
        match kind.as_str() {
            "flat" => Ok(Material::Flat {
                color: ps.get_one_color("color", Color::ZERO),
            }),
            "blinn" => {
                let defaults = BlinnPhong::default();
                Ok(Material::BlinnPhong(BlinnPhong {
                    ambient: ps.get_one_color("ambient", defaults.ambient),
                    diffuse: ps.get_one_color("diffuse", defaults.diffuse),
                    specular: ps.get_one_color("specular", defaults.specular),
                    mirror: ps.get_one_color("mirror", defaults.mirror),
                    glossiness: ps.get_one_float("glossiness", defaults.glossiness),
                }))
            }
            other => Err(SceneError::unknown_type("material", other)),
        }
    }

    /// The color a flat-shading integrator shows for this surface.
    pub fn flat_color(&self) -> Color {
        match self {
            Material::Flat { color } => *color,
            Material::BlinnPhong(b) => b.diffuse,
        }
    }

    /// Reflectance seen by the Blinn-Phong integrator. A flat material is purely diffuse.
    pub fn shading(&self) -> BlinnPhong {
        match self {
            Material::Flat { color } => BlinnPhong {
                ambient: Color::ZERO,
                diffuse: *color,
                specular: Color::ZERO,
                mirror: Color::ZERO,
                glossiness: 0.0,
            },
            Material::BlinnPhong(b) => *b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_from_params() {
        let ps = ParamSet::new()
            .with("type", "flat")
            .with("color", vec![0.1, 0.2, 0.3]);
        let m = Material::from_params(&ps).unwrap();

        assert!((m.flat_color() - Color::new(0.1, 0.2, 0.3)).length() < 1e-6);
        assert_eq!(m.shading().mirror, Color::ZERO);
    }

    #[test]
    fn test_blinn_from_params() {
        let ps = ParamSet::new()
            .with("type", "blinn")
            .with("diffuse", vec![0.9, 0.1, 0.1])
            .with("specular", vec![0.8, 0.8, 0.8])
            .with("mirror", vec![0.2, 0.2, 0.2])
            .with("glossiness", 64);
        let m = Material::from_params(&ps).unwrap();

        let b = m.shading();
        assert_eq!(b.glossiness, 64.0);
        assert!((b.mirror - Color::splat(0.2)).length() < 1e-6);
        assert_eq!(m.flat_color(), b.diffuse);
    }

    #[test]
    fn test_unknown_material_type() {
        let ps = ParamSet::new().with("type", "velvet");
        let err = Material::from_params(&ps).unwrap_err();
        assert!(matches!(err, SceneError::UnknownType { kind: "material", .. }));
    }
}
