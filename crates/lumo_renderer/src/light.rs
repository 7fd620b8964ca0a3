//! Light sources and shadow-ray visibility.
//!
//! Lights are specified in world space. Every light's color is its `L` or
//! `I` parameter multiplied per channel by `scale` (default 1).

use lumo_core::{ParamSet, SceneError};
use lumo_math::{Aabb, Color, Ray, Vec3, EPS};

use crate::error::Result;
use crate::scene::Scene;
use crate::surfel::{ObjSurfel, Surfel};

/// Shadow-ray test between a surface point and a point on a light.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityTester {
    pub object: Surfel,
    /// Light-side point; `wo` points toward the object and `t` is the gap.
    pub light: Surfel,
}

impl VisibilityTester {
    /// Cast from the light toward the object, stopping just short of it.
    pub fn unoccluded(&self, scene: &Scene) -> bool {
        let ray = Ray::new(self.light.p, self.light.wo);
        !scene.intersect_p(&ray, self.light.t - EPS)
    }
}

/// What a sampler light delivers to one surface point.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    pub color: Color,
    /// Unit direction the light travels, from the light toward the surface.
    pub direction: Vec3,
    pub visibility: VisibilityTester,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub radiance: Color,
    /// Unit propagation direction
    pub direction: Vec3,
    /// How far back along `-direction` the virtual light point sits
    pub min_free_distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub intensity: Color,
    pub position: Vec3,
    /// Unit spot axis
    pub axis: Vec3,
    /// Half-angle (degrees) beyond which the light is off
    pub cutoff: f32,
    /// Half-angle (degrees) inside which the light is at full strength
    pub falloff: f32,
}

impl SpotLight {
    /// Attenuation for a direction `angle` degrees off the axis.
    pub fn attenuation(&self, angle: f32) -> f32 {
        if angle > self.cutoff {
            0.0
        } else if angle > self.falloff {
            let x = (angle - self.falloff) / (self.cutoff - self.falloff);
            (1.0 - x).powi(4)
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Unconditional contribution, no direction and no shadow test.
    Ambient { radiance: Color },
    Point(PointLight),
    Directional(DirectionalLight),
    Spot(SpotLight),
}

impl Light {
    /// Build a light from a `light` directive.
    ///
    /// `world_bounds` sizes the free distance of directional lights.
    pub fn from_params(ps: &ParamSet, world_bounds: &Aabb) -> Result<Self> {
        let scale = ps.get_one_vec3("scale", Vec3::ONE);
        let kind = ps.get_one_string("type", "point");

        let light = match kind.as_str() {
            "ambient" => Light::Ambient {
                radiance: ps.get_one_color("L", Color::ONE) * scale,
            },
            "point" => Light::Point(PointLight {
                intensity: ps.get_one_color("I", Color::ONE) * scale,
                position: ps.get_one_vec3("from", Vec3::ZERO),
            }),
            "directional" => {
                let from = ps.get_one_vec3("from", Vec3::ZERO);
                let to = ps.get_one_vec3("to", Vec3::new(0.0, 0.0, 1.0));
                let diagonal = world_bounds.diagonal();
                let default_distance = if diagonal > 0.0 && diagonal.is_finite() {
                    diagonal
                } else {
                    1.0
                };
                Light::Directional(DirectionalLight {
                    radiance: ps.get_one_color("L", Color::ONE) * scale,
                    direction: (to - from).normalize_or_zero(),
                    min_free_distance: ps.get_one_float("min_free_distance", default_distance),
                })
            }
            "spot" => {
                let from = ps.get_one_vec3("from", Vec3::ZERO);
                let to = ps.get_one_vec3("to", Vec3::new(0.0, 0.0, 1.0));
                let cutoff = ps.get_one_float("cutoff", 30.0);
                Light::Spot(SpotLight {
                    intensity: ps.get_one_color("I", Color::ONE) * scale,
                    position: from,
                    axis: (to - from).normalize_or_zero(),
                    cutoff,
                    falloff: ps.get_one_float("falloff", cutoff).min(cutoff),
                })
            }
            other => return Err(SceneError::unknown_type("light", other).into()),
        };

        log::debug!("Created light: {:?}", light);
        Ok(light)
    }

    /// Radiance of an ambient light; `None` for sampler lights.
    pub fn ambient(&self) -> Option<Color> {
        match self {
            Light::Ambient { radiance } => Some(*radiance),
            _ => None,
        }
    }

    /// Incident light at a surface point; `None` for ambient lights and for
    /// a point that coincides with the light position.
    pub fn sample_li(&self, hit: &ObjSurfel<'_>) -> Option<LightSample> {
        let object = hit.surfel();
        match self {
            Light::Ambient { .. } => None,
            Light::Point(light) => {
                let (direction, distance) = toward(light.position, hit.p)?;
                Some(LightSample {
                    color: light.intensity,
                    direction,
                    visibility: VisibilityTester {
                        object,
                        light: Surfel::new(light.position, direction, distance),
                    },
                })
            }
            Light::Directional(light) => {
                let d = light.min_free_distance;
                Some(LightSample {
                    color: light.radiance,
                    direction: light.direction,
                    visibility: VisibilityTester {
                        object,
                        light: Surfel::new(hit.p - light.direction * d, light.direction, d),
                    },
                })
            }
            Light::Spot(light) => {
                let (direction, distance) = toward(light.position, hit.p)?;
                let angle = light.axis.dot(direction).clamp(-1.0, 1.0).acos().to_degrees();
                Some(LightSample {
                    color: light.intensity * light.attenuation(angle),
                    direction,
                    visibility: VisibilityTester {
                        object,
                        light: Surfel::new(light.position, direction, distance),
                    },
                })
            }
        }
    }
}

/// Unit direction and distance from `from` to `to`.
fn toward(from: Vec3, to: Vec3) -> Option<(Vec3, f32)> {
    let delta = to - from;
    let distance = delta.length();
    (distance > 0.0).then(|| (delta / distance, distance))
}
