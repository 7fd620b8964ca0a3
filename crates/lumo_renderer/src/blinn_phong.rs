//! Whitted-style Blinn-Phong integrator with mirror reflections.

use lumo_core::ParamSet;
use lumo_math::{clamp_color, Color, Ray, EPS};

use crate::integrator::Integrator;
use crate::light::Light;
use crate::scene::Scene;
use crate::surfel::ObjSurfel;

/// Direct Blinn-Phong lighting plus up to `max_depth - 1` mirror bounces.
#[derive(Debug, Clone, Copy)]
pub struct BlinnPhongIntegrator {
    max_depth: u32,
}

impl BlinnPhongIntegrator {
    /// A depth of 1 shades direct lighting only.
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    /// Reads `depth` (default 1).
    pub fn from_params(ps: &ParamSet) -> Self {
        Self::new(ps.get_one_int("depth", 1).max(1) as u32)
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Direct lighting at a hit, from every light in the scene.
    pub fn direct_lighting(&self, ray: &Ray, hit: &ObjSurfel<'_>, scene: &Scene) -> Color {
        let material = hit.primitive.material().shading();
        let mut color = Color::ZERO;

        for light in &scene.lights {
            if let Light::Ambient { radiance } = light {
                color += *radiance * material.ambient;
                continue;
            }
            let Some(sample) = light.sample_li(hit) else {
                continue;
            };
            if !sample.visibility.unoccluded(scene) {
                continue;
            }

            let diffuse = hit.n.dot(-sample.direction).max(0.0);
            color += material.diffuse * sample.color * diffuse;

            if material.glossiness != 0.0 {
                let h = -(ray.direction + sample.direction).normalize_or_zero();
                let specular = hit.n.dot(h).max(0.0).powf(material.glossiness);
                color += material.specular * sample.color * specular;
            }
        }

        color
    }

    fn trace(&self, ray: &Ray, scene: &Scene, background: Color, step: u32) -> Color {
        let Some(hit) = scene.intersect(ray) else {
            return background;
        };
        // Looking at the back of the surface.
        if hit.wo.dot(hit.n) < 0.0 {
            return Color::ZERO;
        }

        let mut color = self.direct_lighting(ray, &hit, scene);

        if step < self.max_depth {
            let mirror = hit.primitive.material().shading().mirror;
            if mirror != Color::ZERO {
                let d = ray.direction;
                let reflected = (d - 2.0 * d.dot(hit.n) * hit.n).normalize_or_zero();
                let bounce = Ray::new(hit.p + reflected * EPS, reflected);
                color += mirror * self.trace(&bounce, scene, background, step + 1);
            }
        }

        color
    }
}

impl Integrator for BlinnPhongIntegrator {
    fn li(&self, ray: &Ray, scene: &Scene, background: Color) -> Color {
        clamp_color(self.trace(ray, scene, background, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::Background;
    use crate::light::PointLight;
    use crate::primitive::{GeometricPrimitive, PrimList, Primitive};
    use crate::sphere::Sphere;
    use crate::triangle::Triangle;
    use lumo_core::{BlinnPhong, Material, TriangleMesh};
    use lumo_math::{Transform, Vec3};
    use std::sync::Arc;

    fn matte(diffuse: Color) -> Arc<Material> {
        Arc::new(Material::BlinnPhong(BlinnPhong {
            diffuse,
            ..BlinnPhong::default()
        }))
    }

    /// An upward-facing floor quad at y = 0.
    fn floor(material: Arc<Material>) -> Vec<Box<dyn Primitive>> {
        let mesh = Arc::new(
            TriangleMesh::new(
                vec![
                    Vec3::new(-5.0, 0.0, 5.0),
                    Vec3::new(5.0, 0.0, 5.0),
                    Vec3::new(5.0, 0.0, -5.0),
                    Vec3::new(-5.0, 0.0, -5.0),
                ],
                vec![0, 1, 2, 0, 2, 3],
                Some((vec![Vec3::Y], vec![0, 0, 0, 0, 0, 0])),
                false,
            )
            .unwrap(),
        );
        Triangle::from_mesh(&mesh)
            .into_iter()
            .map(|t| Box::new(GeometricPrimitive::new(Box::new(t), Arc::clone(&material))) as Box<dyn Primitive>)
            .collect()
    }

    fn point_light_above() -> Light {
        Light::Point(PointLight {
            intensity: Color::ONE,
            position: Vec3::new(0.5, 4.0, 0.3),
        })
    }

    fn scene_with(prims: Vec<Box<dyn Primitive>>, lights: Vec<Light>) -> Scene {
        Scene::new(Background::default(), Box::new(PrimList::new(prims)), lights)
    }

    /// Hits the floor at (0.5, 0, 0.3), away from the quad's diagonal.
    fn straight_down() -> Ray {
        Ray::new(Vec3::new(0.5, 2.0, 0.3), Vec3::NEG_Y)
    }

    #[test]
    fn test_point_light_lights_floor() {
        let scene = scene_with(floor(matte(Color::splat(0.8))), vec![point_light_above()]);
        let c = BlinnPhongIntegrator::new(1).li(&straight_down(), &scene, Color::ZERO);

        assert!((c - Color::splat(0.8)).length() < 1e-4);
    }

    #[test]
    fn test_occluder_blocks_point_light() {
        let mut prims = floor(matte(Color::splat(0.8)));
        // Sits between the light at y = 4 and the floor, off the camera ray.
        prims.push(Box::new(GeometricPrimitive::new(
            Box::new(Sphere::new(Vec3::new(0.5, 3.0, 0.3), 0.5, false, Transform::identity())),
            matte(Color::ONE),
        )));
        let scene = scene_with(prims, vec![point_light_above()]);
        let ray = Ray::new(Vec3::new(0.5, 1.0, 1.3), Vec3::new(0.0, -1.0, -1.0));

        let c = BlinnPhongIntegrator::new(1).li(&ray, &scene, Color::ZERO);
        assert_eq!(c, Color::ZERO);
    }

    #[test]
    fn test_ambient_is_unconditional() {
        let material = Arc::new(Material::BlinnPhong(BlinnPhong {
            ambient: Color::new(0.2, 0.4, 0.6),
            diffuse: Color::ZERO,
            ..BlinnPhong::default()
        }));
        let scene = scene_with(
            floor(material),
            vec![Light::Ambient {
                radiance: Color::splat(0.5),
            }],
        );
        let c = BlinnPhongIntegrator::new(1).li(&straight_down(), &scene, Color::ZERO);

        assert!((c - Color::new(0.1, 0.2, 0.3)).length() < 1e-5);
    }

    #[test]
    fn test_specular_highlight() {
        let material = Arc::new(Material::BlinnPhong(BlinnPhong {
            diffuse: Color::ZERO,
            specular: Color::ONE,
            glossiness: 16.0,
            ..BlinnPhong::default()
        }));
        let scene = scene_with(floor(material), vec![point_light_above()]);

        // Eye and light both straight above: the half vector equals the normal.
        let c = BlinnPhongIntegrator::new(1).li(&straight_down(), &scene, Color::ZERO);
        assert!((c - Color::ONE).length() < 1e-4);
    }

    #[test]
    fn test_back_faces_are_black() {
        let scene = scene_with(floor(matte(Color::ONE)), vec![point_light_above()]);
        let from_below = Ray::new(Vec3::new(0.5, -2.0, 0.3), Vec3::Y);

        let c = BlinnPhongIntegrator::new(1).li(&from_below, &scene, Color::splat(0.3));
        assert_eq!(c, Color::ZERO);
    }

    #[test]
    fn test_mirror_recursion_depth() {
        let mirror = Arc::new(Material::BlinnPhong(BlinnPhong {
            diffuse: Color::ZERO,
            mirror: Color::splat(0.5),
            ..BlinnPhong::default()
        }));
        let scene = scene_with(floor(mirror), Vec::new());
        let background = Color::ONE;

        // The reflected ray escapes to the background.
        let direct_only = BlinnPhongIntegrator::new(1).li(&straight_down(), &scene, background);
        let one_bounce = BlinnPhongIntegrator::new(2).li(&straight_down(), &scene, background);

        assert_eq!(direct_only, Color::ZERO);
        assert!((one_bounce - Color::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn test_depth_param() {
        let ps = ParamSet::new().with("depth", 3);
        assert_eq!(BlinnPhongIntegrator::from_params(&ps).max_depth(), 3);
        assert_eq!(BlinnPhongIntegrator::from_params(&ParamSet::new()).max_depth(), 1);
    }
}
