//! Integrators: per-ray color evaluation and the render loop.
//!
//! Rows of pixels are shaded in parallel with rayon. The scene, camera and
//! integrator are only read while pixels are shaded.

use rayon::prelude::*;

use lumo_core::{ParamSet, SceneError};
use lumo_math::{clamp_color, lerp_color, Color, Ray};

use crate::blinn_phong::BlinnPhongIntegrator;
use crate::camera::Camera;
use crate::error::Result;
use crate::film::Film;
use crate::scene::Scene;

/// Computes the color seen along a camera ray.
pub trait Integrator: Send + Sync {
    /// One-off pass over the scene before any pixel is shaded.
    fn preprocess(&mut self, _scene: &Scene, _camera: &Camera) {}

    /// Radiance arriving along `ray`; `background` is the color behind the pixel.
    fn li(&self, ray: &Ray, scene: &Scene, background: Color) -> Color;
}

/// Build an integrator from an `integrator` directive.
///
/// `type` is one of `flat`, `normal_map`, `depth_map` or `blinn_phong`.
pub fn create_integrator(ps: &ParamSet) -> Result<Box<dyn Integrator>> {
    let kind = ps.get_one_string("type", "flat");
    let integrator: Box<dyn Integrator> = match kind.as_str() {
        "flat" => Box::new(FlatIntegrator),
        "normal_map" => Box::new(NormalMapIntegrator),
        "depth_map" => Box::new(DepthMapIntegrator::from_params(ps)),
        "blinn_phong" => Box::new(BlinnPhongIntegrator::from_params(ps)),
        other => return Err(SceneError::unknown_type("integrator", other).into()),
    };
    log::debug!("Created {} integrator", kind);
    Ok(integrator)
}

/// Preprocess, shade every pixel into `film`, then write the image.
pub fn render(integrator: &mut dyn Integrator, scene: &Scene, camera: &Camera, film: &mut Film) -> Result<()> {
    integrator.preprocess(scene, camera);

    let integrator: &dyn Integrator = integrator;
    let rows: Vec<Vec<Color>> = (0..film.height())
        .into_par_iter()
        .map(|row| render_row(row, camera, scene, integrator))
        .collect();

    for (row, colors) in rows.iter().enumerate() {
        for (col, color) in colors.iter().enumerate() {
            film.add_sample(row as u32, col as u32, *color);
        }
    }
    film.write_image()
}

/// Shade one row of pixels, left to right.
pub fn render_row(row: u32, camera: &Camera, scene: &Scene, integrator: &dyn Integrator) -> Vec<Color> {
    let (width, height) = camera.resolution();
    (0..width)
        .map(|col| {
            let ray = camera.generate_ray(row, col);
            let background = scene.background.sample_pixel(row, col, width, height);
            integrator.li(&ray, scene, background)
        })
        .collect()
}

/// Shows the flat color of whatever the ray hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatIntegrator;

impl Integrator for FlatIntegrator {
    fn li(&self, ray: &Ray, scene: &Scene, background: Color) -> Color {
        match scene.intersect(ray) {
            Some(hit) => clamp_color(hit.primitive.material().flat_color()),
            None => background,
        }
    }
}

/// Shows surface normals, mapping each component from [-1, 1] to [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalMapIntegrator;

impl Integrator for NormalMapIntegrator {
    fn li(&self, ray: &Ray, scene: &Scene, background: Color) -> Color {
        match scene.intersect(ray) {
            Some(hit) => clamp_color((hit.n + Color::ONE) * 0.5),
            None => background,
        }
    }
}

/// Shows hit distance as a blend from `near_color` to `far_color`.
///
/// Distances are first normalized against the nearest and farthest hit seen
/// by the camera (found in `preprocess`), then remapped by `zmin`/`zmax`.
#[derive(Debug, Clone, Copy)]
pub struct DepthMapIntegrator {
    pub zmin: f32,
    pub zmax: f32,
    pub near_color: Color,
    pub far_color: Color,
    scene_tmin: f32,
    scene_tmax: f32,
}

impl DepthMapIntegrator {
    pub fn new(zmin: f32, zmax: f32, near_color: Color, far_color: Color) -> Self {
        Self {
            zmin,
            zmax,
            near_color,
            far_color,
            scene_tmin: 0.0,
            scene_tmax: 0.0,
        }
    }

    pub fn from_params(ps: &ParamSet) -> Self {
        Self::new(
            ps.get_one_float("zmin", 0.0),
            ps.get_one_float("zmax", 1.0),
            ps.get_one_color("near_color", Color::ZERO),
            ps.get_one_color("far_color", Color::ONE),
        )
    }

    /// Range of hit distances found by `preprocess`.
    pub fn scene_range(&self) -> (f32, f32) {
        (self.scene_tmin, self.scene_tmax)
    }

    /// Blend weight for a hit at distance `t`.
    fn depth_weight(&self, t: f32) -> f32 {
        let t_range = self.scene_tmax - self.scene_tmin;
        let norm_t = if t_range > 0.0 {
            (t - self.scene_tmin) / t_range
        } else {
            0.0
        };
        let z_range = self.zmax - self.zmin;
        if z_range > 0.0 {
            (norm_t - self.zmin) / z_range
        } else {
            norm_t
        }
    }
}

impl Integrator for DepthMapIntegrator {
    fn preprocess(&mut self, scene: &Scene, camera: &Camera) {
        let (width, height) = camera.resolution();
        let (tmin, tmax) = (0..height)
            .into_par_iter()
            .map(|row| {
                (0..width)
                    .filter_map(|col| scene.intersect(&camera.generate_ray(row, col)).map(|hit| hit.t))
                    .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), t| (lo.min(t), hi.max(t)))
            })
            .reduce(
                || (f32::INFINITY, f32::NEG_INFINITY),
                |(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)),
            );

        if tmin <= tmax {
            self.scene_tmin = tmin;
            self.scene_tmax = tmax;
        } else {
            // Nothing was hit.
            self.scene_tmin = 0.0;
            self.scene_tmax = 0.0;
        }
        log::debug!("Depth range [{}, {}]", self.scene_tmin, self.scene_tmax);
    }

    fn li(&self, ray: &Ray, scene: &Scene, background: Color) -> Color {
        match scene.intersect(ray) {
            Some(hit) => clamp_color(lerp_color(self.depth_weight(hit.t), self.near_color, self.far_color)),
            None => background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::Background;
    use crate::primitive::{GeometricPrimitive, PrimList, Primitive};
    use crate::sphere::Sphere;
    use lumo_core::Material;
    use lumo_math::{Ray, Transform, Vec3};
    use std::sync::Arc;

    fn sphere(center: Vec3, color: Color) -> Box<dyn Primitive> {
        Box::new(GeometricPrimitive::new(
            Box::new(Sphere::new(center, 0.5, false, Transform::identity())),
            Arc::new(Material::Flat { color }),
        ))
    }

    fn two_spheres() -> Scene {
        Scene::new(
            Background::solid(Color::splat(0.1)),
            Box::new(PrimList::new(vec![
                sphere(Vec3::new(-1.0, 0.0, -2.0), Color::X),
                sphere(Vec3::new(1.0, 0.0, -4.0), Color::Y),
            ])),
            Vec::new(),
        )
    }

    fn camera(width: u32, height: u32) -> Camera {
        let ps = ParamSet::new().with("type", "perspective").with("fovy", 90.0);
        let look_at = ParamSet::new()
            .with("look_from", vec![0.0, 0.0, 0.0])
            .with("look_at", vec![0.0, 0.0, -1.0]);
        Camera::from_params(&ps, &look_at, width, height).unwrap()
    }

    #[test]
    fn test_flat_integrator() {
        let scene = two_spheres();
        let bg = Color::splat(0.1);

        let hit_red = Ray::new(Vec3::ZERO, Vec3::new(-1.0, 0.0, -2.0));
        let miss = Ray::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(FlatIntegrator.li(&hit_red, &scene, bg), Color::X);
        assert_eq!(FlatIntegrator.li(&miss, &scene, bg), bg);
    }

    #[test]
    fn test_normal_map_integrator() {
        let scene = two_spheres();
        // Straight at the front of the red sphere: normal +Z.
        let ray = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::NEG_Z);
        let c = NormalMapIntegrator.li(&ray, &scene, Color::ZERO);
        assert!((c - Color::new(0.5, 0.5, 1.0)).length() < 1e-4);
    }

    #[test]
    fn test_depth_map_preprocess_and_blend() {
        let scene = two_spheres();
        let mut depth = DepthMapIntegrator::new(0.0, 1.0, Color::ZERO, Color::ONE);
        depth.preprocess(&scene, &camera(32, 32));

        let (tmin, tmax) = depth.scene_range();
        assert!(tmin > 1.0 && tmin < tmax);

        let near = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::NEG_Z);
        let far = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_Z);
        let near_c = depth.li(&near, &scene, Color::X);
        let far_c = depth.li(&far, &scene, Color::X);
        assert!(near_c.x < far_c.x);
        assert!(far_c.max_element() <= 1.0 && near_c.min_element() >= 0.0);

        let miss = Ray::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(depth.li(&miss, &scene, Color::X), Color::X);
    }

    #[test]
    fn test_depth_map_empty_scene() {
        let scene = Scene::new(Background::default(), Box::new(PrimList::new(Vec::new())), Vec::new());
        let mut depth = DepthMapIntegrator::new(0.0, 1.0, Color::ZERO, Color::ONE);
        depth.preprocess(&scene, &camera(4, 4));
        assert_eq!(depth.scene_range(), (0.0, 0.0));
    }

    #[test]
    fn test_create_integrator() {
        for kind in ["flat", "normal_map", "depth_map", "blinn_phong"] {
            assert!(create_integrator(&ParamSet::new().with("type", kind)).is_ok());
        }
        assert!(create_integrator(&ParamSet::new().with("type", "path")).is_err());
    }

    #[test]
    fn test_render_row_uses_background() {
        let scene = Scene::new(
            Background::solid(Color::splat(0.3)),
            Box::new(PrimList::new(Vec::new())),
            Vec::new(),
        );
        let row = render_row(0, &camera(5, 3), &scene, &FlatIntegrator);
        assert_eq!(row, vec![Color::splat(0.3); 5]);
    }

    #[test]
    fn test_render_writes_film() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.png");
        let scene = two_spheres();
        let camera = camera(16, 8);
        let mut film = Film::new(16, 8, &path, crate::film::ImageType::Png);

        render(&mut FlatIntegrator, &scene, &camera, &mut film).unwrap();

        assert!(path.exists());
        // Top row looks over both spheres.
        assert!((film.pixel(0, 0) - Color::splat(0.1)).length() < 1e-6);
    }
}
