//! Lumo Renderer - Whitted-style CPU ray tracing
//!
//! Turns the records collected by `lumo_core` into a renderable scene and
//! shades its rows of pixels on all cores.
//!
//! The usual entry point is [`RenderContext`], which accepts scene
//! directives in order and renders when the world block closes:
//!
//! ```no_run
//! use lumo_core::ParamSet;
//! use lumo_renderer::{RenderContext, RunOptions};
//!
//! let mut ctx = RenderContext::new();
//! ctx.init(RunOptions::default());
//! ctx.film(ParamSet::new().with("x_res", 320).with("y_res", 240));
//! ctx.integrator(ParamSet::new().with("type", "normal_map"));
//! ctx.world_begin();
//! ctx.object(&ParamSet::new().with("type", "sphere").with("center", vec![0.0, 0.0, -3.0]))?;
//! ctx.world_end()?;
//! ctx.clean_up();
//! # Ok::<(), lumo_renderer::RenderError>(())
//! ```

mod api;
mod background;
mod blinn_phong;
mod bvh;
mod camera;
mod error;
mod film;
mod integrator;
mod light;
mod primitive;
mod scene;
mod shape;
mod sphere;
mod surfel;
mod triangle;

pub use api::{ApiState, RenderContext, RenderOptions, RenderReport};
pub use background::Background;
pub use blinn_phong::BlinnPhongIntegrator;
pub use bvh::{BvhAccel, DEFAULT_LEAF_SIZE};
pub use camera::{Camera, Projection, ScreenWindow};
pub use error::{RenderError, Result};
pub use film::{Film, ImageType, RunOptions};
pub use integrator::{
    create_integrator, render, render_row, DepthMapIntegrator, FlatIntegrator, Integrator, NormalMapIntegrator,
};
pub use light::{DirectionalLight, Light, LightSample, PointLight, SpotLight, VisibilityTester};
pub use primitive::{GeometricPrimitive, PrimList, Primitive};
pub use scene::Scene;
pub use shape::{Shape, ShapeHit};
pub use sphere::Sphere;
pub use surfel::{ObjSurfel, Surfel};
pub use triangle::Triangle;

/// Re-export common math types from lumo_math
pub use lumo_math::{Aabb, Color, Interval, Ray, Transform, Vec3};
