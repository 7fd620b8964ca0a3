//! JSON scene files.
//!
//! A scene file is an ordered list of directives, each an object whose `op`
//! field names the directive:
//!
//! ```json
//! { "directives": [
//!     { "op": "film", "params": { "x_res": 320, "y_res": 240 } },
//!     { "op": "world_begin" },
//!     { "op": "translate", "value": [0, 0, -3] },
//!     { "op": "object", "params": { "type": "sphere" } },
//!     { "op": "world_end" }
//! ] }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lumo_core::ParamSet;
use lumo_math::Vec3;
use lumo_renderer::{RenderContext, RenderReport, RunOptions};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneFile {
    pub directives: Vec<Directive>,
}

/// One scene directive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Directive {
    Film {
        #[serde(default)]
        params: ParamSet,
    },
    Camera {
        #[serde(default)]
        params: ParamSet,
    },
    LookAt {
        #[serde(default)]
        params: ParamSet,
    },
    Integrator {
        #[serde(default)]
        params: ParamSet,
    },
    Accelerator {
        #[serde(default)]
        params: ParamSet,
    },
    WorldBegin,
    WorldEnd,
    Background {
        #[serde(default)]
        params: ParamSet,
    },
    Material {
        #[serde(default)]
        params: ParamSet,
    },
    MakeNamedMaterial {
        name: String,
        #[serde(default)]
        params: ParamSet,
    },
    NamedMaterial {
        name: String,
    },
    Object {
        #[serde(default)]
        params: ParamSet,
    },
    Light {
        #[serde(default)]
        params: ParamSet,
    },
    PushGs,
    PopGs,
    PushCtm,
    PopCtm,
    Translate {
        value: [f32; 3],
    },
    /// Angle in degrees.
    Rotate {
        angle: f32,
        axis: [f32; 3],
    },
    Scale {
        value: [f32; 3],
    },
    Identity,
    SaveCoordSystem {
        name: String,
    },
    RestoreCoordSystem {
        name: String,
    },
    ObjectBegin {
        name: String,
    },
    ObjectEnd,
    ObjectInstance {
        name: String,
    },
}

impl Directive {
    /// Directive name as written in the scene file.
    pub fn op(&self) -> &'static str {
        match self {
            Directive::Film { .. } => "film",
            Directive::Camera { .. } => "camera",
            Directive::LookAt { .. } => "look_at",
            Directive::Integrator { .. } => "integrator",
            Directive::Accelerator { .. } => "accelerator",
            Directive::WorldBegin => "world_begin",
            Directive::WorldEnd => "world_end",
            Directive::Background { .. } => "background",
            Directive::Material { .. } => "material",
            Directive::MakeNamedMaterial { .. } => "make_named_material",
            Directive::NamedMaterial { .. } => "named_material",
            Directive::Object { .. } => "object",
            Directive::Light { .. } => "light",
            Directive::PushGs => "push_gs",
            Directive::PopGs => "pop_gs",
            Directive::PushCtm => "push_ctm",
            Directive::PopCtm => "pop_ctm",
            Directive::Translate { .. } => "translate",
            Directive::Rotate { .. } => "rotate",
            Directive::Scale { .. } => "scale",
            Directive::Identity => "identity",
            Directive::SaveCoordSystem { .. } => "save_coord_system",
            Directive::RestoreCoordSystem { .. } => "restore_coord_system",
            Directive::ObjectBegin { .. } => "object_begin",
            Directive::ObjectEnd => "object_end",
            Directive::ObjectInstance { .. } => "object_instance",
        }
    }

    /// Forward the directive to the render context.
    ///
    /// Returns the render report when the directive closed a world block.
    pub fn apply(&self, ctx: &mut RenderContext) -> lumo_renderer::Result<Option<RenderReport>> {
        match self {
            Directive::Film { params } => ctx.film(params.clone()),
            Directive::Camera { params } => ctx.camera(params.clone()),
            Directive::LookAt { params } => ctx.look_at(params.clone()),
            Directive::Integrator { params } => ctx.integrator(params.clone()),
            Directive::Accelerator { params } => ctx.accelerator(params.clone()),
            Directive::WorldBegin => ctx.world_begin(),
            Directive::WorldEnd => return ctx.world_end(),
            Directive::Background { params } => ctx.background(params.clone()),
            Directive::Material { params } => ctx.material(params)?,
            Directive::MakeNamedMaterial { name, params } => ctx.make_named_material(name, params)?,
            Directive::NamedMaterial { name } => ctx.named_material(name)?,
            Directive::Object { params } => ctx.object(params)?,
            Directive::Light { params } => ctx.light(params.clone()),
            Directive::PushGs => ctx.push_gs(),
            Directive::PopGs => ctx.pop_gs()?,
            Directive::PushCtm => ctx.push_ctm(),
            Directive::PopCtm => ctx.pop_ctm()?,
            Directive::Translate { value } => ctx.translate(Vec3::from_array(*value)),
            Directive::Rotate { angle, axis } => ctx.rotate(*angle, Vec3::from_array(*axis)),
            Directive::Scale { value } => ctx.scale(Vec3::from_array(*value)),
            Directive::Identity => ctx.identity(),
            Directive::SaveCoordSystem { name } => ctx.save_coord_system(name),
            Directive::RestoreCoordSystem { name } => ctx.restore_coord_system(name)?,
            Directive::ObjectBegin { name } => ctx.object_begin(name)?,
            Directive::ObjectEnd => ctx.object_end()?,
            Directive::ObjectInstance { name } => ctx.object_instance(name)?,
        }
        Ok(None)
    }
}

impl SceneFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to parse scene file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Run every directive in a fresh session and return one report per
    /// rendered world block.
    pub fn run(&self, run: RunOptions) -> Result<Vec<RenderReport>> {
        let mut ctx = RenderContext::new();
        ctx.init(run);

        let mut reports = Vec::new();
        for (i, directive) in self.directives.iter().enumerate() {
            log::debug!("Directive {}: {}", i, directive.op());
            let report = directive
                .apply(&mut ctx)
                .with_context(|| format!("Directive {} ({}) failed", i, directive.op()))?;
            reports.extend(report);
        }

        ctx.clean_up();
        Ok(reports)
    }
}
