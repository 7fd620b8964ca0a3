//! Scene-construction API.
//!
//! [`RenderContext`] is the session object every scene directive goes
//! through. It moves between three phases:
//!
//! - `Uninitialized` until [`RenderContext::init`]
//! - `Setup`, where film, camera, integrator and accelerator are configured
//! - `World`, where materials, geometry, lights and transforms are given
//!
//! A directive issued in the wrong phase is logged and skipped. Closing the
//! world renders it, then returns to `Setup` with the per-scene geometry and
//! lights cleared. Named materials, coordinate systems and objects persist.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lumo_core::{
    GraphicsContext, GraphicsStateStack, LightRecord, Material, ObjectBuilder, ObjectRegistry,
    ParamSet, PrimitiveRecord, SceneError, SceneRecords, ShapeDescriptor,
};
use lumo_math::{Transform, Vec3};

use crate::background::Background;
use crate::bvh::{BvhAccel, DEFAULT_LEAF_SIZE};
use crate::camera::Camera;
use crate::error::Result;
use crate::film::{Film, RunOptions};
use crate::integrator::{create_integrator, render};
use crate::light::Light;
use crate::primitive::{GeometricPrimitive, PrimList, Primitive};
use crate::scene::Scene;
use crate::sphere::Sphere;
use crate::triangle::Triangle;

/// Phase of the construction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiState {
    Uninitialized,
    Setup,
    World,
}

/// Parameters captured by the setup-phase directives.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub film: ParamSet,
    pub camera: ParamSet,
    pub look_at: ParamSet,
    pub integrator: ParamSet,
    pub accelerator: ParamSet,
    pub background: ParamSet,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            film: ParamSet::new(),
            camera: ParamSet::new().with("type", "perspective").with("fovy", 90.0),
            look_at: ParamSet::new(),
            integrator: ParamSet::new(),
            accelerator: ParamSet::new(),
            background: ParamSet::new(),
        }
    }
}

/// Summary of a finished render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub width: u32,
    pub height: u32,
    pub primitives: usize,
    pub lights: usize,
    pub elapsed: Duration,
    pub output: PathBuf,
}

/// The rendering session.
pub struct RenderContext {
    state: ApiState,
    run: RunOptions,
    options: RenderOptions,
    graphics: GraphicsStateStack,
    context: GraphicsContext,
    objects: ObjectRegistry,
    building: Option<ObjectBuilder>,
    records: SceneRecords,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    pub fn new() -> Self {
        Self {
            state: ApiState::Uninitialized,
            run: RunOptions::default(),
            options: RenderOptions::default(),
            graphics: GraphicsStateStack::new(),
            context: GraphicsContext::new(),
            objects: ObjectRegistry::new(),
            building: None,
            records: SceneRecords::new(),
        }
    }

    pub fn state(&self) -> ApiState {
        self.state
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn graphics_state(&self) -> &GraphicsStateStack {
        &self.graphics
    }

    /// Records collected so far in the current world block.
    pub fn records(&self) -> &SceneRecords {
        &self.records
    }

    pub fn objects(&self) -> &ObjectRegistry {
        &self.objects
    }

    /// Name of the object being built, if any.
    pub fn building(&self) -> Option<&str> {
        self.building.as_ref().map(ObjectBuilder::name)
    }

    /// Log a phase violation and tell the caller to skip the directive.
    fn verify(&self, expected: ApiState, directive: &str) -> bool {
        if self.state == expected {
            return true;
        }
        match self.state {
            ApiState::Uninitialized => {
                log::error!("{}() called before the engine was initialized; skipped", directive)
            }
            _ => log::error!(
                "{}() is only allowed in the {:?} phase, not {:?}; skipped",
                directive,
                expected,
                self.state
            ),
        }
        false
    }

    /// Where primitives and lights go: the open object, or the world.
    fn sink(&mut self) -> &mut SceneRecords {
        match &mut self.building {
            Some(builder) => builder.records_mut(),
            None => &mut self.records,
        }
    }

    // === Session ===

    pub fn init(&mut self, run: RunOptions) {
        if !self.verify(ApiState::Uninitialized, "init") {
            return;
        }
        self.run = run;
        self.options = RenderOptions::default();
        self.graphics = GraphicsStateStack::new();
        self.state = ApiState::Setup;
        log::info!("Rendering engine initialized");
    }

    pub fn clean_up(&mut self) {
        match self.state {
            ApiState::Uninitialized => {
                log::error!("clean_up() called before the engine was initialized");
            }
            ApiState::World => {
                log::error!("clean_up() called inside a world block; skipped");
            }
            ApiState::Setup => {
                self.state = ApiState::Uninitialized;
                log::info!("Rendering engine shut down");
            }
        }
    }

    // === Setup phase ===

    pub fn film(&mut self, ps: ParamSet) {
        if self.verify(ApiState::Setup, "film") {
            self.options.film = ps;
        }
    }

    pub fn camera(&mut self, ps: ParamSet) {
        if self.verify(ApiState::Setup, "camera") {
            self.options.camera = ps;
        }
    }

    pub fn look_at(&mut self, ps: ParamSet) {
        if self.verify(ApiState::Setup, "look_at") {
            self.options.look_at = ps;
        }
    }

    pub fn integrator(&mut self, ps: ParamSet) {
        if self.verify(ApiState::Setup, "integrator") {
            self.options.integrator = ps;
        }
    }

    pub fn accelerator(&mut self, ps: ParamSet) {
        if self.verify(ApiState::Setup, "accelerator") {
            self.options.accelerator = ps;
        }
    }

    /// Open a world block with a fresh graphics state.
    pub fn world_begin(&mut self) {
        if !self.verify(ApiState::Setup, "world_begin") {
            return;
        }
        self.graphics = GraphicsStateStack::new();
        self.records.clear();
        self.state = ApiState::World;
        log::info!("World begin");
    }

    // === World phase ===

    pub fn background(&mut self, ps: ParamSet) {
        if self.verify(ApiState::World, "background") {
            self.options.background = ps;
        }
    }

    /// Bind an anonymous material to the current graphics state.
    pub fn material(&mut self, ps: &ParamSet) -> Result<()> {
        if !self.verify(ApiState::World, "material") {
            return Ok(());
        }
        let material = Material::from_params(ps)?;
        self.graphics.current_mut().material = Arc::new(material);
        Ok(())
    }

    pub fn make_named_material(&mut self, name: &str, ps: &ParamSet) -> Result<()> {
        if !self.verify(ApiState::World, "make_named_material") {
            return Ok(());
        }
        let material = Material::from_params(ps)?;
        self.context.add_named_material(name, Arc::new(material));
        Ok(())
    }

    pub fn named_material(&mut self, name: &str) -> Result<()> {
        if !self.verify(ApiState::World, "named_material") {
            return Ok(());
        }
        self.graphics.current_mut().material = self.context.named_material(name)?;
        Ok(())
    }

    /// Record a shape under the current material and transform.
    ///
    /// `type` is `sphere` or `trianglemesh` (the default).
    pub fn object(&mut self, ps: &ParamSet) -> Result<()> {
        if !self.verify(ApiState::World, "object") {
            return Ok(());
        }
        let kind = ps.get_one_string("type", "trianglemesh");
        let shape = match kind.as_str() {
            "sphere" => ShapeDescriptor::Params(ps.clone()),
            "trianglemesh" => ShapeDescriptor::Mesh(self.context.mesh(ps)?),
            other => return Err(SceneError::unknown_type("shape", other).into()),
        };

        let record = PrimitiveRecord {
            shape,
            material: Arc::clone(&self.graphics.current().material),
            transform: *self.graphics.ctm(),
        };
        log::debug!("Recorded {} under {:?}", kind, record.transform.matrix());
        self.sink().push_primitive(record);
        Ok(())
    }

    /// Record a light. Lights are given in world space.
    pub fn light(&mut self, ps: ParamSet) {
        if self.verify(ApiState::World, "light") {
            self.sink().push_light(LightRecord(ps));
        }
    }

    pub fn push_gs(&mut self) {
        if self.verify(ApiState::World, "push_gs") {
            self.graphics.push();
        }
    }

    pub fn pop_gs(&mut self) -> Result<()> {
        if self.verify(ApiState::World, "pop_gs") {
            self.graphics.pop()?;
        }
        Ok(())
    }

    pub fn push_ctm(&mut self) {
        if self.verify(ApiState::World, "push_ctm") {
            self.graphics.current_mut().transforms.push();
        }
    }

    pub fn pop_ctm(&mut self) -> Result<()> {
        if self.verify(ApiState::World, "pop_ctm") {
            self.graphics.current_mut().transforms.pop()?;
        }
        Ok(())
    }

    fn compose(&mut self, directive: &str, t: Transform) {
        if self.verify(ApiState::World, directive) {
            self.graphics.current_mut().transforms.compose(&t);
        }
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.compose("translate", Transform::translate(offset));
    }

    /// Rotate by `angle` degrees about `axis`.
    pub fn rotate(&mut self, angle: f32, axis: Vec3) {
        self.compose("rotate", Transform::rotate(angle, axis));
    }

    pub fn scale(&mut self, factors: Vec3) {
        self.compose("scale", Transform::scale(factors));
    }

    pub fn identity(&mut self) {
        if self.verify(ApiState::World, "identity") {
            self.graphics.current_mut().transforms.reset_identity();
        }
    }

    pub fn save_coord_system(&mut self, name: &str) {
        if self.verify(ApiState::World, "save_coord_system") {
            let ctm = *self.graphics.ctm();
            self.context.save_coordinate_system(name, ctm);
        }
    }

    pub fn restore_coord_system(&mut self, name: &str) -> Result<()> {
        if !self.verify(ApiState::World, "restore_coord_system") {
            return Ok(());
        }
        let ctm = self.context.coordinate_system(name)?;
        self.graphics.current_mut().transforms.set_top(ctm);
        Ok(())
    }

    /// Start recording a named object. Only one object may be open.
    pub fn object_begin(&mut self, name: &str) -> Result<()> {
        if !self.verify(ApiState::World, "object_begin") {
            return Ok(());
        }
        if let Some(open) = &self.building {
            return Err(SceneError::ObjectInProgress(open.name().to_string()).into());
        }
        self.building = Some(self.objects.begin(name));
        Ok(())
    }

    pub fn object_end(&mut self) -> Result<()> {
        if !self.verify(ApiState::World, "object_end") {
            return Ok(());
        }
        let builder = self.building.take().ok_or(SceneError::NoObjectInProgress)?;
        self.objects.finish(builder);
        Ok(())
    }

    /// Add a copy of a finished object to the world under the current transform.
    pub fn object_instance(&mut self, name: &str) -> Result<()> {
        if !self.verify(ApiState::World, "object_instance") {
            return Ok(());
        }
        if self.building() == Some(name) {
            return Err(SceneError::ObjectInProgress(name.to_string()).into());
        }
        let instance = self.objects.instantiate(name, self.graphics.ctm())?;
        self.records.append(instance);
        Ok(())
    }

    /// Assemble and render the world, then go back to the setup phase.
    ///
    /// Returns `None` when called outside a world block.
    pub fn world_end(&mut self) -> Result<Option<RenderReport>> {
        if !self.verify(ApiState::World, "world_end") {
            return Ok(None);
        }
        if let Some(open) = self.building.take() {
            self.state = ApiState::Setup;
            self.records.clear();
            return Err(SceneError::ObjectInProgress(open.name().to_string()).into());
        }

        let report = self.render_world();

        self.state = ApiState::Setup;
        self.records.clear();
        log::info!("World end");
        report.map(Some)
    }

    fn render_world(&self) -> Result<RenderReport> {
        let start = Instant::now();

        let mut primitives: Vec<Box<dyn Primitive>> = Vec::new();
        for record in &self.records.primitives {
            build_primitives(record, &mut primitives)?;
        }
        let primitive_count = primitives.len();
        let aggregate = build_aggregate(&self.options.accelerator, primitives)?;

        let world_bounds = aggregate.bounds();
        let lights = self
            .records
            .lights
            .iter()
            .map(|record| Light::from_params(&record.0, &world_bounds))
            .collect::<Result<Vec<_>>>()?;
        let light_count = lights.len();

        let background = if self.options.background.is_empty() {
            Background::default()
        } else {
            Background::from_params(&self.options.background)?
        };
        let scene = Scene::new(background, aggregate, lights);

        let mut film = Film::from_params(&self.options.film, &self.run)?;
        let camera = Camera::from_params(
            &self.options.camera,
            &self.options.look_at,
            film.width(),
            film.height(),
        )?;
        let mut integrator = create_integrator(&self.options.integrator)?;

        log::info!(
            "Rendering {} primitives and {} lights at {}x{}",
            primitive_count,
            light_count,
            film.width(),
            film.height()
        );
        render(integrator.as_mut(), &scene, &camera, &mut film)?;

        let elapsed = start.elapsed();
        log::info!("Render finished in {:.2?}", elapsed);

        Ok(RenderReport {
            width: film.width(),
            height: film.height(),
            primitives: primitive_count,
            lights: light_count,
            elapsed,
            output: film.filename().to_path_buf(),
        })
    }
}

/// Turn one record into renderable primitives.
///
/// A mesh under the identity transform is shared as is; any other transform
/// gets its own transformed copy of the buffer.
fn build_primitives(record: &PrimitiveRecord, out: &mut Vec<Box<dyn Primitive>>) -> Result<()> {
    match &record.shape {
        ShapeDescriptor::Params(ps) => {
            let kind = ps.get_one_string("type", "sphere");
            if kind != "sphere" {
                return Err(SceneError::unknown_type("shape", kind).into());
            }
            let sphere = Sphere::from_params(ps, record.transform);
            out.push(Box::new(GeometricPrimitive::new(
                Box::new(sphere),
                Arc::clone(&record.material),
            )));
        }
        ShapeDescriptor::Mesh(mesh) => {
            let placed = if record.transform.is_identity() {
                Arc::clone(mesh)
            } else {
                Arc::new(mesh.transformed(&record.transform))
            };
            for triangle in Triangle::from_mesh(&placed) {
                out.push(Box::new(GeometricPrimitive::new(
                    Box::new(triangle),
                    Arc::clone(&record.material),
                )));
            }
        }
    }
    Ok(())
}

/// Root aggregate from an `accelerator` directive.
///
/// `type` is `list` (default) or `bvh`; a BVH reads `max_prims_per_node`.
fn build_aggregate(ps: &ParamSet, primitives: Vec<Box<dyn Primitive>>) -> Result<Box<dyn Primitive>> {
    let kind = ps.get_one_string("type", "list");
    match kind.as_str() {
        "list" => Ok(Box::new(PrimList::new(primitives))),
        "bvh" => {
            let leaf_size = ps.get_one_int("max_prims_per_node", DEFAULT_LEAF_SIZE as i32);
            Ok(Box::new(BvhAccel::new(primitives, leaf_size.max(1) as usize)))
        }
        other => Err(SceneError::unknown_type("accelerator", other).into()),
    }
}
