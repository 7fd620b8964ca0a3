//! Graphics-state and coordinate-transform stacks, plus the named registries
//! that outlive a single world block.

use std::collections::HashMap;
use std::sync::Arc;

use lumo_math::Transform;

use crate::error::{Result, SceneError};
use crate::material::Material;
use crate::mesh::TriangleMesh;
use crate::obj::{self, ObjOptions};
use crate::param::ParamSet;

/// Stack of current transform matrices. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformStack {
    stack: Vec<Transform>,
}

impl TransformStack {
    /// A fresh stack holding one identity frame.
    pub fn new() -> Self {
        Self {
            stack: vec![Transform::identity()],
        }
    }

    /// The current transform matrix.
    pub fn top(&self) -> &Transform {
        // Invariant: at least one frame.
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Transform {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// Duplicate the current matrix.
    pub fn push(&mut self) {
        let top = *self.top();
        self.stack.push(top);
    }

    pub fn pop(&mut self) -> Result<()> {
        if self.stack.len() == 1 {
            return Err(SceneError::StackUnderflow("transform"));
        }
        self.stack.pop();
        Ok(())
    }

    pub fn set_top(&mut self, t: Transform) {
        *self.top_mut() = t;
    }

    /// `top = top ∘ t`: `t` acts first, in the current frame.
    pub fn compose(&mut self, t: &Transform) {
        let composed = self.top().update(t);
        self.set_top(composed);
    }

    pub fn reset_identity(&mut self) {
        self.set_top(Transform::identity());
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

/// One graphics-state frame.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    pub transforms: TransformStack,
    /// Shared with every primitive recorded while bound.
    pub material: Arc<Material>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            transforms: TransformStack::new(),
            material: Arc::new(Material::default()),
        }
    }
}

/// Stack of graphics-state frames. Never empty.
#[derive(Debug, Clone)]
pub struct GraphicsStateStack {
    stack: Vec<GraphicsState>,
}

impl GraphicsStateStack {
    pub fn new() -> Self {
        Self {
            stack: vec![GraphicsState::default()],
        }
    }

    pub fn current(&self) -> &GraphicsState {
        &self.stack[self.stack.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut GraphicsState {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// The current transform matrix of the top frame.
    pub fn ctm(&self) -> &Transform {
        self.current().transforms.top()
    }

    /// Duplicate the top frame; transforms are cloned, the material is shared.
    pub fn push(&mut self) {
        let top = self.current().clone();
        self.stack.push(top);
    }

    pub fn pop(&mut self) -> Result<()> {
        if self.stack.len() == 1 {
            return Err(SceneError::StackUnderflow("graphics state"));
        }
        self.stack.pop();
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for GraphicsStateStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Named materials, coordinate systems and the mesh file cache.
///
/// These persist across world blocks of one session.
#[derive(Debug, Default)]
pub struct GraphicsContext {
    named_materials: HashMap<String, Arc<Material>>,
    coordinate_systems: HashMap<String, Transform>,
    mesh_cache: HashMap<(String, ObjOptions), Arc<TriangleMesh>>,
}

impl GraphicsContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_named_material(&mut self, name: &str, material: Arc<Material>) {
        if self.named_materials.insert(name.to_string(), material).is_some() {
            log::warn!("Named material \"{}\" redefined", name);
        }
    }

    pub fn named_material(&self, name: &str) -> Result<Arc<Material>> {
        self.named_materials
            .get(name)
            .cloned()
            .ok_or_else(|| SceneError::UnknownNamedMaterial(name.to_string()))
    }

    pub fn save_coordinate_system(&mut self, name: &str, ctm: Transform) {
        self.coordinate_systems.insert(name.to_string(), ctm);
    }

    pub fn coordinate_system(&self, name: &str) -> Result<Transform> {
        self.coordinate_systems
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::UnknownCoordinateSystem(name.to_string()))
    }

    /// Resolve the mesh of a `trianglemesh` directive.
    ///
    /// Meshes loaded from a file are cached by file name and flags, so a file
    /// referenced many times is read once and its buffer shared.
    pub fn mesh(&mut self, ps: &ParamSet) -> Result<Arc<TriangleMesh>> {
        if !ps.contains("filename") {
            return Ok(Arc::new(TriangleMesh::from_params(ps)?));
        }

        let options = ObjOptions::from_params(ps);
        let key = (ps.get_one_string("filename", ""), options);

        if let Some(mesh) = self.mesh_cache.get(&key) {
            log::debug!("Mesh cache hit: {}", key.0);
            return Ok(Arc::clone(mesh));
        }

        let mesh = Arc::new(obj::load_obj(&key.0, &options)?);
        self.mesh_cache.insert(key, Arc::clone(&mesh));
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumo_math::Vec3;

    #[test]
    fn test_transform_stack_starts_with_identity() {
        let stack = TransformStack::new();
        assert_eq!(stack.depth(), 1);
        assert!(stack.top().is_identity());
    }

    #[test]
    fn test_transform_stack_pop_base_is_an_error() {
        let mut stack = TransformStack::new();
        assert!(matches!(stack.pop(), Err(SceneError::StackUnderflow(_))));
    }

    #[test]
    fn test_transform_stack_push_compose_pop() {
        let mut stack = TransformStack::new();
        stack.compose(&Transform::translate(Vec3::X));
        stack.push();
        stack.compose(&Transform::scale(Vec3::splat(2.0)));

        assert_eq!(stack.top().apply_point(Vec3::ONE), Vec3::new(3.0, 2.0, 2.0));

        stack.pop().unwrap();
        assert_eq!(stack.top().apply_point(Vec3::ONE), Vec3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn test_graphics_state_push_pop_restores_binding() {
        let mut gs = GraphicsStateStack::new();
        let red = Arc::new(Material::Flat {
            color: Vec3::new(1.0, 0.0, 0.0),
        });
        gs.current_mut().material = Arc::clone(&red);
        gs.current_mut()
            .transforms
            .compose(&Transform::rotate(30.0, Vec3::Y));
        let saved_ctm = *gs.ctm();

        gs.push();
        // Pushed frame shares the material and copies the transforms.
        assert!(Arc::ptr_eq(&gs.current().material, &red));
        gs.current_mut().material = Arc::new(Material::default());
        gs.current_mut()
            .transforms
            .compose(&Transform::translate(Vec3::new(0.0, 5.0, 0.0)));

        gs.pop().unwrap();
        assert!(Arc::ptr_eq(&gs.current().material, &red));
        assert_eq!(*gs.ctm(), saved_ctm);
        assert!(gs.pop().is_err());
    }

    #[test]
    fn test_named_lookups() {
        let mut ctx = GraphicsContext::new();
        ctx.add_named_material("gold", Arc::new(Material::default()));
        ctx.save_coordinate_system("camera", Transform::translate(Vec3::Z));

        assert!(ctx.named_material("gold").is_ok());
        assert!(matches!(
            ctx.named_material("silver"),
            Err(SceneError::UnknownNamedMaterial(_))
        ));
        assert_eq!(
            ctx.coordinate_system("camera").unwrap(),
            Transform::translate(Vec3::Z)
        );
        assert!(ctx.coordinate_system("nowhere").is_err());
    }
}
