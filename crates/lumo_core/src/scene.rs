//! Scene records: what the construction API accumulates before world end.
//!
//! Records are descriptors, not renderable objects. The renderer turns them
//! into shapes, primitives and lights when a world block closes.

use std::sync::Arc;

use lumo_math::Transform;

use crate::material::Material;
use crate::mesh::TriangleMesh;
use crate::param::ParamSet;

/// Geometry awaiting instantiation.
#[derive(Debug, Clone)]
pub enum ShapeDescriptor {
    /// Analytic shape built from its parameters (e.g. `sphere`).
    Params(ParamSet),
    /// A mesh buffer in object space, shared until it is placed.
    Mesh(Arc<TriangleMesh>),
}

/// A (shape, material, object-to-world transform) triple.
#[derive(Debug, Clone)]
pub struct PrimitiveRecord {
    pub shape: ShapeDescriptor,
    pub material: Arc<Material>,
    pub transform: Transform,
}

/// Light directive parameters. Lights are specified in world space.
#[derive(Debug, Clone)]
pub struct LightRecord(pub ParamSet);

/// Primitives and lights collected by one sink (the world or a named object).
#[derive(Debug, Clone, Default)]
pub struct SceneRecords {
    pub primitives: Vec<PrimitiveRecord>,
    pub lights: Vec<LightRecord>,
}

impl SceneRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_primitive(&mut self, record: PrimitiveRecord) {
        self.primitives.push(record);
    }

    pub fn push_light(&mut self, record: LightRecord) {
        self.lights.push(record);
    }

    /// Append `other`, consuming it.
    pub fn append(&mut self, other: SceneRecords) {
        self.primitives.extend(other.primitives);
        self.lights.extend(other.lights);
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
        self.lights.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty() && self.lights.is_empty()
    }
}
