//! Lumo Core - scene construction state for the Lumo ray tracer.
//!
//! This crate provides:
//!
//! - **Parameter bags**: `ParamSet`, the typed key/value input of every directive
//! - **Scene data**: `Material`, `TriangleMesh` (inline or OBJ), scene records
//! - **Construction state**: graphics-state and transform stacks, named
//!   materials and coordinate systems, named-object instancing
//!
//! # Example
//!
//! ```
//! use lumo_core::{GraphicsStateStack, ParamSet, Material};
//! use lumo_math::{Transform, Vec3};
//!
//! let mut gs = GraphicsStateStack::new();
//! gs.current_mut().transforms.compose(&Transform::translate(Vec3::Y));
//!
//! let ps = ParamSet::new().with("type", "flat").with("color", vec![1.0, 0.0, 0.0]);
//! let red = Material::from_params(&ps).unwrap();
//! assert_eq!(red.flat_color(), Vec3::X);
//! ```

pub mod error;
pub mod graphics_state;
pub mod instancing;
pub mod material;
pub mod mesh;
pub mod obj;
pub mod param;
pub mod scene;

// Re-export commonly used types
pub use error::{Result, SceneError};
pub use graphics_state::{GraphicsContext, GraphicsState, GraphicsStateStack, TransformStack};
pub use instancing::{ObjectBuilder, ObjectRegistry};
pub use material::{BlinnPhong, Material};
pub use mesh::TriangleMesh;
pub use obj::{load_obj, ObjOptions};
pub use param::{ParamSet, ParamValue};
pub use scene::{LightRecord, PrimitiveRecord, SceneRecords, ShapeDescriptor};
