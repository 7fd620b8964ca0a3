//! Errors raised while building a scene.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal scene-construction errors.
///
/// Phase violations are not represented here: they are logged and the
/// offending directive is skipped.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Unknown {kind} type: \"{name}\"")]
    UnknownType { kind: &'static str, name: String },

    #[error("Failed to load mesh {path}: {source}")]
    MeshLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("Unknown named material: \"{0}\"")]
    UnknownNamedMaterial(String),

    #[error("Unknown named coordinate system: \"{0}\"")]
    UnknownCoordinateSystem(String),

    #[error("Unknown object: \"{0}\"")]
    UnknownObject(String),

    #[error("Object \"{0}\" is still being built")]
    ObjectInProgress(String),

    #[error("No object is being built")]
    NoObjectInProgress,

    #[error("Cannot pop the base {0} frame")]
    StackUnderflow(&'static str),
}

impl SceneError {
    pub fn unknown_type(kind: &'static str, name: impl Into<String>) -> Self {
        SceneError::UnknownType {
            kind,
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SceneError>;
