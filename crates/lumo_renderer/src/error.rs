//! Fatal rendering errors.

use lumo_core::SceneError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
