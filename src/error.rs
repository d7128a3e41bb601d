use thiserror::Error;

use crate::transform::TransformError;

/// Errors produced while loading a scene or writing a rendered image.
///
/// Nothing in the intersection or shading path returns an `Error`; a ray that
/// hits nothing is an ordinary `Intersection::miss()`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed scene description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid scene: {0}")]
    InvalidScene(String),

    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
}

pub type Result<T> = std::result::Result<T, Error>;
