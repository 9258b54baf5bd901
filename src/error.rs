//! Errors raised while loading scenes and writing images.
//!
//! Tracing itself never fails: a ray that hits nothing is `None`, and
//! degenerate geometry is filtered by epsilon comparisons.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    /// I/O error reading a scene or writing an image.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON scene description.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure while encoding an image.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Malformed line in a text scene description.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// Line number (1-indexed).
        line: usize,
        message: String,
    },

    /// The scene never declared a camera.
    #[error("scene has no camera")]
    MissingCamera,

    /// The scene parsed, but cannot be rendered as described.
    #[error("invalid scene: {0}")]
    Invalid(String),

    /// The output path has an extension no encoder handles.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
}

impl SceneError {
    /// Create a parse error.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}
