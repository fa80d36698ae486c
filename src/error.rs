//! Error types for the pose engine.

use std::fmt;

/// Result type alias for pose engine operations.
pub type Result<T> = std::result::Result<T, PoseError>;

/// Main error type for the pose engine.
///
/// Most of these never cross the engine boundary: detection, scoring, and
/// diagnosis all recover internally so a single bad frame cannot crash a
/// coaching session. They surface only from explicit setup paths such as
/// model loading and downloading.
#[derive(Debug)]
pub enum PoseError {
    /// Error loading an ONNX detector model.
    ModelLoad(String),
    /// Error during detector inference.
    Inference(String),
    /// Error decoding or resizing an image.
    Image(String),
    /// Invalid engine configuration.
    Config(String),
    /// Error downloading a model file.
    Download(String),
    /// Wrapped `std::io::Error`.
    Io(std::io::Error),
}

impl fmt::Display for PoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoad(msg) => write!(f, "Model load error: {msg}"),
            Self::Inference(msg) => write!(f, "Inference error: {msg}"),
            Self::Image(msg) => write!(f, "Image error: {msg}"),
            Self::Config(msg) => write!(f, "Config error: {msg}"),
            Self::Download(msg) => write!(f, "Download error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for PoseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PoseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for PoseError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err.to_string())
    }
}
