/// Error types for panorama rendering operations.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An attribute array file exists but could not be decoded.
    #[error("failed to read array {}: {source}", path.display())]
    Npy {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported dtype {dtype} in {}", path.display())]
    UnsupportedDtype { path: PathBuf, dtype: String },

    #[error("LAS error: {0}")]
    Las(#[from] las::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// A renderer was invoked without the per-point array it needs.
    #[error("{attribute} information is missing")]
    MissingAttribute { attribute: &'static str },

    #[error("{attribute} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        attribute: &'static str,
        expected: Vec<u64>,
        found: Vec<u64>,
    },

    /// Scene rejected because points fall outside the vertical field of view.
    #[error("{count} points outside the field of view")]
    FieldOfView { count: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    #[error("unknown site '{0}'")]
    UnknownSite(String),

    #[error("worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
