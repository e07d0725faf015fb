//! Error type for dataset access

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AvdError>;

#[derive(Debug, Error)]
pub enum AvdError {
    #[error("dataset not found or corrupted under {}", root.display())]
    DatasetNotFound { root: PathBuf },

    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no annotation for image '{image}' in scene {scene}")]
    AnnotationMissing { image: String, scene: String },

    #[error("image name '{name}' does not encode a scene")]
    MalformedImageName { name: String },

    #[error("image file name is not valid UTF-8: {}", path.display())]
    NonUtf8ImageName { path: PathBuf },

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json parse error at {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("image decode error at {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("pixel buffer does not match image shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl AvdError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AvdError::Io {
            path: path.into(),
            source,
        }
    }
}
