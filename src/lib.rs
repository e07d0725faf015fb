//! Indexable (image, label) access to the Active Vision Dataset.
//!
//! ```no_run
//! use avd_index::{AvdDataset, DatasetConfig};
//!
//! let dataset = AvdDataset::open(DatasetConfig::new("/data/ActiveVisionDataset"))?;
//! let sample = dataset.get(0)?;
//! # Ok::<(), avd_index::AvdError>(())
//! ```

pub mod audit;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod report;
pub mod scene;

pub use config::DatasetConfig;
pub use dataset::{AvdDataset, ImageReader, RgbImageReader};
pub use error::{AvdError, Result};
pub use models::{BoundingBox, ImageData, Pixels, Sample, Target};
