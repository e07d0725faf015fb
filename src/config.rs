//! Dataset configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AvdError, Result};
use crate::scene::default_scenes;

fn default_train() -> bool {
    true
}

/// Construction parameters for [`crate::AvdDataset`].
///
/// Can be written as YAML:
///
/// ```yaml
/// root: /data/ActiveVisionDataset
/// train: false
/// scene_list: [Home_001_1, Home_008_1]
/// classification: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub root: PathBuf,
    /// Picks the default train or test scenes when `scene_list` is absent.
    #[serde(default = "default_train")]
    pub train: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_list: Option<Vec<String>>,
    /// Crop every box out of its image and return instance ids as targets.
    #[serde(default)]
    pub classification: bool,
}

impl DatasetConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            train: true,
            scene_list: None,
            classification: false,
        }
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| AvdError::io(path, e))?;
        serde_yaml::from_str(&content).map_err(|source| AvdError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn train(mut self, train: bool) -> Self {
        self.train = train;
        self
    }

    pub fn scene_list<S: Into<String>>(mut self, scenes: impl IntoIterator<Item = S>) -> Self {
        self.scene_list = Some(scenes.into_iter().map(Into::into).collect());
        self
    }

    pub fn classification(mut self, classification: bool) -> Self {
        self.classification = classification;
        self
    }

    /// The caller's scene list if given, otherwise the default split.
    pub fn effective_scenes(&self) -> Vec<String> {
        match &self.scene_list {
            Some(scenes) => scenes.clone(),
            None => default_scenes(self.train),
        }
    }
}
