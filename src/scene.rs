//! Scene layout on disk and image name conventions

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{AvdError, Result};

/// Directory inside each scene holding the RGB frames.
pub const IMAGES_DIR: &str = "jpg_rgb";

/// Per-scene annotation file.
pub const ANNOTATION_FILENAME: &str = "annotations.json";

/// Train split 1 from the AVD paper.
pub const DEFAULT_TRAIN_SCENES: &[&str] = &[
    "Home_002_1",
    "Home_003_1",
    "Home_003_2",
    "Home_004_1",
    "Home_004_2",
    "Home_005_1",
    "Home_005_2",
    "Home_006_1",
    "Home_014_1",
    "Home_014_2",
    "Office_001_1",
];

/// Test split 1 from the AVD paper.
pub const DEFAULT_TEST_SCENES: &[&str] = &["Home_001_1", "Home_001_2", "Home_008_1"];

pub fn default_scenes(train: bool) -> Vec<String> {
    let scenes = if train {
        DEFAULT_TRAIN_SCENES
    } else {
        DEFAULT_TEST_SCENES
    };
    scenes.iter().map(|s| s.to_string()).collect()
}

pub fn scene_dir(root: &Path, scene: &str) -> PathBuf {
    root.join(scene)
}

pub fn images_dir(root: &Path, scene: &str) -> PathBuf {
    root.join(scene).join(IMAGES_DIR)
}

pub fn annotation_path(root: &Path, scene: &str) -> PathBuf {
    root.join(scene).join(ANNOTATION_FILENAME)
}

pub fn image_path(root: &Path, scene: &str, image_name: &str) -> PathBuf {
    images_dir(root, scene).join(image_name)
}

/// Derive the owning scene from an image name.
///
/// The first character selects the scene type (`'0'` is Home, anything else
/// Office), characters 1..4 are the scene id and character 4 the sub-index.
/// `"0420012345"` belongs to `Home_420_0`.
pub fn scene_for_image(image_name: &str) -> Result<String> {
    let chars: Vec<char> = image_name.chars().take(5).collect();
    if chars.len() < 5 {
        return Err(AvdError::MalformedImageName {
            name: image_name.to_string(),
        });
    }

    let scene_type = if chars[0] == '0' { "Home" } else { "Office" };
    let id: String = chars[1..4].iter().collect();
    Ok(format!("{}_{}_{}", scene_type, id, chars[4]))
}

/// Which parts of a scene's layout are present on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneStatus {
    pub scene: String,
    pub scene_dir: bool,
    pub images_dir: bool,
    pub annotations: bool,
}

impl SceneStatus {
    pub fn probe(root: &Path, scene: &str) -> Self {
        Self {
            scene: scene.to_string(),
            scene_dir: scene_dir(root, scene).is_dir(),
            images_dir: images_dir(root, scene).is_dir(),
            annotations: annotation_path(root, scene).is_file(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.scene_dir && self.images_dir && self.annotations
    }

    /// Short description of what is missing, empty when complete.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.scene_dir {
            missing.push("scene directory");
        }
        if !self.images_dir {
            missing.push(IMAGES_DIR);
        }
        if !self.annotations {
            missing.push(ANNOTATION_FILENAME);
        }
        missing
    }
}

/// True when every scene has its directory, image directory and annotation
/// file. Stops at the first incomplete scene.
pub fn check_integrity<S: AsRef<str>>(root: &Path, scenes: &[S]) -> bool {
    scenes
        .iter()
        .all(|scene| SceneStatus::probe(root, scene.as_ref()).is_complete())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scene_for_image() {
        assert_eq!(scene_for_image("0420012345").unwrap(), "Home_420_0");
        assert_eq!(scene_for_image("1420012345").unwrap(), "Office_420_0");
        assert_eq!(scene_for_image("000110000010101.jpg").unwrap(), "Home_001_1");
        assert_eq!(scene_for_image("2001100000").unwrap(), "Office_001_1");
    }

    #[test]
    fn test_scene_for_image_only_reads_prefix() {
        assert_eq!(
            scene_for_image("04200").unwrap(),
            scene_for_image("04200zzzz.png").unwrap()
        );
    }

    #[test]
    fn test_scene_for_short_name() {
        let err = scene_for_image("0420").unwrap_err();
        assert!(matches!(err, AvdError::MalformedImageName { .. }));
    }

    #[test]
    fn test_default_scenes() {
        assert_eq!(default_scenes(true).len(), 11);
        assert_eq!(default_scenes(false), vec!["Home_001_1", "Home_001_2", "Home_008_1"]);
    }

    #[test]
    fn test_scene_status() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let status = SceneStatus::probe(root, "Home_001_1");
        assert_eq!(status.missing().len(), 3);

        fs::create_dir_all(images_dir(root, "Home_001_1")).unwrap();
        let status = SceneStatus::probe(root, "Home_001_1");
        assert_eq!(status.missing(), vec![ANNOTATION_FILENAME]);
        assert!(!check_integrity(root, &["Home_001_1"]));

        fs::write(annotation_path(root, "Home_001_1"), "{}").unwrap();
        assert!(SceneStatus::probe(root, "Home_001_1").is_complete());
        assert!(check_integrity(root, &["Home_001_1"]));
        assert!(!check_integrity(root, &["Home_001_1", "Home_001_2"]));
    }

    #[test]
    fn test_annotation_dir_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(images_dir(root, "Home_001_1")).unwrap();
        fs::create_dir_all(annotation_path(root, "Home_001_1")).unwrap();
        assert!(!check_integrity(root, &["Home_001_1"]));
    }
}
