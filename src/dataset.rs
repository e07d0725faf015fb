//! Active Vision Dataset loading

use log::{debug, info};
use ndarray::{s, Array3};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DatasetConfig;
use crate::error::{AvdError, Result};
use crate::models::{BoundingBox, ImageData, Pixels, Sample, SceneAnnotations, Target};
use crate::scene::{self, annotation_path, check_integrity, image_path, images_dir};

pub type ImageTransform = Box<dyn Fn(Pixels) -> Pixels + Send + Sync>;
pub type TargetTransform = Box<dyn Fn(Vec<BoundingBox>) -> Vec<BoundingBox> + Send + Sync>;

/// Decodes an image file into a pixel array.
pub trait ImageReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<Pixels>;
}

/// Decodes with the `image` crate and converts to 8-bit RGB.
#[derive(Debug, Default, Clone, Copy)]
pub struct RgbImageReader;

impl ImageReader for RgbImageReader {
    fn read(&self, path: &Path) -> Result<Pixels> {
        let img = image::open(path)
            .map_err(|source| AvdError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgb8();
        let (width, height) = img.dimensions();
        let pixels = Array3::from_shape_vec((height as usize, width as usize, 3), img.into_raw())?;
        Ok(pixels)
    }
}

/// Read and parse a scene's `annotations.json`.
pub fn load_annotations(root: &Path, scene: &str) -> Result<SceneAnnotations> {
    let path = annotation_path(root, scene);
    let raw = fs::read(&path).map_err(|e| AvdError::io(&path, e))?;
    serde_json::from_slice(&raw).map_err(|source| AvdError::Json { path, source })
}

/// Crop `image[y_min..y_max, x_min..x_max, ..]`, clamped to the image.
///
/// Negative coordinates clamp to 0 rather than counting back from the far
/// edge as numpy slicing would, so `[-4, -4, 3, 3]` crops `0..3` on both axes.
pub fn crop(image: &Pixels, bbox: &BoundingBox) -> Pixels {
    let (height, width, _) = image.dim();
    let clamp = |v: i64, hi: usize| v.clamp(0, hi as i64) as usize;

    let y0 = clamp(bbox.y_min, height);
    let y1 = clamp(bbox.y_max, height).max(y0);
    let x0 = clamp(bbox.x_min, width);
    let x1 = clamp(bbox.x_max, width).max(x0);

    image.slice(s![y0..y1, x0..x1, ..]).to_owned()
}

/// Indexable view over the images and box annotations of a set of scenes.
pub struct AvdDataset {
    root: PathBuf,
    scenes: Vec<String>,
    classification: bool,
    image_names: Vec<String>,
    transform: ImageTransform,
    target_transform: TargetTransform,
    reader: Box<dyn ImageReader>,
}

impl AvdDataset {
    /// Validate the scenes and build the sorted image index.
    pub fn open(config: DatasetConfig) -> Result<Self> {
        let scenes = config.effective_scenes();
        let root = config.root;

        if !check_integrity(&root, &scenes) {
            return Err(AvdError::DatasetNotFound { root });
        }

        let mut image_names = Vec::new();
        for scene in &scenes {
            let dir = images_dir(&root, scene);
            let before = image_names.len();
            for entry in fs::read_dir(&dir).map_err(|e| AvdError::io(&dir, e))? {
                let entry = entry.map_err(|e| AvdError::io(&dir, e))?;
                let name = entry
                    .file_name()
                    .into_string()
                    .map_err(|_| AvdError::NonUtf8ImageName { path: entry.path() })?;
                image_names.push(name);
            }
            debug!("{}: {} images", scene, image_names.len() - before);
        }
        // image names start with their scene code, so sorting keeps scenes together
        image_names.sort();

        info!(
            "Indexed {} images from {} scenes under {}",
            image_names.len(),
            scenes.len(),
            root.display()
        );

        Ok(Self {
            root,
            scenes,
            classification: config.classification,
            image_names,
            transform: Box::new(|img: Pixels| img),
            target_transform: Box::new(|boxes: Vec<BoundingBox>| boxes),
            reader: Box::new(RgbImageReader),
        })
    }

    /// Applied to every image before any cropping.
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Pixels) -> Pixels + Send + Sync + 'static,
    {
        self.transform = Box::new(transform);
        self
    }

    /// Applied to every box list before any cropping. In classification mode
    /// the result still drives the crops, so keep one entry per box.
    pub fn with_target_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Vec<BoundingBox>) -> Vec<BoundingBox> + Send + Sync + 'static,
    {
        self.target_transform = Box::new(transform);
        self
    }

    pub fn with_reader<R: ImageReader + 'static>(mut self, reader: R) -> Self {
        self.reader = Box::new(reader);
        self
    }

    pub fn len(&self) -> usize {
        self.image_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_names.is_empty()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scenes(&self) -> &[String] {
        &self.scenes
    }

    pub fn is_classification(&self) -> bool {
        self.classification
    }

    pub fn image_names(&self) -> &[String] {
        &self.image_names
    }

    pub fn image_name(&self, index: usize) -> Result<&str> {
        self.image_names
            .get(index)
            .map(String::as_str)
            .ok_or(AvdError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    pub fn scene_of(&self, index: usize) -> Result<String> {
        scene::scene_for_image(self.image_name(index)?)
    }

    /// SHA-256 over the sorted image names. Equal fingerprints mean equal
    /// index-to-name mappings.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for name in &self.image_names {
            hasher.update(name.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }

    /// Decode one image without applying the transform.
    pub fn read_image(&self, scene_name: &str, image_name: &str) -> Result<Pixels> {
        self.reader.read(&image_path(&self.root, scene_name, image_name))
    }

    /// Load the image and boxes at `index`, transformed and, in
    /// classification mode, cropped per box.
    pub fn get(&self, index: usize) -> Result<Sample> {
        let image_name = self.image_name(index)?;
        let scene_name = scene::scene_for_image(image_name)?;
        debug!("Loading {} from {}", image_name, scene_name);

        let image = self.read_image(&scene_name, image_name)?;

        let mut annotations = load_annotations(&self.root, &scene_name)?;
        let boxes = annotations
            .remove(image_name)
            .ok_or_else(|| AvdError::AnnotationMissing {
                image: image_name.to_string(),
                scene: scene_name.clone(),
            })?
            .bounding_boxes;

        let image = (self.transform)(image);
        let boxes = (self.target_transform)(boxes);

        if !self.classification {
            return Ok(Sample {
                image: ImageData::Full(image),
                target: Target::Boxes(boxes),
            });
        }

        let crops = boxes.iter().map(|b| crop(&image, b)).collect();
        let ids = boxes.iter().map(|b| b.instance_id).collect();
        Ok(Sample {
            image: ImageData::Crops(crops),
            target: Target::Ids(ids),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<Sample>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}

impl std::fmt::Debug for AvdDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvdDataset")
            .field("root", &self.root)
            .field("scenes", &self.scenes)
            .field("classification", &self.classification)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
