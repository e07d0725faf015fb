//! Annotation coverage audit over a dataset index

use indicatif::ProgressBar;
use log::warn;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};

use crate::dataset::{load_annotations, AvdDataset};
use crate::error::Result;
use crate::models::{AuditResult, ImageResult, Issue, IssueType, SceneAnnotations};
use crate::scene::{annotation_path, scene_for_image};

/// Configuration for an audit run
#[derive(Debug, Clone, Default)]
pub struct AuditConfig {
    /// Also decode every image, not just look up its annotation.
    pub decode_images: bool,
    /// Number of images to sample (0 = all)
    pub sample: usize,
    pub seed: u64,
}

/// Check every indexed image (or a seeded sample) for a matching annotation
/// record and, optionally, a decodable image file.
pub fn audit(
    dataset: &AvdDataset,
    config: &AuditConfig,
    progress: Option<&ProgressBar>,
) -> Result<AuditResult> {
    let mut names: Vec<&str> = dataset.image_names().iter().map(String::as_str).collect();
    if config.sample > 0 && config.sample < names.len() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(config.seed);
        names.shuffle(&mut rng);
        names.truncate(config.sample);
        names.sort_unstable();
    }

    // one parse per scene instead of one per image. A name may point outside
    // the scene list; its scene is loaded the same way `get` would load it.
    let scenes: BTreeSet<String> = names
        .iter()
        .filter_map(|name| scene_for_image(name).ok())
        .collect();
    let annotations: HashMap<String, SceneAnnotations> = scenes
        .into_par_iter()
        .filter(|scene| annotation_path(dataset.root(), scene).is_file())
        .map(|scene| load_annotations(dataset.root(), &scene).map(|a| (scene, a)))
        .collect::<Result<_>>()?;

    let results: Vec<ImageResult> = names
        .par_iter()
        .map(|name| {
            let result = audit_image(dataset, name, &annotations, config.decode_images);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            result
        })
        .collect();

    let mut audit_result = AuditResult::new(
        dataset.root().display().to_string(),
        dataset.fingerprint(),
        dataset.len(),
        names.len(),
        config.decode_images,
    );
    for result in results {
        audit_result.add_image_result(result);
    }
    audit_result.finish();

    Ok(audit_result)
}

fn audit_image(
    dataset: &AvdDataset,
    image_name: &str,
    annotations: &HashMap<String, SceneAnnotations>,
    decode: bool,
) -> ImageResult {
    let scene = match scene_for_image(image_name) {
        Ok(scene) => scene,
        Err(e) => {
            let mut result = ImageResult::new(image_name.to_string(), None);
            result.add_issue(Issue::new(
                image_name,
                None,
                IssueType::MalformedName,
                e.to_string(),
            ));
            return result;
        }
    };

    let mut result = ImageResult::new(image_name.to_string(), Some(scene.clone()));

    let missing = match annotations.get(&scene) {
        Some(records) => match records.get(image_name) {
            Some(record) => {
                result.box_count = record.bounding_boxes.len();
                None
            }
            None => Some(format!("'{}' has no entry in {}/annotations.json", image_name, scene)),
        },
        None => Some(format!("scene {} has no annotations.json", scene)),
    };
    if let Some(description) = missing {
        warn!("{}: {}", image_name, description);
        result.add_issue(Issue::new(
            image_name,
            Some(&scene),
            IssueType::MissingAnnotation,
            description,
        ));
    }

    if decode {
        if let Err(e) = dataset.read_image(&scene, image_name) {
            warn!("{}: {}", image_name, e);
            result.add_issue(Issue::new(
                image_name,
                Some(&scene),
                IssueType::UnreadableImage,
                format!("Failed to load image: {}", e),
            ));
        }
    }

    result
}
