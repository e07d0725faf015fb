//! Data models for avd-index

use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Decoded image, `(height, width, channels)`.
pub type Pixels = Array3<u8>;

/// Annotation file contents: image name to record.
pub type SceneAnnotations = HashMap<String, AnnotationRecord>;

/// One labeled box, stored in AVD order `[x_min, y_min, x_max, y_max, instance_id, ...]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct BoundingBox {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
    pub instance_id: i64,
    /// Trailing values (AVD stores a difficulty here); not interpreted.
    pub extra: Vec<f64>,
}

impl BoundingBox {
    pub fn new(x_min: i64, y_min: i64, x_max: i64, y_max: i64, instance_id: i64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
            instance_id,
            extra: Vec::new(),
        }
    }

    pub fn width(&self) -> i64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i64 {
        self.y_max - self.y_min
    }
}

impl TryFrom<Vec<f64>> for BoundingBox {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        if values.len() < 5 {
            return Err(format!(
                "bounding box needs at least 5 values, got {}",
                values.len()
            ));
        }
        Ok(Self {
            x_min: values[0] as i64,
            y_min: values[1] as i64,
            x_max: values[2] as i64,
            y_max: values[3] as i64,
            instance_id: values[4] as i64,
            extra: values[5..].to_vec(),
        })
    }
}

impl From<BoundingBox> for Vec<f64> {
    fn from(b: BoundingBox) -> Self {
        let mut values = vec![
            b.x_min as f64,
            b.y_min as f64,
            b.x_max as f64,
            b.y_max as f64,
            b.instance_id as f64,
        ];
        values.extend(b.extra);
        values
    }
}

/// Per-image entry of `annotations.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub bounding_boxes: Vec<BoundingBox>,
    /// Movement pointers and anything else stored alongside the boxes.
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// Label returned with an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Detection mode: the boxes as annotated.
    Boxes(Vec<BoundingBox>),
    /// Classification mode: one instance id per cropped region.
    Ids(Vec<i64>),
}

impl Target {
    pub fn len(&self) -> usize {
        match self {
            Target::Boxes(boxes) => boxes.len(),
            Target::Ids(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Image returned with a target.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    Full(Pixels),
    /// Classification mode: one crop per box.
    Crops(Vec<Pixels>),
}

impl ImageData {
    /// Shapes of the contained arrays.
    pub fn shapes(&self) -> Vec<[usize; 3]> {
        let shape = |p: &Pixels| {
            let (h, w, c) = p.dim();
            [h, w, c]
        };
        match self {
            ImageData::Full(p) => vec![shape(p)],
            ImageData::Crops(crops) => crops.iter().map(shape).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub image: ImageData,
    pub target: Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    MissingAnnotation,
    UnreadableImage,
    MalformedName,
}

impl IssueType {
    pub fn severity(&self) -> IssueSeverity {
        match self {
            IssueType::MissingAnnotation | IssueType::UnreadableImage => IssueSeverity::High,
            IssueType::MalformedName => IssueSeverity::Medium,
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueType::MissingAnnotation => write!(f, "missing_annotation"),
            IssueType::UnreadableImage => write!(f, "unreadable_image"),
            IssueType::MalformedName => write!(f, "malformed_name"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    pub severity: IssueSeverity,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub description: String,
}

impl Issue {
    pub fn new(image: &str, scene: Option<&str>, issue_type: IssueType, description: String) -> Self {
        Self {
            image: image.to_string(),
            scene: scene.map(str::to_string),
            severity: issue_type.severity(),
            issue_type,
            description,
        }
    }
}

/// Outcome of auditing a single image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResult {
    pub filename: String,
    pub scene: Option<String>,
    pub box_count: usize,
    pub issues: Vec<Issue>,
}

impl ImageResult {
    pub fn new(filename: String, scene: Option<String>) -> Self {
        Self {
            filename,
            scene,
            box_count: 0,
            issues: Vec::new(),
        }
    }

    pub fn add_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSummary {
    pub scene: String,
    pub images: usize,
    pub annotated: usize,
    pub missing_annotations: usize,
    pub malformed_names: usize,
    pub unreadable_images: usize,
    pub boxes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub generator: String,
    pub generator_version: String,
    pub generated_at: String,
    pub root: String,
    pub fingerprint: String,
    pub total_images: usize,
    pub images_audited: usize,
    pub decoded_images: bool,
    pub scenes: Vec<SceneSummary>,
    pub issues: Vec<Issue>,
    pub by_type: BTreeMap<String, usize>,
}

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

impl AuditResult {
    pub fn new(
        root: String,
        fingerprint: String,
        total_images: usize,
        images_audited: usize,
        decoded_images: bool,
    ) -> Self {
        Self {
            generator: "avd-index".to_string(),
            generator_version: VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            root,
            fingerprint,
            total_images,
            images_audited,
            decoded_images,
            scenes: Vec::new(),
            issues: Vec::new(),
            by_type: BTreeMap::new(),
        }
    }

    pub fn add_image_result(&mut self, result: ImageResult) {
        let scene_name = result.scene.clone().unwrap_or_else(|| "<unknown>".to_string());
        let idx = match self.scenes.iter().position(|s| s.scene == scene_name) {
            Some(idx) => idx,
            None => {
                self.scenes.push(SceneSummary {
                    scene: scene_name,
                    ..Default::default()
                });
                self.scenes.len() - 1
            }
        };

        let summary = &mut self.scenes[idx];
        summary.images += 1;
        summary.boxes += result.box_count;
        let mut annotated = true;
        for issue in &result.issues {
            match issue.issue_type {
                IssueType::MissingAnnotation => {
                    annotated = false;
                    summary.missing_annotations += 1;
                }
                IssueType::MalformedName => {
                    annotated = false;
                    summary.malformed_names += 1;
                }
                IssueType::UnreadableImage => summary.unreadable_images += 1,
            }
            *self.by_type.entry(issue.issue_type.to_string()).or_insert(0) += 1;
        }
        if annotated {
            summary.annotated += 1;
        }

        self.issues.extend(result.issues);
    }

    /// Order scene rows by name once all images are added.
    pub fn finish(&mut self) {
        self.scenes.sort_by(|a, b| a.scene.cmp(&b.scene));
    }

    pub fn images_with_issues(&self) -> usize {
        let mut images: Vec<&str> = self.issues.iter().map(|i| i.image.as_str()).collect();
        images.sort_unstable();
        images.dedup();
        images.len()
    }

    pub fn total_issues(&self) -> usize {
        self.issues.len()
    }

    pub fn count_of(&self, issue_type: &IssueType) -> usize {
        *self.by_type.get(&issue_type.to_string()).unwrap_or(&0)
    }

    pub fn high_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::High)
            .count()
    }

    pub fn medium_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Medium)
            .count()
    }

    pub fn total_boxes(&self) -> usize {
        self.scenes.iter().map(|s| s.boxes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_from_json() {
        let boxes: Vec<BoundingBox> =
            serde_json::from_str("[[10, 20, 50, 60, 3, 1], [0.0, 0.9, 5, 5, 7]]").unwrap();
        assert_eq!(boxes[0], BoundingBox { extra: vec![1.0], ..BoundingBox::new(10, 20, 50, 60, 3) });
        assert_eq!(boxes[1], BoundingBox::new(0, 0, 5, 5, 7));
        assert_eq!(boxes[0].width(), 40);
        assert_eq!(boxes[0].height(), 40);
    }

    #[test]
    fn test_bbox_too_short() {
        let parsed: Result<BoundingBox, _> = serde_json::from_str("[1, 2, 3, 4]");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_record_keeps_other_fields() {
        let record: AnnotationRecord = serde_json::from_str(
            r#"{"bounding_boxes": [[1, 2, 3, 4, 5]], "forward": "000110000020101.jpg", "rotate_cw": ""}"#,
        )
        .unwrap();
        assert_eq!(record.bounding_boxes.len(), 1);
        assert_eq!(record.other["forward"], "000110000020101.jpg");
    }

    #[test]
    fn test_audit_result_summary() {
        let mut result = AuditResult::new("/data".into(), "abc".into(), 3, 3, false);

        let mut ok = ImageResult::new("000110000010101.jpg".into(), Some("Home_001_1".into()));
        ok.box_count = 4;
        result.add_image_result(ok);

        let mut missing = ImageResult::new("000110000020101.jpg".into(), Some("Home_001_1".into()));
        missing.add_issue(Issue::new(
            "000110000020101.jpg",
            Some("Home_001_1"),
            IssueType::MissingAnnotation,
            "no record".into(),
        ));
        result.add_image_result(missing);

        let mut bad = ImageResult::new("x".into(), None);
        bad.add_issue(Issue::new("x", None, IssueType::MalformedName, "short".into()));
        result.add_image_result(bad);

        assert_eq!(result.total_issues(), 2);
        assert_eq!(result.images_with_issues(), 2);
        assert_eq!(result.high_count(), 1);
        assert_eq!(result.medium_count(), 1);
        assert_eq!(result.count_of(&IssueType::MissingAnnotation), 1);
        assert_eq!(result.total_boxes(), 4);

        let home = result.scenes.iter().find(|s| s.scene == "Home_001_1").unwrap();
        assert_eq!(home.images, 2);
        assert_eq!(home.annotated, 1);
        assert_eq!(home.missing_annotations, 1);
        assert_eq!(home.malformed_names, 0);

        let unknown = result.scenes.iter().find(|s| s.scene == "<unknown>").unwrap();
        assert_eq!(unknown.missing_annotations, 0);
        assert_eq!(unknown.malformed_names, 1);
        assert_eq!(unknown.annotated, 0);
    }

    #[test]
    fn test_finish_orders_scenes() {
        let mut result = AuditResult::new("/data".into(), "abc".into(), 2, 2, false);
        result.add_image_result(ImageResult::new("100110000010101.jpg".into(), Some("Office_001_1".into())));
        result.add_image_result(ImageResult::new("000110000010101.jpg".into(), Some("Home_001_1".into())));
        assert_eq!(result.scenes[0].scene, "Office_001_1");

        result.finish();
        let order: Vec<&str> = result.scenes.iter().map(|s| s.scene.as_str()).collect();
        assert_eq!(order, vec!["Home_001_1", "Office_001_1"]);
    }
}
