#![allow(dead_code)]

use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;

/// Write a solid-colour PNG of `width` x `height` into a scene's image directory.
pub fn write_image(root: &Path, scene: &str, name: &str, width: u32, height: u32, value: u8) {
    let dir = root.join(scene).join("jpg_rgb");
    fs::create_dir_all(&dir).unwrap();
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
        .save(dir.join(name))
        .unwrap();
}

/// Write `annotations.json` for a scene from `(image_name, boxes)` pairs.
pub fn write_annotations(root: &Path, scene: &str, entries: &[(&str, serde_json::Value)]) {
    let dir = root.join(scene);
    fs::create_dir_all(&dir).unwrap();
    let map: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .map(|(name, boxes)| {
            (
                name.to_string(),
                serde_json::json!({
                    "bounding_boxes": boxes,
                    "forward": "",
                    "rotate_ccw": "",
                }),
            )
        })
        .collect();
    fs::write(
        dir.join("annotations.json"),
        serde_json::to_string(&map).unwrap(),
    )
    .unwrap();
}

/// Two small scenes: Home_001_1 with three images, Office_001_1 with two.
pub fn two_scene_fixture(root: &Path) {
    let boxes = serde_json::json!([[10, 20, 50, 60, 3], [0, 0, 5, 5, 7]]);

    for name in ["000110000030101.png", "000110000010101.png", "000110000020101.png"] {
        write_image(root, "Home_001_1", name, 100, 80, 10);
    }
    write_annotations(
        root,
        "Home_001_1",
        &[
            ("000110000010101.png", boxes.clone()),
            ("000110000020101.png", serde_json::json!([])),
            ("000110000030101.png", boxes.clone()),
        ],
    );

    for name in ["100110000020101.png", "100110000010101.png"] {
        write_image(root, "Office_001_1", name, 64, 48, 200);
    }
    write_annotations(
        root,
        "Office_001_1",
        &[
            ("100110000010101.png", serde_json::json!([[1, 2, 11, 12, 9, 2]])),
            ("100110000020101.png", serde_json::json!([])),
        ],
    );
}

pub const FIXTURE_SCENES: [&str; 2] = ["Home_001_1", "Office_001_1"];
