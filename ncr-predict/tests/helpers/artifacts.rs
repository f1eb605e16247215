//! Small hand-computed model artifact set
//!
//! Stage 1 reads five keywords:
//!
//! | term        | class       |
//! |-------------|-------------|
//! | tolerance   | dimensional |
//! | diameter    | dimensional |
//! | scratch     | surface     |
//! | marking     | marking     |
//! | stain       | appearance  |
//!
//! A single hit gives logits (4, 0, 0, 0) after l2 normalisation, so the
//! winning class has probability e^4 / (e^4 + 3) ≈ 0.948. Text without any
//! vocabulary term scores 0.25 on every class and falls under the 0.30
//! threshold.
//!
//! Stage 2 maps defect i to root cause i (appearance → handling damage) and
//! stage 3 maps (defect i, root cause i) to action i.

use ncr_predict::artifacts::{load_inference_context, sha256_hex, MANIFEST_FILE};
use ncr_predict::{CascadeOrchestrator, CascadeSettings};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

pub const DEFECTS: [&str; 4] = ["dimensional", "surface", "marking", "appearance"];
pub const ROOT_CAUSES: [&str; 3] = ["tool wear", "handling damage", "setup error"];
pub const ACTIONS: [&str; 3] = ["recalibrate tool", "operator training", "fixture check"];

pub const STAGE1_FILE: &str = "stage1_defect_model.json";
pub const STAGE2_ENCODER_FILE: &str = "stage2_encoder.json";
pub const STAGE2_FILE: &str = "stage2_root_cause_model.json";
pub const STAGE3_ENCODER_FILE: &str = "stage3_encoder.json";
pub const STAGE3_FILE: &str = "stage3_corrective_action_model.json";

pub const ALL_FILES: [&str; 5] = [
    STAGE1_FILE,
    STAGE2_ENCODER_FILE,
    STAGE2_FILE,
    STAGE3_ENCODER_FILE,
    STAGE3_FILE,
];

pub fn stage1_json() -> Value {
    json!({
        "vectorizer": {
            "vocabulary": {
                "tolerance": 0,
                "diameter": 1,
                "scratch": 2,
                "marking": 3,
                "stain": 4
            },
            "idf": [1.0, 1.0, 1.0, 1.0, 1.0],
            "ngram_range": [1, 1],
            "sublinear_tf": false,
            "norm": "l2"
        },
        "classifier": {
            "classes": DEFECTS,
            "coef": [
                [4.0, 4.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 4.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 4.0, 0.0],
                [0.0, 0.0, 0.0, 0.0, 4.0]
            ],
            "intercept": [0.0, 0.0, 0.0, 0.0]
        }
    })
}

pub fn stage2_encoder_json() -> Value {
    json!({ "categories": [DEFECTS] })
}

pub fn stage2_json() -> Value {
    json!({
        "classes": ROOT_CAUSES,
        "coef": [
            [5.0, 0.0, 0.0, 0.0],
            [0.0, 5.0, 0.0, 5.0],
            [0.0, 0.0, 5.0, 0.0]
        ],
        "intercept": [0.0, 0.0, 0.0]
    })
}

pub fn stage3_encoder_json() -> Value {
    json!({ "categories": [DEFECTS, ROOT_CAUSES] })
}

pub fn stage3_json() -> Value {
    json!({
        "classes": ACTIONS,
        "coef": [
            [3.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0],
            [0.0, 3.0, 0.0, 3.0, 0.0, 3.0, 0.0],
            [0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 3.0]
        ],
        "intercept": [0.0, 0.0, 0.0]
    })
}

pub fn write_json(dir: &Path, file: &str, value: &Value) {
    std::fs::write(dir.join(file), serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

/// Write all five artifacts under their default names
pub fn write_artifact_set(dir: &Path) {
    write_json(dir, STAGE1_FILE, &stage1_json());
    write_json(dir, STAGE2_ENCODER_FILE, &stage2_encoder_json());
    write_json(dir, STAGE2_FILE, &stage2_json());
    write_json(dir, STAGE3_ENCODER_FILE, &stage3_encoder_json());
    write_json(dir, STAGE3_FILE, &stage3_json());
}

/// Write a manifest listing the default files with their current checksums
pub fn write_manifest(dir: &Path) {
    let keys = ["stage1", "stage2_encoder", "stage2", "stage3_encoder", "stage3"];
    let mut manifest = String::from("format_version = 1\ndescription = \"test cascade\"\n");
    for (key, file) in keys.iter().zip(ALL_FILES) {
        let digest = sha256_hex(&std::fs::read(dir.join(file)).unwrap());
        manifest.push_str(&format!(
            "\n[artifacts.{}]\nfile = \"{}\"\nsha256 = \"{}\"\n",
            key, file, digest
        ));
    }
    std::fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
}

/// Load a cascade from `dir` with default settings
pub fn load_test_cascade(dir: &Path) -> Arc<CascadeOrchestrator> {
    let context = load_inference_context(dir).unwrap();
    Arc::new(CascadeOrchestrator::new(
        Arc::new(context),
        CascadeSettings::default(),
    ))
}
