// tests/common/mod.rs
// Artifact fixtures shared by the integration tests
#![allow(dead_code)]

use obesity_predictor::artifacts::ArtifactPaths;
use obesity_predictor::fields;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tempfile::TempDir;

/// Labels as a fitted target encoder stores them (sorted).
pub const LABELS: [&str; 7] = [
    "Insufficient_Weight",
    "Normal_Weight",
    "Obesity_Type_I",
    "Obesity_Type_II",
    "Obesity_Type_III",
    "Overweight_Level_I",
    "Overweight_Level_II",
];

/// Per-field encoders with sorted classes, like a fitted label encoder.
pub fn feature_encoders() -> Value {
    let map: BTreeMap<String, Vec<String>> = fields::categorical_fields()
        .map(|spec| {
            let mut classes: Vec<String> =
                spec.allowed_values().iter().map(|v| v.to_string()).collect();
            classes.sort();
            (spec.name.to_string(), classes)
        })
        .collect();

    Value::Object(
        map.into_iter()
            .map(|(field, classes)| (field, json!({ "classes": classes })))
            .collect(),
    )
}

/// Single tree splitting on Weight (column 3): <=50 insufficient, <=80
/// normal, heavier obesity type I.
pub fn weight_forest() -> Value {
    json!({
        "kind": "forest",
        "trees": [
            { "nodes": [
                { "feature": 3, "threshold": 50.0, "left": 1, "right": 2 },
                { "class": 0 },
                { "feature": 3, "threshold": 80.0, "left": 3, "right": 4 },
                { "class": 1 },
                { "class": 2 }
            ]}
        ]
    })
}

/// Write the three artifacts into a temp dir.
pub fn write_artifacts(model: &Value) -> (TempDir, ArtifactPaths) {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let paths = ArtifactPaths {
        model: dir.path().join("model.json"),
        target_encoder: dir.path().join("target_encoder.json"),
        feature_encoders: dir.path().join("feature_encoders.json"),
    };

    std::fs::write(&paths.model, model.to_string()).unwrap();
    std::fs::write(
        &paths.target_encoder,
        json!({ "classes": LABELS }).to_string(),
    )
    .unwrap();
    std::fs::write(&paths.feature_encoders, feature_encoders().to_string()).unwrap();

    (dir, paths)
}

/// The worked example: 25 year old male, 1.70 m, 70 kg.
pub fn scenario() -> Value {
    json!({
        "Age": 25, "Gender": "Male", "Height": 1.70, "Weight": 70,
        "CALC": "Sometimes", "FAVC": "yes", "FCVC": 2, "NCP": 3,
        "SCC": "no", "SMOKE": "no", "CH2O": 2,
        "family_history_with_overweight": "yes", "FAF": 1, "TUE": 1,
        "CAEC": "Sometimes", "MTRANS": "Public_Transportation"
    })
}
