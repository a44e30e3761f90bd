//! End-to-end submission tests against artifacts written to disk.

mod common;

use obesity_predictor::artifacts::LoadedArtifacts;
use obesity_predictor::encoders::{CategoryEncoders, LabelCodeTable};
use obesity_predictor::errors::{PredictError, PredictResult};
use obesity_predictor::features::FeatureVector;
use obesity_predictor::fields::FEATURE_COUNT;
use obesity_predictor::model::Predictor;
use obesity_predictor::pipeline::{InferenceContext, Outcome};
use obesity_predictor::request::RawRequest;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn raw(value: Value) -> RawRequest {
    serde_json::from_value(value).unwrap()
}

/// Records every call and always answers `Overweight_Level_I`.
struct CountingPredictor {
    calls: Arc<AtomicUsize>,
}

impl Predictor for CountingPredictor {
    fn predict(&self, features: &FeatureVector) -> PredictResult<i64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(features.len(), FEATURE_COUNT);
        Ok(5)
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}

fn counting_context() -> (InferenceContext, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let encoders =
        CategoryEncoders::from_json_slice(common::feature_encoders().to_string().as_bytes())
            .unwrap();
    let labels = LabelCodeTable::from_classes(common::LABELS).unwrap();
    let artifacts = LoadedArtifacts::new(
        encoders,
        labels,
        Box::new(CountingPredictor {
            calls: calls.clone(),
        }),
    );
    (InferenceContext::from_artifacts(artifacts), calls)
}

#[test]
fn scenario_predicts_from_disk_artifacts() {
    let (_dir, paths) = common::write_artifacts(&common::weight_forest());
    let ctx = InferenceContext::load(&paths);

    let prediction = ctx.submit(&raw(common::scenario())).unwrap();
    assert_eq!(prediction.label, "Normal_Weight");
    assert_eq!(prediction.features.get("Weight"), Some(70.0));
    assert_eq!(ctx.artifact_info().len(), 3);
}

#[test]
fn heavier_input_changes_the_label() {
    let (_dir, paths) = common::write_artifacts(&common::weight_forest());
    let ctx = InferenceContext::load(&paths);

    let mut payload = common::scenario();
    payload["Weight"] = json!(112.5);
    let prediction = ctx.submit(&raw(payload)).unwrap();
    assert_eq!(prediction.label, "Obesity_Type_I");
}

#[test]
fn linear_model_artifact_is_supported() {
    // only the Height column (index 2) carries weight: class 6 wins for tall inputs
    let mut coefficients = vec![vec![0.0; FEATURE_COUNT]; 7];
    coefficients[6][2] = 1.0;
    let model = json!({
        "kind": "linear",
        "coefficients": coefficients,
        "intercepts": [0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    });
    let (_dir, paths) = common::write_artifacts(&model);
    let ctx = InferenceContext::load(&paths);

    let prediction = ctx.submit(&raw(common::scenario())).unwrap();
    assert_eq!(prediction.class_code, 6);
    assert_eq!(prediction.label, "Overweight_Level_II");
}

#[test]
fn predictions_are_deterministic() {
    let (_dir, paths) = common::write_artifacts(&common::weight_forest());
    let ctx = InferenceContext::load(&paths);

    let labels: Vec<String> = (0..5)
        .map(|_| ctx.submit(&raw(common::scenario())).unwrap().label)
        .collect();
    assert!(labels.iter().all(|label| label == &labels[0]));
}

#[test]
fn non_numeric_age_is_rejected_before_prediction() {
    let (ctx, calls) = counting_context();
    let mut payload = common::scenario();
    payload["Age"] = json!("abc");

    let err = ctx.submit(&raw(payload)).unwrap_err();
    assert!(matches!(err, PredictError::InvalidNumericValue { ref field, .. } if field == "Age"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn missing_field_is_rejected_before_prediction() {
    let (ctx, calls) = counting_context();
    let mut payload = common::scenario();
    payload.as_object_mut().unwrap().remove("CAEC");

    let err = ctx.submit(&raw(payload)).unwrap_err();
    assert!(matches!(err, PredictError::MissingField { ref fields } if fields == &["CAEC"]));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn stub_predictor_is_called_once_per_valid_submission() {
    let (ctx, calls) = counting_context();
    let prediction = ctx.submit(&raw(common::scenario())).unwrap();
    assert_eq!(prediction.label, "Overweight_Level_I");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn leaf_outside_label_table_is_unknown_class_code() {
    let model = json!({
        "kind": "forest",
        "trees": [ { "nodes": [ { "class": 9 } ] } ]
    });
    let (_dir, paths) = common::write_artifacts(&model);
    let ctx = InferenceContext::load(&paths);

    let outcome = ctx.outcome(Some(&raw(common::scenario())));
    assert!(outcome.is_error());
    assert_eq!(outcome.message(), "Error: Predicted class code 9 has no label");
}

#[test]
fn model_with_wrong_width_leaves_context_degraded() {
    let model = json!({
        "kind": "linear",
        "coefficients": [[1.0, 2.0, 3.0]],
        "intercepts": [0.0],
    });
    let (_dir, paths) = common::write_artifacts(&model);
    let ctx = InferenceContext::load(&paths);

    assert!(!ctx.is_ready());
    let err = ctx.submit(&raw(common::scenario())).unwrap_err();
    assert!(matches!(err, PredictError::ArtifactLoad { .. }));
}

#[test]
fn missing_artifact_files_leave_context_degraded() {
    let (dir, paths) = common::write_artifacts(&common::weight_forest());
    std::fs::remove_file(&paths.target_encoder).unwrap();
    let ctx = InferenceContext::load(&paths);

    let outcome = ctx.outcome(Some(&raw(common::scenario())));
    assert!(outcome.message().contains("target_encoder"));
    assert_eq!(ctx.outcome(None), Outcome::Prompt);
    drop(dir);
}

#[test]
fn bundled_demo_artifacts_load() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("artifacts");
    let paths = obesity_predictor::artifacts::ArtifactPaths {
        model: root.join("model.json"),
        target_encoder: root.join("target_encoder.json"),
        feature_encoders: root.join("feature_encoders.json"),
    };
    let ctx = InferenceContext::load(&paths);
    assert!(ctx.is_ready());

    let prediction = ctx.submit(&raw(common::scenario())).unwrap();
    assert_eq!(prediction.label, "Normal_Weight");
}
