//! Loading of the three fitted artifacts: model, target encoder and
//! per-field encoders.

use crate::encoders::{CategoryEncoders, LabelCodeTable};
use crate::errors::{PredictError, PredictResult};
use crate::model::{ModelArtifact, Predictor};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the artifacts live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub target_encoder: PathBuf,
    pub feature_encoders: PathBuf,
}

/// Provenance of one loaded artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub name: String,
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Read an artifact file and fingerprint it.
pub fn read_artifact(name: &str, path: &Path) -> PredictResult<(Vec<u8>, ArtifactInfo)> {
    let bytes = fs::read(path).map_err(|e| {
        PredictError::artifact_load(name, format!("failed to read {}: {e}", path.display()))
    })?;

    let info = ArtifactInfo {
        name: name.to_string(),
        path: path.to_path_buf(),
        sha256: format!("{:x}", Sha256::digest(&bytes)),
        size_bytes: bytes.len(),
    };

    Ok((bytes, info))
}

/// The fitted collaborators a submission needs. Read-only once built.
pub struct LoadedArtifacts {
    pub encoders: CategoryEncoders,
    pub labels: LabelCodeTable,
    pub predictor: Box<dyn Predictor>,
    pub info: Vec<ArtifactInfo>,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedArtifacts {
    /// Assemble from already-built parts, e.g. a stub predictor in tests.
    pub fn new(
        encoders: CategoryEncoders,
        labels: LabelCodeTable,
        predictor: Box<dyn Predictor>,
    ) -> Self {
        Self {
            encoders,
            labels,
            predictor,
            info: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Load all three artifacts. Any failure fails the whole set.
    pub fn load(paths: &ArtifactPaths) -> PredictResult<Self> {
        let (model_bytes, model_info) = read_artifact("model", &paths.model)?;
        let (target_bytes, target_info) = read_artifact("target_encoder", &paths.target_encoder)?;
        let (features_bytes, features_info) =
            read_artifact("feature_encoders", &paths.feature_encoders)?;

        let predictor = ModelArtifact::from_json_slice(&model_bytes)?.into_predictor()?;
        let labels = LabelCodeTable::from_json_slice(&target_bytes)?;
        let encoders = CategoryEncoders::from_json_slice(&features_bytes)?;

        info!(
            "Loaded {} with {} labels and {} field encoders",
            predictor.describe(),
            labels.len(),
            encoders.tables().count()
        );

        Ok(Self {
            encoders,
            labels,
            predictor,
            info: vec![model_info, target_info, features_info],
            loaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_sha256_hex() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target_encoder.json");
        fs::write(&path, b"abc").unwrap();

        let (bytes, info) = read_artifact("target_encoder", &path).unwrap();
        assert_eq!(bytes, b"abc");
        assert_eq!(info.size_bytes, 3);
        assert_eq!(
            info.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn missing_file_is_an_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_artifact("model", &dir.path().join("absent.json")).unwrap_err();
        match err {
            PredictError::ArtifactLoad { artifact, message } => {
                assert_eq!(artifact, "model");
                assert!(message.contains("absent.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
