// config.rs
// Runtime configuration for the predictor service

use crate::artifacts::ArtifactPaths;
use crate::errors::{PredictError, PredictResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub target_encoder_path: PathBuf,
    pub feature_encoders_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("artifacts/model.json"),
            target_encoder_path: PathBuf::from("artifacts/target_encoder.json"),
            feature_encoders_path: PathBuf::from("artifacts/feature_encoders.json"),
            host: "127.0.0.1".to_string(),
            port: 8050,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Reject values the service cannot start with.
    pub fn validate(&self) -> PredictResult<()> {
        for (key, path) in [
            ("model_path", &self.model_path),
            ("target_encoder_path", &self.target_encoder_path),
            ("feature_encoders_path", &self.feature_encoders_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(PredictError::config(format!("{key} cannot be empty")));
            }
        }

        if self.host.trim().is_empty() {
            return Err(PredictError::config("host cannot be empty"));
        }

        if self.port == 0 {
            return Err(PredictError::config("port must be non-zero"));
        }

        Ok(())
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.model_path.clone(),
            target_encoder: self.target_encoder_path.clone(),
            feature_encoders: self.feature_encoders_path.clone(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
