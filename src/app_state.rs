use chrono::{DateTime, Utc};
use minijinja::Environment;
use serde_json::json;

use crate::pipeline::InferenceContext;
use crate::web::page_templates;

/// Shared state handed to every request handler.
pub struct AppState {
    pub context: InferenceContext,
    pub templates: Environment<'static>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(context: InferenceContext) -> Self {
        Self {
            context,
            templates: page_templates(),
            started_at: Utc::now(),
        }
    }

    /// Readiness report: whether artifacts loaded, and what was loaded.
    pub fn readiness(&self) -> serde_json::Value {
        match self.context.artifacts() {
            Ok(artifacts) => json!({
                "ready": true,
                "model": artifacts.predictor.describe(),
                "labels": artifacts.labels.labels(),
                "artifacts": self.context.artifact_info(),
                "loaded_at": artifacts.loaded_at.to_rfc3339(),
                "started_at": self.started_at.to_rfc3339(),
            }),
            Err(e) => json!({
                "ready": false,
                "error": e.to_string(),
                "started_at": self.started_at.to_rfc3339(),
            }),
        }
    }
}
