//! pipeline.rs
//! Submission handling: validate, encode, predict, decode.
//!
//! [`InferenceContext`] is built once at startup and never mutated. It either
//! holds the loaded artifacts or the reason they could not be loaded; in the
//! latter case every submission fails with that reason and the process keeps
//! running.

use crate::artifacts::{ArtifactInfo, ArtifactPaths, LoadedArtifacts};
use crate::errors::{PredictError, PredictResult};
use crate::features::{build_feature_vector, FeatureVector};
use crate::request::RawRequest;
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// Message shown before anything has been submitted.
pub const PROMPT_MESSAGE: &str = "Please fill in the form and press Predict.";

/// Per-submission state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Encoding,
    Predicting,
    Decoding,
    Done,
    Failed { reason: String },
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionState::Idle => write!(f, "idle"),
            SubmissionState::Validating => write!(f, "validating"),
            SubmissionState::Encoding => write!(f, "encoding"),
            SubmissionState::Predicting => write!(f, "predicting"),
            SubmissionState::Decoding => write!(f, "decoding"),
            SubmissionState::Done => write!(f, "done"),
            SubmissionState::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Successful outcome of one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub submission_id: Uuid,
    pub label: String,
    pub class_code: i64,
    pub features: FeatureVector,
}

/// What the presentation layer shows in the result area.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Prompt,
    Predicted(Prediction),
    Failed(String),
}

impl Outcome {
    pub fn message(&self) -> String {
        match self {
            Outcome::Prompt => PROMPT_MESSAGE.to_string(),
            Outcome::Predicted(prediction) => format!("Prediction: {}", prediction.label),
            Outcome::Failed(reason) => format!("Error: {reason}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// One run through the pipeline, recording every state it passed through.
#[derive(Debug)]
pub struct Submission {
    id: Uuid,
    state: SubmissionState,
    trace: Vec<SubmissionState>,
}

impl Default for Submission {
    fn default() -> Self {
        Self::new()
    }
}

impl Submission {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SubmissionState::Idle,
            trace: vec![SubmissionState::Idle],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Every state visited, starting with `Idle`.
    pub fn trace(&self) -> &[SubmissionState] {
        &self.trace
    }

    fn advance(&mut self, next: SubmissionState) {
        debug!(submission = %self.id, "{} -> {}", self.state, next);
        self.state = next.clone();
        self.trace.push(next);
    }

    /// Run the request through the context. Ends in `Done` or `Failed`, and
    /// the submission is back to `Idle` afterwards.
    pub fn run(&mut self, ctx: &InferenceContext, raw: &RawRequest) -> PredictResult<Prediction> {
        let span = info_span!("submission", id = %self.id);
        let _guard = span.enter();

        let result = self.execute(ctx, raw);
        match &result {
            Ok(prediction) => {
                self.advance(SubmissionState::Done);
                info!(label = %prediction.label, "Prediction complete");
            }
            Err(e) => {
                self.advance(SubmissionState::Failed {
                    reason: e.to_string(),
                });
                if e.is_input_error() {
                    warn!("Submission rejected: {e}");
                } else {
                    error!("Submission failed: {e}");
                }
            }
        }
        self.advance(SubmissionState::Idle);
        result
    }

    fn execute(&mut self, ctx: &InferenceContext, raw: &RawRequest) -> PredictResult<Prediction> {
        let artifacts = ctx.artifacts()?;

        self.advance(SubmissionState::Validating);
        let valid = raw.validate()?;

        self.advance(SubmissionState::Encoding);
        let features = build_feature_vector(&valid, &artifacts.encoders)?;

        self.advance(SubmissionState::Predicting);
        let class_code = artifacts.predictor.predict(&features)?;

        self.advance(SubmissionState::Decoding);
        let label = artifacts.labels.decode(class_code)?.to_string();

        Ok(Prediction {
            submission_id: self.id,
            label,
            class_code,
            features,
        })
    }
}

/// Process-wide, read-only inference state.
pub struct InferenceContext {
    artifacts: Result<LoadedArtifacts, (String, String)>,
}

impl InferenceContext {
    /// Load the artifacts. Never fails: a load error is kept and reported on
    /// every submission.
    pub fn load(paths: &ArtifactPaths) -> Self {
        match LoadedArtifacts::load(paths) {
            Ok(artifacts) => Self::from_artifacts(artifacts),
            Err(e) => {
                error!("Failed to load model artifacts: {e}");
                warn!("Serving in degraded mode; every submission will report the load failure");
                Self::unavailable(e)
            }
        }
    }

    pub fn from_artifacts(artifacts: LoadedArtifacts) -> Self {
        Self {
            artifacts: Ok(artifacts),
        }
    }

    pub fn unavailable(err: PredictError) -> Self {
        let failure = match err {
            PredictError::ArtifactLoad { artifact, message } => (artifact, message),
            other => ("artifacts".to_string(), other.to_string()),
        };
        Self {
            artifacts: Err(failure),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.artifacts.is_ok()
    }

    /// The loaded artifacts, or the load failure as an `ArtifactLoad` error.
    pub fn artifacts(&self) -> PredictResult<&LoadedArtifacts> {
        self.artifacts
            .as_ref()
            .map_err(|(artifact, message)| PredictError::artifact_load(artifact, message))
    }

    pub fn artifact_info(&self) -> &[ArtifactInfo] {
        match &self.artifacts {
            Ok(artifacts) => &artifacts.info,
            Err(_) => &[],
        }
    }

    /// Run one submission.
    pub fn submit(&self, raw: &RawRequest) -> PredictResult<Prediction> {
        Submission::new().run(self, raw)
    }

    /// Result area content: the prompt when nothing was submitted, otherwise
    /// the label or the error message.
    pub fn outcome(&self, raw: Option<&RawRequest>) -> Outcome {
        match raw {
            None => Outcome::Prompt,
            Some(raw) => match self.submit(raw) {
                Ok(prediction) => Outcome::Predicted(prediction),
                Err(e) => Outcome::Failed(e.to_string()),
            },
        }
    }
}
