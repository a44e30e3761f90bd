//! Error handling for the obesity-level predictor
//!
//! Every failure a submission can hit is a variant of [`PredictError`]. The
//! submission boundary turns each of them into a human-readable message, so
//! none of them ever takes the process down.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for the predictor
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Model artifacts unavailable: {artifact} - {message}")]
    ArtifactLoad { artifact: String, message: String },

    #[error("Missing required fields: {}", .fields.join(", "))]
    MissingField { fields: Vec<String> },

    #[error("Invalid numeric value for {field}: {value:?}")]
    InvalidNumericValue { field: String, value: String },

    #[error("Unknown category for {field}: {value:?}")]
    UnknownCategory { field: String, value: String },

    #[error("Prediction failed: {message}")]
    Prediction { message: String },

    #[error("Predicted class code {code} has no label")]
    UnknownClassCode { code: i64 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for Result with PredictError
pub type PredictResult<T> = Result<T, PredictError>;

impl PredictError {
    /// Create an artifact load error
    pub fn artifact_load(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ArtifactLoad {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Create a missing field error listing every absent field
    pub fn missing_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingField {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn invalid_numeric(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidNumericValue {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn unknown_category(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownCategory {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a prediction error
    pub fn prediction(message: impl Into<String>) -> Self {
        Self::Prediction {
            message: message.into(),
        }
    }

    pub fn unknown_class_code(code: i64) -> Self {
        Self::UnknownClassCode { code }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// True for errors caused by what the user typed, as opposed to the
    /// artifacts or the model.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PredictError::MissingField { .. }
                | PredictError::InvalidNumericValue { .. }
                | PredictError::UnknownCategory { .. }
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PredictError::MissingField { .. }
            | PredictError::InvalidNumericValue { .. }
            | PredictError::UnknownCategory { .. } => StatusCode::BAD_REQUEST,
            PredictError::ArtifactLoad { .. } => StatusCode::SERVICE_UNAVAILABLE,
            PredictError::Prediction { .. }
            | PredictError::UnknownClassCode { .. }
            | PredictError::Config { .. }
            | PredictError::Serialization { .. }
            | PredictError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Convert from serde_json errors
impl From<serde_json::Error> for PredictError {
    fn from(err: serde_json::Error) -> Self {
        PredictError::serialization("json_operation", err)
    }
}

/// Convert from std::io errors
impl From<std::io::Error> for PredictError {
    fn from(err: std::io::Error) -> Self {
        PredictError::io("io_operation", err)
    }
}

impl From<figment::Error> for PredictError {
    fn from(err: figment::Error) -> Self {
        PredictError::config(err.to_string())
    }
}
