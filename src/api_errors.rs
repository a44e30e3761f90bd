use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::errors::PredictError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
    /// Body the JSON extractor refused, with the status axum chose for it.
    #[error("{1}")]
    Rejected(StatusCode, String),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, msg) = match &self {
            AppError::BadRequest(s) => (StatusCode::BAD_REQUEST, s),
            AppError::Unavailable(s) => (StatusCode::SERVICE_UNAVAILABLE, s),
            AppError::Internal(s) => (StatusCode::INTERNAL_SERVER_ERROR, s),
            AppError::Rejected(status, s) => (*status, s),
        };
        (code, Json(ErrBody { error: msg.clone() })).into_response()
    }
}

// Conversion from PredictError to AppError
impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        let message = err.to_string();
        match err.status_code() {
            StatusCode::BAD_REQUEST => AppError::BadRequest(message),
            StatusCode::SERVICE_UNAVAILABLE => AppError::Unavailable(message),
            _ => AppError::Internal(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::BAD_REQUEST => AppError::bad_request(rejection.body_text()),
            status => AppError::Rejected(status, rejection.body_text()),
        }
    }
}
