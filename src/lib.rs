//! Library root for the `obesity_predictor` crate
//! Form front-end that encodes sixteen lifestyle attributes and asks a
//! pre-trained classifier for an obesity level.

// Core error handling
pub mod errors;
pub mod api_errors;

// Field contract and fitted tables
pub mod fields;
pub mod encoders;

// Submission pipeline
pub mod request;
pub mod features;
pub mod model;
pub mod artifacts;
pub mod pipeline;

// Configuration & CLI
pub mod config;
pub mod config_loader;
pub mod cli;

// Web server interface
pub mod app_state;
pub mod web;


pub use errors::{PredictError, PredictResult};
pub use features::FeatureVector;
pub use model::Predictor;
pub use pipeline::{InferenceContext, Outcome, Prediction};
pub use request::RawRequest;
