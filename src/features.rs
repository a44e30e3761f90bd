//! Feature vector assembly.
//!
//! Turns a validated request into the sixteen numbers the classifier reads.
//! Categorical columns go through their fitted code table, numeric columns
//! are coerced to `f64`, and the result is laid out in `FEATURE_COLUMNS`
//! order.

use crate::encoders::CategoryEncoders;
use crate::errors::{PredictError, PredictResult};
use crate::fields::{field_spec, FEATURE_COLUMNS, FEATURE_COUNT};
use crate::request::ValidRequest;
use serde::Serialize;
use serde_json::Value;

/// Sixteen model inputs in column order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn from_columns(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Value of a named column.
    pub fn get(&self, column: &str) -> Option<f64> {
        FEATURE_COLUMNS
            .iter()
            .position(|name| *name == column)
            .map(|idx| self.0[idx])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build the feature vector for a validated request.
///
/// Pure: the same request and tables always give the same vector.
pub fn build_feature_vector(
    request: &ValidRequest,
    encoders: &CategoryEncoders,
) -> PredictResult<FeatureVector> {
    let mut columns = [0.0; FEATURE_COUNT];

    for (idx, (field, raw)) in request.columns().enumerate() {
        let categorical = field_spec(field).is_some_and(|spec| spec.is_categorical());
        columns[idx] = if categorical {
            encoders.encode(field, &render(raw))? as f64
        } else {
            coerce_numeric(field, raw)?
        };
    }

    Ok(FeatureVector(columns))
}

/// Coerce a raw numeric input. Strings are trimmed and parsed; anything that
/// does not end up as a finite float is rejected.
pub fn coerce_numeric(field: &str, raw: &Value) -> PredictResult<f64> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(PredictError::invalid_numeric(field, render(raw))),
    }
}

/// String form of a raw value. Categorical lookups use it too, so a stray
/// number like `1` is looked up as `"1"` and rejected as an unknown category.
fn render(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
