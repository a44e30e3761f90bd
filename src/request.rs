//! Raw submissions and the required-field validator.

use crate::errors::{PredictError, PredictResult};
use crate::fields::{FEATURE_COLUMNS, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// The raw values of one submission, keyed by field name.
///
/// Values are kept exactly as the client sent them: JSON numbers, strings or
/// nulls. Nothing is coerced until the feature vector is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRequest {
    values: BTreeMap<String, Value>,
}

impl RawRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Build a request from an urlencoded form post, every value a string.
    pub fn from_form(form: HashMap<String, String>) -> Self {
        Self {
            values: form
                .into_iter()
                .map(|(field, value)| (field, Value::String(value)))
                .collect(),
        }
    }

    /// Check every required field before anything is encoded.
    pub fn validate(&self) -> PredictResult<ValidRequest> {
        validate(self)
    }
}

/// A request whose sixteen fields are all present, stored in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRequest {
    values: Vec<Value>,
}

impl ValidRequest {
    /// `(field, raw value)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        FEATURE_COLUMNS.iter().copied().zip(self.values.iter())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        FEATURE_COLUMNS
            .iter()
            .position(|name| *name == field)
            .and_then(|idx| self.values.get(idx))
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Validate that all sixteen fields are present and non-null.
///
/// A blank string counts as missing. The error names every missing field in
/// column order, not just the first one.
pub fn validate(raw: &RawRequest) -> PredictResult<ValidRequest> {
    let missing: Vec<&str> = FEATURE_COLUMNS
        .iter()
        .copied()
        .filter(|field| is_missing(raw.get(field)))
        .collect();

    if !missing.is_empty() {
        return Err(PredictError::missing_fields(missing));
    }

    let mut values = Vec::with_capacity(FEATURE_COUNT);
    for field in FEATURE_COLUMNS {
        if let Some(value) = raw.get(field) {
            values.push(value.clone());
        }
    }

    Ok(ValidRequest { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_request() -> RawRequest {
        serde_json::from_value(json!({
            "Age": 25, "Gender": "Male", "Height": 1.70, "Weight": 70,
            "CALC": "Sometimes", "FAVC": "yes", "FCVC": 2, "NCP": 3,
            "SCC": "no", "SMOKE": "no", "CH2O": 2,
            "family_history_with_overweight": "yes", "FAF": 1, "TUE": 1,
            "CAEC": "Sometimes", "MTRANS": "Public_Transportation"
        }))
        .unwrap()
    }

    #[test]
    fn complete_request_is_valid() {
        let valid = full_request().validate().unwrap();
        let names: Vec<&str> = valid.columns().map(|(name, _)| name).collect();
        assert_eq!(names, FEATURE_COLUMNS.to_vec());
        assert_eq!(valid.get("Gender"), Some(&json!("Male")));
    }

    #[test]
    fn reports_every_missing_field() {
        let mut raw = full_request();
        raw.values.remove("Weight");
        raw.insert("MTRANS", Value::Null);
        raw.insert("SCC", "   ");

        match validate(&raw).unwrap_err() {
            PredictError::MissingField { fields } => {
                assert_eq!(fields, vec!["Weight", "SCC", "MTRANS"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn extra_fields_are_ignored() {
        let raw = full_request().with("NObeyesdad", "Normal_Weight");
        assert!(raw.validate().is_ok());
    }

    #[test]
    fn empty_request_misses_all_sixteen() {
        match RawRequest::new().validate().unwrap_err() {
            PredictError::MissingField { fields } => assert_eq!(fields.len(), FEATURE_COUNT),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn form_values_are_strings() {
        let mut form = HashMap::new();
        form.insert("Age".to_string(), "25".to_string());
        let raw = RawRequest::from_form(form);
        assert_eq!(raw.get("Age"), Some(&json!("25")));
    }
}
