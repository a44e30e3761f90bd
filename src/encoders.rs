//! Fitted category code tables.
//!
//! Both the per-field encoders and the target encoder are stored the way a
//! fitted label encoder keeps them: an ordered `classes` list where the code of
//! a class is its position. Tables are built once at load time and only read
//! afterwards.

use crate::errors::{PredictError, PredictResult};
use crate::fields::{self, FieldSpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Lookup contract of a fitted encoder.
pub trait CategoryEncoder {
    /// Code for a raw category, `None` when the value was never fitted.
    fn transform(&self, category: &str) -> Option<i64>;

    /// Category for a code, `None` when the code is outside the fitted set.
    fn inverse_transform(&self, code: i64) -> Option<&str>;
}

/// Serialized shape of one fitted encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderArtifact {
    pub classes: Vec<String>,
}

/// Bidirectional category <-> code table for a single field.
#[derive(Debug, Clone)]
pub struct CategoryCodeTable {
    field: String,
    classes: Vec<String>,
    codes: HashMap<String, i64>,
}

impl CategoryCodeTable {
    /// Build a table from fitted classes. Duplicate classes would make the
    /// encoding non-injective and are rejected.
    pub fn from_classes<S: Into<String>>(
        field: impl Into<String>,
        classes: impl IntoIterator<Item = S>,
    ) -> PredictResult<Self> {
        let field = field.into();
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();

        if classes.is_empty() {
            return Err(PredictError::artifact_load(
                &field,
                "encoder has no fitted classes",
            ));
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), code as i64).is_some() {
                return Err(PredictError::artifact_load(
                    &field,
                    format!("duplicate class {class:?}"),
                ));
            }
        }

        Ok(Self {
            field,
            classes,
            codes,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Encode a raw value, failing with `UnknownCategory` outside the domain.
    pub fn encode(&self, value: &str) -> PredictResult<i64> {
        self.transform(value)
            .ok_or_else(|| PredictError::unknown_category(&self.field, value))
    }
}

impl CategoryEncoder for CategoryCodeTable {
    fn transform(&self, category: &str) -> Option<i64> {
        self.codes.get(category).copied()
    }

    fn inverse_transform(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.classes.get(idx))
            .map(String::as_str)
    }
}

/// One code table per categorical field.
#[derive(Debug, Clone)]
pub struct CategoryEncoders {
    tables: BTreeMap<String, CategoryCodeTable>,
}

impl CategoryEncoders {
    /// Build the per-field tables from the serialized encoder map.
    ///
    /// Every categorical field must have an entry. Entries for fields the form
    /// does not know are ignored with a warning.
    pub fn from_artifact(mut artifact: BTreeMap<String, EncoderArtifact>) -> PredictResult<Self> {
        let mut tables = BTreeMap::new();

        for spec in fields::categorical_fields() {
            let entry = artifact.remove(spec.name).ok_or_else(|| {
                PredictError::artifact_load(
                    "feature_encoders",
                    format!("no encoder for categorical field {}", spec.name),
                )
            })?;
            let table = CategoryCodeTable::from_classes(spec.name, entry.classes)?;
            warn_on_domain_gaps(spec, &table);
            tables.insert(spec.name.to_string(), table);
        }

        for unknown in artifact.keys() {
            warn!("Ignoring encoder for unknown field '{unknown}'");
        }

        Ok(Self { tables })
    }

    pub fn from_json_slice(bytes: &[u8]) -> PredictResult<Self> {
        let artifact: BTreeMap<String, EncoderArtifact> = serde_json::from_slice(bytes)
            .map_err(|e| PredictError::artifact_load("feature_encoders", e.to_string()))?;
        Self::from_artifact(artifact)
    }

    pub fn table(&self, field: &str) -> Option<&CategoryCodeTable> {
        self.tables.get(field)
    }

    /// Encode the raw value of a categorical field.
    pub fn encode(&self, field: &str, value: &str) -> PredictResult<i64> {
        match self.tables.get(field) {
            Some(table) => table.encode(value),
            None => Err(PredictError::unknown_category(field, value)),
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = &CategoryCodeTable> {
        self.tables.values()
    }
}

fn warn_on_domain_gaps(spec: &FieldSpec, table: &CategoryCodeTable) {
    for allowed in spec.allowed_values() {
        if table.transform(allowed).is_none() {
            warn!(
                "Encoder for '{}' was not fitted with '{}'; submissions using it will be rejected",
                spec.name, allowed
            );
        }
    }
}

/// Decoder from predicted class code to the obesity-level label.
#[derive(Debug, Clone)]
pub struct LabelCodeTable {
    table: CategoryCodeTable,
}

impl LabelCodeTable {
    pub fn from_classes<S: Into<String>>(classes: impl IntoIterator<Item = S>) -> PredictResult<Self> {
        Ok(Self {
            table: CategoryCodeTable::from_classes("target_encoder", classes)?,
        })
    }

    pub fn from_json_slice(bytes: &[u8]) -> PredictResult<Self> {
        let artifact: EncoderArtifact = serde_json::from_slice(bytes)
            .map_err(|e| PredictError::artifact_load("target_encoder", e.to_string()))?;
        Self::from_classes(artifact.classes)
    }

    /// Label for a class code, `UnknownClassCode` outside the fitted set.
    pub fn decode(&self, code: i64) -> PredictResult<&str> {
        self.table
            .inverse_transform(code)
            .ok_or_else(|| PredictError::unknown_class_code(code))
    }

    pub fn labels(&self) -> &[String] {
        self.table.classes()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn encoder_map() -> BTreeMap<String, EncoderArtifact> {
        fields::categorical_fields()
            .map(|spec| {
                let mut classes: Vec<String> =
                    spec.allowed_values().iter().map(|v| v.to_string()).collect();
                classes.sort();
                (spec.name.to_string(), EncoderArtifact { classes })
            })
            .collect()
    }

    #[test]
    fn codes_follow_class_positions() {
        let table = CategoryCodeTable::from_classes("Gender", ["Female", "Male"]).unwrap();
        assert_eq!(table.transform("Female"), Some(0));
        assert_eq!(table.transform("Male"), Some(1));
        assert_eq!(table.inverse_transform(1), Some("Male"));
        assert_eq!(table.inverse_transform(2), None);
        assert_eq!(table.inverse_transform(-1), None);
    }

    #[test]
    fn encoding_is_injective_per_field() {
        let encoders = CategoryEncoders::from_artifact(encoder_map()).unwrap();
        for table in encoders.tables() {
            let codes: HashSet<i64> = table
                .classes()
                .iter()
                .map(|c| table.transform(c).unwrap())
                .collect();
            assert_eq!(codes.len(), table.len(), "{}", table.field());
        }
    }

    #[test]
    fn duplicate_classes_are_rejected() {
        let err = CategoryCodeTable::from_classes("SMOKE", ["no", "yes", "no"]).unwrap_err();
        assert!(matches!(err, PredictError::ArtifactLoad { .. }));
    }

    #[test]
    fn unknown_value_is_an_error_not_a_default() {
        let encoders = CategoryEncoders::from_artifact(encoder_map()).unwrap();
        let err = encoders.encode("Gender", "Other").unwrap_err();
        match err {
            PredictError::UnknownCategory { field, value } => {
                assert_eq!(field, "Gender");
                assert_eq!(value, "Other");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_categorical_encoder_fails_load() {
        let mut map = encoder_map();
        map.remove("MTRANS");
        let err = CategoryEncoders::from_artifact(map).unwrap_err();
        assert!(err.to_string().contains("MTRANS"));
    }

    #[test]
    fn extra_encoder_entries_are_ignored() {
        let mut map = encoder_map();
        map.insert(
            "NObeyesdad".to_string(),
            EncoderArtifact {
                classes: vec!["Normal_Weight".to_string()],
            },
        );
        let encoders = CategoryEncoders::from_artifact(map).unwrap();
        assert!(encoders.table("NObeyesdad").is_none());
        assert_eq!(encoders.tables().count(), 8);
    }

    #[test]
    fn label_table_decodes_and_rejects_unknown_codes() {
        let labels = LabelCodeTable::from_json_slice(
            br#"{"classes": ["Insufficient_Weight", "Normal_Weight", "Obesity_Type_I"]}"#,
        )
        .unwrap();
        assert_eq!(labels.decode(1).unwrap(), "Normal_Weight");
        assert!(matches!(
            labels.decode(7),
            Err(PredictError::UnknownClassCode { code: 7 })
        ));
    }

    #[test]
    fn malformed_encoder_json_is_an_artifact_error() {
        let err = CategoryEncoders::from_json_slice(b"{not json").unwrap_err();
        assert!(matches!(err, PredictError::ArtifactLoad { .. }));
    }
}
