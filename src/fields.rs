//! Field domain contract for the sixteen form inputs.
//!
//! `FEATURE_COLUMNS` is the column order the classifier was fitted with. The
//! feature vector is always assembled by walking this constant; nothing in the
//! crate derives the order from a map.

use serde::Serialize;

/// Number of columns the classifier consumes.
pub const FEATURE_COUNT: usize = 16;

/// Column order shared with the model artifact.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "Age",
    "Gender",
    "Height",
    "Weight",
    "CALC",
    "FAVC",
    "FCVC",
    "NCP",
    "SCC",
    "SMOKE",
    "CH2O",
    "family_history_with_overweight",
    "FAF",
    "TUE",
    "CAEC",
    "MTRANS",
];

const YES_NO: &[&str] = &["yes", "no"];
const FREQUENCY: &[&str] = &["no", "Sometimes", "Frequently", "Always"];

/// Range and default the form offers for a numeric input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: f64,
    pub default: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Numeric(NumericRange),
    Categorical {
        allowed: &'static [&'static str],
        default: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Human-readable label shown next to the input.
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn numeric(
        name: &'static str,
        label: &'static str,
        min: Option<f64>,
        max: Option<f64>,
        step: f64,
        default: f64,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Numeric(NumericRange {
                min,
                max,
                step,
                default,
            }),
        }
    }

    const fn categorical(
        name: &'static str,
        label: &'static str,
        allowed: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Categorical { allowed, default },
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FieldKind::Categorical { .. })
    }

    /// Allowed raw values for a categorical field, empty for numeric ones.
    pub fn allowed_values(&self) -> &'static [&'static str] {
        match self.kind {
            FieldKind::Categorical { allowed, .. } => allowed,
            FieldKind::Numeric(_) => &[],
        }
    }

    /// Default value rendered in the form.
    pub fn default_value(&self) -> String {
        match self.kind {
            FieldKind::Numeric(range) => range.default.to_string(),
            FieldKind::Categorical { default, .. } => default.to_string(),
        }
    }
}

/// All sixteen fields, listed in `FEATURE_COLUMNS` order.
pub const FIELD_SPECS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec::numeric("Age", "Age", Some(0.0), None, 1.0, 25.0),
    FieldSpec::categorical("Gender", "Gender", &["Male", "Female"], "Male"),
    FieldSpec::numeric("Height", "Height (metres, e.g. 1.75)", Some(0.0), None, 0.01, 1.70),
    FieldSpec::numeric("Weight", "Weight (kg, e.g. 70.5)", Some(0.0), None, 0.1, 70.0),
    FieldSpec::categorical("CALC", "Alcohol consumption (CALC)", FREQUENCY, "Sometimes"),
    FieldSpec::categorical("FAVC", "Frequent high-calorie food (FAVC)", YES_NO, "yes"),
    FieldSpec::numeric(
        "FCVC",
        "Vegetable consumption (FCVC, 1 never - 3 always)",
        Some(1.0),
        Some(3.0),
        1.0,
        2.0,
    ),
    FieldSpec::numeric("NCP", "Main meals per day (NCP, 1-4)", Some(1.0), Some(4.0), 1.0, 3.0),
    FieldSpec::categorical("SCC", "Monitors calorie intake (SCC)", YES_NO, "no"),
    FieldSpec::categorical("SMOKE", "Smokes (SMOKE)", YES_NO, "no"),
    FieldSpec::numeric(
        "CH2O",
        "Daily water (CH2O, 1 <1L, 2 1-2L, 3 >2L)",
        Some(1.0),
        Some(3.0),
        1.0,
        2.0,
    ),
    FieldSpec::categorical(
        "family_history_with_overweight",
        "Family history of overweight",
        YES_NO,
        "yes",
    ),
    FieldSpec::numeric(
        "FAF",
        "Physical activity (FAF, 0 none - 3 4-5 days)",
        Some(0.0),
        Some(3.0),
        1.0,
        1.0,
    ),
    FieldSpec::numeric(
        "TUE",
        "Device use (TUE, 0 0-2h, 1 3-5h, 2 >5h)",
        Some(0.0),
        Some(2.0),
        1.0,
        1.0,
    ),
    FieldSpec::categorical("CAEC", "Eats between meals (CAEC)", FREQUENCY, "Sometimes"),
    FieldSpec::categorical(
        "MTRANS",
        "Main transportation (MTRANS)",
        &["Automobile", "Motorbike", "Bike", "Public_Transportation", "Walking"],
        "Public_Transportation",
    ),
];

pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELD_SPECS.iter().find(|spec| spec.name == name)
}

/// Categorical fields in column order.
pub fn categorical_fields() -> impl Iterator<Item = &'static FieldSpec> {
    FIELD_SPECS.iter().filter(|spec| spec.is_categorical())
}
