use crate::errors::{PredictError, PredictResult};
use crate::features::FeatureVector;
use crate::fields::FEATURE_COUNT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Call contract of the pre-trained classifier.
///
/// The pipeline only ever talks to this trait, so tests can swap the loaded
/// artifact for a stub.
pub trait Predictor: Send + Sync {
    /// Predict the class code for one feature vector.
    fn predict(&self, features: &FeatureVector) -> PredictResult<i64>;

    /// Short description used in logs and the readiness report.
    fn describe(&self) -> String;
}

/// Weights of a multinomial linear classifier, one row per class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearWeights {
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
    /// Class code per row; rows map to `0..n` when absent.
    #[serde(default)]
    pub classes: Option<Vec<i64>>,
}

/// Linear classifier scoring each class with `intercept + w . x`
pub struct LinearClassifier {
    weights: LinearWeights,
    classes: Vec<i64>,
}

impl LinearClassifier {
    pub fn new(weights: LinearWeights) -> PredictResult<Self> {
        let n_classes = weights.coefficients.len();
        if n_classes == 0 {
            return Err(PredictError::artifact_load("model", "linear model has no classes"));
        }
        if weights.intercepts.len() != n_classes {
            return Err(PredictError::artifact_load(
                "model",
                format!(
                    "{} intercepts for {} coefficient rows",
                    weights.intercepts.len(),
                    n_classes
                ),
            ));
        }
        if let Some(row) = weights
            .coefficients
            .iter()
            .position(|row| row.len() != FEATURE_COUNT)
        {
            return Err(PredictError::artifact_load(
                "model",
                format!(
                    "coefficient row {row} has {} features, expected {FEATURE_COUNT}",
                    weights.coefficients[row].len()
                ),
            ));
        }

        let classes = match &weights.classes {
            Some(classes) if classes.len() != n_classes => {
                return Err(PredictError::artifact_load(
                    "model",
                    format!("{} class codes for {} rows", classes.len(), n_classes),
                ));
            }
            Some(classes) => classes.clone(),
            None => (0..n_classes as i64).collect(),
        };

        Ok(Self { weights, classes })
    }

    /// Decision value for every class, in row order.
    pub fn decision_function(&self, x: &[f64]) -> PredictResult<Vec<f64>> {
        if x.len() != FEATURE_COUNT {
            return Err(PredictError::prediction(format!(
                "feature vector has {} columns, model expects {FEATURE_COUNT}",
                x.len()
            )));
        }

        Ok(self
            .weights
            .coefficients
            .iter()
            .zip(self.weights.intercepts.iter())
            .map(|(row, bias)| bias + row.iter().zip(x).map(|(w, f)| w * f).sum::<f64>())
            .collect())
    }
}

impl Predictor for LinearClassifier {
    fn predict(&self, features: &FeatureVector) -> PredictResult<i64> {
        let scores = self.decision_function(features.as_slice())?;

        let mut best: Option<(usize, f64)> = None;
        for (idx, score) in scores.into_iter().enumerate() {
            if score.is_nan() {
                return Err(PredictError::prediction("decision value is NaN"));
            }
            // strict comparison keeps the lowest index on ties
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((idx, score));
            }
        }

        best.map(|(idx, _)| self.classes[idx])
            .ok_or_else(|| PredictError::prediction("linear model produced no scores"))
    }

    fn describe(&self) -> String {
        format!("linear({} classes)", self.classes.len())
    }
}

/// A node of an exported decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, index: usize) -> PredictResult<()> {
        if self.nodes.is_empty() {
            return Err(PredictError::artifact_load(
                "model",
                format!("tree {index} has no nodes"),
            ));
        }
        for (id, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= FEATURE_COUNT {
                    return Err(PredictError::artifact_load(
                        "model",
                        format!("tree {index} node {id} splits on feature {feature}"),
                    ));
                }
                if *left >= self.nodes.len() || *right >= self.nodes.len() {
                    return Err(PredictError::artifact_load(
                        "model",
                        format!("tree {index} node {id} points outside the tree"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Walk from the root; a split sends `x[feature] <= threshold` left.
    pub fn predict_row(&self, x: &[f64]) -> PredictResult<i64> {
        let mut id = 0;
        // a valid tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.nodes.len() {
            match self.nodes.get(id) {
                Some(TreeNode::Leaf { class }) => return Ok(*class),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = x.get(*feature).copied().ok_or_else(|| {
                        PredictError::prediction(format!("feature {feature} out of range"))
                    })?;
                    id = if value <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(PredictError::prediction(format!("node {id} does not exist")))
                }
            }
        }
        Err(PredictError::prediction("tree walk did not reach a leaf"))
    }
}

/// Majority-vote ensemble of decision trees.
pub struct ForestClassifier {
    trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    pub fn new(trees: Vec<DecisionTree>) -> PredictResult<Self> {
        if trees.is_empty() {
            return Err(PredictError::artifact_load("model", "forest has no trees"));
        }
        for (index, tree) in trees.iter().enumerate() {
            tree.validate(index)?;
        }
        Ok(Self { trees })
    }
}

impl Predictor for ForestClassifier {
    fn predict(&self, features: &FeatureVector) -> PredictResult<i64> {
        let x = features.as_slice();
        if x.len() != FEATURE_COUNT {
            return Err(PredictError::prediction(format!(
                "feature vector has {} columns, model expects {FEATURE_COUNT}",
                x.len()
            )));
        }

        let mut votes: BTreeMap<i64, usize> = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.predict_row(x)?).or_default() += 1;
        }

        // ascending iteration with a strict comparison resolves ties to the smallest code
        let mut winner: Option<(i64, usize)> = None;
        for (class, count) in votes {
            if winner.is_none_or(|(_, top)| count > top) {
                winner = Some((class, count));
            }
        }

        winner
            .map(|(class, _)| class)
            .ok_or_else(|| PredictError::prediction("forest produced no votes"))
    }

    fn describe(&self) -> String {
        format!("forest({} trees)", self.trees.len())
    }
}

/// Serialized model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearWeights),
    Forest { trees: Vec<DecisionTree> },
}

impl ModelArtifact {
    pub fn from_json_slice(bytes: &[u8]) -> PredictResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| PredictError::artifact_load("model", e.to_string()))
    }

    /// Validate the artifact and turn it into a predictor.
    pub fn into_predictor(self) -> PredictResult<Box<dyn Predictor>> {
        Ok(match self {
            ModelArtifact::Linear(weights) => Box::new(LinearClassifier::new(weights)?),
            ModelArtifact::Forest { trees } => Box::new(ForestClassifier::new(trees)?),
        })
    }
}
