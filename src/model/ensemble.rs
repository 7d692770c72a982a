use serde::Deserialize;
use std::path::Path;
use tracing::{info, trace};

use super::{read_json, LabelPredictor};
use crate::error::ModelError;
use crate::features::{FeatureVector, FEATURE_COUNT};

/// A node of a regression tree
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Goes to `yes` when `features[split] < threshold`, to `missing` on NaN
    Split {
        split: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        #[serde(default)]
        missing: Option<usize>,
    },
    Leaf {
        leaf: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

/// Gradient-boosted binary classifier over the URL feature vector
///
/// The margin is `logit(base_score)` plus the sum of the leaf reached in
/// every tree; the predicted label is 1 when `sigmoid(margin) > 0.5`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default = "default_base_score")]
    base_score: f64,
    trees: Vec<Tree>,
}

fn default_base_score() -> f64 {
    0.5
}

impl TreeEnsemble {
    /// Loads and validates an ensemble exported as JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let model: Self = read_json(path)?;
        model.validate()?;
        info!("Loaded tree ensemble with {} trees from {}", model.trees.len(), path.display());
        Ok(model)
    }

    /// Decodes and validates an ensemble from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_str(json).map_err(ModelError::Decode)?;
        model.validate()?;
        Ok(model)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Checks the structural invariants evaluation relies on
    ///
    /// Children must come after their parent, which rules out cycles.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("ensemble has no trees".to_string()));
        }
        if !(self.base_score > 0.0 && self.base_score < 1.0) {
            return Err(ModelError::Invalid(format!(
                "base_score {} must lie strictly between 0 and 1",
                self.base_score
            )));
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ModelError::Invalid(format!("tree {} has no nodes", t)));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                let TreeNode::Split { split, yes, no, missing, .. } = node else {
                    continue;
                };
                if *split >= FEATURE_COUNT {
                    return Err(ModelError::Invalid(format!(
                        "tree {} node {} splits on feature {} (only {} features)",
                        t, i, split, FEATURE_COUNT
                    )));
                }
                for child in [Some(*yes), Some(*no), *missing].into_iter().flatten() {
                    if child <= i || child >= tree.nodes.len() {
                        return Err(ModelError::Invalid(format!(
                            "tree {} node {} has invalid child {}",
                            t, i, child
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Raw score before the logistic transform
    pub fn margin(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let base = (self.base_score / (1.0 - self.base_score)).ln();
        self.trees.iter().try_fold(base, |acc, tree| {
            Ok(acc + leaf_value(tree, features.as_slice())?)
        })
    }

    /// Probability of the malicious class
    pub fn probability(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let margin = self.margin(features)?;
        Ok(1.0 / (1.0 + (-margin).exp()))
    }
}

impl LabelPredictor for TreeEnsemble {
    fn predict(&self, features: &FeatureVector) -> Result<i64, ModelError> {
        let probability = self.probability(features)?;
        trace!("Ensemble probability: {:.4}", probability);
        Ok(if probability > 0.5 { 1 } else { 0 })
    }
}

fn leaf_value(tree: &Tree, features: &[f64]) -> Result<f64, ModelError> {
    let mut index = 0;
    // Validation guarantees children follow parents, so a leaf is reached
    // within nodes.len() steps
    for _ in 0..tree.nodes.len() {
        match tree.nodes.get(index) {
            Some(TreeNode::Leaf { leaf }) => return Ok(*leaf),
            Some(TreeNode::Split { split, threshold, yes, no, missing }) => {
                let value = *features.get(*split).ok_or_else(|| {
                    ModelError::Inference(format!("feature {} out of range", split))
                })?;
                index = if value.is_nan() {
                    missing.unwrap_or(*yes)
                } else if value < *threshold {
                    *yes
                } else {
                    *no
                };
            }
            None => {
                return Err(ModelError::Inference(format!("node {} out of range", index)));
            }
        }
    }
    Err(ModelError::Inference("tree walk did not reach a leaf".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // One stump on url_length (feature 0) and one on has_suspicious_word (11)
    const MODEL: &str = r#"{
        "base_score": 0.5,
        "trees": [
            {"nodes": [
                {"split": 0, "threshold": 60.0, "yes": 1, "no": 2},
                {"leaf": -1.0},
                {"leaf": 0.8}
            ]},
            {"nodes": [
                {"split": 11, "threshold": 0.5, "yes": 1, "no": 2, "missing": 1},
                {"leaf": -0.5},
                {"leaf": 1.5}
            ]}
        ]
    }"#;

    fn vector(length: f64, suspicious: f64) -> FeatureVector {
        let mut values = [0.0; FEATURE_COUNT];
        values[0] = length;
        values[11] = suspicious;
        FeatureVector::from_values(values)
    }

    #[test]
    fn test_predicts_labels() {
        let model = TreeEnsemble::from_json(MODEL).unwrap();
        assert_eq!(model.tree_count(), 2);

        assert_eq!(model.predict(&vector(20.0, 0.0)).unwrap(), 0);
        assert_eq!(model.predict(&vector(90.0, 1.0)).unwrap(), 1);
        // -1.0 + 1.5 = 0.5 > 0
        assert_eq!(model.predict(&vector(20.0, 1.0)).unwrap(), 1);
        // 0.8 - 0.5 = 0.3 > 0
        assert_eq!(model.predict(&vector(90.0, 0.0)).unwrap(), 1);
    }

    #[test]
    fn test_margin_and_missing_values() {
        let model = TreeEnsemble::from_json(MODEL).unwrap();

        assert!((model.margin(&vector(20.0, 0.0)).unwrap() - (-1.5)).abs() < 1e-12);
        // NaN follows the explicit missing branch
        assert!((model.margin(&vector(20.0, f64::NAN)).unwrap() - (-1.5)).abs() < 1e-12);
        let p = model.probability(&vector(20.0, 0.0)).unwrap();
        assert!(p > 0.0 && p < 0.5);
    }

    #[test]
    fn test_rejects_invalid_models() {
        let no_trees = r#"{"trees": []}"#;
        assert!(matches!(TreeEnsemble::from_json(no_trees), Err(ModelError::Invalid(_))));

        let bad_feature = r#"{"trees": [{"nodes": [
            {"split": 25, "threshold": 1.0, "yes": 1, "no": 2}, {"leaf": 0.0}, {"leaf": 1.0}
        ]}]}"#;
        assert!(matches!(TreeEnsemble::from_json(bad_feature), Err(ModelError::Invalid(_))));

        let cycle = r#"{"trees": [{"nodes": [
            {"split": 0, "threshold": 1.0, "yes": 0, "no": 1}, {"leaf": 1.0}
        ]}]}"#;
        assert!(matches!(TreeEnsemble::from_json(cycle), Err(ModelError::Invalid(_))));

        let bad_base = r#"{"base_score": 1.0, "trees": [{"nodes": [{"leaf": 0.0}]}]}"#;
        assert!(matches!(TreeEnsemble::from_json(bad_base), Err(ModelError::Invalid(_))));

        assert!(matches!(TreeEnsemble::from_json("not json"), Err(ModelError::Decode(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = TreeEnsemble::load("does/not/exist.json");
        assert!(matches!(result, Err(ModelError::Io { .. })));
    }
}
