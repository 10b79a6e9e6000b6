//! Bagged Decision-Tree Ensemble
//!
//! Each tree is a Gini CART tree fitted on a bootstrap resample of the training
//! rows. Class probabilities are the fraction of trees voting for each class.
//!
//! A deserialized forest is checked node by node before it is handed out:
//! every split must index a column the forest was fitted on, every split must
//! have both children and every leaf must vote for a known class.

use crate::PhishError;
use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Number of classes the ensemble votes over
pub const CLASS_COUNT: usize = 2;

/// Ensemble hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Trees in the ensemble
    pub n_trees: usize,
    /// Bootstrap seed
    pub seed: u64,
    /// Maximum tree depth
    pub max_depth: Option<usize>,
}

/// Binary bagged decision-tree classifier
#[derive(Serialize, Deserialize)]
#[serde(try_from = "RawForest")]
pub struct BaggedForest {
    trees: Vec<DecisionTree<f64, usize>>,
    n_features: usize,
}

impl BaggedForest {
    /// Fit on `records` (rows × features) and class indices `targets`
    pub fn fit(
        records: &Array2<f64>,
        targets: &Array1<usize>,
        params: &ForestParams,
    ) -> Result<Self, PhishError> {
        let n_samples = records.nrows();
        if params.n_trees == 0 {
            return Err(PhishError::Configuration("ensemble needs at least one tree".into()));
        }
        if n_samples == 0 {
            return Err(PhishError::Configuration("no training rows".into()));
        }
        if targets.len() != n_samples {
            return Err(PhishError::InvalidInput(format!(
                "{} rows but {} targets",
                n_samples,
                targets.len()
            )));
        }
        if let Some(bad) = targets.iter().find(|&&t| t >= CLASS_COUNT) {
            return Err(PhishError::InvalidInput(format!("unknown class index {}", bad)));
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            let sample: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
            let bootstrap = Dataset::new(
                records.select(Axis(0), &sample),
                targets.select(Axis(0), &sample),
            );

            let tree = DecisionTree::<f64, usize>::params()
                .split_quality(SplitQuality::Gini)
                .max_depth(params.max_depth)
                .fit(&bootstrap)
                .map_err(|e| PhishError::Training(e.to_string()))?;
            trees.push(tree);
        }

        Ok(Self {
            trees,
            n_features: records.ncols(),
        })
    }

    /// Trees in the ensemble
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Feature columns the ensemble was fitted on
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Vote fractions per row: column 0 legitimate, column 1 phishing
    pub fn predict_proba(&self, records: &Array2<f64>) -> Result<Array2<f64>, PhishError> {
        if records.ncols() != self.n_features {
            return Err(PhishError::InvalidInput(format!(
                "expected {} feature columns, got {}",
                self.n_features,
                records.ncols()
            )));
        }
        if self.trees.is_empty() {
            return Err(PhishError::ModelUnavailable("ensemble has no trees".into()));
        }

        let mut votes = Array2::<f64>::zeros((records.nrows(), CLASS_COUNT));
        for tree in &self.trees {
            let predicted: Array1<usize> = tree.predict(records);
            for (row, &class) in predicted.iter().enumerate() {
                votes[[row, class]] += 1.0;
            }
        }

        let total = self.trees.len() as f64;
        votes.mapv_inplace(|v| v / total);
        Ok(votes)
    }

    /// Predicted class per row; ties go to class 0
    pub fn predict(&self, records: &Array2<f64>) -> Result<Array1<usize>, PhishError> {
        let proba = self.predict_proba(records)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|p| if p[1] > p[0] { 1 } else { 0 })
            .collect())
    }

    /// Probability pair for a single aligned row
    pub fn predict_row(&self, row: &[f64]) -> Result<[f64; CLASS_COUNT], PhishError> {
        let records = Array2::from_shape_vec((1, row.len()), row.to_vec())
            .map_err(|e| PhishError::InvalidInput(e.to_string()))?;
        let proba = self.predict_proba(&records)?;
        Ok([proba[[0, 0]], proba[[0, 1]]])
    }

    /// Mean normalized impurity decrease per feature column
    pub fn feature_importance(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (i, value) in tree.feature_importance().iter().enumerate() {
                if i < totals.len() && value.is_finite() {
                    totals[i] += *value;
                }
            }
        }

        let n = self.trees.len().max(1) as f64;
        totals.into_iter().map(|t| t / n).collect()
    }
}

/// Serialized shape, trees kept raw until their width has been read
#[derive(Deserialize)]
struct RawForest {
    trees: Vec<Value>,
    n_features: usize,
}

#[derive(Deserialize)]
struct TreeWidth {
    num_features: usize,
}

impl TryFrom<RawForest> for BaggedForest {
    type Error = PhishError;

    fn try_from(raw: RawForest) -> Result<Self, Self::Error> {
        let mut trees = Vec::with_capacity(raw.trees.len());

        for (index, value) in raw.trees.into_iter().enumerate() {
            let width = TreeWidth::deserialize(&value)
                .map_err(|e| PhishError::Decode(format!("tree {}: {}", index, e)))?
                .num_features;
            if width != raw.n_features {
                return Err(PhishError::Decode(format!(
                    "tree {} was fitted on {} features, forest on {}",
                    index, width, raw.n_features
                )));
            }

            let tree: DecisionTree<f64, usize> = serde_json::from_value(value)
                .map_err(|e| PhishError::Decode(format!("tree {}: {}", index, e)))?;
            check_tree(index, &tree, raw.n_features)?;
            trees.push(tree);
        }

        Ok(Self {
            trees,
            n_features: raw.n_features,
        })
    }
}

fn check_tree(index: usize, tree: &DecisionTree<f64, usize>, n_features: usize) -> Result<(), PhishError> {
    for node in tree.iter_nodes() {
        match node.prediction() {
            Some(class) if class >= CLASS_COUNT => {
                return Err(PhishError::Decode(format!(
                    "tree {} has a leaf voting for unknown class {}",
                    index, class
                )));
            }
            Some(_) => {}
            None => {
                let (feature, _, _) = node.split();
                if feature >= n_features {
                    return Err(PhishError::Decode(format!(
                        "tree {} splits on feature {} of {}",
                        index, feature, n_features
                    )));
                }
                if node.children().iter().any(|child| child.is_none()) {
                    return Err(PhishError::Decode(format!(
                        "tree {} has a split without both children",
                        index
                    )));
                }
            }
        }
    }
    Ok(())
}

impl fmt::Debug for BaggedForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaggedForest")
            .field("n_trees", &self.trees.len())
            .field("n_features", &self.n_features)
            .finish()
    }
}
