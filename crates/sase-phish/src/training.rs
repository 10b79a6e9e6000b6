//! Model Training
//!
//! Extracts features for every labeled URL, freezes the feature schema, holds
//! out a seeded fraction of rows for accuracy and fits the ensemble on the rest.

use crate::{
    config::TrainingConfig,
    dataset::TrainingDataset,
    forest::{BaggedForest, ForestParams},
    schema::FeatureSchema,
    PhishError,
};
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, Axis};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

/// Learned importance of one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Feature name
    pub name: String,
    /// Mean normalized impurity decrease
    pub importance: f64,
}

/// Training metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Exact-match accuracy on the holdout rows
    pub accuracy: f64,
    /// Rows used to fit
    pub training_size: usize,
    /// Rows held out
    pub holdout_size: usize,
    /// Features ranked by importance, highest first
    pub importance: Vec<FeatureImportance>,
    /// Completion time
    pub trained_at: DateTime<Utc>,
}

/// Fitted classifier with its schema and report
#[derive(Debug)]
pub struct TrainedModel {
    /// Fitted ensemble
    pub forest: BaggedForest,
    /// Frozen column order
    pub schema: FeatureSchema,
    /// Accuracy and diagnostics
    pub report: TrainingReport,
}

impl TrainedModel {
    /// `(classifier, accuracy, schema)`
    pub fn into_parts(self) -> (BaggedForest, f64, FeatureSchema) {
        (self.forest, self.report.accuracy, self.schema)
    }
}

/// Classifier trainer
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    /// Create a trainer
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Training parameters
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Fit a classifier over `dataset`
    pub fn train(&self, dataset: &TrainingDataset) -> Result<TrainedModel, PhishError> {
        self.config.validate()?;
        if dataset.is_empty() {
            return Err(PhishError::Configuration("training dataset is empty".into()));
        }
        if dataset.distinct_labels().len() < 2 {
            return Err(PhishError::Configuration(
                "training dataset needs both phishing and legitimate examples".into(),
            ));
        }

        let vectors = dataset.feature_vectors();
        let schema = FeatureSchema::from_vectors(&vectors);
        let flat: Vec<f64> = vectors.iter().flat_map(|v| v.aligned(&schema)).collect();
        let records = Array2::from_shape_vec((vectors.len(), schema.len()), flat)
            .map_err(|e| PhishError::Training(e.to_string()))?;
        let targets = Array1::from(dataset.class_indices());

        let (train_idx, holdout_idx) =
            holdout_split(dataset.len(), self.config.holdout_ratio, self.config.seed);
        if train_idx.is_empty() {
            return Err(PhishError::Configuration(format!(
                "holdout ratio {} leaves no training rows out of {}",
                self.config.holdout_ratio,
                dataset.len()
            )));
        }

        let params = ForestParams {
            n_trees: self.config.n_trees,
            seed: self.config.seed,
            max_depth: self.config.max_depth,
        };
        let forest = BaggedForest::fit(
            &records.select(Axis(0), &train_idx),
            &targets.select(Axis(0), &train_idx),
            &params,
        )?;

        let accuracy = if holdout_idx.is_empty() {
            0.0
        } else {
            let predicted = forest.predict(&records.select(Axis(0), &holdout_idx))?;
            let expected = targets.select(Axis(0), &holdout_idx);
            let correct = predicted
                .iter()
                .zip(expected.iter())
                .filter(|(p, e)| p == e)
                .count();
            correct as f64 / holdout_idx.len() as f64
        };

        let importance = rank_importance(&schema, &forest.feature_importance());

        tracing::debug!(
            training = train_idx.len(),
            holdout = holdout_idx.len(),
            trees = forest.n_trees(),
            accuracy,
            "Classifier fitted"
        );

        Ok(TrainedModel {
            forest,
            schema,
            report: TrainingReport {
                accuracy,
                training_size: train_idx.len(),
                holdout_size: holdout_idx.len(),
                importance,
                trained_at: Utc::now(),
            },
        })
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(TrainingConfig::default())
    }
}

/// Seeded shuffle split into `(training, holdout)` row indices.
/// The holdout gets `ceil(ratio * n)` rows.
fn holdout_split(n: usize, ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let holdout = ((n as f64 * ratio).ceil() as usize).min(n);
    let training = indices.split_off(holdout);
    (training, indices)
}

fn rank_importance(schema: &FeatureSchema, scores: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = schema
        .names()
        .iter()
        .zip(scores.iter())
        .map(|(name, &importance)| FeatureImportance {
            name: name.clone(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}
