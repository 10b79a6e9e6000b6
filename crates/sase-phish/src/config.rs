//! Detector Configuration

use crate::PhishError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default model artifact file name
pub const DEFAULT_MODEL_FILE: &str = "phishing_model.json";

/// Detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Persisted model bundle
    pub model_path: PathBuf,
    /// Training parameters
    pub training: TrainingConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_FILE),
            training: TrainingConfig::default(),
        }
    }
}

/// Training parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Trees in the ensemble
    pub n_trees: usize,
    /// Seed for the holdout shuffle and the bootstrap resamples
    pub seed: u64,
    /// Fraction of the dataset held out for accuracy (rounded up)
    pub holdout_ratio: f64,
    /// Maximum tree depth, unlimited if `None`
    pub max_depth: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            holdout_ratio: 0.2,
            max_depth: None,
        }
    }
}

impl TrainingConfig {
    /// Reject parameters that cannot produce a model
    pub fn validate(&self) -> Result<(), PhishError> {
        if self.n_trees == 0 {
            return Err(PhishError::Configuration("n_trees must be at least 1".into()));
        }
        if !(self.holdout_ratio > 0.0 && self.holdout_ratio < 1.0) {
            return Err(PhishError::Configuration(format!(
                "holdout_ratio must be in (0, 1), got {}",
                self.holdout_ratio
            )));
        }
        if self.max_depth == Some(0) {
            return Err(PhishError::Configuration("max_depth must be at least 1".into()));
        }
        Ok(())
    }
}
