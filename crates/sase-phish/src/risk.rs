//! Feature Risk Annotation
//!
//! Buckets each extracted feature against the training population:
//! above mean + std is High, above mean is Medium, anything else Low.
//! The statistics come from the training set itself, so the buckets describe
//! how unusual a value is for that set; they are not calibrated risk.

use crate::{dataset::TrainingDataset, features::FeatureVector, PhishError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Qualitative risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// At or below the mean
    Low,
    /// Above the mean
    Medium,
    /// Above mean + one standard deviation
    High,
}

impl RiskLevel {
    /// Bucket a value against a statistic
    pub fn classify(value: f64, stat: &FeatureStatistic) -> Self {
        if value > stat.mean + stat.std_dev {
            RiskLevel::High
        } else if value > stat.mean {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// Population statistic for one feature
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureStatistic {
    /// Mean
    pub mean: f64,
    /// Sample standard deviation (n - 1), 0 with fewer than two samples
    pub std_dev: f64,
}

impl FeatureStatistic {
    /// Mean and sample standard deviation of `values`
    pub fn from_values(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self::default();
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let std_dev = if n < 2 {
            0.0
        } else {
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (n - 1) as f64).sqrt()
        };
        Self { mean, std_dev }
    }
}

/// Statistics for every feature seen in a set of vectors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureStatistics {
    by_name: HashMap<String, FeatureStatistic>,
}

impl FeatureStatistics {
    /// Compute over vectors; a feature absent from a vector counts as 0
    pub fn from_vectors(vectors: &[FeatureVector]) -> Self {
        let mut columns: HashMap<String, Vec<f64>> = HashMap::new();
        for vector in vectors {
            for name in vector.names() {
                columns.entry(name.to_string()).or_default();
            }
        }
        for (name, column) in columns.iter_mut() {
            column.extend(vectors.iter().map(|v| v.get(name).unwrap_or(0) as f64));
        }

        let by_name = columns
            .into_iter()
            .map(|(name, column)| (name, FeatureStatistic::from_values(&column)))
            .collect();
        Self { by_name }
    }

    /// Compute over the dataset's extracted features
    pub fn from_dataset(dataset: &TrainingDataset) -> Self {
        Self::from_vectors(&dataset.feature_vectors())
    }

    /// Statistic for a feature
    pub fn get(&self, name: &str) -> Option<&FeatureStatistic> {
        self.by_name.get(name)
    }

    /// Number of features covered
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether no feature is covered
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// One annotated feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRisk {
    /// Feature name
    pub name: String,
    /// Title-cased name for display
    pub display_name: String,
    /// Extracted value
    pub value: u64,
    /// Risk bucket
    pub risk: RiskLevel,
}

/// Annotate every feature of `vector`, in vector order
pub fn annotate(
    vector: &FeatureVector,
    statistics: &FeatureStatistics,
) -> Result<Vec<FeatureRisk>, PhishError> {
    vector
        .iter()
        .map(|(name, value)| {
            let stat = statistics.get(name).ok_or_else(|| {
                PhishError::ModelUnavailable(format!("no statistics for feature '{}'", name))
            })?;
            Ok(FeatureRisk {
                name: name.to_string(),
                display_name: display_name(name),
                value,
                risk: RiskLevel::classify(value as f64, stat),
            })
        })
        .collect()
}

/// `num_special_chars` → `Num Special Chars`
pub fn display_name(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
