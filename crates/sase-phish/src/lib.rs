//! OpenSASE Phishing URL Classifier
//!
//! Lexical URL classification with a bagged decision-tree ensemble.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PHISHING URL CLASSIFIER                            │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌─────────────┐ │
//! │  │   Feature    │  │   Training   │  │    Model     │  │   Feature   │ │
//! │  │  Extraction  │─▶│  (Bagged     │─▶│    Store     │  │  Statistics │ │
//! │  │  (lexical)   │  │   CART)      │  │   (JSON)     │  │ (mean, std) │ │
//! │  └──────────────┘  └──────────────┘  └──────┬───────┘  └──────┬──────┘ │
//! │                                             │                 │        │
//! │  ┌──────────────────────────────────────────▼─────────────────▼──────┐ │
//! │  │                  MODEL CONTEXT (immutable, Arc)                   │ │
//! │  │        classifier │ feature schema │ feature statistics           │ │
//! │  └───────────────────────────────┬───────────────────────────────────┘ │
//! │                                  │                                      │
//! │  ┌──────────────┐  ┌─────────────▼────┐                                 │
//! │  │  Predictor   │  │  Risk Annotator  │                                 │
//! │  │ label, conf. │  │  High/Med/Low    │                                 │
//! │  └──────────────┘  └──────────────────┘                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod dataset;
pub mod features;
pub mod forest;
pub mod predictor;
pub mod risk;
pub mod schema;
pub mod store;
pub mod training;

use std::path::Path;
use std::sync::Arc;
use parking_lot::RwLock;
use thiserror::Error;

pub use config::{DetectorConfig, TrainingConfig};
pub use context::{Assessment, ModelContext};
pub use dataset::{Label, LabeledExample, TrainingDataset};
pub use features::{extract_features, FeatureVector, FEATURE_NAMES};
pub use forest::BaggedForest;
pub use predictor::{predict, PredictionResult};
pub use risk::{annotate, FeatureRisk, FeatureStatistic, FeatureStatistics, RiskLevel};
pub use schema::FeatureSchema;
pub use store::ModelStore;
pub use training::{FeatureImportance, TrainedModel, Trainer, TrainingReport};

/// Classifier error types
#[derive(Debug, Error)]
pub enum PhishError {
    /// Bad training data, bad parameters or an unusable model bundle
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Model artifact could not be decoded
    #[error("model decode error: {0}")]
    Decode(String),
    /// Model artifact could not be read or written
    #[error("model io error: {0}")]
    Io(#[from] std::io::Error),
    /// The tree learner rejected its input
    #[error("training error: {0}")]
    Training(String),
    /// Caller supplied input of the wrong shape
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// No classifier, schema or statistics available yet
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
}

impl PhishError {
    /// Whether the error belongs to the configuration class (data, parameters, artifact)
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Decode(_) | Self::Io(_))
    }
}

/// Classifier result alias
pub type Result<T> = std::result::Result<T, PhishError>;

/// Main phishing detection engine
///
/// Holds the configuration and a read-only handle to the current
/// [`ModelContext`]. The context itself is never mutated; installing a new
/// one swaps the `Arc` and in-flight readers keep the old one.
pub struct PhishingEngine {
    config: DetectorConfig,
    context: RwLock<Option<Arc<ModelContext>>>,
}

impl PhishingEngine {
    /// Create an engine with no model installed
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            context: RwLock::new(None),
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Load the persisted model, or train and persist one when no artifact exists.
    ///
    /// Feature statistics are always computed over `dataset`. Returns the
    /// training report when a model was trained.
    pub fn bootstrap(&self, dataset: &TrainingDataset) -> Result<Option<TrainingReport>> {
        let store = ModelStore::new(&self.config.model_path);

        let (forest, schema, report) = if store.exists() {
            let (forest, schema) = store.load()?;
            tracing::info!("Loaded saved model from {}", store.path().display());
            (forest, schema, None)
        } else {
            let trained = Trainer::new(self.config.training.clone()).train(dataset)?;
            tracing::info!("Model trained with accuracy: {:.2}", trained.report.accuracy);
            store.save(&trained.forest, &trained.schema)?;
            (trained.forest, trained.schema, Some(trained.report))
        };

        let statistics = FeatureStatistics::from_dataset(dataset);
        self.install(ModelContext::new(forest, schema, statistics)?);
        Ok(report)
    }

    /// Load a model from an explicit artifact path, bypassing training
    pub fn load_from(&self, path: impl AsRef<Path>, dataset: &TrainingDataset) -> Result<()> {
        let (forest, schema) = ModelStore::new(path).load()?;
        let statistics = FeatureStatistics::from_dataset(dataset);
        self.install(ModelContext::new(forest, schema, statistics)?);
        Ok(())
    }

    /// Install a new model context (hot reload)
    pub fn install(&self, context: ModelContext) {
        tracing::debug!(
            features = context.schema().len(),
            trees = context.forest().n_trees(),
            "Installing model context"
        );
        *self.context.write() = Some(Arc::new(context));
    }

    /// Current model context
    pub fn context(&self) -> Result<Arc<ModelContext>> {
        self.context
            .read()
            .clone()
            .ok_or_else(|| PhishError::ModelUnavailable("no model has been trained or loaded".into()))
    }

    /// Whether a model context is installed
    pub fn is_ready(&self) -> bool {
        self.context.read().is_some()
    }

    /// Score a URL against the installed model
    pub fn predict(&self, url: &str) -> Result<PredictionResult> {
        self.context()?.predict(url)
    }

    /// Score a URL and annotate every feature with a risk level
    pub fn assess(&self, url: &str) -> Result<Assessment> {
        self.context()?.assess(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_in(dir: &tempfile::TempDir) -> PhishingEngine {
        let config = DetectorConfig {
            model_path: dir.path().join("phishing_model.json"),
            ..Default::default()
        };
        PhishingEngine::new(config)
    }

    #[test]
    fn test_predict_before_bootstrap() {
        let engine = PhishingEngine::new(DetectorConfig::default());
        assert!(!engine.is_ready());
        let err = engine.predict("https://www.google.com").unwrap_err();
        assert!(matches!(err, PhishError::ModelUnavailable(_)));
    }

    #[test]
    fn test_bootstrap_trains_then_loads() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = TrainingDataset::builtin();

        let first = engine_in(&dir);
        let report = first.bootstrap(&dataset).unwrap();
        assert!(report.is_some());
        assert!(first.config().model_path.exists());

        let second = engine_in(&dir);
        let report = second.bootstrap(&dataset).unwrap();
        assert!(report.is_none());

        let url = "http://paypal-security-update.com/login.php";
        let a = first.predict(url).unwrap();
        let b = second.predict(url).unwrap();
        assert_eq!(a.label, b.label);
        assert_eq!(a.confidence, b.confidence);
    }

    #[test]
    fn test_assess_annotates_every_feature() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(&dir);
        engine.bootstrap(&TrainingDataset::builtin()).unwrap();

        let assessment = engine.assess("https://www.amazon.com/gp/buy.html").unwrap();
        assert_eq!(assessment.prediction.label, Label::Legitimate);
        assert_eq!(assessment.risks.len(), FEATURE_NAMES.len());
    }

    #[test]
    fn test_error_classes() {
        assert!(PhishError::Configuration("x".into()).is_configuration());
        assert!(PhishError::Decode("x".into()).is_configuration());
        assert!(!PhishError::ModelUnavailable("x".into()).is_configuration());
    }
}
