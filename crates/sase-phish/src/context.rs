//! Model Context
//!
//! The classifier, its feature schema and the population statistics bundled
//! into one read-only value. Built once, then shared by `Arc`.

use crate::{
    features::FeatureVector,
    forest::BaggedForest,
    predictor::{self, PredictionResult},
    risk::{self, FeatureRisk, FeatureStatistics},
    schema::FeatureSchema,
    PhishError,
};
use serde::Serialize;

/// Prediction plus per-feature risk annotation
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    /// Verdict and confidence
    pub prediction: PredictionResult,
    /// One row per extracted feature, in extraction order
    pub risks: Vec<FeatureRisk>,
}

/// Immutable model state
#[derive(Debug)]
pub struct ModelContext {
    forest: BaggedForest,
    schema: FeatureSchema,
    statistics: FeatureStatistics,
}

impl ModelContext {
    /// Bundle a fitted classifier with its schema and statistics
    pub fn new(
        forest: BaggedForest,
        schema: FeatureSchema,
        statistics: FeatureStatistics,
    ) -> Result<Self, PhishError> {
        if forest.n_features() != schema.len() {
            return Err(PhishError::Configuration(format!(
                "classifier expects {} features but schema lists {}",
                forest.n_features(),
                schema.len()
            )));
        }

        Ok(Self {
            forest,
            schema,
            statistics,
        })
    }

    /// Fitted classifier
    pub fn forest(&self) -> &BaggedForest {
        &self.forest
    }

    /// Frozen column order
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Training population statistics
    pub fn statistics(&self) -> &FeatureStatistics {
        &self.statistics
    }

    /// Classify `url`
    pub fn predict(&self, url: &str) -> Result<PredictionResult, PhishError> {
        predictor::predict(url, &self.forest, &self.schema)
    }

    /// Risk-annotate an already extracted vector
    pub fn annotate(&self, vector: &FeatureVector) -> Result<Vec<FeatureRisk>, PhishError> {
        risk::annotate(vector, &self.statistics)
    }

    /// Classify `url` and annotate its features
    pub fn assess(&self, url: &str) -> Result<Assessment, PhishError> {
        let prediction = self.predict(url)?;
        let risks = self.annotate(&prediction.features)?;
        Ok(Assessment { prediction, risks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dataset::TrainingDataset, training::Trainer, Label, RiskLevel, TrainingConfig};

    fn context() -> ModelContext {
        let dataset = TrainingDataset::builtin();
        let model = Trainer::default().train(&dataset).unwrap();
        ModelContext::new(model.forest, model.schema, FeatureStatistics::from_dataset(&dataset)).unwrap()
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let dataset = TrainingDataset::builtin();
        let model = Trainer::new(TrainingConfig { n_trees: 3, ..Default::default() })
            .train(&dataset)
            .unwrap();
        let narrow = FeatureSchema::new(vec!["url_length".into()]).unwrap();
        let err = ModelContext::new(model.forest, narrow, FeatureStatistics::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_assess_ip_url() {
        let ctx = context();
        let assessment = ctx.assess("http://142.251.16.100/search").unwrap();
        assert!((50.0..=100.0).contains(&assessment.prediction.confidence));

        let ip = assessment.risks.iter().find(|r| r.name == "uses_ip").unwrap();
        assert_eq!(ip.risk, RiskLevel::High);
        assert_eq!(assessment.risks.len(), assessment.prediction.features.len());
    }

    #[test]
    fn test_predict_matches_free_function() {
        let ctx = context();
        let url = "http://paypal-security-update.com/login.php";
        let a = ctx.predict(url).unwrap();
        let b = predictor::predict(url, ctx.forest(), ctx.schema()).unwrap();
        assert_eq!(a.label, b.label);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.label, Label::Phishing);
    }

    #[test]
    fn test_assessment_serializes() {
        let ctx = context();
        let assessment = ctx.assess("https://www.google.com").unwrap();
        let json = serde_json::to_value(&assessment).unwrap();
        assert_eq!(json["risks"][0]["name"], "url_length");
        assert_eq!(json["risks"][0]["display_name"], "Url Length");
        assert!(json["prediction"]["confidence"].is_number());
    }
}
