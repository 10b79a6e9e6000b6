//! URL Prediction

use crate::{
    dataset::Label,
    features::{extract_features, FeatureVector},
    forest::BaggedForest,
    schema::FeatureSchema,
    PhishError,
};
use serde::Serialize;

/// Prediction for one URL
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    /// Predicted label
    pub label: Label,
    /// Probability of the predicted class, as a percentage in [50, 100]
    pub confidence: f64,
    /// Raw extracted features (not aligned to the schema)
    pub features: FeatureVector,
}

impl PredictionResult {
    /// Whether the URL was classified as phishing
    pub fn is_phishing(&self) -> bool {
        self.label == Label::Phishing
    }
}

/// Score `url` with `forest`.
///
/// The extracted vector is aligned to `schema` before scoring: names the
/// schema lists but the extractor no longer produces score as 0, extra
/// extracted names are ignored.
pub fn predict(
    url: &str,
    forest: &BaggedForest,
    schema: &FeatureSchema,
) -> Result<PredictionResult, PhishError> {
    let features = extract_features(url);
    let row = features.aligned(schema);
    let [legitimate, phishing] = forest.predict_row(&row)?;

    let label = if phishing > legitimate {
        Label::Phishing
    } else {
        Label::Legitimate
    };

    Ok(PredictionResult {
        label,
        confidence: legitimate.max(phishing) * 100.0,
        features,
    })
}
