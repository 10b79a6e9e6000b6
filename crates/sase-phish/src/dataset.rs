//! Training dataset

use crate::{
    features::{extract_features, FeatureVector},
    PhishError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Binary URL label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    /// Class 0
    Legitimate,
    /// Class 1
    Phishing,
}

impl Label {
    /// Classifier class index
    pub const fn class_index(self) -> usize {
        match self {
            Label::Legitimate => 0,
            Label::Phishing => 1,
        }
    }

    /// Label for a classifier class index
    pub fn from_class_index(index: usize) -> Result<Self, PhishError> {
        match index {
            0 => Ok(Label::Legitimate),
            1 => Ok(Label::Phishing),
            other => Err(PhishError::InvalidInput(format!("unknown class index {}", other))),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Legitimate => write!(f, "Legitimate"),
            Label::Phishing => write!(f, "Phishing"),
        }
    }
}

/// A URL with its known label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledExample {
    /// Raw URL
    pub url: String,
    /// Known label
    pub label: Label,
}

impl LabeledExample {
    /// Create a labeled example
    pub fn new(url: impl Into<String>, label: Label) -> Self {
        Self {
            url: url.into(),
            label,
        }
    }
}

/// On-disk record: `{"url": "...", "label": 0|1}`
#[derive(Debug, Serialize, Deserialize)]
struct ExampleRecord {
    url: String,
    label: u8,
}

/// Collection of labeled URLs used to fit the classifier and compute feature statistics
#[derive(Debug, Clone, Default)]
pub struct TrainingDataset {
    examples: Vec<LabeledExample>,
}

impl TrainingDataset {
    /// Create from examples
    pub fn new(examples: Vec<LabeledExample>) -> Self {
        Self { examples }
    }

    /// Built-in reference corpus
    pub fn builtin() -> Self {
        use Label::{Legitimate, Phishing};

        let examples = [
            ("http://example.com/login", Legitimate),
            ("http://142.251.16.100/search", Legitimate),
            ("http://secure-bank-login.com?verify=account&user=1", Phishing),
            ("https://www.google.com", Legitimate),
            ("http://freelotto.com.winner.get.prize.now", Phishing),
            ("https://www.amazon.com/gp/buy.html", Legitimate),
            ("http://paypal-security-update.com/login.php", Phishing),
            ("https://www.microsoft.com/en-us/", Legitimate),
            ("http://facebook.verify-account.security.com", Phishing),
            ("https://www.netflix.com/login", Legitimate),
        ];

        Self::new(
            examples
                .into_iter()
                .map(|(url, label)| LabeledExample::new(url, label))
                .collect(),
        )
    }

    /// Parse a JSON array of `{"url", "label"}` records (label 1 = phishing, 0 = legitimate)
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, PhishError> {
        let records: Vec<ExampleRecord> = serde_json::from_slice(bytes)
            .map_err(|e| PhishError::Configuration(format!("invalid dataset: {}", e)))?;

        let examples = records
            .into_iter()
            .map(|r| {
                let label = Label::from_class_index(r.label as usize).map_err(|_| {
                    PhishError::Configuration(format!("invalid label {} for {}", r.label, r.url))
                })?;
                Ok(LabeledExample::new(r.url, label))
            })
            .collect::<Result<Vec<_>, PhishError>>()?;

        Ok(Self::new(examples))
    }

    /// Read a JSON dataset file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PhishError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_json_slice(&bytes)
    }

    /// Examples in order
    pub fn examples(&self) -> &[LabeledExample] {
        &self.examples
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Distinct labels present
    pub fn distinct_labels(&self) -> BTreeSet<Label> {
        self.examples.iter().map(|e| e.label).collect()
    }

    /// Extract a feature vector per example
    pub fn feature_vectors(&self) -> Vec<FeatureVector> {
        self.examples
            .iter()
            .map(|e| extract_features(&e.url))
            .collect()
    }

    /// Class index per example
    pub fn class_indices(&self) -> Vec<usize> {
        self.examples
            .iter()
            .map(|e| e.label.class_index())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_labels() {
        let dataset = TrainingDataset::builtin();
        assert_eq!(dataset.len(), 10);
        assert_eq!(dataset.class_indices(), vec![0, 0, 1, 0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(dataset.distinct_labels().len(), 2);
    }

    #[test]
    fn test_from_json() {
        let json = br#"[
            {"url": "http://bit.ly/x", "label": 1},
            {"url": "https://www.rust-lang.org", "label": 0}
        ]"#;
        let dataset = TrainingDataset::from_json_slice(json).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.examples()[0].label, Label::Phishing);
    }

    #[test]
    fn test_from_json_rejects_bad_label() {
        let json = br#"[{"url": "http://x.com", "label": 7}]"#;
        let err = TrainingDataset::from_json_slice(json).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::Phishing.to_string(), "Phishing");
        assert_eq!(Label::from_class_index(0).unwrap(), Label::Legitimate);
        assert!(Label::from_class_index(2).is_err());
    }
}
