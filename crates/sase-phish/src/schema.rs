//! Feature schema

use crate::{features::FeatureVector, PhishError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered feature names a trained model expects.
///
/// Frozen at training time and persisted with the classifier. Serializes as a
/// plain JSON list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Create from ordered names; duplicates are rejected
    pub fn new(names: Vec<String>) -> Result<Self, PhishError> {
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(PhishError::Configuration(format!(
                    "duplicate feature '{}' in schema",
                    name
                )));
            }
        }
        Ok(Self { names })
    }

    /// Union of the vectors' names in first-appearance order
    pub fn from_vectors(vectors: &[FeatureVector]) -> Self {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for vector in vectors {
            for name in vector.names() {
                if seen.insert(name.to_string()) {
                    names.push(name.to_string());
                }
            }
        }
        Self { names }
    }

    /// Names in column order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Column index of a name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Whether the schema contains a name
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = PhishError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{extract_features, FEATURE_NAMES};

    #[test]
    fn test_from_vectors_first_appearance() {
        let a = FeatureVector::from_entries([("x", 1), ("y", 2)]);
        let b = FeatureVector::from_entries([("z", 3), ("x", 4)]);
        let schema = FeatureSchema::from_vectors(&[a, b]);
        assert_eq!(schema.names(), ["x", "y", "z"]);
    }

    #[test]
    fn test_extracted_schema_matches_feature_names() {
        let schema = FeatureSchema::from_vectors(&[extract_features("http://example.com/login")]);
        assert_eq!(schema.len(), FEATURE_NAMES.len());
        assert_eq!(schema.position("url_length"), Some(0));
        assert_eq!(schema.position("shortening_service"), Some(18));
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = FeatureSchema::new(vec!["a".into(), "a".into()]).unwrap_err();
        assert!(err.is_configuration());

        let decoded: Result<FeatureSchema, _> = serde_json::from_str(r#"["a","b","a"]"#);
        assert!(decoded.is_err());
    }

    #[test]
    fn test_align_defaults_and_drops() {
        let schema = FeatureSchema::new(vec!["num_dots".into(), "retired_feature".into(), "url_length".into()]).unwrap();
        let vector = extract_features("https://a.b.c");
        assert_eq!(vector.aligned(&schema), vec![2.0, 0.0, 13.0]);
    }

    #[test]
    fn test_serde_plain_list() {
        let schema = FeatureSchema::new(vec!["b".into(), "a".into()]).unwrap();
        let json = serde_json::to_string(&schema).unwrap();
        assert_eq!(json, r#"["b","a"]"#);
        let back: FeatureSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }
}
