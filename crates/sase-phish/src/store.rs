//! Model Store
//!
//! A model artifact is one JSON array holding the fitted ensemble and its
//! feature schema. Two shapes are accepted on load:
//!
//! - `[forest, schema]` (written by [`ModelStore::save`])
//! - `[forest, <ignored>, schema]` (older bundles carrying an extra member)
//!
//! Any other arity is a configuration error.

use crate::{forest::BaggedForest, schema::FeatureSchema, PhishError};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Decoded bundle shapes
#[derive(Debug)]
pub enum PersistedBundle {
    /// `[forest, schema]`
    Pair {
        /// Fitted ensemble
        forest: BaggedForest,
        /// Feature schema
        schema: FeatureSchema,
    },
    /// `[forest, extra, schema]`
    WithExtra {
        /// Fitted ensemble
        forest: BaggedForest,
        /// Unused middle member
        extra: Value,
        /// Feature schema
        schema: FeatureSchema,
    },
}

impl PersistedBundle {
    /// Decode the top-level array members
    pub fn from_members(members: Vec<Value>) -> Result<Self, PhishError> {
        let arity = members.len();
        let mut members = members.into_iter();

        match (arity, members.next(), members.next(), members.next()) {
            (2, Some(forest), Some(schema), None) => Ok(Self::Pair {
                forest: decode_member(forest, "classifier")?,
                schema: decode_member(schema, "schema")?,
            }),
            (3, Some(forest), Some(extra), Some(schema)) => Ok(Self::WithExtra {
                forest: decode_member(forest, "classifier")?,
                extra,
                schema: decode_member(schema, "schema")?,
            }),
            _ => Err(PhishError::Configuration(format!(
                "unexpected model bundle arity {}, expected 2 or 3",
                arity
            ))),
        }
    }

    /// Canonical `(forest, schema)` after checking the two agree on width
    pub fn into_parts(self) -> Result<(BaggedForest, FeatureSchema), PhishError> {
        let (forest, schema) = match self {
            Self::Pair { forest, schema } => (forest, schema),
            Self::WithExtra { forest, schema, .. } => (forest, schema),
        };

        if forest.n_features() != schema.len() {
            return Err(PhishError::Configuration(format!(
                "classifier expects {} features but schema lists {}",
                forest.n_features(),
                schema.len()
            )));
        }
        if forest.n_trees() == 0 {
            return Err(PhishError::Configuration("classifier has no trees".into()));
        }
        Ok((forest, schema))
    }
}

fn decode_member<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Result<T, PhishError> {
    serde_json::from_value(value).map_err(|e| PhishError::Decode(format!("{}: {}", what, e)))
}

fn write_bundle(path: &Path, forest: &BaggedForest, schema: &FeatureSchema) -> Result<(), PhishError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &(forest, schema))
        .map_err(|e| PhishError::Decode(e.to_string()))?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// File-backed model store
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    /// Store at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Artifact path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an artifact exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Encode `[forest, schema]`
    pub fn encode(forest: &BaggedForest, schema: &FeatureSchema) -> Result<Vec<u8>, PhishError> {
        serde_json::to_vec(&(forest, schema)).map_err(|e| PhishError::Decode(e.to_string()))
    }

    /// Decode an artifact
    pub fn decode(bytes: &[u8]) -> Result<(BaggedForest, FeatureSchema), PhishError> {
        let members: Vec<Value> =
            serde_json::from_slice(bytes).map_err(|e| PhishError::Decode(e.to_string()))?;
        PersistedBundle::from_members(members)?.into_parts()
    }

    /// Write the bundle through a temporary sibling and rename it into place
    pub fn save(&self, forest: &BaggedForest, schema: &FeatureSchema) -> Result<(), PhishError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        let written = write_bundle(&tmp_path, forest, schema)
            .and_then(|()| std::fs::rename(&tmp_path, &self.path).map_err(PhishError::from));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }

        tracing::info!(
            path = %self.path.display(),
            trees = forest.n_trees(),
            features = schema.len(),
            "Model saved"
        );
        Ok(())
    }

    /// Read and decode the artifact
    pub fn load(&self) -> Result<(BaggedForest, FeatureSchema), PhishError> {
        let members: Vec<Value> = {
            let file = File::open(&self.path)?;
            serde_json::from_reader(BufReader::new(file))
                .map_err(|e| PhishError::Decode(format!("{}: {}", self.path.display(), e)))?
        };
        let (forest, schema) = PersistedBundle::from_members(members)?.into_parts()?;

        tracing::debug!(
            path = %self.path.display(),
            trees = forest.n_trees(),
            features = schema.len(),
            "Model loaded"
        );
        Ok((forest, schema))
    }
}
