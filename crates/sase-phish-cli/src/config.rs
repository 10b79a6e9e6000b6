//! CLI Configuration
//!
//! ```toml
//! model_path = "/var/lib/phishscan/phishing_model.json"
//! dataset = "/etc/phishscan/urls.json"
//! default_format = "table"
//!
//! [training]
//! n_trees = 200
//! max_depth = 12
//! ```

use crate::output::OutputFormat;
use anyhow::{anyhow, Context};
use clap::ValueEnum;
use sase_phish::{DetectorConfig, TrainingConfig, TrainingDataset};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    pub model_path: Option<PathBuf>,
    pub dataset: Option<PathBuf>,
    pub default_format: Option<String>,
    pub training: Option<TrainingConfig>,
}

impl Config {
    /// An explicit path must exist; the default location is optional
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".phishscan").join("config.toml"))
    }

    /// Flag/env model path wins over the file
    pub fn detector_config(&self, model_override: Option<PathBuf>) -> DetectorConfig {
        let mut detector = DetectorConfig::default();
        if let Some(path) = model_override.or_else(|| self.model_path.clone()) {
            detector.model_path = path;
        }
        if let Some(training) = &self.training {
            detector.training = training.clone();
        }
        detector
    }

    pub fn default_format(&self) -> anyhow::Result<OutputFormat> {
        match &self.default_format {
            Some(name) => OutputFormat::from_str(name, true)
                .map_err(|_| anyhow!("unknown default_format '{}'", name)),
            None => Ok(OutputFormat::Table),
        }
    }

    /// Flag path, then config path, then the built-in corpus
    pub fn dataset(&self, flag: Option<&Path>) -> anyhow::Result<TrainingDataset> {
        match flag.or(self.dataset.as_deref()) {
            Some(path) => TrainingDataset::from_json_file(path)
                .with_context(|| format!("loading dataset {}", path.display())),
            None => Ok(TrainingDataset::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            model_path = "/tmp/model.json"
            default_format = "json"

            [training]
            n_trees = 7
            "#,
        )
        .unwrap();

        let detector = config.detector_config(None);
        assert_eq!(detector.model_path, PathBuf::from("/tmp/model.json"));
        assert_eq!(detector.training.n_trees, 7);
        assert_eq!(detector.training.seed, 42);
        assert!(matches!(config.default_format().unwrap(), OutputFormat::Json));
    }

    #[test]
    fn test_model_override_wins() {
        let config = Config::parse(r#"model_path = "/tmp/a.json""#).unwrap();
        let detector = config.detector_config(Some(PathBuf::from("/tmp/b.json")));
        assert_eq!(detector.model_path, PathBuf::from("/tmp/b.json"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let detector = config.detector_config(None);
        assert_eq!(detector.model_path, PathBuf::from("phishing_model.json"));
        assert!(matches!(config.default_format().unwrap(), OutputFormat::Table));
        assert_eq!(config.dataset(None).unwrap().len(), 10);
    }

    #[test]
    fn test_bad_format_name() {
        let config = Config::parse(r#"default_format = "xml""#).unwrap();
        assert!(config.default_format().is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_dataset_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.json");
        fs::write(
            &path,
            r#"[{"url": "http://a.com", "label": 0}, {"url": "http://b-c.com", "label": 1}]"#,
        )
        .unwrap();

        let config = Config::default();
        assert_eq!(config.dataset(Some(&path)).unwrap().len(), 2);
    }
}
