//! Inspect command

use crate::output::OutputFormat;
use anyhow::Context;
use colored::Colorize;
use sase_phish::{DetectorConfig, ModelStore};
use serde::Serialize;

#[derive(Serialize)]
struct ModelSummary<'a> {
    path: String,
    trees: usize,
    features: &'a [String],
}

pub fn handle(config: &DetectorConfig, format: OutputFormat) -> anyhow::Result<()> {
    let store = ModelStore::new(&config.model_path);
    let (forest, schema) = store
        .load()
        .with_context(|| format!("loading model {}", store.path().display()))?;

    let summary = ModelSummary {
        path: store.path().display().to_string(),
        trees: forest.n_trees(),
        features: schema.names(),
    };

    match format {
        OutputFormat::Table => {
            println!("{} {}", "Model:".bold(), summary.path);
            println!("{} {}", "Trees:".bold(), summary.trees);
            println!("{} {}", "Features:".bold(), summary.features.len());
            for (i, name) in summary.features.iter().enumerate() {
                println!("  {:>2}. {}", i + 1, name);
            }
        }
        _ => format.print(&summary)?,
    }
    Ok(())
}
