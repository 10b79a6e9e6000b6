//! Train command

use crate::output::{importance_chart, OutputFormat};
use anyhow::Context;
use colored::Colorize;
use sase_phish::{DetectorConfig, ModelStore, Trainer, TrainingDataset, TrainingReport};
use serde::Serialize;

#[derive(Serialize)]
struct TrainSummary<'a> {
    saved_to: Option<String>,
    #[serde(flatten)]
    report: &'a TrainingReport,
}

pub fn handle(
    config: &DetectorConfig,
    dataset: &TrainingDataset,
    save: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let model = Trainer::new(config.training.clone())
        .train(dataset)
        .context("training failed")?;
    tracing::info!("Model trained with accuracy: {:.2}", model.report.accuracy);

    let saved_to = if save {
        let store = ModelStore::new(&config.model_path);
        store
            .save(&model.forest, &model.schema)
            .with_context(|| format!("saving model to {}", store.path().display()))?;
        Some(store.path().display().to_string())
    } else {
        None
    };

    match format {
        OutputFormat::Table => {
            println!(
                "Accuracy: {} ({} training, {} holdout)",
                format!("{:.2}", model.report.accuracy).bold(),
                model.report.training_size,
                model.report.holdout_size
            );
            if let Some(path) = &saved_to {
                println!("Saved: {}", path);
            }
            println!();
            println!("{}", "Feature Importance".bold());
            println!("{}", importance_chart(&model.report.importance));
        }
        _ => format.print(&TrainSummary {
            saved_to,
            report: &model.report,
        })?,
    }
    Ok(())
}
