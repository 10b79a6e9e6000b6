//! Predict command

use crate::output::{print_assessment, OutputFormat, PredictionReport};
use anyhow::Context;
use sase_phish::{DetectorConfig, PhishingEngine, TrainingDataset};

pub fn handle(
    config: &DetectorConfig,
    dataset: &TrainingDataset,
    urls: &[String],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let engine = PhishingEngine::new(config.clone());
    engine
        .bootstrap(dataset)
        .with_context(|| format!("preparing model at {}", config.model_path.display()))?;

    match format {
        OutputFormat::Table => {
            for (i, url) in urls.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                let assessment = engine.assess(url)?;
                print_assessment(url, &assessment);
            }
        }
        _ => {
            let reports = urls
                .iter()
                .map(|url| Ok(PredictionReport::new(url, engine.assess(url)?)))
                .collect::<anyhow::Result<Vec<_>>>()?;
            match reports.as_slice() {
                [single] => format.print(single)?,
                _ => format.print(&reports)?,
            }
        }
    }
    Ok(())
}
