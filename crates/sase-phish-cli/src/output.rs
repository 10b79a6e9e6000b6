//! Output formatting

use clap::ValueEnum;
use colored::Colorize;
use sase_phish::{Assessment, FeatureImportance, FeatureRisk, FeatureVector, RiskLevel};
use serde::Serialize;
use tabled::{Table, Tabled};

/// Width of the importance chart bars
const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Print a structured document; `Table` is handled by the caller
    pub fn print<T: Serialize>(&self, data: &T) -> anyhow::Result<()> {
        match self {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(data)?),
            OutputFormat::Table => println!("{}", serde_json::to_string_pretty(data)?),
        }
        Ok(())
    }
}

/// Per-URL verdict document
#[derive(Debug, Serialize)]
pub struct PredictionReport {
    pub url: String,
    pub prediction: String,
    pub confidence: f64,
    pub features: FeatureVector,
    pub risks: Vec<RiskEntry>,
}

#[derive(Debug, Serialize)]
pub struct RiskEntry {
    pub feature: String,
    pub value: u64,
    pub risk: RiskLevel,
}

impl PredictionReport {
    pub fn new(url: &str, assessment: Assessment) -> Self {
        let risks = assessment
            .risks
            .into_iter()
            .map(|r| RiskEntry {
                feature: r.name,
                value: r.value,
                risk: r.risk,
            })
            .collect();

        Self {
            url: url.to_string(),
            prediction: assessment.prediction.label.to_string(),
            confidence: round2(assessment.prediction.confidence),
            features: assessment.prediction.features,
            risks,
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Tabled)]
struct RiskRow {
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Value")]
    value: u64,
    #[tabled(rename = "Risk")]
    risk: String,
}

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Value")]
    value: u64,
}

fn colored_risk(risk: RiskLevel) -> String {
    match risk {
        RiskLevel::High => risk.to_string().red().bold().to_string(),
        RiskLevel::Medium => risk.to_string().yellow().to_string(),
        RiskLevel::Low => risk.to_string().green().to_string(),
    }
}

pub fn print_assessment(url: &str, assessment: &Assessment) {
    let prediction = &assessment.prediction;
    let verdict = if prediction.is_phishing() {
        prediction.label.to_string().red().bold()
    } else {
        prediction.label.to_string().green().bold()
    };

    println!("{}", url.bold());
    println!("  Prediction: {}", verdict);
    println!("  Confidence: {:.2}%", prediction.confidence);
    println!("{}", risk_table(&assessment.risks));
}

fn risk_table(risks: &[FeatureRisk]) -> Table {
    let rows: Vec<RiskRow> = risks
        .iter()
        .map(|r| RiskRow {
            feature: r.display_name.clone(),
            value: r.value,
            risk: colored_risk(r.risk),
        })
        .collect();
    Table::new(rows)
}

pub fn print_features(url: &str, features: &FeatureVector) {
    let rows: Vec<FeatureRow> = features
        .iter()
        .map(|(name, value)| FeatureRow {
            feature: name.to_string(),
            value,
        })
        .collect();
    println!("{}", url.bold());
    println!("{}", Table::new(rows));
}

/// Horizontal bar chart, longest bar = highest importance
pub fn importance_chart(ranked: &[FeatureImportance]) -> String {
    let max = ranked
        .iter()
        .map(|f| f.importance)
        .fold(0.0_f64, f64::max);
    let label_width = ranked.iter().map(|f| f.name.len()).max().unwrap_or(0);

    ranked
        .iter()
        .map(|f| {
            let filled = if max > 0.0 {
                ((f.importance / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            format!(
                "{:<width$}  {:<bar$}  {:.4}",
                f.name,
                "█".repeat(filled),
                f.importance,
                width = label_width,
                bar = BAR_WIDTH
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
