//! phishscan
//!
//! Command-line front end for the SASE URL phishing classifier.
//!
//! # Usage
//!
//! ```bash
//! phishscan train --dataset urls.json
//! phishscan predict http://paypal-security-update.com/login.php
//! phishscan predict https://www.amazon.com/gp/buy.html --format json
//! phishscan features "http://bit.ly/abc?x=1"
//! phishscan inspect --model /var/lib/phishscan/phishing_model.json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "phishscan")]
#[command(author = "OpenSASE")]
#[command(version)]
#[command(about = "Lexical phishing URL classifier", long_about = None)]
struct Cli {
    /// Model artifact path
    #[arg(long, global = true, env = "PHISHSCAN_MODEL")]
    model: Option<PathBuf>,

    /// Config file (defaults to ~/.phishscan/config.toml)
    #[arg(long, global = true, env = "PHISHSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true)]
    format: Option<output::OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a classifier and report holdout accuracy
    Train {
        /// JSON dataset of {"url", "label"} records (built-in corpus if omitted)
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Do not write the model artifact
        #[arg(long)]
        no_save: bool,
    },
    /// Classify URLs, training a model first if none is saved
    Predict {
        #[arg(required = true)]
        urls: Vec<String>,
        /// Dataset for training and feature statistics
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Show the raw feature vector of a URL
    Features { url: String },
    /// Show the saved model's schema and size
    Inspect,
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::Config::load(cli.config.as_deref())?;
    let format = match cli.format {
        Some(format) => format,
        None => config.default_format()?,
    };
    let detector = config.detector_config(cli.model);

    match cli.command {
        Commands::Train { dataset, no_save } => {
            let dataset = config.dataset(dataset.as_deref())?;
            commands::train::handle(&detector, &dataset, !no_save, format)
        }
        Commands::Predict { urls, dataset } => {
            let dataset = config.dataset(dataset.as_deref())?;
            commands::predict::handle(&detector, &dataset, &urls, format)
        }
        Commands::Features { url } => commands::features::handle(&url, format),
        Commands::Inspect => commands::inspect::handle(&detector, format),
    }
}
