//! Features command

use crate::output::{print_features, OutputFormat};
use sase_phish::extract_features;

pub fn handle(url: &str, format: OutputFormat) -> anyhow::Result<()> {
    let features = extract_features(url);
    match format {
        OutputFormat::Table => print_features(url, &features),
        _ => format.print(&features)?,
    }
    Ok(())
}
