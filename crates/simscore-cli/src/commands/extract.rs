use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use simscore_core::services::extract_metrics;

use super::evaluate::print_metrics;
use super::print_json;

pub fn handle_extract_command(file: PathBuf, json: bool) -> Result<()> {
    let text = fs::read_to_string(&file)
        .with_context(|| format!("Failed to read evaluation file: {}", file.display()))?;

    let metrics = extract_metrics(&text);
    tracing::debug!(
        rated_categories = metrics.category_ratings.rated_count(),
        "Extracted metrics"
    );

    if json {
        print_json(&metrics)
    } else {
        print_metrics(&metrics);
        Ok(())
    }
}
