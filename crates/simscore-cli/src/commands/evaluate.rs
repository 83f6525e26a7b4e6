use anyhow::{Context, Result};
use console::style;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use simscore_core::config::Config;
use simscore_core::models::{CaseDossier, ConversationTurn, EvaluationMetrics, SessionRef};
use simscore_core::services::{
    EvaluationService, ExtractedMetrics, LlmClientFactory, SessionEvaluator,
};

use super::{open_database, print_json};

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {what} file: {}", path.display()))
}

pub async fn handle_evaluate_command(
    case_path: PathBuf,
    transcript_path: PathBuf,
    user_id: String,
    session_id: Option<String>,
    json: bool,
) -> Result<()> {
    let case: CaseDossier = read_json(&case_path, "case")?;
    let transcript: Vec<ConversationTurn> = read_json(&transcript_path, "transcript")?;

    let config = Config::load()?;
    let client = LlmClientFactory::from_config(&config)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    tracing::info!(
        provider = client.provider_name(),
        model = %client.model_name(),
        "Using completion service"
    );

    let db_manager = open_database().await?;
    let service = EvaluationService::new(db_manager, SessionEvaluator::new(client));

    let session = SessionRef::new(
        session_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        user_id,
        case.case_id.clone(),
    );

    let evaluation = service
        .complete_session(&session, &case, &transcript)
        .await?;

    if json {
        return print_json(&evaluation);
    }

    println!(
        "{} {}",
        style("Session").bold(),
        style(&session.session_id).cyan()
    );
    if let Some(reason) = &evaluation.unavailable_reason {
        println!(
            "{} {}",
            style("Evaluation unavailable:").yellow().bold(),
            evaluation.evaluation_text
        );
        tracing::debug!(?reason, "Stored fallback evaluation");
        return Ok(());
    }

    print_metrics(&extracted_fields(&evaluation.record.metrics));
    Ok(())
}

/// The extracted fields of a stored evaluation
pub fn extracted_fields(metrics: &EvaluationMetrics) -> ExtractedMetrics {
    ExtractedMetrics {
        category_ratings: metrics.category_ratings.clone(),
        diagnosis_accuracy: metrics.diagnosis_accuracy,
        overall_score: metrics.overall_score,
        performance_label: metrics.performance_label.clone(),
        evaluation_summary: metrics.evaluation_summary.clone(),
    }
}

/// Human-readable rendering shared by `evaluate`, `extract` and `show`
pub fn print_metrics(metrics: &ExtractedMetrics) {
    match metrics.overall_score {
        Some(score) => println!(
            "  Overall score: {}",
            style(format!("{score}%")).green().bold()
        ),
        None => println!("  Overall score: {}", style("not available").dim()),
    }
    if let Some(label) = &metrics.performance_label {
        println!("  Performance:   {label}");
    }
    if let Some(accuracy) = metrics.diagnosis_accuracy {
        println!("  Diagnosis:     {accuracy}");
    }

    println!();
    for (category, rating) in metrics.category_ratings.iter() {
        let shown = rating
            .map(|r| style(r.to_string()).cyan())
            .unwrap_or_else(|| style("-".to_string()).dim());
        println!("  {:<36} {}", category.label(), shown);
    }

    if let Some(summary) = &metrics.evaluation_summary {
        println!();
        println!("{}", style("Summary").bold());
        println!("  {summary}");
    }
}
