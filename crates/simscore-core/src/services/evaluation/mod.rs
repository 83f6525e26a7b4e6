//! Session evaluation: prompt construction, the completion call and metric extraction

pub mod extractor;
pub mod orchestrator;
pub mod prompt;

pub use extractor::{extract_metrics, truncate_chars, ExtractedMetrics, SUMMARY_MAX_CHARS};
pub use orchestrator::{
    EvaluationOutcome, EvaluatorSettings, SessionEvaluator, UnavailableReason,
    MISSING_CASE_DATA_TEXT, SERVICE_ERROR_TEXT,
};
pub use prompt::{build_evaluation_prompt, EvaluationPrompt};
