use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use super::extractor::extract_metrics;
use super::prompt::build_evaluation_prompt;
use crate::logging::log_performance;
use crate::models::{CaseDossier, ConversationTurn, EvaluationMetrics, SessionRef};
use crate::services::llm::{GenerateRequest, LlmClient};

pub const MISSING_CASE_DATA_TEXT: &str = "Evaluation data is missing from the case file.";
pub const SERVICE_ERROR_TEXT: &str =
    "An error occurred while generating the comprehensive evaluation.";

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 2048,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The dossier has no hidden diagnosis or no evaluation criteria
    MissingCaseData,
    /// The completion service failed or returned nothing
    ServiceError(String),
}

/// Result of evaluating one session. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    Completed {
        evaluation_text: String,
        metrics: EvaluationMetrics,
    },
    Unavailable {
        reason: UnavailableReason,
        evaluation_text: String,
        metrics: EvaluationMetrics,
    },
}

impl EvaluationOutcome {
    fn unavailable(session: &SessionRef, reason: UnavailableReason) -> Self {
        let text = match &reason {
            UnavailableReason::MissingCaseData => MISSING_CASE_DATA_TEXT,
            UnavailableReason::ServiceError(_) => SERVICE_ERROR_TEXT,
        };
        EvaluationOutcome::Unavailable {
            reason,
            evaluation_text: text.to_string(),
            metrics: EvaluationMetrics::unavailable(session, text),
        }
    }

    pub fn evaluation_text(&self) -> &str {
        match self {
            EvaluationOutcome::Completed {
                evaluation_text, ..
            }
            | EvaluationOutcome::Unavailable {
                evaluation_text, ..
            } => evaluation_text,
        }
    }

    pub fn metrics(&self) -> &EvaluationMetrics {
        match self {
            EvaluationOutcome::Completed { metrics, .. }
            | EvaluationOutcome::Unavailable { metrics, .. } => metrics,
        }
    }

    pub fn into_metrics(self) -> EvaluationMetrics {
        match self {
            EvaluationOutcome::Completed { metrics, .. }
            | EvaluationOutcome::Unavailable { metrics, .. } => metrics,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&UnavailableReason> {
        match self {
            EvaluationOutcome::Completed { .. } => None,
            EvaluationOutcome::Unavailable { reason, .. } => Some(reason),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, EvaluationOutcome::Completed { .. })
    }
}

/// Runs the evaluation prompt for a finished session and extracts metrics
pub struct SessionEvaluator {
    client: Arc<dyn LlmClient>,
    settings: EvaluatorSettings,
}

impl SessionEvaluator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self::with_settings(client, EvaluatorSettings::default())
    }

    pub fn with_settings(client: Arc<dyn LlmClient>, settings: EvaluatorSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &EvaluatorSettings {
        &self.settings
    }

    /// Evaluate one session. Makes at most one completion call and never
    /// returns an error; failures come back as `EvaluationOutcome::Unavailable`.
    pub async fn evaluate(
        &self,
        session: &SessionRef,
        case: &CaseDossier,
        transcript: &[ConversationTurn],
    ) -> EvaluationOutcome {
        if !case.is_scorable() {
            tracing::debug!(
                session_id = %session.session_id,
                case_id = %case.case_id,
                has_diagnosis = case.diagnosis().is_some(),
                has_criteria = case.criteria().is_some(),
                "Case dossier incomplete, skipping evaluation"
            );
            return EvaluationOutcome::unavailable(session, UnavailableReason::MissingCaseData);
        }

        let prompt = build_evaluation_prompt(case, transcript);
        let request = GenerateRequest::new(prompt.instruction)
            .with_system_prompt(prompt.system)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);

        let started = Instant::now();
        let result = self.client.generate(request).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let text = match result {
            Ok(response) if !response.text.trim().is_empty() => response.text,
            Ok(_) => {
                log_performance("session_evaluation", elapsed_ms, false);
                tracing::error!(
                    session_id = %session.session_id,
                    provider = self.client.provider_name(),
                    "Evaluation service returned an empty completion"
                );
                return EvaluationOutcome::unavailable(
                    session,
                    UnavailableReason::ServiceError("empty completion".to_string()),
                );
            }
            Err(e) => {
                log_performance("session_evaluation", elapsed_ms, false);
                tracing::error!(
                    session_id = %session.session_id,
                    provider = self.client.provider_name(),
                    transient = e.is_transient(),
                    error = %e,
                    "Evaluation service call failed"
                );
                return EvaluationOutcome::unavailable(
                    session,
                    UnavailableReason::ServiceError(e.to_string()),
                );
            }
        };

        log_performance("session_evaluation", elapsed_ms, true);

        let metrics = extract_metrics(&text).into_metrics(session, Utc::now());
        tracing::info!(
            session_id = %session.session_id,
            overall_score = ?metrics.overall_score,
            rated_categories = metrics.category_ratings.rated_count(),
            "Session evaluated"
        );

        EvaluationOutcome::Completed {
            evaluation_text: text,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConversationTurn, Rating, Speaker};
    use crate::services::llm::{GenerateResponse, LlmError, MockLlmClient};
    use std::collections::BTreeMap;

    fn session() -> SessionRef {
        SessionRef::new("session-1", "user-1", "case-1")
    }

    fn scorable_case() -> CaseDossier {
        CaseDossier {
            case_id: "case-1".to_string(),
            hidden_diagnosis: Some("Pulmonary embolism".to_string()),
            evaluation_criteria: Some(BTreeMap::from([(
                "Risk factors".to_string(),
                "Asks about recent travel and immobility".to_string(),
            )])),
            ..Default::default()
        }
    }

    fn transcript() -> Vec<ConversationTurn> {
        vec![
            ConversationTurn::new(Speaker::Clinician, "Any recent long flights?"),
            ConversationTurn::new(Speaker::Patient, "I flew back from Sydney last week."),
        ]
    }

    fn mock_with_provider() -> MockLlmClient {
        let mut mock = MockLlmClient::new();
        mock.expect_provider_name().return_const("mock");
        mock
    }

    fn assert_all_null(metrics: &EvaluationMetrics) {
        assert_eq!(metrics.overall_score, None);
        assert!(metrics.category_ratings.is_empty());
        assert_eq!(metrics.diagnosis_accuracy, None);
        assert_eq!(metrics.performance_label, None);
    }

    #[tokio::test]
    async fn test_missing_diagnosis_skips_the_service() {
        let mut mock = MockLlmClient::new();
        mock.expect_generate().never();

        let evaluator = SessionEvaluator::new(Arc::new(mock));
        let mut case = scorable_case();
        case.hidden_diagnosis = None;

        let outcome = evaluator.evaluate(&session(), &case, &transcript()).await;

        assert!(!outcome.is_completed());
        assert_eq!(outcome.evaluation_text(), MISSING_CASE_DATA_TEXT);
        assert_eq!(
            outcome.unavailable_reason(),
            Some(&UnavailableReason::MissingCaseData)
        );
        assert_all_null(outcome.metrics());
        assert_eq!(
            outcome.metrics().evaluation_summary.as_deref(),
            Some(MISSING_CASE_DATA_TEXT)
        );
    }

    #[tokio::test]
    async fn test_missing_criteria_skips_the_service() {
        let mut mock = MockLlmClient::new();
        mock.expect_generate().never();

        let evaluator = SessionEvaluator::new(Arc::new(mock));
        let mut case = scorable_case();
        case.evaluation_criteria = None;

        let outcome = evaluator.evaluate(&session(), &case, &transcript()).await;
        assert_eq!(outcome.evaluation_text(), MISSING_CASE_DATA_TEXT);
    }

    #[tokio::test]
    async fn test_service_failure_becomes_fallback() {
        let mut mock = mock_with_provider();
        mock.expect_generate().times(1).returning(|_| {
            Err(LlmError::NetworkError {
                message: "connection reset".to_string(),
            })
        });

        let evaluator = SessionEvaluator::new(Arc::new(mock));
        let outcome = evaluator
            .evaluate(&session(), &scorable_case(), &transcript())
            .await;

        assert_eq!(outcome.evaluation_text(), SERVICE_ERROR_TEXT);
        assert_all_null(outcome.metrics());
        match outcome.unavailable_reason() {
            Some(UnavailableReason::ServiceError(message)) => {
                assert!(message.contains("connection reset"))
            }
            other => panic!("unexpected reason: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_completion_becomes_fallback() {
        let mut mock = mock_with_provider();
        mock.expect_generate()
            .times(1)
            .returning(|_| Ok(GenerateResponse::new("  \n ")));

        let evaluator = SessionEvaluator::new(Arc::new(mock));
        let outcome = evaluator
            .evaluate(&session(), &scorable_case(), &transcript())
            .await;

        assert_eq!(outcome.evaluation_text(), SERVICE_ERROR_TEXT);
        assert_all_null(&outcome.into_metrics());
    }

    #[tokio::test]
    async fn test_success_sends_one_low_temperature_request() {
        let mut mock = MockLlmClient::new();
        mock.expect_generate()
            .times(1)
            .withf(|request| {
                request.temperature == Some(0.1)
                    && request.max_tokens == Some(2048)
                    && request
                        .system_prompt
                        .as_deref()
                        .is_some_and(|p| p.contains("Hidden diagnosis: Pulmonary embolism"))
            })
            .returning(|_| {
                Ok(GenerateResponse::new(
                    "1. History Taking: (Rating: Good)\n\
                     DIAGNOSTIC ACCURACY: Partially Reached\n\
                     Overall Clinical Reasoning Score: 74%\n\
                     Performance Label: Developing",
                ))
            });

        let evaluator = SessionEvaluator::new(Arc::new(mock));
        let outcome = evaluator
            .evaluate(&session(), &scorable_case(), &transcript())
            .await;

        assert!(outcome.is_completed());
        let metrics = outcome.metrics();
        assert_eq!(metrics.session_id, "session-1");
        assert_eq!(metrics.overall_score, Some(74));
        assert_eq!(metrics.category_ratings.history_taking, Some(Rating::Good));
        assert_eq!(metrics.category_ratings.diagnostic_reasoning, None);
        assert_eq!(metrics.performance_label.as_deref(), Some("Developing"));
    }

    #[tokio::test]
    async fn test_custom_settings_are_forwarded() {
        let mut mock = MockLlmClient::new();
        mock.expect_generate()
            .times(1)
            .withf(|request| request.temperature == Some(0.0) && request.max_tokens == Some(512))
            .returning(|_| Ok(GenerateResponse::new("Overall Clinical Reasoning Score: 50%")));

        let settings = EvaluatorSettings {
            temperature: 0.0,
            max_tokens: 512,
        };
        let evaluator = SessionEvaluator::with_settings(Arc::new(mock), settings);
        let outcome = evaluator
            .evaluate(&session(), &scorable_case(), &transcript())
            .await;

        assert_eq!(outcome.metrics().overall_score, Some(50));
    }
}
