use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::evaluation::{SessionEvaluator, UnavailableReason};
use crate::database::{DatabaseManager, EvaluationRepository};
use crate::models::{CaseDossier, ConversationTurn, EvaluationRecord, SessionRef};

/// A stored evaluation together with the raw text shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEvaluation {
    pub record: EvaluationRecord,
    pub evaluation_text: String,
    pub unavailable_reason: Option<UnavailableReason>,
}

impl SessionEvaluation {
    pub fn is_scored(&self) -> bool {
        self.record.metrics.is_scored()
    }
}

/// Evaluates finished sessions and appends the result to the store
pub struct EvaluationService {
    evaluator: SessionEvaluator,
    repository: EvaluationRepository,
}

impl EvaluationService {
    pub fn new(db_manager: Arc<DatabaseManager>, evaluator: SessionEvaluator) -> Self {
        Self {
            evaluator,
            repository: EvaluationRepository::new(&db_manager),
        }
    }

    /// Evaluate a session and persist the record, including fallback records.
    ///
    /// Only storage failures are returned as errors.
    pub async fn complete_session(
        &self,
        session: &SessionRef,
        case: &CaseDossier,
        transcript: &[ConversationTurn],
    ) -> Result<SessionEvaluation> {
        tracing::info!(
            session_id = %session.session_id,
            case_id = %session.case_id,
            turns = transcript.len(),
            "Completing session"
        );

        let outcome = self.evaluator.evaluate(session, case, transcript).await;
        let evaluation_text = outcome.evaluation_text().to_string();
        let unavailable_reason = outcome.unavailable_reason().cloned();

        let record = EvaluationRecord {
            id: Uuid::new_v4().to_string(),
            metrics: outcome.into_metrics(),
            specialty: case.specialty.clone(),
            difficulty: case.difficulty,
        };

        self.repository
            .create(&record)
            .await
            .with_context(|| format!("Failed to store evaluation for session {}", session.session_id))?;

        Ok(SessionEvaluation {
            record,
            evaluation_text,
            unavailable_reason,
        })
    }

    pub async fn get_evaluation(&self, session_id: &str) -> Result<Option<EvaluationRecord>> {
        self.repository.get_by_session(session_id).await
    }
}
