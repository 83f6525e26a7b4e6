#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use simscore_core::models::{
    CaseDossier, ConversationTurn, Difficulty, EvaluationMetrics, EvaluationRecord, Rating,
    SessionRef, Speaker,
};
use simscore_core::services::llm::{GenerateRequest, GenerateResponse, LlmClient, LlmError};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const FULL_EVALUATION: &str = "\
CLINICAL REASONING EVALUATION

1. History Taking: (Rating: Very Good)
Explored onset, migration and character of the pain.
2. Risk Factor Assessment: (Rating: Good)
3. Differential Diagnosis Generation: (Rating: Very Good)
4. Diagnostic Reasoning: (Rating: Excellent)
5. Clinical Decision Making: (Rating: Very Good)
6. Communication and Empathy: (Rating: Good)
7. Clinical Urgency Recognition: (Rating: Excellent)

DIAGNOSTIC ACCURACY: Reached

ANALYSIS:
A focused history led quickly to the correct diagnosis.

Overall Clinical Reasoning Score: 92%
Performance Label: Excellent
";

enum Reply {
    Text(String),
    NetworkFailure,
}

/// Completion service stand-in that returns a fixed reply and counts calls
pub struct ScriptedLlmClient {
    reply: Reply,
    calls: AtomicUsize,
}

impl ScriptedLlmClient {
    pub fn replying(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Text(text.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::NetworkFailure,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Text(text) => Ok(GenerateResponse::new(text.clone())),
            Reply::NetworkFailure => Err(LlmError::NetworkError {
                message: "connection refused".to_string(),
            }),
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> String {
        "scripted-model".to_string()
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        Ok(())
    }
}

pub fn appendicitis_case() -> CaseDossier {
    CaseDossier {
        case_id: "case-appendicitis".to_string(),
        title: Some("Right lower quadrant pain".to_string()),
        specialty: Some("General Surgery".to_string()),
        difficulty: Some(Difficulty::Intermediate),
        chief_complaint: Some("Abdominal pain for 18 hours".to_string()),
        hidden_diagnosis: Some("Acute appendicitis".to_string()),
        evaluation_criteria: Some(BTreeMap::from([
            (
                "Pain migration".to_string(),
                "Asks whether the pain started around the umbilicus".to_string(),
            ),
            (
                "Urgency".to_string(),
                "Recognises the need for surgical review".to_string(),
            ),
        ])),
        ..Default::default()
    }
}

pub fn transcript() -> Vec<ConversationTurn> {
    vec![
        ConversationTurn::new(Speaker::Clinician, "Where did the pain start?"),
        ConversationTurn::new(Speaker::Patient, "Around my belly button, then it moved."),
        ConversationTurn::new(Speaker::Clinician, "Any fever or vomiting?"),
        ConversationTurn::new(Speaker::Patient, "I was sick once this morning."),
    ]
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

/// A stored record with the given score and uniform category rating
pub fn scored_record(
    session_id: &str,
    user_id: &str,
    score: Option<u8>,
    rating: Option<Rating>,
    evaluated_at: DateTime<Utc>,
) -> EvaluationRecord {
    let session = SessionRef::new(session_id, user_id, "case-appendicitis");
    let mut metrics = EvaluationMetrics::unavailable(&session, "seeded");
    metrics.overall_score = score;
    metrics.evaluated_at = evaluated_at;
    for category in simscore_core::models::ClinicalCategory::ALL {
        metrics.category_ratings.set(category, rating);
    }

    EvaluationRecord {
        id: format!("rec-{session_id}"),
        metrics,
        specialty: Some("General Surgery".to_string()),
        difficulty: Some(Difficulty::Intermediate),
    }
}
