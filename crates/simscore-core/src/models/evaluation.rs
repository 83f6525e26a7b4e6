use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::case::Difficulty;

/// Rating scale used for each clinical reasoning category, ordered worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    Poor,
    #[serde(rename = "Below Average")]
    BelowAverage,
    Good,
    #[serde(rename = "Very Good")]
    VeryGood,
    Excellent,
}

impl Rating {
    pub const ALL: [Rating; 5] = [
        Rating::Poor,
        Rating::BelowAverage,
        Rating::Good,
        Rating::VeryGood,
        Rating::Excellent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Poor => "Poor",
            Rating::BelowAverage => "Below Average",
            Rating::Good => "Good",
            Rating::VeryGood => "Very Good",
            Rating::Excellent => "Excellent",
        }
    }

    /// Position on the scale, 1 (Poor) through 5 (Excellent)
    pub fn points(&self) -> u8 {
        match self {
            Rating::Poor => 1,
            Rating::BelowAverage => 2,
            Rating::Good => 3,
            Rating::VeryGood => 4,
            Rating::Excellent => 5,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rating {
    type Err = String;

    /// Exact, case-sensitive match against the rating vocabulary
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rating::ALL
            .into_iter()
            .find(|rating| rating.as_str() == s)
            .ok_or_else(|| format!("Unknown rating: {s}"))
    }
}

/// Whether the clinician arrived at the hidden diagnosis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosisAccuracy {
    Reached,
    #[serde(rename = "Partially Reached")]
    PartiallyReached,
    Missed,
}

impl DiagnosisAccuracy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosisAccuracy::Reached => "Reached",
            DiagnosisAccuracy::PartiallyReached => "Partially Reached",
            DiagnosisAccuracy::Missed => "Missed",
        }
    }
}

impl fmt::Display for DiagnosisAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiagnosisAccuracy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Reached" => Ok(DiagnosisAccuracy::Reached),
            "Partially Reached" => Ok(DiagnosisAccuracy::PartiallyReached),
            "Missed" => Ok(DiagnosisAccuracy::Missed),
            _ => Err(format!("Unknown diagnosis accuracy: {s}")),
        }
    }
}

/// The seven clinical reasoning categories scored in every evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalCategory {
    HistoryTaking,
    RiskFactorAssessment,
    DifferentialDiagnosisGeneration,
    DiagnosticReasoning,
    ClinicalDecisionMaking,
    CommunicationAndEmpathy,
    ClinicalUrgencyRecognition,
}

impl ClinicalCategory {
    pub const ALL: [ClinicalCategory; 7] = [
        ClinicalCategory::HistoryTaking,
        ClinicalCategory::RiskFactorAssessment,
        ClinicalCategory::DifferentialDiagnosisGeneration,
        ClinicalCategory::DiagnosticReasoning,
        ClinicalCategory::ClinicalDecisionMaking,
        ClinicalCategory::CommunicationAndEmpathy,
        ClinicalCategory::ClinicalUrgencyRecognition,
    ];

    /// Name as it appears in evaluation text
    pub fn label(&self) -> &'static str {
        match self {
            ClinicalCategory::HistoryTaking => "History Taking",
            ClinicalCategory::RiskFactorAssessment => "Risk Factor Assessment",
            ClinicalCategory::DifferentialDiagnosisGeneration => {
                "Differential Diagnosis Generation"
            }
            ClinicalCategory::DiagnosticReasoning => "Diagnostic Reasoning",
            ClinicalCategory::ClinicalDecisionMaking => "Clinical Decision Making",
            ClinicalCategory::CommunicationAndEmpathy => "Communication and Empathy",
            ClinicalCategory::ClinicalUrgencyRecognition => "Clinical Urgency Recognition",
        }
    }

    /// Column name used by the evaluation repository
    pub fn column(&self) -> &'static str {
        match self {
            ClinicalCategory::HistoryTaking => "history_taking",
            ClinicalCategory::RiskFactorAssessment => "risk_factor_assessment",
            ClinicalCategory::DifferentialDiagnosisGeneration => {
                "differential_diagnosis_generation"
            }
            ClinicalCategory::DiagnosticReasoning => "diagnostic_reasoning",
            ClinicalCategory::ClinicalDecisionMaking => "clinical_decision_making",
            ClinicalCategory::CommunicationAndEmpathy => "communication_and_empathy",
            ClinicalCategory::ClinicalUrgencyRecognition => "clinical_urgency_recognition",
        }
    }
}

impl fmt::Display for ClinicalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One optional rating per clinical category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRatings {
    pub history_taking: Option<Rating>,
    pub risk_factor_assessment: Option<Rating>,
    pub differential_diagnosis_generation: Option<Rating>,
    pub diagnostic_reasoning: Option<Rating>,
    pub clinical_decision_making: Option<Rating>,
    pub communication_and_empathy: Option<Rating>,
    pub clinical_urgency_recognition: Option<Rating>,
}

impl CategoryRatings {
    pub fn get(&self, category: ClinicalCategory) -> Option<Rating> {
        match category {
            ClinicalCategory::HistoryTaking => self.history_taking,
            ClinicalCategory::RiskFactorAssessment => self.risk_factor_assessment,
            ClinicalCategory::DifferentialDiagnosisGeneration => {
                self.differential_diagnosis_generation
            }
            ClinicalCategory::DiagnosticReasoning => self.diagnostic_reasoning,
            ClinicalCategory::ClinicalDecisionMaking => self.clinical_decision_making,
            ClinicalCategory::CommunicationAndEmpathy => self.communication_and_empathy,
            ClinicalCategory::ClinicalUrgencyRecognition => self.clinical_urgency_recognition,
        }
    }

    pub fn set(&mut self, category: ClinicalCategory, rating: Option<Rating>) {
        let slot = match category {
            ClinicalCategory::HistoryTaking => &mut self.history_taking,
            ClinicalCategory::RiskFactorAssessment => &mut self.risk_factor_assessment,
            ClinicalCategory::DifferentialDiagnosisGeneration => {
                &mut self.differential_diagnosis_generation
            }
            ClinicalCategory::DiagnosticReasoning => &mut self.diagnostic_reasoning,
            ClinicalCategory::ClinicalDecisionMaking => &mut self.clinical_decision_making,
            ClinicalCategory::CommunicationAndEmpathy => &mut self.communication_and_empathy,
            ClinicalCategory::ClinicalUrgencyRecognition => {
                &mut self.clinical_urgency_recognition
            }
        };
        *slot = rating;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClinicalCategory, Option<Rating>)> + '_ {
        ClinicalCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    pub fn rated_count(&self) -> usize {
        self.iter().filter(|(_, rating)| rating.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.rated_count() == 0
    }
}

/// Structured metrics extracted from one session's evaluation text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub session_id: String,
    pub user_id: String,
    pub case_id: String,
    pub category_ratings: CategoryRatings,
    pub diagnosis_accuracy: Option<DiagnosisAccuracy>,
    pub overall_score: Option<u8>,
    pub performance_label: Option<String>,
    pub evaluation_summary: Option<String>,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationMetrics {
    /// An all-null record carrying only identifiers and an explanatory summary
    pub fn unavailable(session: &SessionRef, summary: impl Into<String>) -> Self {
        Self {
            session_id: session.session_id.clone(),
            user_id: session.user_id.clone(),
            case_id: session.case_id.clone(),
            category_ratings: CategoryRatings::default(),
            diagnosis_accuracy: None,
            overall_score: None,
            performance_label: None,
            evaluation_summary: Some(summary.into()),
            evaluated_at: Utc::now(),
        }
    }

    pub fn is_scored(&self) -> bool {
        self.overall_score.is_some()
    }
}

/// Identifiers of the session being evaluated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionRef {
    pub session_id: String,
    pub user_id: String,
    pub case_id: String,
}

impl SessionRef {
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        case_id: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            case_id: case_id.into(),
        }
    }
}

/// Stored evaluation together with the case context captured at session end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: String,
    #[serde(flatten)]
    pub metrics: EvaluationMetrics,
    pub specialty: Option<String>,
    pub difficulty: Option<Difficulty>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_exact_match() {
        assert_eq!("Very Good".parse::<Rating>().unwrap(), Rating::VeryGood);
        assert!("very good".parse::<Rating>().is_err());
        assert_eq!(Rating::BelowAverage.to_string(), "Below Average");
    }

    #[test]
    fn test_rating_ordering_and_points() {
        assert!(Rating::Poor < Rating::Excellent);
        assert_eq!(Rating::Good.points(), 3);
    }

    #[test]
    fn test_rating_serializes_as_label() {
        let json = serde_json::to_string(&Rating::BelowAverage).unwrap();
        assert_eq!(json, "\"Below Average\"");
    }

    #[test]
    fn test_category_ratings_get_set() {
        let mut ratings = CategoryRatings::default();
        assert!(ratings.is_empty());

        ratings.set(ClinicalCategory::DiagnosticReasoning, Some(Rating::Good));
        assert_eq!(
            ratings.get(ClinicalCategory::DiagnosticReasoning),
            Some(Rating::Good)
        );
        assert_eq!(ratings.rated_count(), 1);
    }

    #[test]
    fn test_unavailable_record_is_all_null() {
        let session = SessionRef::new("s1", "u1", "c1");
        let metrics = EvaluationMetrics::unavailable(&session, "unavailable");

        assert!(!metrics.is_scored());
        assert!(metrics.category_ratings.is_empty());
        assert!(metrics.diagnosis_accuracy.is_none());
        assert!(metrics.performance_label.is_none());
        assert_eq!(metrics.evaluation_summary.as_deref(), Some("unavailable"));
    }
}
