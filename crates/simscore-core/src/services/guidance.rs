//! Rule-based reflection prompts and study recommendations
//!
//! Both generators are deterministic: the same context always yields the
//! same list in the same order.

use serde::{Deserialize, Serialize};

use crate::models::{
    ClinicalCategory, DiagnosisAccuracy, Guidance, GuidanceKind, TrendDirection, WeakArea,
};

const MAX_WEAK_AREA_PROMPTS: usize = 2;
const MAX_WEAK_AREA_RECOMMENDATIONS: usize = 3;
const LOW_CONSISTENCY: f64 = 50.0;
const MIN_SESSIONS_FOR_CONSISTENCY: usize = 3;
const STRETCH_SCORE: u8 = 90;

/// Everything the generators look at for one finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceContext {
    pub weak_areas: Vec<WeakArea>,
    pub trend: TrendDirection,
    pub consistency_score: f64,
    pub scored_sessions: usize,
    pub latest_score: Option<u8>,
    pub diagnosis_accuracy: Option<DiagnosisAccuracy>,
    /// Sessions the user has completed on this case, including this one
    pub attempts_on_case: usize,
    pub case_title: String,
}

fn reflection_question(category: ClinicalCategory) -> &'static str {
    match category {
        ClinicalCategory::HistoryTaking => {
            "Which parts of the history did you leave unexplored, and how might they have changed your thinking?"
        }
        ClinicalCategory::RiskFactorAssessment => {
            "Which of this patient's risk factors did you identify, and which ones might you have missed?"
        }
        ClinicalCategory::DifferentialDiagnosisGeneration => {
            "What other diagnoses could explain this presentation, and why did you rule them in or out?"
        }
        ClinicalCategory::DiagnosticReasoning => {
            "Which findings most strongly supported your working diagnosis, and which ones argued against it?"
        }
        ClinicalCategory::ClinicalDecisionMaking => {
            "How did you decide on your next steps, and what would you do differently with the same information?"
        }
        ClinicalCategory::CommunicationAndEmpathy => {
            "How did the patient respond to your questions, and where could you have shown more empathy?"
        }
        ClinicalCategory::ClinicalUrgencyRecognition => {
            "At what point did you judge how urgent this case was, and which red flags informed that judgement?"
        }
    }
}

fn practice_advice(category: ClinicalCategory) -> &'static str {
    match category {
        ClinicalCategory::HistoryTaking => {
            "Practice a structured history (onset, character, timing, associated symptoms) before narrowing your questions."
        }
        ClinicalCategory::RiskFactorAssessment => {
            "Review the major risk factors for common presentations and ask about them explicitly in each case."
        }
        ClinicalCategory::DifferentialDiagnosisGeneration => {
            "List at least three differentials early in each encounter and revisit them as new findings appear."
        }
        ClinicalCategory::DiagnosticReasoning => {
            "Connect each key finding to your working diagnosis and state what would change your mind."
        }
        ClinicalCategory::ClinicalDecisionMaking => {
            "Work through management algorithms for common conditions and justify each investigation you order."
        }
        ClinicalCategory::CommunicationAndEmpathy => {
            "Use open questions, acknowledge the patient's concerns and summarise back what you have heard."
        }
        ClinicalCategory::ClinicalUrgencyRecognition => {
            "Screen for red-flag symptoms early and decide explicitly whether the patient needs urgent escalation."
        }
    }
}

pub fn reflection_prompts(ctx: &GuidanceContext) -> Vec<Guidance> {
    let mut prompts = Vec::new();

    for area in ctx.weak_areas.iter().take(MAX_WEAK_AREA_PROMPTS) {
        prompts.push(Guidance::question(
            GuidanceKind::WeakArea,
            reflection_question(area.category),
            area.label.clone(),
        ));
    }

    if ctx.attempts_on_case > 1 {
        prompts.push(Guidance::question(
            GuidanceKind::CaseComparison,
            format!(
                "You have now attempted this case {} times. What did you do differently this time, and what effect did it have?",
                ctx.attempts_on_case
            ),
            ctx.case_title.clone(),
        ));
    }

    match ctx.diagnosis_accuracy {
        Some(DiagnosisAccuracy::Missed) => prompts.push(Guidance::question(
            GuidanceKind::Diagnosis,
            "The diagnosis was missed. Which finding, had you pursued it, would have pointed you to the correct diagnosis?",
            ctx.case_title.clone(),
        )),
        Some(DiagnosisAccuracy::PartiallyReached) => prompts.push(Guidance::question(
            GuidanceKind::Diagnosis,
            "You were close to the diagnosis. What additional information would have let you commit to it?",
            ctx.case_title.clone(),
        )),
        Some(DiagnosisAccuracy::Reached) | None => {}
    }

    prompts.push(Guidance::question(
        GuidanceKind::General,
        "What is the single most important lesson you will take from this case into your next patient encounter?",
        ctx.case_title.clone(),
    ));

    prompts
}

pub fn recommendations(ctx: &GuidanceContext) -> Vec<Guidance> {
    let mut recs = Vec::new();

    if ctx.scored_sessions == 0 {
        recs.push(Guidance::message(
            GuidanceKind::General,
            "Complete more cases to unlock personalised recommendations.",
            "No scored sessions yet",
        ));
        return recs;
    }

    for area in ctx.weak_areas.iter().take(MAX_WEAK_AREA_RECOMMENDATIONS) {
        recs.push(Guidance::message(
            GuidanceKind::WeakArea,
            practice_advice(area.category),
            format!("{} (average {:.2} / 5)", area.label, area.average_points),
        ));
    }

    match ctx.trend {
        TrendDirection::Declining => recs.push(Guidance::message(
            GuidanceKind::Trend,
            "Your recent scores are lower than earlier ones. Revisit cases you found difficult and slow down your history taking.",
            "Declining trend",
        )),
        TrendDirection::Improving => recs.push(Guidance::message(
            GuidanceKind::Trend,
            "Your scores are improving. Keep the same routine and try cases in a new specialty.",
            "Improving trend",
        )),
        TrendDirection::Stable | TrendDirection::InsufficientData => {}
    }

    if ctx.scored_sessions >= MIN_SESSIONS_FOR_CONSISTENCY && ctx.consistency_score < LOW_CONSISTENCY
    {
        recs.push(Guidance::message(
            GuidanceKind::Consistency,
            "Your scores vary widely between sessions. Use the same structured approach in every encounter.",
            format!("Consistency {:.2}", ctx.consistency_score),
        ));
    }

    if ctx.weak_areas.is_empty() && ctx.latest_score.is_some_and(|s| s >= STRETCH_SCORE) {
        recs.push(Guidance::message(
            GuidanceKind::General,
            "Excellent work. Challenge yourself with Hard cases or an unfamiliar specialty.",
            "High performance",
        ));
    }

    recs
}
