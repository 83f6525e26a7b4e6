use serde::{Deserialize, Serialize};
use std::fmt;

use super::case::Difficulty;
use super::evaluation::ClinicalCategory;

/// Filters applied to a user's evaluation history before aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalyticsOptions {
    /// Rolling window in days, counted back from now
    pub since_days: Option<u32>,
    pub specialty: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl AnalyticsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_since_days(mut self, days: u32) -> Self {
        self.since_days = Some(days);
        self
    }

    pub fn with_specialty(mut self, specialty: impl Into<String>) -> Self {
        self.specialty = Some(specialty.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }
}

/// Sessions grouped by ISO week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub iso_year: i32,
    pub iso_week: u32,
    /// `YYYY-Www`, e.g. `2024-W07`
    pub label: String,
    pub case_count: usize,
    pub average_score: f64,
}

/// Sessions grouped by specialty or difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendBucket {
    pub key: String,
    pub case_count: usize,
    pub average_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
    InsufficientData,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Stable => "stable",
            TrendDirection::Declining => "declining",
            TrendDirection::InsufficientData => "insufficient data",
        };
        f.write_str(text)
    }
}

/// A clinical category where the user rates below "Good" on average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeakArea {
    pub category: ClinicalCategory,
    pub label: String,
    /// Mean rating points, 1.0 (Poor) to 5.0 (Excellent)
    pub average_points: f64,
    pub rated_sessions: usize,
}

/// Aggregated view over a user's evaluation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTrends {
    pub total_sessions: usize,
    pub scored_sessions: usize,
    pub average_score: Option<f64>,
    pub latest_score: Option<u8>,
    pub weekly: Vec<WeeklyBucket>,
    pub by_specialty: Vec<TrendBucket>,
    pub by_difficulty: Vec<TrendBucket>,
    pub overall_improvement: f64,
    pub consistency_score: f64,
    pub trend: TrendDirection,
    pub weak_areas: Vec<WeakArea>,
}

/// Mean score of one peer over the cohort window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerAverage {
    pub user_id: String,
    pub average_score: f64,
    pub session_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerComparison {
    pub user_average: f64,
    pub cohort_size: usize,
    pub peers_below: usize,
    /// 1 plus the number of peers with a strictly higher average
    pub rank: usize,
    pub percentile: f64,
    pub cohort_average: Option<f64>,
    /// False when the cohort is smaller than the configured minimum
    pub is_reliable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceKind {
    WeakArea,
    CaseComparison,
    Diagnosis,
    Trend,
    Consistency,
    General,
}

/// Reflection prompts carry a question, recommendations carry a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidanceBody {
    Question(String),
    Message(String),
}

/// One reflection prompt or recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guidance {
    #[serde(rename = "type")]
    pub kind: GuidanceKind,
    #[serde(flatten)]
    pub body: GuidanceBody,
    pub context: String,
}

impl Guidance {
    pub fn question(kind: GuidanceKind, question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            kind,
            body: GuidanceBody::Question(question.into()),
            context: context.into(),
        }
    }

    pub fn message(kind: GuidanceKind, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            kind,
            body: GuidanceBody::Message(message.into()),
            context: context.into(),
        }
    }

    pub fn text(&self) -> &str {
        match &self.body {
            GuidanceBody::Question(text) | GuidanceBody::Message(text) => text,
        }
    }
}

/// Post-session guidance returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGuidance {
    pub reflection_prompts: Vec<Guidance>,
    pub recommendations: Vec<Guidance>,
}
