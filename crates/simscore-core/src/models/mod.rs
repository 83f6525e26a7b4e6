pub mod analytics;
pub mod case;
pub mod conversation;
pub mod evaluation;

pub use analytics::{
    AnalyticsOptions, Guidance, GuidanceBody, GuidanceKind, PeerAverage, PeerComparison,
    PerformanceTrends, SessionGuidance, TrendBucket, TrendDirection, WeakArea, WeeklyBucket,
};
pub use case::{CaseDossier, Demographics, Difficulty};
pub use conversation::{format_transcript, ConversationTurn, Speaker};
pub use evaluation::{
    CategoryRatings, ClinicalCategory, DiagnosisAccuracy, EvaluationMetrics, EvaluationRecord,
    Rating, SessionRef,
};
