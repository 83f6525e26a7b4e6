pub mod aggregation;
pub mod analytics_service;
pub mod cache;
pub mod evaluation;
pub mod evaluation_service;
pub mod google_ai;
pub mod guidance;
pub mod llm;
pub mod peer_comparison;

pub use aggregation::{round2, summarize};
pub use analytics_service::AnalyticsService;
pub use cache::TtlCache;
pub use evaluation::{
    extract_metrics, EvaluationOutcome, EvaluatorSettings, ExtractedMetrics, SessionEvaluator,
    UnavailableReason,
};
pub use evaluation_service::{EvaluationService, SessionEvaluation};
pub use google_ai::{GoogleAiClient, GoogleAiConfig, GoogleAiError};
pub use guidance::{recommendations, reflection_prompts, GuidanceContext};
pub use llm::{LlmClient, LlmClientFactory, LlmConfig, LlmError};
pub use peer_comparison::compare_with_cohort;
