use anyhow::Result;
use std::sync::Arc;

use super::aggregation::summarize;
use super::cache::TtlCache;
use super::guidance::{reflection_prompts, recommendations, GuidanceContext};
use super::peer_comparison::{compare_with_cohort, partition_cohort};
use crate::config::AnalyticsConfig;
use crate::database::{window_start, DatabaseManager, EvaluationRepository};
use crate::error::SimScoreError;
use crate::models::{
    AnalyticsOptions, PeerComparison, PerformanceTrends, SessionGuidance, WeakArea,
};

type TrendsKey = (String, AnalyticsOptions);

/// Read-side analytics over stored evaluations.
///
/// `performance_trends` results are cached per `(user_id, options)` for the
/// configured TTL. New evaluations do not invalidate warm entries.
pub struct AnalyticsService {
    repository: EvaluationRepository,
    config: AnalyticsConfig,
    trends_cache: TtlCache<TrendsKey, PerformanceTrends>,
}

impl AnalyticsService {
    pub fn new(db_manager: Arc<DatabaseManager>, config: AnalyticsConfig) -> Self {
        Self {
            repository: EvaluationRepository::new(&db_manager),
            trends_cache: TtlCache::new(config.cache_ttl),
            config,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub async fn performance_trends(
        &self,
        user_id: &str,
        options: &AnalyticsOptions,
    ) -> Result<PerformanceTrends> {
        let key = (user_id.to_string(), options.clone());
        if let Some(cached) = self.trends_cache.get(&key).await {
            tracing::debug!(user_id = %user_id, "Serving performance trends from cache");
            return Ok(cached);
        }

        let records = self.repository.list_for_user(user_id, options).await?;
        let trends = summarize(&records);

        tracing::info!(
            user_id = %user_id,
            sessions = trends.total_sessions,
            scored = trends.scored_sessions,
            "Computed performance trends"
        );

        self.trends_cache.insert(key, trends.clone()).await;
        Ok(trends)
    }

    pub async fn weak_areas(
        &self,
        user_id: &str,
        options: &AnalyticsOptions,
    ) -> Result<Vec<WeakArea>> {
        Ok(self.performance_trends(user_id, options).await?.weak_areas)
    }

    /// Compare a user's mean score with other users over the peer window.
    ///
    /// Returns `None` when the user has no scored session in the window.
    pub async fn compare_with_peers(
        &self,
        user_id: &str,
        specialty: Option<&str>,
    ) -> Result<Option<PeerComparison>> {
        let since = window_start(self.config.peer_window_days);
        let averages = self.repository.score_averages(specialty, since).await?;

        let (user_average, peers) = partition_cohort(&averages, user_id);
        let Some(user_average) = user_average else {
            tracing::debug!(user_id = %user_id, "No scored sessions in peer window");
            return Ok(None);
        };

        let comparison = compare_with_cohort(user_average, &peers, self.config.min_cohort_size);
        if !comparison.is_reliable {
            tracing::warn!(
                user_id = %user_id,
                cohort_size = comparison.cohort_size,
                min_cohort_size = self.config.min_cohort_size,
                "Peer cohort is below the minimum size"
            );
        }

        Ok(Some(comparison))
    }

    /// Reflection prompts and recommendations for a finished session
    pub async fn session_guidance(&self, session_id: &str) -> Result<SessionGuidance> {
        let record = self
            .repository
            .get_by_session(session_id)
            .await?
            .ok_or_else(|| SimScoreError::not_found(format!("session evaluation {session_id}")))?;

        let metrics = &record.metrics;
        let trends = self
            .performance_trends(&metrics.user_id, &AnalyticsOptions::default())
            .await?;
        let attempts_on_case = self
            .repository
            .count_attempts(&metrics.user_id, &metrics.case_id)
            .await?;

        let ctx = GuidanceContext {
            weak_areas: trends.weak_areas,
            trend: trends.trend,
            consistency_score: trends.consistency_score,
            scored_sessions: trends.scored_sessions,
            latest_score: trends.latest_score,
            diagnosis_accuracy: metrics.diagnosis_accuracy,
            attempts_on_case,
            case_title: metrics.case_id.clone(),
        };

        Ok(SessionGuidance {
            reflection_prompts: reflection_prompts(&ctx),
            recommendations: recommendations(&ctx),
        })
    }

    /// Drop expired trend entries, returning how many were removed
    pub async fn purge_cache(&self) -> usize {
        self.trends_cache.purge_expired().await
    }
}
