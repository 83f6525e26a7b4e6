mod common;

use anyhow::Result;
use common::{days_ago, scored_record, FULL_EVALUATION};
use simscore_core::config::AnalyticsConfig;
use simscore_core::database::{DatabaseManager, EvaluationRepository};
use simscore_core::error::SimScoreError;
use simscore_core::models::{
    AnalyticsOptions, ClinicalCategory, Difficulty, GuidanceKind, Rating, SessionRef,
    TrendDirection,
};
use simscore_core::services::{AnalyticsService, EvaluationService, SessionEvaluator};
use std::sync::Arc;
use std::time::Duration;

async fn setup(config: AnalyticsConfig) -> Result<(AnalyticsService, EvaluationRepository, Arc<DatabaseManager>)> {
    let db = Arc::new(DatabaseManager::open_in_memory().await?);
    let repo = EvaluationRepository::new(&db);
    let service = AnalyticsService::new(db.clone(), config);
    Ok((service, repo, db))
}

fn uncached() -> AnalyticsConfig {
    AnalyticsConfig {
        cache_ttl: Duration::ZERO,
        ..AnalyticsConfig::default()
    }
}

#[tokio::test]
async fn test_performance_trends_over_history() -> Result<()> {
    let (service, repo, _db) = setup(uncached()).await?;

    let history = [
        ("s1", Some(50), Some(Rating::Poor), 30),
        ("s2", Some(50), Some(Rating::BelowAverage), 20),
        ("s3", None, None, 15),
        ("s4", Some(90), Some(Rating::Good), 10),
        ("s5", Some(90), Some(Rating::BelowAverage), 1),
    ];
    for (session, score, rating, age) in history {
        repo.create(&scored_record(session, "alice", score, rating, days_ago(age)))
            .await?;
    }

    let trends = service
        .performance_trends("alice", &AnalyticsOptions::default())
        .await?;

    assert_eq!(trends.total_sessions, 5);
    assert_eq!(trends.scored_sessions, 4);
    assert_eq!(trends.average_score, Some(70.0));
    assert_eq!(trends.latest_score, Some(90));
    assert_eq!(trends.overall_improvement, 40.0);
    assert_eq!(trends.trend, TrendDirection::Improving);
    assert_eq!(trends.consistency_score, 0.0);
    assert_eq!(trends.by_specialty.len(), 1);
    assert_eq!(trends.by_specialty[0].case_count, 4);
    assert_eq!(trends.by_difficulty[0].key, "Intermediate");
    assert_eq!(
        trends.weekly.iter().map(|w| w.case_count).sum::<usize>(),
        4
    );

    // (1 + 2 + 3 + 2) / 4 points in every category
    assert_eq!(trends.weak_areas.len(), ClinicalCategory::ALL.len());
    assert_eq!(trends.weak_areas[0].average_points, 2.0);

    Ok(())
}

#[tokio::test]
async fn test_trends_respect_filters() -> Result<()> {
    let (service, repo, _db) = setup(uncached()).await?;

    repo.create(&scored_record("old", "bob", Some(40), None, days_ago(60)))
        .await?;
    repo.create(&scored_record("recent", "bob", Some(80), None, days_ago(2)))
        .await?;
    let mut hard = scored_record("hard", "bob", Some(70), None, days_ago(3));
    hard.difficulty = Some(Difficulty::Hard);
    hard.specialty = Some("Cardiology".to_string());
    repo.create(&hard).await?;

    let recent = service
        .performance_trends("bob", &AnalyticsOptions::new().with_since_days(7))
        .await?;
    assert_eq!(recent.scored_sessions, 2);

    let cardiology = service
        .performance_trends("bob", &AnalyticsOptions::new().with_specialty("Cardiology"))
        .await?;
    assert_eq!(cardiology.scored_sessions, 1);
    assert_eq!(cardiology.average_score, Some(70.0));

    let intermediate = service
        .performance_trends(
            "bob",
            &AnalyticsOptions::new().with_difficulty(Difficulty::Intermediate),
        )
        .await?;
    assert_eq!(intermediate.scored_sessions, 2);
    assert_eq!(intermediate.average_score, Some(60.0));

    Ok(())
}

#[tokio::test]
async fn test_cached_trends_lag_new_sessions() -> Result<()> {
    let (service, repo, _db) = setup(AnalyticsConfig::default()).await?;
    let options = AnalyticsOptions::default();

    repo.create(&scored_record("c1", "carol", Some(60), None, days_ago(5)))
        .await?;
    let first = service.performance_trends("carol", &options).await?;
    assert_eq!(first.scored_sessions, 1);

    repo.create(&scored_record("c2", "carol", Some(80), None, days_ago(1)))
        .await?;
    let cached = service.performance_trends("carol", &options).await?;
    assert_eq!(cached, first);

    let other_options = AnalyticsOptions::new().with_since_days(30);
    let fresh = service.performance_trends("carol", &other_options).await?;
    assert_eq!(fresh.scored_sessions, 2);

    assert_eq!(service.purge_cache().await, 0);

    Ok(())
}

#[tokio::test]
async fn test_compare_with_peers() -> Result<()> {
    let (service, repo, _db) = setup(uncached()).await?;

    for (user, score) in [("p1", 60), ("p2", 70), ("p3", 80), ("p4", 90), ("me", 75)] {
        repo.create(&scored_record(
            &format!("{user}-s"),
            user,
            Some(score),
            None,
            days_ago(3),
        ))
        .await?;
    }
    // outside the default 90 day window
    repo.create(&scored_record("p5-old", "p5", Some(10), None, days_ago(200)))
        .await?;
    // unscored sessions never count
    repo.create(&scored_record("p6-fallback", "p6", None, None, days_ago(1)))
        .await?;

    let comparison = service
        .compare_with_peers("me", None)
        .await?
        .expect("user has scored sessions");

    assert_eq!(comparison.cohort_size, 4);
    assert_eq!(comparison.peers_below, 2);
    assert_eq!(comparison.percentile, 50.0);
    assert_eq!(comparison.rank, 3);
    assert_eq!(comparison.user_average, 75.0);
    assert!(!comparison.is_reliable);

    assert!(service.compare_with_peers("nobody", None).await?.is_none());

    let other_specialty = service
        .compare_with_peers("me", Some("Cardiology"))
        .await?;
    assert!(other_specialty.is_none());

    Ok(())
}

#[tokio::test]
async fn test_session_guidance_for_repeat_attempt() -> Result<()> {
    let (service, _repo, db) = setup(uncached()).await?;
    let evaluations = EvaluationService::new(
        db.clone(),
        SessionEvaluator::new(common::ScriptedLlmClient::replying(
            FULL_EVALUATION.replace("DIAGNOSTIC ACCURACY: Reached", "DIAGNOSTIC ACCURACY: Missed"),
        )),
    );

    let case = common::appendicitis_case();
    for session_id in ["g1", "g2"] {
        let session = SessionRef::new(session_id, "dana", &case.case_id);
        evaluations
            .complete_session(&session, &case, &common::transcript())
            .await?;
    }

    let guidance = service.session_guidance("g2").await?;
    let kinds: Vec<_> = guidance.reflection_prompts.iter().map(|g| g.kind).collect();

    assert_eq!(
        kinds,
        vec![
            GuidanceKind::CaseComparison,
            GuidanceKind::Diagnosis,
            GuidanceKind::General
        ]
    );
    assert!(guidance.reflection_prompts[0].text().contains("2 times"));
    assert_eq!(guidance.reflection_prompts[0].context, "case-appendicitis");

    // 92 with no weak areas
    assert_eq!(guidance.recommendations.len(), 1);
    assert_eq!(guidance.recommendations[0].kind, GuidanceKind::General);

    Ok(())
}

#[tokio::test]
async fn test_session_guidance_unknown_session() -> Result<()> {
    let (service, _repo, _db) = setup(uncached()).await?;

    let err = service
        .session_guidance("missing")
        .await
        .expect_err("unknown session");
    assert!(matches!(
        err.downcast_ref::<SimScoreError>(),
        Some(SimScoreError::NotFound { .. })
    ));

    Ok(())
}
