use anyhow::{Context, Result as AnyhowResult};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use sqlx::{Pool, Row, Sqlite};

use super::connection::DatabaseManager;
use crate::error::SimScoreError;
use crate::models::{
    AnalyticsOptions, CategoryRatings, ClinicalCategory, DiagnosisAccuracy, Difficulty,
    EvaluationMetrics, EvaluationRecord, PeerAverage, Rating,
};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, session_id, user_id, case_id, specialty, difficulty,
        history_taking, risk_factor_assessment, differential_diagnosis_generation,
        diagnostic_reasoning, clinical_decision_making, communication_and_empathy,
        clinical_urgency_recognition,
        diagnosis_accuracy, overall_score, performance_label, evaluation_summary,
        evaluated_at
    FROM session_evaluations
"#;

/// Fixed-width RFC 3339 so stored timestamps compare correctly as strings
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Start of a rolling window of `days` ending now.
///
/// Windows reaching past the representable range start at the Unix epoch.
pub fn window_start(days: u32) -> DateTime<Utc> {
    let epoch = DateTime::<Utc>::UNIX_EPOCH;
    Utc::now()
        .checked_sub_signed(Duration::days(i64::from(days)))
        .map_or(epoch, |start| start.max(epoch))
}

pub struct EvaluationRepository {
    pool: Pool<Sqlite>,
}

impl EvaluationRepository {
    pub fn new(db: &DatabaseManager) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Append an evaluation. A session can only be evaluated once.
    pub async fn create(&self, record: &EvaluationRecord) -> AnyhowResult<String> {
        let metrics = &record.metrics;
        let ratings = &metrics.category_ratings;
        let rating_str = |category| ratings.get(category).map(|r: Rating| r.as_str());

        let result = sqlx::query(
            r#"
            INSERT INTO session_evaluations (
                id, session_id, user_id, case_id, specialty, difficulty,
                history_taking, risk_factor_assessment, differential_diagnosis_generation,
                diagnostic_reasoning, clinical_decision_making, communication_and_empathy,
                clinical_urgency_recognition,
                diagnosis_accuracy, overall_score, performance_label, evaluation_summary,
                evaluated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&metrics.session_id)
        .bind(&metrics.user_id)
        .bind(&metrics.case_id)
        .bind(&record.specialty)
        .bind(record.difficulty.map(|d| d.as_str()))
        .bind(rating_str(ClinicalCategory::HistoryTaking))
        .bind(rating_str(ClinicalCategory::RiskFactorAssessment))
        .bind(rating_str(ClinicalCategory::DifferentialDiagnosisGeneration))
        .bind(rating_str(ClinicalCategory::DiagnosticReasoning))
        .bind(rating_str(ClinicalCategory::ClinicalDecisionMaking))
        .bind(rating_str(ClinicalCategory::CommunicationAndEmpathy))
        .bind(rating_str(ClinicalCategory::ClinicalUrgencyRecognition))
        .bind(metrics.diagnosis_accuracy.map(|d| d.as_str()))
        .bind(metrics.overall_score.map(i64::from))
        .bind(&metrics.performance_label)
        .bind(&metrics.evaluation_summary)
        .bind(format_timestamp(&metrics.evaluated_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(record.id.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(SimScoreError::already_exists(format!(
                    "evaluation for session {}",
                    metrics.session_id
                ))
                .into())
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to insert session evaluation")),
        }
    }

    pub async fn get_by_session(&self, session_id: &str) -> AnyhowResult<Option<EvaluationRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE session_id = ?");
        let row = sqlx::query(&sql)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch session evaluation")?;

        row.map(|r| Self::row_to_record(&r)).transpose()
    }

    /// A user's evaluations matching `options`, oldest first
    pub async fn list_for_user(
        &self,
        user_id: &str,
        options: &AnalyticsOptions,
    ) -> AnyhowResult<Vec<EvaluationRecord>> {
        let mut sql = format!("{SELECT_COLUMNS} WHERE user_id = ?");
        let mut params = vec![user_id.to_string()];

        if let Some(days) = options.since_days {
            sql.push_str(" AND evaluated_at >= ?");
            params.push(format_timestamp(&window_start(days)));
        }

        if let Some(specialty) = &options.specialty {
            sql.push_str(" AND specialty = ?");
            params.push(specialty.clone());
        }

        if let Some(difficulty) = options.difficulty {
            sql.push_str(" AND difficulty = ?");
            params.push(difficulty.as_str().to_string());
        }

        sql.push_str(" ORDER BY evaluated_at ASC, id ASC");

        let mut query = sqlx::query(&sql);
        for param in &params {
            query = query.bind(param);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list session evaluations")?;

        rows.iter().map(Self::row_to_record).collect()
    }

    /// Number of evaluated sessions a user has on one case
    pub async fn count_attempts(&self, user_id: &str, case_id: &str) -> AnyhowResult<usize> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM session_evaluations WHERE user_id = ? AND case_id = ?",
        )
        .bind(user_id)
        .bind(case_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count case attempts")?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Mean scored result per user since `since`, optionally within one specialty
    pub async fn score_averages(
        &self,
        specialty: Option<&str>,
        since: DateTime<Utc>,
    ) -> AnyhowResult<Vec<PeerAverage>> {
        let mut sql = r#"
            SELECT user_id, AVG(overall_score) AS average_score, COUNT(*) AS session_count
            FROM session_evaluations
            WHERE overall_score IS NOT NULL AND evaluated_at >= ?
        "#
        .to_string();
        let mut params = vec![format_timestamp(&since)];

        if let Some(specialty) = specialty {
            sql.push_str(" AND specialty = ?");
            params.push(specialty.to_string());
        }

        sql.push_str(" GROUP BY user_id ORDER BY average_score DESC, user_id ASC");

        let mut query = sqlx::query(&sql);
        for param in &params {
            query = query.bind(param);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to aggregate peer averages")?;

        rows.iter()
            .map(|row| -> AnyhowResult<PeerAverage> {
                let session_count: i64 = row.try_get("session_count")?;
                Ok(PeerAverage {
                    user_id: row.try_get("user_id")?,
                    average_score: row.try_get("average_score")?,
                    session_count: usize::try_from(session_count).unwrap_or(0),
                })
            })
            .collect()
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> AnyhowResult<EvaluationRecord> {
        let evaluated_at_str: String = row.get("evaluated_at");
        let evaluated_at = DateTime::parse_from_rfc3339(&evaluated_at_str)
            .with_context(|| format!("Invalid evaluated_at timestamp: {evaluated_at_str}"))?
            .with_timezone(&Utc);

        let mut category_ratings = CategoryRatings::default();
        for category in ClinicalCategory::ALL {
            let value: Option<String> = row.get(category.column());
            category_ratings.set(category, value.and_then(|v| v.parse::<Rating>().ok()));
        }

        let diagnosis_accuracy: Option<String> = row.get("diagnosis_accuracy");
        let difficulty: Option<String> = row.get("difficulty");
        let overall_score: Option<i64> = row.get("overall_score");

        Ok(EvaluationRecord {
            id: row.get("id"),
            metrics: EvaluationMetrics {
                session_id: row.get("session_id"),
                user_id: row.get("user_id"),
                case_id: row.get("case_id"),
                category_ratings,
                diagnosis_accuracy: diagnosis_accuracy
                    .and_then(|v| v.parse::<DiagnosisAccuracy>().ok()),
                overall_score: overall_score.and_then(|s| u8::try_from(s).ok()),
                performance_label: row.get("performance_label"),
                evaluation_summary: row.get("evaluation_summary"),
                evaluated_at,
            },
            specialty: row.get("specialty"),
            difficulty: difficulty.and_then(|v| v.parse::<Difficulty>().ok()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionRef;

    fn record(session: &str, user: &str, score: Option<u8>, days_ago: i64) -> EvaluationRecord {
        let session_ref = SessionRef::new(session, user, "case-1");
        let mut metrics = EvaluationMetrics::unavailable(&session_ref, "summary");
        metrics.overall_score = score;
        metrics.evaluated_at = Utc::now() - Duration::days(days_ago);
        if score.is_some() {
            metrics
                .category_ratings
                .set(ClinicalCategory::HistoryTaking, Some(Rating::VeryGood));
            metrics.diagnosis_accuracy = Some(DiagnosisAccuracy::PartiallyReached);
            metrics.performance_label = Some("Proficient".to_string());
        }
        EvaluationRecord {
            id: format!("eval-{session}"),
            metrics,
            specialty: Some("Cardiology".to_string()),
            difficulty: Some(Difficulty::Intermediate),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_by_session() {
        let db = DatabaseManager::open_in_memory().await.unwrap();
        let repo = EvaluationRepository::new(&db);

        let rec = record("s1", "u1", Some(84), 1);
        repo.create(&rec).await.unwrap();

        let fetched = repo.get_by_session("s1").await.unwrap().unwrap();
        assert_eq!(fetched.metrics.overall_score, Some(84));
        assert_eq!(
            fetched
                .metrics
                .category_ratings
                .get(ClinicalCategory::HistoryTaking),
            Some(Rating::VeryGood)
        );
        assert_eq!(
            fetched.metrics.diagnosis_accuracy,
            Some(DiagnosisAccuracy::PartiallyReached)
        );
        assert_eq!(fetched.difficulty, Some(Difficulty::Intermediate));
        assert_eq!(
            format_timestamp(&fetched.metrics.evaluated_at),
            format_timestamp(&rec.metrics.evaluated_at)
        );

        assert!(repo.get_by_session("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_session_is_rejected() {
        let db = DatabaseManager::open_in_memory().await.unwrap();
        let repo = EvaluationRepository::new(&db);

        repo.create(&record("s1", "u1", Some(70), 1)).await.unwrap();

        let mut again = record("s1", "u1", Some(90), 0);
        again.id = "eval-other".to_string();
        let err = repo.create(&again).await.unwrap_err();
        let err = SimScoreError::from(err);
        assert!(matches!(err, SimScoreError::AlreadyExists { .. }));

        let stored = repo.get_by_session("s1").await.unwrap().unwrap();
        assert_eq!(stored.metrics.overall_score, Some(70));
    }

    #[tokio::test]
    async fn test_list_for_user_filters_and_orders() {
        let db = DatabaseManager::open_in_memory().await.unwrap();
        let repo = EvaluationRepository::new(&db);

        repo.create(&record("recent", "u1", Some(80), 2)).await.unwrap();
        repo.create(&record("old", "u1", Some(60), 120)).await.unwrap();
        repo.create(&record("other", "u2", Some(99), 1)).await.unwrap();

        let mut hard = record("hard", "u1", Some(50), 5);
        hard.difficulty = Some(Difficulty::Hard);
        repo.create(&hard).await.unwrap();

        let all = repo
            .list_for_user("u1", &AnalyticsOptions::default())
            .await
            .unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.metrics.session_id.as_str()).collect();
        assert_eq!(ids, vec!["old", "hard", "recent"]);

        let windowed = repo
            .list_for_user("u1", &AnalyticsOptions::new().with_since_days(30))
            .await
            .unwrap();
        assert_eq!(windowed.len(), 2);

        let hard_only = repo
            .list_for_user(
                "u1",
                &AnalyticsOptions::new().with_difficulty(Difficulty::Hard),
            )
            .await
            .unwrap();
        assert_eq!(hard_only.len(), 1);
        assert_eq!(hard_only[0].metrics.session_id, "hard");

        let other_specialty = repo
            .list_for_user("u1", &AnalyticsOptions::new().with_specialty("Neurology"))
            .await
            .unwrap();
        assert!(other_specialty.is_empty());
    }

    #[test]
    fn test_window_start_saturates_for_huge_windows() {
        assert_eq!(window_start(u32::MAX), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(window_start(100_000_000), DateTime::<Utc>::UNIX_EPOCH);

        let recent = window_start(7);
        assert!(recent < Utc::now());
        assert!(recent > Utc::now() - Duration::days(8));
    }

    #[tokio::test]
    async fn test_huge_since_days_includes_full_history() {
        let db = DatabaseManager::open_in_memory().await.unwrap();
        let repo = EvaluationRepository::new(&db);

        repo.create(&record("recent", "u1", Some(80), 2)).await.unwrap();
        repo.create(&record("ancient", "u1", Some(60), 3000)).await.unwrap();

        let all = repo
            .list_for_user("u1", &AnalyticsOptions::new().with_since_days(100_000_000))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let averages = repo.score_averages(None, window_start(u32::MAX)).await.unwrap();
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].average_score, 70.0);
    }

    #[tokio::test]
    async fn test_score_averages_group_by_user() {
        let db = DatabaseManager::open_in_memory().await.unwrap();
        let repo = EvaluationRepository::new(&db);

        repo.create(&record("a1", "alice", Some(60), 1)).await.unwrap();
        repo.create(&record("a2", "alice", Some(80), 2)).await.unwrap();
        repo.create(&record("b1", "bob", Some(90), 3)).await.unwrap();
        repo.create(&record("b2", "bob", None, 3)).await.unwrap();
        repo.create(&record("c1", "carol", Some(40), 200)).await.unwrap();

        let averages = repo
            .score_averages(Some("Cardiology"), window_start(90))
            .await
            .unwrap();

        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].user_id, "bob");
        assert_eq!(averages[0].average_score, 90.0);
        assert_eq!(averages[0].session_count, 1);
        assert_eq!(averages[1].user_id, "alice");
        assert_eq!(averages[1].average_score, 70.0);
    }

    #[tokio::test]
    async fn test_count_attempts() {
        let db = DatabaseManager::open_in_memory().await.unwrap();
        let repo = EvaluationRepository::new(&db);

        repo.create(&record("s1", "u1", Some(70), 3)).await.unwrap();
        repo.create(&record("s2", "u1", None, 1)).await.unwrap();

        assert_eq!(repo.count_attempts("u1", "case-1").await.unwrap(), 2);
        assert_eq!(repo.count_attempts("u1", "case-9").await.unwrap(), 0);
    }
}
