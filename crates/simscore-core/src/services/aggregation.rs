//! Aggregation over a user's evaluation history
//!
//! All functions are pure and take the history by shared reference. Only
//! records with an overall score take part in score statistics. Means are
//! kept at full precision internally and rounded with [`round2`] on output.

use chrono::{DateTime, Datelike, Utc};
use std::collections::BTreeMap;

use crate::models::{
    ClinicalCategory, Difficulty, EvaluationRecord, PerformanceTrends, TrendBucket,
    TrendDirection, WeakArea, WeeklyBucket,
};

/// Improvement beyond this many points counts as a trend
pub const TREND_THRESHOLD: f64 = 5.0;

/// Mean rating points below "Good"
pub const WEAK_AREA_THRESHOLD: f64 = 3.0;

/// Round half away from zero to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn population_variance(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    Some(values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Scored records as (timestamp, score), oldest first. Ties keep input order.
fn scored_points(records: &[EvaluationRecord]) -> Vec<(DateTime<Utc>, f64)> {
    let mut points: Vec<_> = records
        .iter()
        .filter_map(|r| {
            r.metrics
                .overall_score
                .map(|s| (r.metrics.evaluated_at, f64::from(s)))
        })
        .collect();
    points.sort_by_key(|(at, _)| *at);
    points
}

/// Chronologically ordered overall scores
pub fn score_series(records: &[EvaluationRecord]) -> Vec<f64> {
    scored_points(records).into_iter().map(|(_, s)| s).collect()
}

pub fn weekly_buckets(records: &[EvaluationRecord]) -> Vec<WeeklyBucket> {
    let mut weeks: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for (at, score) in scored_points(records) {
        let week = at.iso_week();
        weeks
            .entry((week.year(), week.week()))
            .or_default()
            .push(score);
    }

    weeks
        .into_iter()
        .filter_map(|((iso_year, iso_week), scores)| {
            mean(&scores).map(|avg| WeeklyBucket {
                iso_year,
                iso_week,
                label: format!("{iso_year}-W{iso_week:02}"),
                case_count: scores.len(),
                average_score: round2(avg),
            })
        })
        .collect()
}

fn keyed_buckets<K: Ord>(
    records: &[EvaluationRecord],
    key: impl Fn(&EvaluationRecord) -> Option<K>,
    label: impl Fn(&K) -> String,
) -> Vec<TrendBucket> {
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for record in records {
        if let (Some(k), Some(score)) = (key(record), record.metrics.overall_score) {
            groups.entry(k).or_default().push(f64::from(score));
        }
    }

    groups
        .iter()
        .filter_map(|(k, scores)| {
            mean(scores).map(|avg| TrendBucket {
                key: label(k),
                case_count: scores.len(),
                average_score: round2(avg),
            })
        })
        .collect()
}

/// Buckets per specialty, alphabetical. Records without a specialty are skipped.
pub fn specialty_buckets(records: &[EvaluationRecord]) -> Vec<TrendBucket> {
    keyed_buckets(records, |r| r.specialty.clone(), |s: &String| s.clone())
}

/// Buckets per difficulty in Easy, Intermediate, Hard order
pub fn difficulty_buckets(records: &[EvaluationRecord]) -> Vec<TrendBucket> {
    keyed_buckets(records, |r| r.difficulty, |d: &Difficulty| d.to_string())
}

/// Mean of the later half minus mean of the earlier half, unrounded
pub fn improvement_of(scores: &[f64]) -> f64 {
    if scores.len() < 2 {
        return 0.0;
    }
    let (earlier, later) = scores.split_at(scores.len() / 2);
    match (mean(earlier), mean(later)) {
        (Some(first), Some(second)) => second - first,
        _ => 0.0,
    }
}

/// `max(0, 100 - 2 * variance)`, unrounded; 0 with fewer than 3 scores
pub fn consistency_of(scores: &[f64]) -> f64 {
    if scores.len() < 3 {
        return 0.0;
    }
    population_variance(scores)
        .map(|variance| (100.0 - 2.0 * variance).max(0.0))
        .unwrap_or(0.0)
}

pub fn direction_of(scores: &[f64]) -> TrendDirection {
    if scores.len() < 2 {
        return TrendDirection::InsufficientData;
    }
    let improvement = improvement_of(scores);
    if improvement > TREND_THRESHOLD {
        TrendDirection::Improving
    } else if improvement < -TREND_THRESHOLD {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

pub fn overall_improvement(records: &[EvaluationRecord]) -> f64 {
    round2(improvement_of(&score_series(records)))
}

pub fn consistency_score(records: &[EvaluationRecord]) -> f64 {
    round2(consistency_of(&score_series(records)))
}

pub fn trend_direction(records: &[EvaluationRecord]) -> TrendDirection {
    direction_of(&score_series(records))
}

/// Categories averaging below "Good", weakest first
pub fn identify_weak_areas(records: &[EvaluationRecord]) -> Vec<WeakArea> {
    let mut areas: Vec<(ClinicalCategory, f64, usize)> = ClinicalCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let points: Vec<f64> = records
                .iter()
                .filter_map(|r| r.metrics.category_ratings.get(category))
                .map(|rating| f64::from(rating.points()))
                .collect();
            mean(&points).map(|avg| (category, avg, points.len()))
        })
        .filter(|(_, avg, _)| *avg < WEAK_AREA_THRESHOLD)
        .collect();

    areas.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    areas
        .into_iter()
        .map(|(category, avg, rated_sessions)| WeakArea {
            category,
            label: category.label().to_string(),
            average_points: round2(avg),
            rated_sessions,
        })
        .collect()
}

pub fn summarize(records: &[EvaluationRecord]) -> PerformanceTrends {
    let scores = score_series(records);

    PerformanceTrends {
        total_sessions: records.len(),
        scored_sessions: scores.len(),
        average_score: mean(&scores).map(round2),
        latest_score: scores.last().and_then(|s| u8::try_from(*s as i64).ok()),
        weekly: weekly_buckets(records),
        by_specialty: specialty_buckets(records),
        by_difficulty: difficulty_buckets(records),
        overall_improvement: round2(improvement_of(&scores)),
        consistency_score: round2(consistency_of(&scores)),
        trend: direction_of(&scores),
        weak_areas: identify_weak_areas(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EvaluationMetrics, Rating, SessionRef};
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn record(id: &str, score: Option<u8>, evaluated_at: DateTime<Utc>) -> EvaluationRecord {
        let mut metrics = EvaluationMetrics::unavailable(&SessionRef::new(id, "u1", "c1"), "x");
        metrics.overall_score = score;
        metrics.evaluated_at = evaluated_at;
        EvaluationRecord {
            id: id.to_string(),
            metrics,
            specialty: None,
            difficulty: None,
        }
    }

    fn series(scores: &[u8]) -> Vec<EvaluationRecord> {
        scores
            .iter()
            .enumerate()
            .map(|(i, s)| record(&format!("s{i}"), Some(*s), at(2024, 3, 1 + i as u32)))
            .collect()
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(2.345_000_1), 2.35);
        assert_eq!(round2(-1.005_1), -1.01);
        assert_eq!(round2(66.666_666), 66.67);
    }

    #[test]
    fn test_consistency_of_identical_scores_is_100() {
        assert_eq!(consistency_score(&series(&[80, 80, 80])), 100.0);
    }

    #[test]
    fn test_consistency_needs_three_points() {
        assert_eq!(consistency_score(&series(&[80, 90])), 0.0);
        assert_eq!(consistency_score(&[]), 0.0);
    }

    #[test]
    fn test_consistency_uses_population_variance_and_floors_at_zero() {
        // variance of [78, 80, 82] is 8/3
        assert_eq!(consistency_score(&series(&[78, 80, 82])), 94.67);
        assert_eq!(consistency_score(&series(&[10, 90, 10, 90])), 0.0);
    }

    #[test]
    fn test_overall_improvement_splits_halves() {
        assert_eq!(overall_improvement(&series(&[50, 50, 90, 90])), 40.0);
        assert_eq!(overall_improvement(&series(&[70])), 0.0);
        // odd length: earlier half is the first element
        assert_eq!(overall_improvement(&series(&[60, 70, 80])), 15.0);
    }

    #[test]
    fn test_improvement_sorts_by_time_not_input_order() {
        let mut records = series(&[50, 50, 90, 90]);
        records.reverse();
        assert_eq!(overall_improvement(&records), 40.0);
    }

    #[test]
    fn test_trend_direction_thresholds() {
        assert_eq!(trend_direction(&series(&[60, 80])), TrendDirection::Improving);
        assert_eq!(trend_direction(&series(&[80, 60])), TrendDirection::Declining);
        assert_eq!(trend_direction(&series(&[70, 75])), TrendDirection::Stable);
        assert_eq!(
            trend_direction(&series(&[70])),
            TrendDirection::InsufficientData
        );
    }

    #[test]
    fn test_weekly_buckets_group_by_iso_week() {
        let records = vec![
            record("a", Some(80), at(2024, 1, 1)), // Monday, 2024-W01
            record("b", Some(91), at(2024, 1, 7)), // Sunday, 2024-W01
            record("c", Some(70), at(2024, 1, 8)), // 2024-W02
            record("d", None, at(2024, 1, 15)),    // unscored, omitted
            record("e", Some(60), at(2023, 1, 1)), // ISO year 2022, week 52
        ];

        let buckets = weekly_buckets(&records);
        let labels: Vec<_> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["2022-W52", "2024-W01", "2024-W02"]);

        assert_eq!(buckets[1].case_count, 2);
        assert_eq!(buckets[1].average_score, 85.5);
        assert_eq!(buckets[0].iso_year, 2022);
    }

    #[test]
    fn test_weekly_buckets_do_not_mutate_input() {
        let records = series(&[55, 65, 75, 85]);
        let before = records.clone();

        let first = weekly_buckets(&records);
        let second = weekly_buckets(&records);

        assert_eq!(first, second);
        assert_eq!(records, before);
    }

    #[test]
    fn test_specialty_and_difficulty_buckets() {
        let mut records = series(&[60, 80, 90, 40]);
        records[0].specialty = Some("Neurology".to_string());
        records[1].specialty = Some("Cardiology".to_string());
        records[2].specialty = Some("Cardiology".to_string());
        records[0].difficulty = Some(Difficulty::Hard);
        records[1].difficulty = Some(Difficulty::Easy);
        records[2].difficulty = Some(Difficulty::Hard);

        let by_specialty = specialty_buckets(&records);
        assert_eq!(by_specialty.len(), 2);
        assert_eq!(by_specialty[0].key, "Cardiology");
        assert_eq!(by_specialty[0].average_score, 85.0);
        assert_eq!(by_specialty[1].key, "Neurology");

        let by_difficulty = difficulty_buckets(&records);
        let keys: Vec<_> = by_difficulty.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["Easy", "Hard"]);
        assert_eq!(by_difficulty[1].average_score, 75.0);
    }

    #[test]
    fn test_identify_weak_areas() {
        let mut records = series(&[70, 72]);
        let ratings = [
            (ClinicalCategory::HistoryTaking, Rating::Poor, Rating::BelowAverage),
            (ClinicalCategory::DiagnosticReasoning, Rating::Good, Rating::Excellent),
            (ClinicalCategory::ClinicalUrgencyRecognition, Rating::BelowAverage, Rating::Good),
        ];
        for (category, first, second) in ratings {
            records[0].metrics.category_ratings.set(category, Some(first));
            records[1].metrics.category_ratings.set(category, Some(second));
        }

        let weak = identify_weak_areas(&records);
        assert_eq!(weak.len(), 2);
        assert_eq!(weak[0].category, ClinicalCategory::HistoryTaking);
        assert_eq!(weak[0].average_points, 1.5);
        assert_eq!(weak[0].rated_sessions, 2);
        assert_eq!(weak[1].category, ClinicalCategory::ClinicalUrgencyRecognition);
    }

    #[test]
    fn test_summarize_empty_history() {
        let trends = summarize(&[]);
        assert_eq!(trends.total_sessions, 0);
        assert_eq!(trends.average_score, None);
        assert_eq!(trends.latest_score, None);
        assert!(trends.weekly.is_empty());
        assert_eq!(trends.consistency_score, 0.0);
        assert_eq!(trends.overall_improvement, 0.0);
        assert_eq!(trends.trend, TrendDirection::InsufficientData);
    }

    #[test]
    fn test_summarize_counts_only_scored_records() {
        let mut records = series(&[60, 90]);
        records.push(record("fallback", None, at(2024, 3, 10)));

        let trends = summarize(&records);
        assert_eq!(trends.total_sessions, 3);
        assert_eq!(trends.scored_sessions, 2);
        assert_eq!(trends.average_score, Some(75.0));
        assert_eq!(trends.latest_score, Some(90));
        assert_eq!(trends.trend, TrendDirection::Improving);
    }
}
