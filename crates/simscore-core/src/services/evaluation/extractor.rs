//! Structured metric extraction from free-text evaluations
//!
//! Every field is matched independently; a line that is missing or malformed
//! leaves only its own field empty. Nothing is inferred.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{
    CategoryRatings, ClinicalCategory, DiagnosisAccuracy, EvaluationMetrics, Rating, SessionRef,
};

pub const SUMMARY_MAX_CHARS: usize = 500;

const RATING_VALUES: &str = "Poor|Below Average|Good|Very Good|Excellent";

lazy_static! {
    static ref CATEGORY_PATTERNS: Vec<(ClinicalCategory, Regex)> = ClinicalCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let pattern = format!(
                r"(?m)^[ \t]*\d+\.[ \t]*(?:\*\*)?{}(?:\*\*)?[ \t]*:[ \t]*(?:\*\*)?[ \t]*\(Rating:[ \t]*({})\)",
                regex::escape(category.label()),
                RATING_VALUES
            );
            Regex::new(&pattern).ok().map(|re| (category, re))
        })
        .collect();
    static ref SCORE_PATTERN: Regex =
        Regex::new(r"(?m)Overall Clinical Reasoning Score:(?:\*\*)?[ \t]*(\d+)[ \t]*%").unwrap();
    static ref LABEL_PATTERN: Regex =
        Regex::new(r"(?m)Performance Label:(?:\*\*)?[ \t]*(.*)$").unwrap();
    static ref DIAGNOSIS_PATTERN: Regex = Regex::new(concat!(
        r"(?mi)DIAGNOSTIC ACCURACY:(?:\*\*)?[ \t]*(?:\*\*)?[ \t]*",
        r"(Partially[ \t]+Reached|Not[ \t]+Reached|Reached|Missed)\b"
    ))
    .unwrap();
    static ref NUMBERED_LINE: Regex = Regex::new(r"^\s*\d+\.\s").unwrap();
}

/// Fields recovered from one evaluation text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMetrics {
    pub category_ratings: CategoryRatings,
    pub diagnosis_accuracy: Option<DiagnosisAccuracy>,
    pub overall_score: Option<u8>,
    pub performance_label: Option<String>,
    pub evaluation_summary: Option<String>,
}

impl ExtractedMetrics {
    pub fn into_metrics(self, session: &SessionRef, evaluated_at: DateTime<Utc>) -> EvaluationMetrics {
        EvaluationMetrics {
            session_id: session.session_id.clone(),
            user_id: session.user_id.clone(),
            case_id: session.case_id.clone(),
            category_ratings: self.category_ratings,
            diagnosis_accuracy: self.diagnosis_accuracy,
            overall_score: self.overall_score,
            performance_label: self.performance_label,
            evaluation_summary: self.evaluation_summary,
            evaluated_at,
        }
    }
}

/// Parse an evaluation text. Never fails; unmatched fields are `None`.
pub fn extract_metrics(text: &str) -> ExtractedMetrics {
    let mut category_ratings = CategoryRatings::default();
    for (category, pattern) in CATEGORY_PATTERNS.iter() {
        let rating = pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<Rating>().ok());
        category_ratings.set(*category, rating);
    }

    ExtractedMetrics {
        category_ratings,
        diagnosis_accuracy: extract_diagnosis_accuracy(text),
        overall_score: extract_overall_score(text),
        performance_label: extract_performance_label(text),
        evaluation_summary: extract_summary(text),
    }
}

fn extract_overall_score(text: &str) -> Option<u8> {
    SCORE_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|score| *score <= 100)
        .and_then(|score| u8::try_from(score).ok())
}

fn extract_performance_label(text: &str) -> Option<String> {
    LABEL_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|label| !label.is_empty())
}

fn extract_diagnosis_accuracy(text: &str) -> Option<DiagnosisAccuracy> {
    let value = DIAGNOSIS_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))?
        .as_str()
        .to_lowercase();

    match value.split_whitespace().collect::<Vec<_>>().as_slice() {
        ["partially", "reached"] => Some(DiagnosisAccuracy::PartiallyReached),
        ["not", "reached"] | ["missed"] => Some(DiagnosisAccuracy::Missed),
        ["reached"] => Some(DiagnosisAccuracy::Reached),
        _ => None,
    }
}

/// Body of the `ANALYSIS:` section, or the leading text when there is none
fn extract_summary(text: &str) -> Option<String> {
    let body = analysis_section(text).unwrap_or_else(|| text.trim().to_string());
    let body = body.trim();
    if body.is_empty() {
        None
    } else {
        Some(truncate_chars(body, SUMMARY_MAX_CHARS))
    }
}

fn analysis_section(text: &str) -> Option<String> {
    let mut lines = text.lines();
    let mut body = Vec::new();

    for line in lines.by_ref() {
        if let Some(idx) = line.find("ANALYSIS:") {
            let rest = strip_emphasis(&line[idx + "ANALYSIS:".len()..]);
            if !rest.is_empty() {
                body.push(rest);
            }
            break;
        }
    }

    for line in lines {
        if is_section_break(line) {
            break;
        }
        body.push(line.trim());
    }

    let joined = body.join("\n").trim().to_string();
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

fn strip_emphasis(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '*' || c == '#').trim()
}

/// Heading-only lines, numbered category lines and the score/label lines end a section
fn is_section_break(line: &str) -> bool {
    if line.contains("Overall Clinical Reasoning Score:") || line.contains("Performance Label:") {
        return true;
    }
    if NUMBERED_LINE.is_match(line)
        && ClinicalCategory::ALL
            .iter()
            .any(|category| line.contains(category.label()))
    {
        return true;
    }

    let stripped = strip_emphasis(line);
    if stripped.to_uppercase().starts_with("DIAGNOSTIC ACCURACY:") {
        return true;
    }

    let heading = match stripped.split_once(':') {
        Some((heading, rest)) if strip_emphasis(rest).is_empty() => heading,
        Some(_) => return false,
        None => stripped,
    };
    let letters: Vec<char> = heading.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
}

/// Bound `text` to `max_chars` characters, marking truncation with an ellipsis
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let truncated: String = text.chars().take(keep).collect();
    format!("{}...", truncated.trim_end())
}
