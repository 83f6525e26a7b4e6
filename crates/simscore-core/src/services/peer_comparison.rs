use crate::models::{PeerAverage, PeerComparison};

use super::aggregation::round2;

/// Rank a user's average against the averages of a peer cohort.
///
/// The cohort must not contain the user. Small cohorts are still compared;
/// `is_reliable` reports whether the cohort reaches `min_cohort_size`.
pub fn compare_with_cohort(
    user_average: f64,
    peers: &[f64],
    min_cohort_size: usize,
) -> PeerComparison {
    let cohort_size = peers.len();
    let peers_below = peers.iter().filter(|p| **p < user_average).count();
    let peers_above = peers.iter().filter(|p| **p > user_average).count();

    let percentile = if cohort_size == 0 {
        0.0
    } else {
        round2(peers_below as f64 / cohort_size as f64 * 100.0)
    };

    let cohort_average = if cohort_size == 0 {
        None
    } else {
        Some(round2(peers.iter().sum::<f64>() / cohort_size as f64))
    };

    PeerComparison {
        user_average: round2(user_average),
        cohort_size,
        peers_below,
        rank: peers_above + 1,
        percentile,
        cohort_average,
        is_reliable: cohort_size > 0 && cohort_size >= min_cohort_size,
    }
}

/// Split repository averages into the user's own average and everyone else's
pub fn partition_cohort(averages: &[PeerAverage], user_id: &str) -> (Option<f64>, Vec<f64>) {
    let mut user_average = None;
    let mut peers = Vec::with_capacity(averages.len());

    for entry in averages {
        if entry.user_id == user_id {
            user_average = Some(entry.average_score);
        } else {
            peers.push(entry.average_score);
        }
    }

    (user_average, peers)
}
