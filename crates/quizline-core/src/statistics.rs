//! Aggregate statistics over a user's recorded results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::results::QuizResult;

/// Statistics across every attempt in a history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_attempts: usize,
    /// Mean percentage, 0.0 for an empty history.
    pub average_score: f64,
    pub best_score: u32,
    /// Fraction of attempts that met their passing score, in `0.0..=1.0`.
    pub pass_rate: f64,
    /// Sum of elapsed time over all attempts, in seconds.
    pub total_study_secs: u64,
    /// Keyed by test id.
    pub per_test: BTreeMap<String, TestStats>,
}

/// Statistics for one test within a history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStats {
    pub test_id: String,
    pub attempts: usize,
    pub best_score: u32,
    pub latest_score: u32,
    pub last_attempted: DateTime<Utc>,
    pub passed: bool,
}

/// Compute statistics from a set of results, in any order.
pub fn compute_history_stats(results: &[QuizResult]) -> HistoryStats {
    if results.is_empty() {
        return HistoryStats::default();
    }

    let total = results.len();
    let score_sum: u64 = results.iter().map(|r| u64::from(r.percentage)).sum();
    let passed = results.iter().filter(|r| r.passed).count();

    let mut per_test: BTreeMap<String, TestStats> = BTreeMap::new();
    for r in results {
        let stats = per_test
            .entry(r.test_id.clone())
            .or_insert_with(|| TestStats {
                test_id: r.test_id.clone(),
                attempts: 0,
                best_score: 0,
                latest_score: r.percentage,
                last_attempted: r.completed_at,
                passed: false,
            });
        stats.attempts += 1;
        stats.best_score = stats.best_score.max(r.percentage);
        stats.passed |= r.passed;
        if r.completed_at >= stats.last_attempted {
            stats.last_attempted = r.completed_at;
            stats.latest_score = r.percentage;
        }
    }

    HistoryStats {
        total_attempts: total,
        average_score: score_sum as f64 / total as f64,
        best_score: results.iter().map(|r| r.percentage).max().unwrap_or(0),
        pass_rate: passed as f64 / total as f64,
        total_study_secs: results.iter().map(|r| r.elapsed_secs).sum(),
        per_test,
    }
}
