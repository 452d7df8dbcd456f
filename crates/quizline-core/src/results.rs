//! Result types for completed attempts, with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The graded outcome of one attempt. Computed exactly once, at submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Identifier of the attempt that produced this result.
    pub attempt_id: Uuid,
    pub test_id: String,
    pub user_id: String,
    pub total_questions: usize,
    pub correct_count: usize,
    /// Whole-number percentage, rounded half up.
    pub percentage: u32,
    /// Seconds spent: allotted time minus time remaining at submission.
    pub elapsed_secs: u64,
    /// Seconds allotted for the attempt.
    pub allotted_secs: u64,
    pub answered_count: usize,
    pub flagged_count: usize,
    pub passing_score: u32,
    pub passed: bool,
    /// Question-by-question review, in test order.
    pub breakdown: Vec<AnswerReview>,
    /// Categories where every question was answered correctly.
    #[serde(default)]
    pub strength_areas: Vec<String>,
    /// Categories with at least one missed question.
    #[serde(default)]
    pub improvement_areas: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// How one question was answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerReview {
    pub index: usize,
    pub question_id: String,
    pub prompt: String,
    pub options: Vec<String>,
    /// `None` when the question was left unanswered.
    pub selected: Option<usize>,
    pub correct_option: usize,
    pub is_correct: bool,
    pub flagged: bool,
    #[serde(default)]
    pub explanation: String,
    /// Seconds the countdown ran while this question was on screen.
    #[serde(default)]
    pub time_spent_secs: u64,
}

impl QuizResult {
    pub fn incorrect_count(&self) -> usize {
        self.answered_count.saturating_sub(self.correct_count)
    }

    pub fn unanswered_count(&self) -> usize {
        self.total_questions.saturating_sub(self.answered_count)
    }

    /// Save the result as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize result")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write result to {}", path.display()))?;
        Ok(())
    }

    /// Load a result from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read result from {}", path.display()))?;
        let result: QuizResult =
            serde_json::from_str(&content).context("failed to parse result JSON")?;
        Ok(result)
    }

    /// Format the result as a markdown review.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## Result: {}\n\n", self.test_id));
        md.push_str(&format!(
            "**Score:** {}% ({}/{} correct), {}\n\n",
            self.percentage,
            self.correct_count,
            self.total_questions,
            if self.passed { "passed" } else { "not passed" }
        ));
        md.push_str(&format!(
            "**Time taken:** {} | **Answered:** {}/{} | **Flagged:** {}\n\n",
            crate::view::format_time(self.elapsed_secs),
            self.answered_count,
            self.total_questions,
            self.flagged_count
        ));

        if !self.strength_areas.is_empty() {
            md.push_str(&format!(
                "**Strengths:** {}\n\n",
                self.strength_areas.join(", ")
            ));
        }
        if !self.improvement_areas.is_empty() {
            md.push_str(&format!(
                "**Needs work:** {}\n\n",
                self.improvement_areas.join(", ")
            ));
        }

        md.push_str("| # | Question | Your answer | Correct answer | |\n");
        md.push_str("|---|----------|-------------|----------------|---|\n");
        for r in &self.breakdown {
            let selected = r
                .selected
                .and_then(|i| r.options.get(i))
                .map(String::as_str)
                .unwrap_or("-");
            let correct = r
                .options
                .get(r.correct_option)
                .map(String::as_str)
                .unwrap_or("-");
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                r.index + 1,
                r.prompt,
                selected,
                correct,
                if r.is_correct { "ok" } else { "x" }
            ));
        }

        md
    }
}
