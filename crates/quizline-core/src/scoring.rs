//! Pure scoring of an attempt's answers.
//!
//! Every submit path (manual or timeout) goes through [`score`], so two
//! submissions over identical answers at the same instant grade identically.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::Question;
use crate::results::{AnswerReview, QuizResult};

/// Everything the scorer needs from an attempt at the moment of submission.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput<'a> {
    pub attempt_id: Uuid,
    pub test_id: &'a str,
    pub user_id: &'a str,
    pub questions: &'a [Question],
    pub answers: &'a BTreeMap<usize, usize>,
    pub flagged: &'a BTreeSet<usize>,
    pub time_spent: &'a BTreeMap<usize, u64>,
    pub allotted_secs: u64,
    pub remaining_secs: u64,
    pub passing_score: u32,
    pub completed_at: DateTime<Utc>,
}

/// Grade an attempt. Unanswered questions count as incorrect; this never
/// fails.
pub fn score(input: &ScoreInput<'_>) -> QuizResult {
    let breakdown: Vec<AnswerReview> = input
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let selected = input.answers.get(&index).copied();
            AnswerReview {
                index,
                question_id: question.id.clone(),
                prompt: question.prompt.clone(),
                options: question.options.clone(),
                selected,
                correct_option: question.correct_option,
                is_correct: selected.is_some_and(|s| question.is_correct(s)),
                flagged: input.flagged.contains(&index),
                explanation: question.explanation.clone(),
                time_spent_secs: input.time_spent.get(&index).copied().unwrap_or(0),
            }
        })
        .collect();

    let total_questions = input.questions.len();
    let correct_count = breakdown.iter().filter(|r| r.is_correct).count();
    let answered_count = breakdown.iter().filter(|r| r.selected.is_some()).count();
    let pct = percentage(correct_count, total_questions);
    let (strength_areas, improvement_areas) = category_areas(input.questions, &breakdown);

    QuizResult {
        attempt_id: input.attempt_id,
        test_id: input.test_id.to_string(),
        user_id: input.user_id.to_string(),
        total_questions,
        correct_count,
        percentage: pct,
        elapsed_secs: input.allotted_secs.saturating_sub(input.remaining_secs),
        allotted_secs: input.allotted_secs,
        answered_count,
        flagged_count: input.flagged.len(),
        passing_score: input.passing_score,
        passed: pct >= input.passing_score,
        breakdown,
        strength_areas,
        improvement_areas,
        completed_at: input.completed_at,
    }
}

/// `round(100 * correct / total)` with halves rounded up, in integer math.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u64;
    let total = total as u64;
    ((200 * correct + total) / (2 * total)) as u32
}

/// Split question categories into strengths (all correct) and improvement
/// areas (at least one miss). Uncategorised questions are ignored.
pub fn category_areas(
    questions: &[Question],
    breakdown: &[AnswerReview],
) -> (Vec<String>, Vec<String>) {
    let mut by_category: BTreeMap<&str, bool> = BTreeMap::new();
    for (question, review) in questions.iter().zip(breakdown) {
        if let Some(category) = question.category.as_deref() {
            let all_correct = by_category.entry(category).or_insert(true);
            *all_correct &= review.is_correct;
        }
    }

    let mut strengths = Vec::new();
    let mut improvements = Vec::new();
    for (category, all_correct) in by_category {
        if all_correct {
            strengths.push(category.to_string());
        } else {
            improvements.push(category.to_string());
        }
    }
    (strengths, improvements)
}
