//! The attempt state machine.
//!
//! ```text
//! [no attempt] --start--> in_progress
//! in_progress --select/flag/navigate/tick--> in_progress
//! in_progress --submit | countdown hits 0--> submitted
//! submitted --submit--> submitted (cached result)
//! ```
//!
//! An attempt is submitted exactly when it holds a result, so there is no
//! observable state where one exists without the other.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuizError;
use crate::model::Question;
use crate::results::QuizResult;
use crate::scoring::{score, ScoreInput};

/// Lifecycle status of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Submitted,
}

/// Where to move the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
    Goto(usize),
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Time left, in seconds.
    Running(u64),
    /// The countdown just reached zero; the attempt must be submitted.
    Expired,
    /// The attempt is already submitted; the tick had no effect.
    Idle,
}

/// One user's run through one test.
#[derive(Debug, Clone)]
pub struct Attempt {
    id: Uuid,
    test_id: String,
    user_id: String,
    questions: Vec<Question>,
    answers: BTreeMap<usize, usize>,
    flagged: BTreeSet<usize>,
    time_spent: BTreeMap<usize, u64>,
    cursor: usize,
    allotted_secs: u64,
    remaining_secs: u64,
    passing_score: u32,
    result: Option<Box<QuizResult>>,
}

impl Attempt {
    /// Create a fresh in-progress attempt.
    ///
    /// Fails with `ContentUnavailable` if there are no questions or any
    /// question breaks the option invariants.
    pub fn new(
        test_id: impl Into<String>,
        user_id: impl Into<String>,
        questions: Vec<Question>,
        allotted_secs: u64,
        passing_score: u32,
    ) -> Result<Self, QuizError> {
        let test_id = test_id.into();
        if questions.is_empty() {
            return Err(QuizError::content(&test_id, "no questions returned"));
        }
        if let Some(reason) = questions.iter().find_map(|q| q.check().err()) {
            return Err(QuizError::content(&test_id, reason));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            test_id,
            user_id: user_id.into(),
            questions,
            answers: BTreeMap::new(),
            flagged: BTreeSet::new(),
            time_spent: BTreeMap::new(),
            cursor: 0,
            allotted_secs,
            remaining_secs: allotted_secs,
            passing_score,
            result: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always `false`: an attempt cannot be built without questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.cursor]
    }

    pub fn answers(&self) -> &BTreeMap<usize, usize> {
        &self.answers
    }

    pub fn answer(&self, question: usize) -> Option<usize> {
        self.answers.get(&question).copied()
    }

    pub fn flagged(&self) -> &BTreeSet<usize> {
        &self.flagged
    }

    pub fn is_flagged(&self, question: usize) -> bool {
        self.flagged.contains(&question)
    }

    pub fn allotted_secs(&self) -> u64 {
        self.allotted_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.allotted_secs - self.remaining_secs
    }

    pub fn passing_score(&self) -> u32 {
        self.passing_score
    }

    pub fn status(&self) -> AttemptStatus {
        if self.result.is_some() {
            AttemptStatus::Submitted
        } else {
            AttemptStatus::InProgress
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.result.is_some()
    }

    /// The result, once submitted.
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_deref()
    }

    /// Record `option` as the answer to `question`, overwriting any earlier
    /// choice.
    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<(), QuizError> {
        self.ensure_open()?;
        let valid = self
            .questions
            .get(question)
            .is_some_and(|q| option < q.options.len());
        if !valid {
            return Err(QuizError::InvalidSelection { question, option });
        }
        self.answers.insert(question, option);
        Ok(())
    }

    /// Flip the review flag on `question`. Returns whether it is now flagged.
    pub fn toggle_flag(&mut self, question: usize) -> Result<bool, QuizError> {
        self.ensure_open()?;
        self.ensure_index(question)?;
        if self.flagged.remove(&question) {
            Ok(false)
        } else {
            self.flagged.insert(question);
            Ok(true)
        }
    }

    /// Move the cursor. `Next` and `Previous` stop at either end without
    /// error; `Goto` must name an existing question. Returns the new cursor.
    pub fn navigate(&mut self, target: Navigation) -> Result<usize, QuizError> {
        self.ensure_open()?;
        let last = self.questions.len() - 1;
        self.cursor = match target {
            Navigation::Next => (self.cursor + 1).min(last),
            Navigation::Previous => self.cursor.saturating_sub(1),
            Navigation::Goto(index) => {
                self.ensure_index(index)?;
                index
            }
        };
        Ok(self.cursor)
    }

    /// Seconds the countdown has run with `question` under the cursor.
    pub fn time_spent(&self, question: usize) -> u64 {
        self.time_spent.get(&question).copied().unwrap_or(0)
    }

    /// Advance the countdown by one second, crediting it to the current
    /// question.
    pub fn tick(&mut self) -> Tick {
        if self.is_submitted() {
            return Tick::Idle;
        }
        if self.remaining_secs > 0 {
            *self.time_spent.entry(self.cursor).or_insert(0) += 1;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            Tick::Expired
        } else {
            Tick::Running(self.remaining_secs)
        }
    }

    /// Grade the attempt and close it.
    ///
    /// The first call computes the result; later calls return it unchanged.
    /// The flag is `true` only for the call that performed the transition.
    pub fn submit(&mut self) -> (&QuizResult, bool) {
        let first = self.result.is_none();
        let result = self.result.get_or_insert_with(|| {
            Box::new(score(&ScoreInput {
                attempt_id: self.id,
                test_id: &self.test_id,
                user_id: &self.user_id,
                questions: &self.questions,
                answers: &self.answers,
                flagged: &self.flagged,
                time_spent: &self.time_spent,
                allotted_secs: self.allotted_secs,
                remaining_secs: self.remaining_secs,
                passing_score: self.passing_score,
                completed_at: Utc::now(),
            }))
        });
        (result, first)
    }

    fn ensure_open(&self) -> Result<(), QuizError> {
        if self.is_submitted() {
            Err(QuizError::AttemptClosed)
        } else {
            Ok(())
        }
    }

    fn ensure_index(&self, index: usize) -> Result<(), QuizError> {
        if index < self.questions.len() {
            Ok(())
        } else {
            Err(QuizError::InvalidNavigation {
                index,
                len: self.questions.len(),
            })
        }
    }
}
