//! Core data model types for quizline.
//!
//! Questions, test metadata and the caller's identity. Everything here is
//! immutable once loaded for an attempt.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within its test.
    pub id: String,
    /// The question text shown to the user.
    pub prompt: String,
    /// Answer options, in display order.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_option: usize,
    /// Explanation shown after grading.
    #[serde(default)]
    pub explanation: String,
    /// Topic used to group strengths and weaknesses.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

impl Question {
    /// Check the structural invariants: at least two options and a correct
    /// index that points at one of them.
    pub fn check(&self) -> Result<(), String> {
        if self.options.len() < 2 {
            return Err(format!(
                "question '{}' has {} option(s), at least 2 required",
                self.id,
                self.options.len()
            ));
        }
        if self.correct_option >= self.options.len() {
            return Err(format!(
                "question '{}' marks option {} correct but only has {} options",
                self.id,
                self.correct_option,
                self.options.len()
            ));
        }
        Ok(())
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_option
    }
}

/// Question or test difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" | "beginner" => Ok(Difficulty::Easy),
            "medium" | "intermediate" => Ok(Difficulty::Medium),
            "hard" | "advanced" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Subscription tier of a test or a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Premium,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Premium => write!(f, "premium"),
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "premium" | "pro" => Ok(Tier::Premium),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

/// Catalog metadata for a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestInfo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tier: Tier,
    /// Time allowed for one attempt, in minutes.
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    /// Minimum percentage needed to pass.
    #[serde(default)]
    pub passing_score: Option<u32>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Number of questions the catalog advertises.
    #[serde(default)]
    pub question_count: Option<usize>,
}

impl TestInfo {
    pub fn time_limit_secs(&self) -> Option<u64> {
        self.time_limit_minutes.map(|m| u64::from(m) * 60)
    }

    pub fn is_premium(&self) -> bool {
        self.tier == Tier::Premium
    }
}

/// A test together with its ordered questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    pub test: TestInfo,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuestionBank {
    /// Test metadata with `question_count` set to the questions actually
    /// loaded.
    pub fn info(&self) -> TestInfo {
        TestInfo {
            question_count: Some(self.questions.len()),
            ..self.test.clone()
        }
    }
}

/// The authenticated caller. Authentication itself happens elsewhere; the
/// engine only needs to know who is taking the test and at which tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub tier: Tier,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, tier: Tier) -> Self {
        let user_id = user_id.into();
        Self {
            display_name: user_id.clone(),
            user_id,
            tier,
        }
    }

    pub fn can_access(&self, test: &TestInfo) -> bool {
        !test.is_premium() || self.tier == Tier::Premium
    }
}

/// Who took which test, passed to the result sink alongside a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptContext {
    pub user_id: String,
    pub test_id: String,
}
