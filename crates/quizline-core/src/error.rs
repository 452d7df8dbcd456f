//! Quiz engine error types.
//!
//! Contract violations (bad indices, acting on a closed attempt) leave the
//! attempt untouched. Content errors abort `start` before any attempt exists.

use thiserror::Error;

/// Errors raised by the quiz session engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// The content store failed or returned no usable questions.
    #[error("content unavailable for test '{test_id}': {reason}")]
    ContentUnavailable { test_id: String, reason: String },

    /// A free-tier identity tried to open a premium test.
    #[error("test '{0}' requires a premium subscription")]
    PremiumRequired(String),

    /// A navigation or flag target outside the question range.
    #[error("invalid navigation: question {index} is out of range (0..{len})")]
    InvalidNavigation { index: usize, len: usize },

    /// An answer for a question or option that does not exist.
    #[error("invalid selection: option {option} for question {question}")]
    InvalidSelection { question: usize, option: usize },

    /// The attempt is already submitted and can no longer change.
    #[error("attempt has already been submitted")]
    AttemptClosed,

    /// The result sink could not persist a computed result.
    #[error("failed to record result: {0}")]
    ResultSinkFailure(String),
}

impl QuizError {
    /// Returns `true` for caller-side contract violations rather than
    /// user-facing or infrastructure failures.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            QuizError::InvalidNavigation { .. }
                | QuizError::InvalidSelection { .. }
                | QuizError::AttemptClosed
        )
    }

    pub(crate) fn content(test_id: &str, reason: impl Into<String>) -> Self {
        QuizError::ContentUnavailable {
            test_id: test_id.to_string(),
            reason: reason.into(),
        }
    }
}
