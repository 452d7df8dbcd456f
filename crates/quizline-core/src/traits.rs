//! Collaborator traits consumed by the quiz engine.
//!
//! Content stores and result sinks are implemented in `quizline-store`;
//! the engine only depends on these contracts.

use async_trait::async_trait;

use crate::model::{AttemptContext, Question, TestInfo};
use crate::results::QuizResult;

// ---------------------------------------------------------------------------
// Content store
// ---------------------------------------------------------------------------

/// Source of tests and their questions.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Human-readable store name (e.g. "directory").
    fn name(&self) -> &str;

    /// Fetch the questions of a test, in a stable order.
    async fn fetch_questions(&self, test_id: &str) -> anyhow::Result<Vec<Question>>;

    /// Fetch catalog metadata for a test, if the store has any.
    async fn fetch_test(&self, test_id: &str) -> anyhow::Result<Option<TestInfo>>;

    /// List every test the store knows about.
    async fn list_tests(&self) -> anyhow::Result<Vec<TestInfo>>;
}

// ---------------------------------------------------------------------------
// Result sink
// ---------------------------------------------------------------------------

/// Durable storage for completed attempts.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist one result.
    async fn record(&self, result: &QuizResult, context: &AttemptContext) -> anyhow::Result<()>;

    /// All results recorded for a user, newest first.
    async fn history(&self, user_id: &str) -> anyhow::Result<Vec<QuizResult>>;
}
