//! In-memory content store and result sink.
//!
//! Useful for tests and for embedding quizline without any persistence.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use quizline_core::model::{AttemptContext, Question, QuestionBank, TestInfo};
use quizline_core::results::QuizResult;
use quizline_core::traits::{ContentStore, ResultSink};

use crate::error::StoreError;

/// A content store backed by a fixed set of question banks.
#[derive(Debug, Default)]
pub struct MemoryStore {
    banks: BTreeMap<String, QuestionBank>,
}

impl MemoryStore {
    pub fn new(banks: impl IntoIterator<Item = QuestionBank>) -> Self {
        Self {
            banks: banks
                .into_iter()
                .map(|b| (b.test.id.clone(), b))
                .collect(),
        }
    }

    /// Add or replace a bank.
    pub fn insert(&mut self, bank: QuestionBank) {
        self.banks.insert(bank.test.id.clone(), bank);
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_questions(&self, test_id: &str) -> anyhow::Result<Vec<Question>> {
        self.banks
            .get(test_id)
            .map(|b| b.questions.clone())
            .ok_or_else(|| StoreError::NotFound(test_id.to_string()).into())
    }

    async fn fetch_test(&self, test_id: &str) -> anyhow::Result<Option<TestInfo>> {
        Ok(self.banks.get(test_id).map(|b| b.info()))
    }

    async fn list_tests(&self) -> anyhow::Result<Vec<TestInfo>> {
        Ok(self.banks.values().map(|b| b.info()).collect())
    }
}

/// A result sink that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryResultSink {
    results: Mutex<Vec<(QuizResult, AttemptContext)>>,
}

impl MemoryResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of results recorded so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of every recorded result with its context, oldest first.
    pub fn recorded(&self) -> Vec<(QuizResult, AttemptContext)> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(QuizResult, AttemptContext)>> {
        // A poisoned lock only means a panicking writer; the data is still valid.
        self.results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ResultSink for MemoryResultSink {
    async fn record(&self, result: &QuizResult, context: &AttemptContext) -> anyhow::Result<()> {
        self.lock().push((result.clone(), context.clone()));
        Ok(())
    }

    async fn history(&self, user_id: &str) -> anyhow::Result<Vec<QuizResult>> {
        let mut results: Vec<QuizResult> = self
            .lock()
            .iter()
            .filter(|(_, ctx)| ctx.user_id == user_id)
            .map(|(r, _)| r.clone())
            .collect();
        results.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(results)
    }
}
