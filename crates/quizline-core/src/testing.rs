//! In-crate test doubles for the content store and result sink.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::model::{AttemptContext, Question, QuestionBank, TestInfo, Tier};
use crate::results::QuizResult;
use crate::traits::{ContentStore, ResultSink};

pub fn question(id: &str, correct: usize) -> Question {
    Question {
        id: id.into(),
        prompt: format!("prompt {id}"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_option: correct,
        explanation: format!("explanation {id}"),
        category: None,
        difficulty: None,
    }
}

/// A bank of `n` questions whose correct answer is always option 0, with a
/// ten-minute limit and a passing score of 60.
pub fn bank(id: &str, tier: Tier, n: usize) -> QuestionBank {
    QuestionBank {
        test: TestInfo {
            id: id.into(),
            title: format!("Test {id}"),
            description: String::new(),
            tier,
            time_limit_minutes: Some(10),
            passing_score: Some(60),
            category: String::new(),
            difficulty: None,
            tags: vec![],
            question_count: Some(n),
        },
        questions: (0..n).map(|i| question(&format!("q{i}"), 0)).collect(),
    }
}

#[derive(Default)]
pub struct StaticStore {
    tests: HashMap<String, TestInfo>,
    questions: HashMap<String, Vec<Question>>,
    error: Option<String>,
    question_fetches: AtomicUsize,
}

impl StaticStore {
    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn with_bank(mut self, bank: QuestionBank) -> Self {
        self.questions.insert(bank.test.id.clone(), bank.questions);
        self.tests.insert(bank.test.id.clone(), bank.test);
        self
    }

    pub fn question_fetches(&self) -> usize {
        self.question_fetches.load(Ordering::SeqCst)
    }

    pub fn with_questions(mut self, test_id: &str, questions: Vec<Question>) -> Self {
        self.questions.insert(test_id.to_string(), questions);
        self
    }
}

#[async_trait]
impl ContentStore for StaticStore {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_questions(&self, test_id: &str) -> anyhow::Result<Vec<Question>> {
        self.question_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = &self.error {
            anyhow::bail!("{e}");
        }
        Ok(self.questions.get(test_id).cloned().unwrap_or_default())
    }

    async fn fetch_test(&self, test_id: &str) -> anyhow::Result<Option<TestInfo>> {
        if let Some(e) = &self.error {
            anyhow::bail!("{e}");
        }
        Ok(self.tests.get(test_id).cloned())
    }

    async fn list_tests(&self) -> anyhow::Result<Vec<TestInfo>> {
        Ok(self.tests.values().cloned().collect())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    recorded: Mutex<Vec<(QuizResult, AttemptContext)>>,
    fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            recorded: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn recorded(&self) -> Vec<(QuizResult, AttemptContext)> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultSink for RecordingSink {
    async fn record(&self, result: &QuizResult, context: &AttemptContext) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("sink unavailable");
        }
        self.recorded
            .lock()
            .unwrap()
            .push((result.clone(), context.clone()));
        Ok(())
    }

    async fn history(&self, user_id: &str) -> anyhow::Result<Vec<QuizResult>> {
        Ok(self
            .recorded
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r.user_id == user_id)
            .map(|(r, _)| r.clone())
            .collect())
    }
}
