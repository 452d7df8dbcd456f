//! File-system backends: TOML question banks in, JSON results out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use quizline_core::model::{AttemptContext, Question, QuestionBank, TestInfo};
use quizline_core::parser::{load_bank_directory, validate_bank};
use quizline_core::results::QuizResult;
use quizline_core::traits::{ContentStore, ResultSink};

use crate::error::StoreError;

/// Content store over a directory of TOML question banks.
///
/// Banks are loaded once when the store is opened. Banks with validation
/// problems are still served; the engine rejects unusable questions when
/// an attempt starts.
#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
    banks: BTreeMap<String, QuestionBank>,
}

impl DirectoryStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let mut banks = BTreeMap::new();

        for bank in load_bank_directory(&root)? {
            for warning in validate_bank(&bank) {
                tracing::warn!(test = %bank.test.id, "{}", warning.message);
            }
            let id = bank.test.id.clone();
            if banks.insert(id.clone(), bank).is_some() {
                tracing::warn!("duplicate test id {id} in {}; keeping the last one", root.display());
            }
        }

        tracing::debug!("loaded {} question banks from {}", banks.len(), root.display());
        Ok(Self { root, banks })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ContentStore for DirectoryStore {
    fn name(&self) -> &str {
        "directory"
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

/// Result sink writing one JSON file per attempt under
/// `<dir>/<user>/<attempt id>.json`.
#[derive(Debug, Clone)]
pub struct JsonResultSink {
    dir: PathBuf,
}

impl JsonResultSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn user_dir(&self, user_id: &str) -> PathBuf {
        self.dir.join(encode_path_component(user_id))
    }

    /// Where the result of an attempt is written.
    pub fn result_path(&self, result: &QuizResult) -> PathBuf {
        self.user_dir(&result.user_id)
            .join(format!("{}.json", result.attempt_id))
    }
}

/// Percent-encode a user id into a single path component.
///
/// Distinct ids always map to distinct names. A leading `.` is encoded so
/// the result is never `.`, `..` or hidden.
fn encode_path_component(id: &str) -> String {
    if id.is_empty() {
        return "%".to_string();
    }
    let mut out = String::with_capacity(id.len());
    for (i, byte) in id.bytes().enumerate() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => out.push(byte as char),
            b'.' if i > 0 => out.push('.'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[async_trait]
impl ResultSink for JsonResultSink {
    async fn record(&self, result: &QuizResult, context: &AttemptContext) -> anyhow::Result<()> {
        let dir = self.user_dir(&context.user_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let path = dir.join(format!("{}.json", result.attempt_id));
        let json = serde_json::to_string_pretty(result).context("failed to serialize result")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("failed to write result to {}", path.display()))?;

        tracing::debug!("result written to {}", path.display());
        Ok(())
    }

    async fn history(&self, user_id: &str) -> anyhow::Result<Vec<QuizResult>> {
        let dir = self.user_dir(user_id);
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(vec![]);
        }

        let mut results = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("failed to read directory: {}", dir.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<QuizResult>(&content) {
                Ok(result) if result.user_id == user_id => results.push(result),
                Ok(result) => tracing::warn!(
                    "skipping {}: recorded for user {}",
                    path.display(),
                    result.user_id
                ),
                Err(e) => tracing::warn!("skipping {}: {}", path.display(), e),
            }
        }

        results.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(results)
    }
}
