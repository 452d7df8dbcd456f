//! TOML question bank parser.
//!
//! Loads question banks from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Difficulty, Question, QuestionBank, TestInfo, Tier};

/// Intermediate TOML structure for parsing question bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    test: TomlTestHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlTestHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tier: Option<String>,
    #[serde(default)]
    time_limit_minutes: Option<u32>,
    #[serde(default)]
    passing_score: Option<u32>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    question_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    prompt: String,
    options: Vec<String>,
    /// Zero-based index of the correct option.
    correct: usize,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
}

fn parse_difficulty(value: Option<String>) -> Result<Option<Difficulty>> {
    value
        .map(|d| d.parse().map_err(|e: String| anyhow::anyhow!("{}", e)))
        .transpose()
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank`.
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let header = parsed.test;
    let tier: Tier = match header.tier {
        Some(t) => t.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?,
        None => Tier::default(),
    };

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            Ok(Question {
                id: q.id,
                prompt: q.prompt.trim().to_string(),
                options: q.options,
                correct_option: q.correct,
                explanation: q.explanation.trim().to_string(),
                category: q.category,
                difficulty: parse_difficulty(q.difficulty)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionBank {
        test: TestInfo {
            id: header.id,
            title: header.title,
            description: header.description,
            tier,
            time_limit_minutes: header.time_limit_minutes,
            passing_score: header.passing_score,
            category: header.category,
            difficulty: parse_difficulty(header.difficulty)?,
            tags: header.tags,
            question_count: header.question_count,
        },
        questions,
    })
}

/// Recursively load all `.toml` question banks from a directory. Files that
/// fail to parse are skipped with a warning.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// A warning from question bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    pub message: String,
}

impl ValidationWarning {
    fn question(id: &str, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a question bank for common issues.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if bank.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "bank has no questions".into(),
        });
    }

    if let Some(expected) = bank.test.question_count {
        if expected != bank.questions.len() {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!(
                    "question_count is {expected} but the bank has {} questions",
                    bank.questions.len()
                ),
            });
        }
    }

    if let Some(score) = bank.test.passing_score {
        if score > 100 {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!("passing_score {score} is above 100"),
            });
        }
    }

    if bank.test.time_limit_minutes == Some(0) {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "time_limit_minutes is 0".into(),
        });
    }

    let mut seen_ids = std::collections::HashSet::new();
    for q in &bank.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(ValidationWarning::question(
                &q.id,
                format!("duplicate question ID: {}", q.id),
            ));
        }
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning::question(&q.id, "prompt is empty"));
        }
        if let Err(message) = q.check() {
            warnings.push(ValidationWarning::question(&q.id, message));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[test]
id = "rust-basics"
title = "Rust Basics"
description = "Ownership and borrowing"
tier = "free"
time_limit_minutes = 15
passing_score = 75
category = "rust"
difficulty = "beginner"
tags = ["ownership"]
question_count = 2

[[questions]]
id = "move"
prompt = """
What happens to `a` after `let b = a;` when `a` is a `String`?
"""
options = ["It is copied", "It is moved", "It is borrowed"]
correct = 1
explanation = "String is not Copy, so assignment moves it."
category = "ownership"

[[questions]]
id = "borrow"
prompt = "How many mutable borrows may be live at once?"
options = ["None", "One", "Unlimited"]
correct = 1
difficulty = "medium"
"#;

    #[test]
    fn parse_valid_toml() {
        let bank = parse_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.test.id, "rust-basics");
        assert_eq!(bank.test.time_limit_secs(), Some(900));
        assert_eq!(bank.test.difficulty, Some(Difficulty::Easy));
        assert_eq!(bank.questions.len(), 2);
        assert_eq!(bank.questions[0].correct_option, 1);
        assert!(bank.questions[0].prompt.starts_with("What happens"));
        assert_eq!(bank.questions[1].difficulty, Some(Difficulty::Medium));
        assert!(validate_bank(&bank).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[test]
id = "minimal"
title = "Minimal"

[[questions]]
id = "q1"
prompt = "Pick one"
options = ["a", "b"]
correct = 0
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.test.tier, Tier::Free);
        assert_eq!(bank.test.time_limit_minutes, None);
        assert_eq!(bank.test.passing_score, None);
        assert!(bank.questions[0].explanation.is_empty());
    }

    #[test]
    fn unknown_tier_is_an_error() {
        let toml = r#"
[test]
id = "x"
title = "X"
tier = "gold"
"#;
        let err = parse_bank_str(toml, &PathBuf::from("x.toml")).unwrap_err();
        assert!(err.to_string().contains("unknown tier"));
    }

    #[test]
    fn validate_reports_structural_problems() {
        let toml = r#"
[test]
id = "broken"
title = "Broken"
question_count = 5

[[questions]]
id = "same"
prompt = "First"
options = ["only"]
correct = 0

[[questions]]
id = "same"
prompt = "  "
options = ["a", "b"]
correct = 2
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_bank(&bank);
        let has = |needle: &str| warnings.iter().any(|w| w.message.contains(needle));

        assert!(has("duplicate"));
        assert!(has("prompt is empty"));
        assert!(has("at least 2"));
        assert!(has("only has 2"));
        assert!(has("question_count is 5"));
    }

    #[test]
    fn validate_empty_bank() {
        let toml = r#"
[test]
id = "empty"
title = "Empty"
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("empty.toml")).unwrap();
        let warnings = validate_bank(&bank);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].question_id.is_none());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_bank_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("basics.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not toml [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let banks = load_bank_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].test.id, "rust-basics");
    }
}
