//! Display values derived from an attempt.
//!
//! All functions here are pure; nothing is cached between calls.

use serde::Serialize;

use crate::attempt::Attempt;

/// Navigator status of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionMark {
    Current,
    Answered,
    Flagged,
    Unanswered,
}

/// What the user may see of the current question while the attempt is
/// running. The answer key and explanation are withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptView {
    pub index: usize,
    pub total: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub flagged: bool,
}

/// Format seconds as `m:ss`.
pub fn format_time(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Position of the cursor through the test, as a percentage.
pub fn progress_percent(attempt: &Attempt) -> f64 {
    (attempt.cursor() + 1) as f64 / attempt.len() as f64 * 100.0
}

pub fn answered_count(attempt: &Attempt) -> usize {
    attempt.answers().len()
}

/// Status of every question, in order. The current question wins over
/// answered, which wins over flagged.
pub fn navigator(attempt: &Attempt) -> Vec<QuestionMark> {
    (0..attempt.len())
        .map(|i| {
            if i == attempt.cursor() {
                QuestionMark::Current
            } else if attempt.answer(i).is_some() {
                QuestionMark::Answered
            } else if attempt.is_flagged(i) {
                QuestionMark::Flagged
            } else {
                QuestionMark::Unanswered
            }
        })
        .collect()
}

pub fn prompt_view(attempt: &Attempt) -> PromptView {
    let index = attempt.cursor();
    let question = attempt.current_question();
    PromptView {
        index,
        total: attempt.len(),
        prompt: question.prompt.clone(),
        options: question.options.clone(),
        selected: attempt.answer(index),
        flagged: attempt.is_flagged(index),
    }
}

/// Letter label for an option index (`0 -> 'A'`).
pub fn option_label(index: usize) -> char {
    char::from_u32('A' as u32 + index as u32).unwrap_or('?')
}

/// Parse an option label (`"B"`, `"b"` or 1-based `"2"`) into an index.
pub fn parse_option_label(label: &str) -> Option<usize> {
    let label = label.trim();
    if let Ok(n) = label.parse::<usize>() {
        return n.checked_sub(1);
    }
    let mut chars = label.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::Navigation;
    use crate::model::Question;

    fn attempt(n: usize) -> Attempt {
        let questions = (0..n)
            .map(|i| Question {
                id: format!("q{i}"),
                prompt: format!("prompt {i}"),
                options: vec!["yes".into(), "no".into()],
                correct_option: 0,
                explanation: "secret".into(),
                category: None,
                difficulty: None,
            })
            .collect();
        Attempt::new("t1", "u1", questions, 1800, 70).unwrap()
    }

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(1800), "30:00");
        assert_eq!(format_time(65), "1:05");
        assert_eq!(format_time(9), "0:09");
        assert_eq!(format_time(0), "0:00");
    }

    #[test]
    fn progress_follows_cursor() {
        let mut a = attempt(4);
        assert_eq!(progress_percent(&a), 25.0);
        a.navigate(Navigation::Goto(3)).unwrap();
        assert_eq!(progress_percent(&a), 100.0);
    }

    #[test]
    fn navigator_precedence() {
        let mut a = attempt(4);
        a.select_answer(1, 0).unwrap();
        a.toggle_flag(1).unwrap();
        a.toggle_flag(2).unwrap();
        a.toggle_flag(0).unwrap();

        assert_eq!(
            navigator(&a),
            vec![
                QuestionMark::Current,
                QuestionMark::Answered,
                QuestionMark::Flagged,
                QuestionMark::Unanswered,
            ]
        );
        assert_eq!(answered_count(&a), 1);
    }

    #[test]
    fn prompt_view_withholds_answer_key() {
        let mut a = attempt(2);
        a.select_answer(0, 1).unwrap();
        let view = prompt_view(&a);
        assert_eq!(view.index, 0);
        assert_eq!(view.total, 2);
        assert_eq!(view.selected, Some(1));

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("correct"));
    }

    #[test]
    fn option_labels() {
        assert_eq!(option_label(0), 'A');
        assert_eq!(option_label(3), 'D');
        assert_eq!(parse_option_label("b"), Some(1));
        assert_eq!(parse_option_label("D"), Some(3));
        assert_eq!(parse_option_label("1"), Some(0));
        assert_eq!(parse_option_label("0"), None);
        assert_eq!(parse_option_label("ab"), None);
        assert_eq!(parse_option_label(""), None);
    }
}
