//! The `quizline review` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizline_core::results::QuizResult;
use quizline_core::view::{format_time, option_label};

pub fn execute(result_path: PathBuf, format: String, output: Option<PathBuf>) -> Result<()> {
    let result = QuizResult::load_json(&result_path)?;

    let rendered = match format.as_str() {
        "text" => render_text(&result),
        "markdown" | "md" => result.to_markdown(),
        "html" => quizline_report::generate_review_html(&result, None),
        other => anyhow::bail!("unknown format '{other}' (expected text, markdown or html)"),
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, rendered)?;
            println!("Review written to: {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn render_text(result: &QuizResult) -> String {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Correct", ""]);

    for r in &result.breakdown {
        let selected = r
            .selected
            .map(|i| format!("{}) {}", option_label(i), r.options.get(i).map_or("?", String::as_str)))
            .unwrap_or_else(|| "-".into());
        let correct = format!(
            "{}) {}",
            option_label(r.correct_option),
            r.options.get(r.correct_option).map_or("?", String::as_str)
        );
        let mark = match (r.selected, r.is_correct) {
            (None, _) => "skipped",
            (Some(_), true) => "ok",
            (Some(_), false) => "wrong",
        };
        let prompt = if r.flagged {
            format!("{} [flagged]", r.prompt)
        } else {
            r.prompt.clone()
        };
        table.add_row(vec![
            Cell::new(r.index + 1),
            Cell::new(prompt),
            Cell::new(selected),
            Cell::new(correct),
            Cell::new(mark),
        ]);
    }

    format!(
        "{}: {}% ({}/{} correct, {}) in {}\n{table}",
        result.test_id,
        result.percentage,
        result.correct_count,
        result.total_questions,
        if result.passed { "passed" } else { "not passed" },
        format_time(result.elapsed_secs)
    )
}
