//! The `quizline history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use serde::Serialize;

use quizline_core::results::QuizResult;
use quizline_core::statistics::{compute_history_stats, HistoryStats};
use quizline_core::view::format_time;
use quizline_store::config::load_config_from;
use quizline_store::create_backends;

#[derive(Serialize)]
struct HistoryReport<'a> {
    user_id: &'a str,
    stats: &'a HistoryStats,
    results: &'a [QuizResult],
}

pub async fn execute(
    user: Option<String>,
    format: String,
    output: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let user_id = user.unwrap_or_else(|| config.user.id.clone());
    let backends = create_backends(&config)?;

    let results = backends.sink.history(&user_id).await?;
    let stats = compute_history_stats(&results);

    match format.as_str() {
        "text" => print_text(&user_id, &results, &stats),
        "json" => {
            let report = HistoryReport {
                user_id: &user_id,
                stats: &stats,
                results: &results,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "html" => {
            let html = quizline_report::generate_history_html(&user_id, &results, &stats);
            quizline_report::write_html(&html, &output)?;
            println!("History written to: {}", output.display());
        }
        other => anyhow::bail!("unknown format '{other}' (expected text, json or html)"),
    }

    Ok(())
}

fn print_text(user_id: &str, results: &[QuizResult], stats: &HistoryStats) {
    if results.is_empty() {
        println!("No results recorded for {user_id}.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Completed", "Test", "Score", "Time", "Result"]);
    for r in results {
        table.add_row(vec![
            Cell::new(r.completed_at.format("%Y-%m-%d %H:%M")),
            Cell::new(&r.test_id),
            Cell::new(format!("{}%", r.percentage)),
            Cell::new(format_time(r.elapsed_secs)),
            Cell::new(if r.passed { "PASS" } else { "FAIL" }),
        ]);
    }
    println!("{table}");

    println!(
        "\n{} attempts | average {:.1}% | best {}% | pass rate {:.0}% | study time {}",
        stats.total_attempts,
        stats.average_score,
        stats.best_score,
        stats.pass_rate * 100.0,
        format_time(stats.total_study_secs)
    );

    let mut per_test = Table::new();
    per_test.set_header(vec!["Test", "Attempts", "Best", "Latest", "Passed"]);
    for t in stats.per_test.values() {
        per_test.add_row(vec![
            Cell::new(&t.test_id),
            Cell::new(t.attempts),
            Cell::new(format!("{}%", t.best_score)),
            Cell::new(format!("{}%", t.latest_score)),
            Cell::new(if t.passed { "yes" } else { "no" }),
        ]);
    }
    println!("{per_test}");
}
