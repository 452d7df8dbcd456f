//! The `quizline list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizline_store::config::load_config_from;
use quizline_store::create_backends;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let backends = create_backends(&config)?;
    let identity = config.identity();

    let mut tests = backends.store.list_tests().await?;
    if tests.is_empty() {
        println!("No tests found. Run `quizline init` to create an example question bank.");
        return Ok(());
    }
    tests.sort_by(|a, b| a.id.cmp(&b.id));

    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Title",
        "Tier",
        "Questions",
        "Time limit",
        "Pass mark",
        "Difficulty",
    ]);

    for test in &tests {
        let tier = if identity.can_access(test) {
            test.tier.to_string()
        } else {
            format!("{} (locked)", test.tier)
        };
        let time_limit = test
            .time_limit_minutes
            .map(|m| format!("{m} min"))
            .unwrap_or_else(|| format!("{} min", config.default_time_limit_secs / 60));
        table.add_row(vec![
            Cell::new(&test.id),
            Cell::new(&test.title),
            Cell::new(tier),
            Cell::new(
                test.question_count
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
            Cell::new(time_limit),
            Cell::new(format!(
                "{}%",
                test.passing_score.unwrap_or(config.passing_score)
            )),
            Cell::new(
                test.difficulty
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
        ]);
    }

    println!("{table}");
    Ok(())
}
