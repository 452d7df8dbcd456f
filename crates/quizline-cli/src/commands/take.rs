//! The `quizline take` command.
//!
//! Runs one timed attempt on the terminal. Input lines are read on a plain
//! thread and forwarded to the session as commands; closing stdin (or
//! `quit`) abandons the attempt.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use tokio::sync::mpsc;

use quizline_core::attempt::{Attempt, Navigation};
use quizline_core::engine::{QuizEngine, SubmitOutcome, SubmitTrigger};
use quizline_core::error::QuizError;
use quizline_core::session::{Command, SessionObserver, SessionOutcome};
use quizline_core::view::{self, format_time, option_label, parse_option_label, QuestionMark};
use quizline_store::config::load_config_from;
use quizline_store::create_backends;

/// One parsed line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Command(Command),
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let input = match word.to_lowercase().as_str() {
        "next" | ">" => Input::Command(Command::Navigate(Navigation::Next)),
        "prev" | "back" | "<" => Input::Command(Command::Navigate(Navigation::Previous)),
        "go" | "goto" => {
            let n: usize = rest.parse().ok()?;
            Input::Command(Command::Navigate(Navigation::Goto(n.checked_sub(1)?)))
        }
        "flag" | "!" => Input::Command(Command::ToggleFlagCurrent),
        "submit" => Input::Command(Command::Submit),
        "quit" | "exit" => Input::Quit,
        "help" | "?" => Input::Help,
        _ if rest.is_empty() => Input::Command(Command::SelectCurrent(parse_option_label(word)?)),
        _ => return None,
    };
    Some(input)
}

const HELP: &str = "Answer with a letter (A, B, ...) or number (1, 2, ...).
Commands: next (>), prev (<), go N, flag (!), submit, quit, help (?)";

/// Prints the attempt to the terminal.
struct ConsoleObserver;

impl ConsoleObserver {
    fn render(attempt: &Attempt) {
        let prompt = view::prompt_view(attempt);
        let nav: String = view::navigator(attempt)
            .iter()
            .map(|mark| match mark {
                QuestionMark::Current => '>',
                QuestionMark::Answered => '#',
                QuestionMark::Flagged => '!',
                QuestionMark::Unanswered => '.',
            })
            .collect();

        println!();
        println!(
            "[{nav}] {}/{} answered | {} left",
            view::answered_count(attempt),
            attempt.len(),
            format_time(attempt.remaining_secs())
        );
        println!(
            "Question {} of {}{}",
            prompt.index + 1,
            prompt.total,
            if prompt.flagged { " (flagged)" } else { "" }
        );
        println!("{}", prompt.prompt);
        for (i, option) in prompt.options.iter().enumerate() {
            let marker = if prompt.selected == Some(i) { "*" } else { " " };
            println!(" {marker} {}) {option}", option_label(i));
        }
    }
}

impl SessionObserver for ConsoleObserver {
    fn on_change(&self, attempt: &Attempt) {
        Self::render(attempt);
    }

    fn on_tick(&self, attempt: &Attempt) {
        let remaining = attempt.remaining_secs();
        if remaining % 60 == 0 || remaining <= 10 {
            println!("  {} remaining", format_time(remaining));
        }
    }

    fn on_rejected(&self, error: &QuizError) {
        eprintln!("  ! {error}");
    }

    fn on_submitted(&self, outcome: &SubmitOutcome) {
        if outcome.trigger == SubmitTrigger::Timeout {
            println!("\nTime is up. Your answers were submitted automatically.");
        }
    }
}

/// Forward stdin lines to the session until EOF or `quit`.
fn spawn_input_reader(tx: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_input(&line) {
                Some(Input::Command(command)) => {
                    if tx.blocking_send(command).is_err() {
                        break;
                    }
                }
                Some(Input::Help) => println!("{HELP}"),
                Some(Input::Quit) => break,
                None => eprintln!("  ! unrecognized input '{}'; type help", line.trim()),
            }
        }
    });
}

pub async fn execute(
    test_id: String,
    user: Option<String>,
    review: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(user) = user {
        config.user.id = user;
    }

    let backends = create_backends(&config)?;
    let engine = QuizEngine::new(backends.store, backends.sink, config.engine_config());
    let identity = config.identity();

    let title = engine
        .store()
        .fetch_test(&test_id)
        .await
        .ok()
        .flatten()
        .map(|t| t.title)
        .unwrap_or_else(|| test_id.clone());

    let live = engine.start(&identity, &test_id).await?;
    println!(
        "{title}: {} questions, {} allowed. Type help for commands.",
        live.attempt().len(),
        format_time(live.attempt().allotted_secs())
    );

    let (tx, rx) = mpsc::channel(16);
    spawn_input_reader(tx);

    match live.run(rx, &ConsoleObserver).await {
        SessionOutcome::Abandoned { .. } => {
            println!("\nAttempt abandoned; nothing was recorded.");
        }
        SessionOutcome::Submitted(outcome) => {
            print_summary(&outcome);
            if let Some(e) = &outcome.sink_error {
                eprintln!("Warning: {e}");
            }
            if let Some(path) = review {
                let test = engine.store().fetch_test(&test_id).await.ok().flatten();
                let html = quizline_report::generate_review_html(&outcome.result, test.as_ref());
                quizline_report::write_html(&html, &path)?;
                println!("Review written to: {}", path.display());
            }
        }
    }

    Ok(())
}

fn print_summary(outcome: &SubmitOutcome) {
    let r = &outcome.result;

    let mut table = Table::new();
    table.set_header(vec!["Score", "Correct", "Incorrect", "Unanswered", "Time", "Result"]);
    table.add_row(vec![
        Cell::new(format!("{}%", r.percentage)),
        Cell::new(format!("{}/{}", r.correct_count, r.total_questions)),
        Cell::new(r.incorrect_count()),
        Cell::new(r.unanswered_count()),
        Cell::new(format_time(r.elapsed_secs)),
        Cell::new(if r.passed { "PASS" } else { "FAIL" }),
    ]);
    println!("\n{table}");

    if !r.strength_areas.is_empty() {
        println!("Strengths: {}", r.strength_areas.join(", "));
    }
    if !r.improvement_areas.is_empty() {
        println!("Needs work: {}", r.improvement_areas.join(", "));
    }
}
