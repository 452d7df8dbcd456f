//! The `quizline init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizline.toml").exists() {
        println!("quizline.toml already exists, skipping.");
    } else {
        std::fs::write("quizline.toml", SAMPLE_CONFIG)?;
        println!("Created quizline.toml");
    }

    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizline.toml to set your user id");
    println!("  2. Run: quizline validate --bank banks/example.toml");
    println!("  3. Run: quizline take example");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizline configuration

results_dir = "./quizline-results"
default_time_limit_secs = 1800
passing_score = 70

[store]
type = "directory"
path = "./banks"

# Remote store instead of local banks:
# [store]
# type = "http"
# base_url = "https://quiz.example.com/api"
# api_key = "${QUIZLINE_API_KEY}"

[user]
id = "${USER}"
tier = "free"
"#;

const EXAMPLE_BANK: &str = r#"[test]
id = "example"
title = "Example Test"
description = "A short test to get started"
tier = "free"
time_limit_minutes = 5
passing_score = 60
category = "general"
difficulty = "easy"
question_count = 3

[[questions]]
id = "capital"
prompt = "What is the capital of France?"
options = ["Berlin", "Paris", "Madrid", "Rome"]
correct = 1
explanation = "Paris has been the capital of France since 987."
category = "geography"

[[questions]]
id = "planets"
prompt = "How many planets are in the Solar System?"
options = ["Seven", "Eight", "Nine"]
correct = 1
explanation = "Pluto was reclassified as a dwarf planet in 2006."
category = "science"

[[questions]]
id = "boiling"
prompt = "At sea level, water boils at which temperature?"
options = ["90 C", "100 C", "110 C"]
correct = 1
category = "science"
"#;
