//! quizline CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizline", version, about = "Timed quiz and practice-exam engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a timed test interactively
    Take {
        /// Test identifier
        test_id: String,

        /// Take the test as this user instead of the configured one
        #[arg(long)]
        user: Option<String>,

        /// Write an HTML review of the graded attempt to this path
        #[arg(long)]
        review: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List tests available in the content store
    List {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to a question bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Show a user's recorded results
    History {
        /// User to show (defaults to the configured user)
        #[arg(long)]
        user: Option<String>,

        /// Output format: text, json, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Output file for the html format
        #[arg(long, default_value = "quizline-history.html")]
        output: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Review a saved result file
    Review {
        /// Path to a result JSON file
        result: PathBuf,

        /// Output format: text, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizline=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            test_id,
            user,
            review,
            config,
        } => commands::take::execute(test_id, user, review, config).await,
        Commands::List { config } => commands::list::execute(config).await,
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::History {
            user,
            format,
            output,
            config,
        } => commands::history::execute(user, format, output, config).await,
        Commands::Review {
            result,
            format,
            output,
        } => commands::review::execute(result, format, output),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
