//! Terminal UI binary for pdf2quiz.
//!
//! Sets up the workspace, logging and configuration, then hands the
//! terminal to [`pdf2quiz::shell`]. Startup failures are fatal: the message
//! is printed, the user acknowledges it, and the process exits with code 1.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2quiz::{shell, QuizConfig, QuizGenerator, WorkspacePaths};
use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "pdf2quiz.log";

const AFTER_HELP: &str = r#"WORKSPACE (created in the current directory):
  data/pdfs/         put your PDFs here
  data/images/       rendered pages, one folder per PDF
  data/questions/    generated quizzes, <name>.json
  data/pdf2quiz.log  log file (level via RUST_LOG, default info)

ENVIRONMENT VARIABLES (a .env file in the current directory is read too):
  OPENAI_API         API key for the completion endpoint (required)
  QUESTION_AMOUNT    Questions per PDF, positive integer (default 50)
  OPENAI_MODEL       Vision model (default gpt-4o)

KEYS:
  ↑/↓ or j/k   move          Enter or 1-9   generate quiz
  q / Esc      quit          Ctrl-C         quit from any screen

REQUIREMENTS:
  pdftocairo (poppler-utils) must be on PATH.
"#;

/// Generate multiple-choice quizzes from PDFs using a vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2quiz",
    version,
    about = "Generate multiple-choice quizzes from PDFs using a vision LLM",
    long_about = "Pick a PDF from data/pdfs in a terminal UI; each page is rendered to JPEG, \
sent to a vision chat model, and the returned questions are saved to data/questions as JSON.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {}

#[tokio::main]
async fn main() {
    let _cli = Cli::parse();

    let (generator, pdfs) = match startup() {
        Ok(ready) => ready,
        Err(e) => fatal(&e),
    };

    if let Err(e) = shell::run(generator, pdfs)
        .await
        .context("Terminal UI failed")
    {
        fatal(&e);
    }
}

/// Bootstrap the workspace, logging and config; discover the PDFs.
fn startup() -> Result<(Arc<QuizGenerator>, Vec<PathBuf>)> {
    // ── Workspace ────────────────────────────────────────────────────────
    let workspace = WorkspacePaths::from_current_dir()?;
    workspace.ensure()?;

    // ── Logging setup ────────────────────────────────────────────────────
    // The terminal belongs to the UI, so logs go to a file.
    let log_path = workspace.data().join(LOG_FILE);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    // ── Config ───────────────────────────────────────────────────────────
    let config = QuizConfig::from_env()?;
    tracing::info!("Configuration: {:?}", config);

    // ── Inputs ───────────────────────────────────────────────────────────
    let pdfs = workspace.discover_pdfs()?;

    let generator =
        QuizGenerator::new(workspace, config).context("Failed to initialise HTTP client")?;
    Ok((Arc::new(generator), pdfs))
}

/// Report a fatal error, wait for the user to acknowledge it, exit 1.
fn fatal(err: &anyhow::Error) -> ! {
    tracing::error!("Fatal: {:#}", err);
    eprintln!("Error: {:#}", err);
    print!("Press any key to exit...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
    std::process::exit(1);
}
