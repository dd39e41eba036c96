//! # pdf2quiz
//!
//! Turn PDF documents into multiple-choice quizzes with a vision-capable
//! chat model.
//!
//! ## Pipeline Overview
//!
//! ```text
//! data/pdfs/foo.pdf
//!  │
//!  ├─ 1. Render   pdftocairo -jpeg → data/images/foo/foo-N.jpg
//!  ├─ 2. Encode   JPEG → base64 data URI
//!  ├─ 3. Ask      one chat request: instructions + every page image
//!  ├─ 4. Decode   assistant content → Vec<Question>
//!  └─ 5. Write    data/questions/foo.json (pretty-printed)
//! ```
//!
//! Every step depends on the previous one; the first failure ends the job
//! and nothing is written. There are no retries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2quiz::{QuizConfig, QuizGenerator, WorkspacePaths};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let workspace = WorkspacePaths::from_current_dir()?;
//!     workspace.ensure()?;
//!
//!     // Reads OPENAI_API and QUESTION_AMOUNT (a local .env file works too)
//!     let config = QuizConfig::from_env()?;
//!     let generator = QuizGenerator::new(workspace, config)?;
//!
//!     let written = generator.run(Path::new("data/pdfs/lecture.pdf")).await?;
//!     println!("questions in {}", written.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Terminal UI ([`shell`]) and the `pdf2quiz` binary (clap + crossterm + anyhow + tracing-subscriber) |
//!
//! The rasterizer is poppler's `pdftocairo`, which must be on `PATH`.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod prompts;
pub mod question;
#[cfg(feature = "cli")]
pub mod shell;
pub mod workspace;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{QuizConfig, QuizConfigBuilder};
pub use error::Pdf2QuizError;
pub use generate::{generate_questions, questions_path, QuizGenerator};
pub use pipeline::llm::{ChatRequest, CompletionTransport, HttpTransport};
pub use pipeline::render::{render_document, PdfToCairo, Rasterizer};
pub use question::Question;
pub use workspace::WorkspacePaths;
