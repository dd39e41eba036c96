//! Quiz generation entry points.
//!
//! [`generate_questions`] is the synthesis step on its own: it expects the
//! page images to exist already. [`QuizGenerator::run`] is a full job:
//! render, then synthesize, strictly in that order.
//!
//! Nothing is written until the model's reply has been decoded, so a failed
//! job leaves any previous `<name>.json` untouched.

use crate::config::QuizConfig;
use crate::error::Pdf2QuizError;
use crate::pipeline::llm::{request_questions, CompletionTransport, HttpTransport};
use crate::pipeline::render::{render_document, PdfToCairo, Rasterizer};
use crate::pipeline::{encode, input};
use crate::question::{write_questions, Question};
use crate::workspace::WorkspacePaths;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Where the questions for `pdf_path` are written: `<questions_dir>/<base>.json`.
pub fn questions_path(questions_dir: &Path, pdf_path: &Path) -> Result<PathBuf, Pdf2QuizError> {
    let base = input::document_stem(pdf_path)?;
    Ok(questions_dir.join(format!("{base}.json")))
}

/// Generate questions from the already-rendered pages of `pdf_path`.
///
/// Reads `<images_root>/<base>/*.jpg`, asks the model for
/// `config.question_count` questions and writes them to
/// `<questions_dir>/<base>.json`, replacing any previous file.
///
/// # Errors
/// - [`Pdf2QuizError::MissingCredential`] before any I/O if `config.api_key`
///   is empty
/// - image read, transport, API status and parse errors otherwise
pub async fn generate_questions<T: CompletionTransport>(
    images_root: &Path,
    questions_dir: &Path,
    pdf_path: &Path,
    config: &QuizConfig,
    transport: &T,
) -> Result<Vec<Question>, Pdf2QuizError> {
    if config.api_key.trim().is_empty() {
        return Err(Pdf2QuizError::MissingCredential {
            var: crate::config::API_KEY_VAR,
        });
    }

    let base = input::document_stem(pdf_path)?;
    let output_path = questions_path(questions_dir, pdf_path)?;

    let images = encode::encode_page_images(&images_root.join(&base)).await?;
    let questions = request_questions(transport, config, &images).await?;

    let unanswerable = questions.iter().filter(|q| !q.answer_is_valid()).count();
    if unanswerable > 0 {
        warn!("{unanswerable} questions name an answer that is not among their options");
    }

    write_questions(&output_path, &questions)?;
    Ok(questions)
}

/// Runs render-then-synthesize jobs against one workspace.
pub struct QuizGenerator<T = HttpTransport> {
    workspace: WorkspacePaths,
    config: QuizConfig,
    rasterizer: Arc<dyn Rasterizer>,
    transport: T,
}

impl QuizGenerator<HttpTransport> {
    /// Generator using `pdftocairo` and the reqwest transport.
    pub fn new(workspace: WorkspacePaths, config: QuizConfig) -> Result<Self, Pdf2QuizError> {
        let transport = HttpTransport::new(&config)?;
        let rasterizer = Arc::new(PdfToCairo::new(config.rasterizer.clone()));
        Ok(Self::with_parts(workspace, config, rasterizer, transport))
    }
}

impl<T: CompletionTransport> QuizGenerator<T> {
    /// Generator with caller-supplied collaborators.
    pub fn with_parts(
        workspace: WorkspacePaths,
        config: QuizConfig,
        rasterizer: Arc<dyn Rasterizer>,
        transport: T,
    ) -> Self {
        Self {
            workspace,
            config,
            rasterizer,
            transport,
        }
    }

    pub fn workspace(&self) -> &WorkspacePaths {
        &self.workspace
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// Render `pdf_path`, then generate and write its questions.
    ///
    /// Returns the path of the written JSON file.
    pub async fn run(&self, pdf_path: &Path) -> Result<PathBuf, Pdf2QuizError> {
        let start = Instant::now();
        info!("Starting job: {}", pdf_path.display());

        let pdf = input::resolve_local(pdf_path)?;

        // ── Step 1: Rasterise ────────────────────────────────────────────
        render_document(&pdf, self.workspace.images(), Arc::clone(&self.rasterizer)).await?;

        // ── Step 2: Synthesize ───────────────────────────────────────────
        let questions = generate_questions(
            self.workspace.images(),
            self.workspace.questions(),
            &pdf,
            &self.config,
            &self.transport,
        )
        .await?;

        let output = questions_path(self.workspace.questions(), &pdf)?;
        info!(
            "Job complete: {} questions → {} in {}ms",
            questions.len(),
            output.display(),
            start.elapsed().as_millis()
        );
        Ok(output)
    }
}
