//! Error types for the pdf2quiz library.
//!
//! A single [`Pdf2QuizError`] covers every failure. The binary sorts them
//! into two tiers by *where* they happen, not by variant:
//!
//! * **Startup** — workspace, configuration and discovery errors. The
//!   process prints the message and exits.
//! * **Job** — rasterizer, network, API and parsing errors raised while a
//!   selected PDF is processed. They are shown on the result screen and
//!   the UI returns to the PDF list.
//!
//! Nothing is retried and nothing is written on failure, so every variant
//! is terminal for the operation that produced it.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2quiz library.
#[derive(Debug, Error)]
pub enum Pdf2QuizError {
    // ── Workspace errors ──────────────────────────────────────────────────
    /// A working directory could not be created or inspected.
    #[error("Failed to create directory '{path}': {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PDF input folder is empty.
    #[error("No PDFs found in '{dir}' folder")]
    NoPdfsFound { dir: PathBuf },

    /// The selected PDF disappeared or cannot be opened.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The selected file exists but does not start with `%PDF`.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Config errors ─────────────────────────────────────────────────────
    /// The API credential is not set or is empty.
    #[error("{var} is not set or is empty, please check the \".env\" file")]
    MissingCredential { var: &'static str },

    /// The question count is not a positive integer.
    #[error("Question amount {value:?} is not a positive integer")]
    InvalidQuestionCount { value: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Rasterizer errors ─────────────────────────────────────────────────
    /// The rasterizer program could not be started (usually not installed).
    #[error("Failed to run '{program}': {source}\nIs poppler-utils installed?")]
    RasterizerUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The rasterizer exited with a non-zero status.
    #[error("Failed to convert PDF to images: {status}, output: {output}")]
    RasterizerFailed { status: String, output: String },

    /// A rendered page image could not be read back.
    #[error("Failed to read page image '{path}': {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rasterizer produced no JPEG files for this document.
    #[error("No page images found in '{dir}'")]
    NoPageImages { dir: PathBuf },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// Transport-level failure: DNS, TLS, connection reset, timeout.
    #[error("Request to completion endpoint failed: {0}")]
    Http(String),

    /// The endpoint answered with a non-2xx status.
    #[error("API request failed with status: {status:?}, body: {body}")]
    ApiError { status: String, body: String },

    /// The response envelope or the question array could not be decoded.
    #[error("Failed to parse completion response: {0}")]
    ResponseParse(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write the questions file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for Pdf2QuizError {
    fn from(e: reqwest::Error) -> Self {
        Pdf2QuizError::Http(e.to_string())
    }
}
