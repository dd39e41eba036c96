//! PDF rasterisation: hand the document to an external converter that writes
//! one JPEG per page.
//!
//! ## Why spawn_blocking?
//!
//! The converter is a child process we wait on synchronously, and a long
//! document can keep it busy for tens of seconds. `spawn_blocking` moves the
//! wait onto Tokio's blocking pool so the UI loop keeps animating.
//!
//! ## Output naming
//!
//! `pdftocairo -jpeg in.pdf images/foo/foo` writes `images/foo/foo-1.jpg`,
//! `foo-2.jpg`, … zero-padding the page number to the width of the page
//! count, so lexical order of the file names is page order.

use crate::error::Pdf2QuizError;
use crate::pipeline::input::document_stem;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info};

/// Something that turns a PDF into numbered JPEG files.
///
/// Implementations block until every page is written. The output files must
/// be named `<output_prefix>-<page>.jpg`.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, pdf_path: &Path, output_prefix: &Path) -> Result<(), Pdf2QuizError>;
}

/// Rasterizer backed by poppler's `pdftocairo`.
#[derive(Debug, Clone)]
pub struct PdfToCairo {
    program: String,
}

impl PdfToCairo {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments passed to the converter, in order.
    pub fn args(pdf_path: &Path, output_prefix: &Path) -> Vec<std::ffi::OsString> {
        vec![
            "-jpeg".into(),
            pdf_path.as_os_str().to_owned(),
            output_prefix.as_os_str().to_owned(),
        ]
    }
}

impl Default for PdfToCairo {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_RASTERIZER)
    }
}

impl Rasterizer for PdfToCairo {
    fn rasterize(&self, pdf_path: &Path, output_prefix: &Path) -> Result<(), Pdf2QuizError> {
        debug!("Running {} -jpeg {:?} {:?}", self.program, pdf_path, output_prefix);

        let output = Command::new(&self.program)
            .args(Self::args(pdf_path, output_prefix))
            .output()
            .map_err(|e| Pdf2QuizError::RasterizerUnavailable {
                program: self.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(Pdf2QuizError::RasterizerFailed {
                status: output.status.to_string(),
                output: combined.trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Rasterise `pdf_path` into `<images_root>/<basename>/`.
///
/// Creates the per-document folder if needed, then runs the rasterizer with
/// the prefix `<images_root>/<basename>/<basename>`. Returns the folder.
pub async fn render_document(
    pdf_path: &Path,
    images_root: &Path,
    rasterizer: Arc<dyn Rasterizer>,
) -> Result<PathBuf, Pdf2QuizError> {
    let path = pdf_path.to_path_buf();
    let root = images_root.to_path_buf();

    tokio::task::spawn_blocking(move || render_blocking(&path, &root, rasterizer.as_ref()))
        .await
        .map_err(|e| Pdf2QuizError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of [`render_document`].
fn render_blocking(
    pdf_path: &Path,
    images_root: &Path,
    rasterizer: &dyn Rasterizer,
) -> Result<PathBuf, Pdf2QuizError> {
    let base = document_stem(pdf_path)?;
    let folder = images_root.join(&base);

    if folder.is_dir() {
        debug!("Folder {} already exists", folder.display());
    } else {
        std::fs::create_dir_all(&folder).map_err(|e| Pdf2QuizError::Workspace {
            path: folder.clone(),
            source: e,
        })?;
        debug!("Created directory {}", folder.display());
    }

    rasterizer.rasterize(pdf_path, &folder.join(&base))?;
    info!("Rendered {} into {}", pdf_path.display(), folder.display());
    Ok(folder)
}
