//! Input resolution: validate the selected PDF and derive its base name.
//!
//! The base name (file name without extension) keys everything downstream:
//! the image folder `images/<base>/`, the rasterizer prefix
//! `images/<base>/<base>` and the output file `questions/<base>.json`.

use crate::error::Pdf2QuizError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Base name of a document: the file name with its extension removed.
///
/// `"/data/pdfs/foo.pdf"` → `"foo"`, `"report.v2.pdf"` → `"report.v2"`.
pub fn document_stem(pdf_path: &Path) -> Result<String, Pdf2QuizError> {
    pdf_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Pdf2QuizError::FileNotFound {
            path: pdf_path.to_path_buf(),
        })
}

/// Check that `path` exists, is readable and starts with the `%PDF` magic.
///
/// Catching a renamed text file here yields a clear message instead of
/// whatever the rasterizer prints for it.
pub fn resolve_local(path: &Path) -> Result<PathBuf, Pdf2QuizError> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => Pdf2QuizError::Workspace {
            path: path.to_path_buf(),
            source: e,
        },
        _ => Pdf2QuizError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    // Files shorter than the magic keep zero padding in the reported bytes.
    let mut head = Vec::with_capacity(4);
    file.take(4)
        .read_to_end(&mut head)
        .map_err(|source| Pdf2QuizError::Workspace {
            path: path.to_path_buf(),
            source,
        })?;
    if head != b"%PDF" {
        let mut magic = [0u8; 4];
        magic[..head.len()].copy_from_slice(&head);
        return Err(Pdf2QuizError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path.to_path_buf())
}
