//! Image encoding: rendered JPEG files → base64 data URIs.
//!
//! The completion API takes images inline as `data:` URIs inside the JSON
//! body. The rasterizer already produced JPEG, so the bytes are sent as-is
//! without re-encoding.

use crate::error::Pdf2QuizError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// MIME type of every page image we attach.
pub const JPEG_MIME: &str = "image/jpeg";

/// One page image, base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub path: PathBuf,
    pub base64: String,
}

impl EncodedImage {
    /// `data:image/jpeg;base64,...` form accepted by `image_url` parts.
    pub fn data_uri(&self) -> String {
        format!("data:{JPEG_MIME};base64,{}", self.base64)
    }
}

/// List the `.jpg` files in `dir`, sorted by file name.
pub async fn list_page_images(dir: &Path) -> Result<Vec<PathBuf>, Pdf2QuizError> {
    let read_err = |source| Pdf2QuizError::ImageRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
    let mut images = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "jpg") {
            images.push(path);
        } else {
            warn!("Skipping non-JPEG file {}", path.display());
        }
    }
    images.sort();
    Ok(images)
}

/// Read and base64-encode every page image of a rendered document.
///
/// An empty folder is an error: a request without images would make the
/// model invent questions from nothing.
pub async fn encode_page_images(dir: &Path) -> Result<Vec<EncodedImage>, Pdf2QuizError> {
    let paths = list_page_images(dir).await?;
    if paths.is_empty() {
        return Err(Pdf2QuizError::NoPageImages {
            dir: dir.to_path_buf(),
        });
    }

    let mut encoded = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| Pdf2QuizError::ImageRead {
                path: path.clone(),
                source,
            })?;
        let base64 = STANDARD.encode(&bytes);
        debug!("Encoded {} → {} bytes base64", path.display(), base64.len());
        encoded.push(EncodedImage { path, base64 });
    }
    Ok(encoded)
}
