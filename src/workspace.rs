//! Working-directory layout and bootstrap.
//!
//! ```text
//! <root>/data/
//!   ├─ pdfs/        input documents
//!   ├─ images/      <basename>/<basename>-NN.jpg, one folder per document
//!   └─ questions/   <basename>.json
//! ```
//!
//! [`WorkspacePaths`] maps the logical names above to absolute paths. It is
//! built once at startup and never mutated.

use crate::error::Pdf2QuizError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Logical name of the workspace root directory.
pub const DATA: &str = "data";
/// Logical name of the PDF input directory.
pub const PDFS: &str = "pdfs";
/// Logical name of the rendered-images directory.
pub const IMAGES: &str = "images";
/// Logical name of the generated-questions directory.
pub const QUESTIONS: &str = "questions";

/// Fixed mapping of logical directory names to filesystem locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    dirs: BTreeMap<&'static str, PathBuf>,
}

impl WorkspacePaths {
    /// Lay out the workspace under `root` (the `data` folder goes inside it).
    pub fn under(root: impl AsRef<Path>) -> Self {
        let data = root.as_ref().join("data");
        let dirs = BTreeMap::from([
            (PDFS, data.join("pdfs")),
            (IMAGES, data.join("images")),
            (QUESTIONS, data.join("questions")),
            (DATA, data),
        ]);
        Self { dirs }
    }

    /// Lay out the workspace under the current working directory.
    pub fn from_current_dir() -> Result<Self, Pdf2QuizError> {
        let wd = std::env::current_dir().map_err(|e| Pdf2QuizError::Workspace {
            path: PathBuf::from("."),
            source: e,
        })?;
        Ok(Self::under(wd))
    }

    /// Look up a directory by logical name.
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.dirs.get(name).map(PathBuf::as_path)
    }

    pub fn data(&self) -> &Path {
        &self.dirs[DATA]
    }

    pub fn pdfs(&self) -> &Path {
        &self.dirs[PDFS]
    }

    pub fn images(&self) -> &Path {
        &self.dirs[IMAGES]
    }

    pub fn questions(&self) -> &Path {
        &self.dirs[QUESTIONS]
    }

    /// Iterate `(logical name, path)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Path)> {
        self.dirs.iter().map(|(k, v)| (*k, v.as_path()))
    }

    /// Create every directory that does not exist yet.
    pub fn ensure(&self) -> Result<(), Pdf2QuizError> {
        ensure_dirs(self.dirs.values())
    }

    /// List every `.pdf` under the input folder, sorted by path.
    pub fn discover_pdfs(&self) -> Result<Vec<PathBuf>, Pdf2QuizError> {
        let dir = self.pdfs();
        let mut pdfs = Vec::new();

        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.map_err(|e| {
                let path = e.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
                Pdf2QuizError::Workspace {
                    path,
                    source: e.into(),
                }
            })?;
            if entry.file_type().is_file() && is_pdf(entry.path()) {
                pdfs.push(entry.into_path());
            }
        }

        pdfs.sort();
        debug!("Discovered {} PDFs in {}", pdfs.len(), dir.display());

        if pdfs.is_empty() {
            return Err(Pdf2QuizError::NoPdfsFound {
                dir: dir.to_path_buf(),
            });
        }
        Ok(pdfs)
    }
}

/// Create each directory if absent.
///
/// An existing directory counts as success; any other failure is returned
/// with the offending path attached. Parents are created as needed.
pub fn ensure_dirs<I, P>(dirs: I) -> Result<(), Pdf2QuizError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for dir in dirs {
        let dir = dir.as_ref();
        if dir.is_dir() {
            continue;
        }
        std::fs::create_dir_all(dir).map_err(|e| Pdf2QuizError::Workspace {
            path: dir.to_path_buf(),
            source: e,
        })?;
        info!("Created directory {}", dir.display());
    }
    Ok(())
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
