//! The durable output record.

use crate::error::Pdf2QuizError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One multiple-choice question as returned by the model.
///
/// `answer` is expected to be a key of `options`. Questions that break this
/// are still written; generation logs a warning for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Zero-based position in the quiz.
    pub id: i64,
    pub question: String,
    /// Option label (`"A"`..`"D"`) to option text. Ordered by label.
    pub options: BTreeMap<String, String>,
    /// Label of the correct option.
    pub answer: String,
    /// Why the answer is correct.
    pub hint: String,
}

impl Question {
    /// Whether `answer` names one of the options.
    pub fn answer_is_valid(&self) -> bool {
        self.options.contains_key(&self.answer)
    }
}

/// Decode a JSON array of questions.
pub fn parse_questions(json: &str) -> Result<Vec<Question>, Pdf2QuizError> {
    serde_json::from_str(json)
        .map_err(|e| Pdf2QuizError::ResponseParse(format!("question list: {e}")))
}

/// Write `questions` as pretty-printed JSON, replacing `path` atomically.
///
/// The array is written to a temp file in the same directory and renamed
/// over the target, so readers never see a half-written quiz.
pub fn write_questions(path: &Path, questions: &[Question]) -> Result<(), Pdf2QuizError> {
    let write_err = |source| Pdf2QuizError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(questions)
        .map_err(|e| Pdf2QuizError::Internal(format!("serialise questions: {e}")))?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(json.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    info!("Wrote {} questions to {}", questions.len(), path.display());
    Ok(())
}
