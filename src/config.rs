//! Configuration for quiz generation.
//!
//! Every knob lives in [`QuizConfig`], built through [`QuizConfigBuilder`].
//! The binary fills it from the environment with [`QuizConfig::from_env`];
//! library callers and tests use the builder directly.
//!
//! # Environment
//!
//! | Variable | Required | Meaning |
//! |----------|----------|---------|
//! | `OPENAI_API` | yes | Bearer token for the completion endpoint |
//! | `QUESTION_AMOUNT` | no | Questions per PDF, positive integer (default 50) |
//! | `OPENAI_MODEL` | no | Model identifier (default `gpt-4o`) |
//!
//! A `.env` file in the working directory is read first, so the variables
//! can live there instead of the shell profile.

use crate::error::Pdf2QuizError;
use std::fmt;

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "OPENAI_API";

/// Environment variable overriding the number of questions.
pub const QUESTION_AMOUNT_VAR: &str = "QUESTION_AMOUNT";

/// Environment variable overriding the model identifier.
pub const MODEL_VAR: &str = "OPENAI_MODEL";

/// Questions requested when `QUESTION_AMOUNT` is unset.
pub const DEFAULT_QUESTION_COUNT: u32 = 50;

/// Vision-capable model used when `OPENAI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Chat-completions endpoint every request is posted to.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// External PDF rasterizer (poppler-utils).
pub const DEFAULT_RASTERIZER: &str = "pdftocairo";

/// Configuration for one or more quiz-generation jobs.
///
/// # Example
/// ```rust
/// use pdf2quiz::QuizConfig;
///
/// let config = QuizConfig::builder()
///     .api_key("sk-test")
///     .question_count(10)
///     .build()
///     .unwrap();
/// assert_eq!(config.question_count, 10);
/// ```
#[derive(Clone)]
pub struct QuizConfig {
    /// Bearer token sent with every request. Empty means "not configured";
    /// generation refuses to start without it.
    pub api_key: String,

    /// Number of questions the model is asked for. Default: 50.
    pub question_count: u32,

    /// Model identifier placed in the request body. Default: `gpt-4o`.
    pub model: String,

    /// Full URL of the chat-completions endpoint.
    pub endpoint: String,

    /// Program invoked to rasterize PDFs. Default: `pdftocairo`.
    pub rasterizer: String,

    /// Timeout for the whole completion request in seconds. Default: 300.
    ///
    /// A single request carries every page of the document, so responses
    /// for long PDFs take minutes rather than seconds.
    pub api_timeout_secs: u64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            question_count: DEFAULT_QUESTION_COUNT,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            rasterizer: DEFAULT_RASTERIZER.to_string(),
            api_timeout_secs: 300,
        }
    }
}

// Never print the credential.
impl fmt::Debug for QuizConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("question_count", &self.question_count)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("rasterizer", &self.rasterizer)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl QuizConfig {
    /// Create a new builder for `QuizConfig`.
    pub fn builder() -> QuizConfigBuilder {
        QuizConfigBuilder {
            config: Self::default(),
        }
    }

    /// Load `.env` (if present) and resolve the configuration from the
    /// process environment.
    pub fn from_env() -> Result<Self, Pdf2QuizError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => tracing::debug!("No .env file, using process environment"),
            Err(e) => {
                return Err(Pdf2QuizError::InvalidConfig(format!(
                    "failed to read .env file: {e}"
                )))
            }
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve the configuration through an arbitrary variable lookup.
    ///
    /// Fails fast on a missing or empty credential and on a question count
    /// that is not a positive integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Pdf2QuizError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|k| !k.trim().is_empty())
            .ok_or(Pdf2QuizError::MissingCredential { var: API_KEY_VAR })?;

        let question_count = match lookup(QUESTION_AMOUNT_VAR) {
            Some(raw) if !raw.is_empty() => parse_question_count(&raw)?,
            _ => DEFAULT_QUESTION_COUNT,
        };

        let mut builder = Self::builder()
            .api_key(api_key)
            .question_count(question_count);

        if let Some(model) = lookup(MODEL_VAR).filter(|m| !m.is_empty()) {
            builder = builder.model(model);
        }

        builder.build()
    }
}

/// Parse a question count; only positive integers are accepted.
pub fn parse_question_count(raw: &str) -> Result<u32, Pdf2QuizError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Pdf2QuizError::InvalidQuestionCount {
            value: raw.to_string(),
        }),
    }
}

/// Builder for [`QuizConfig`].
#[derive(Debug)]
pub struct QuizConfigBuilder {
    config: QuizConfig,
}

impl QuizConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn question_count(mut self, n: u32) -> Self {
        self.config.question_count = n;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn rasterizer(mut self, program: impl Into<String>) -> Self {
        self.config.rasterizer = program.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// The credential is deliberately not checked here; generation checks
    /// it before contacting the endpoint.
    pub fn build(self) -> Result<QuizConfig, Pdf2QuizError> {
        let c = &self.config;
        if c.question_count == 0 {
            return Err(Pdf2QuizError::InvalidQuestionCount {
                value: "0".into(),
            });
        }
        if c.model.trim().is_empty() {
            return Err(Pdf2QuizError::InvalidConfig("model must not be empty".into()));
        }
        if !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://")) {
            return Err(Pdf2QuizError::InvalidConfig(format!(
                "endpoint must be an HTTP(S) URL, got {:?}",
                c.endpoint
            )));
        }
        if c.rasterizer.trim().is_empty() {
            return Err(Pdf2QuizError::InvalidConfig(
                "rasterizer program must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
