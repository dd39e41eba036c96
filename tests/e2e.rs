//! End-to-end tests for pdf2quiz.
//!
//! Every test builds a throwaway workspace in a temp dir and drives a full
//! job with two stand-ins: a rasterizer that writes fake JPEGs instead of
//! running `pdftocairo`, and a transport that returns canned responses and
//! records what it was sent. No network or poppler install is needed.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use pdf2quiz::config::{API_KEY_VAR, QUESTION_AMOUNT_VAR};
use pdf2quiz::{
    ChatRequest, CompletionTransport, Pdf2QuizError, QuizConfig, QuizGenerator, Rasterizer,
    WorkspacePaths,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

const SAMPLE_CONTENT: &str = r#"[{"id":0,"question":"Q?","options":{"A":"a","B":"b","C":"c","D":"d"},"answer":"A","hint":"because"}]"#;

/// Writes `<prefix>-1.jpg` .. `<prefix>-N.jpg`.
struct StubRasterizer {
    pages: usize,
    calls: Arc<AtomicUsize>,
}

impl Rasterizer for StubRasterizer {
    fn rasterize(&self, _pdf: &Path, prefix: &Path) -> Result<(), Pdf2QuizError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for page in 1..=self.pages {
            std::fs::write(format!("{}-{page}.jpg", prefix.display()), [0xFF, 0xD8, 0xFF, 0xE0])
                .expect("write fake page");
        }
        Ok(())
    }
}

struct BrokenRasterizer;

impl Rasterizer for BrokenRasterizer {
    fn rasterize(&self, _pdf: &Path, _prefix: &Path) -> Result<(), Pdf2QuizError> {
        Err(Pdf2QuizError::RasterizerFailed {
            status: "exit status: 99".into(),
            output: "Syntax Error: broken xref".into(),
        })
    }
}

/// Canned reply for every request.
#[derive(Clone)]
enum Reply {
    Body(String),
    Status(String, String),
}

#[derive(Clone)]
struct StubTransport {
    reply: Reply,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl StubTransport {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn ok(content: &str) -> Self {
        Self::new(Reply::Body(envelope(content)))
    }
}

impl CompletionTransport for StubTransport {
    async fn send(&self, request: &ChatRequest) -> Result<String, Pdf2QuizError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push(serde_json::to_value(request).unwrap());
        match &self.reply {
            Reply::Body(body) => Ok(body.clone()),
            Reply::Status(status, body) => Err(Pdf2QuizError::ApiError {
                status: status.clone(),
                body: body.clone(),
            }),
        }
    }
}

fn envelope(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

/// Temp workspace containing `data/pdfs/sample.pdf`.
fn sample_workspace() -> (TempDir, WorkspacePaths, PathBuf) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let ws = WorkspacePaths::under(tmp.path());
    ws.ensure().expect("bootstrap");
    let pdf = ws.pdfs().join("sample.pdf");
    std::fs::write(&pdf, b"%PDF-1.4\n%stub\n").expect("write pdf");
    (tmp, ws, pdf)
}

fn config() -> QuizConfig {
    QuizConfig::builder()
        .api_key("sk-test")
        .build()
        .expect("valid config")
}

fn generator(
    ws: &WorkspacePaths,
    config: QuizConfig,
    pages: usize,
    transport: StubTransport,
) -> (QuizGenerator<StubTransport>, Arc<AtomicUsize>) {
    let raster_calls = Arc::new(AtomicUsize::new(0));
    let rasterizer = Arc::new(StubRasterizer {
        pages,
        calls: Arc::clone(&raster_calls),
    });
    (
        QuizGenerator::with_parts(ws.clone(), config, rasterizer, transport),
        raster_calls,
    )
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sample_pdf_end_to_end() {
    let (_tmp, ws, pdf) = sample_workspace();
    let transport = StubTransport::ok(SAMPLE_CONTENT);
    let (gen, raster_calls) = generator(&ws, config(), 1, transport.clone());

    let written = gen.run(&pdf).await.expect("job should succeed");

    assert_eq!(written, ws.questions().join("sample.json"));
    assert!(ws.images().join("sample").join("sample-1.jpg").exists());
    assert_eq!(raster_calls.load(Ordering::SeqCst), 1);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

    let expected = r#"[
  {
    "id": 0,
    "question": "Q?",
    "options": {
      "A": "a",
      "B": "b",
      "C": "c",
      "D": "d"
    },
    "answer": "A",
    "hint": "because"
  }
]"#;
    let actual = std::fs::read_to_string(&written).expect("output file");
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_request_carries_every_page_and_auth_free_body() {
    let (_tmp, ws, pdf) = sample_workspace();
    let transport = StubTransport::ok("[]");
    let (gen, _) = generator(&ws, config(), 3, transport.clone());

    gen.run(&pdf).await.expect("job should succeed");

    let requests = transport.requests.lock().unwrap();
    let req = &requests[0];
    assert_eq!(req["model"], "gpt-4o");
    assert_eq!(req["messages"].as_array().unwrap().len(), 2);
    assert_eq!(req["messages"][0]["role"], "system");

    let user_parts = req["messages"][1]["content"].as_array().unwrap();
    assert_eq!(user_parts.len(), 4, "text + 3 images");
    assert_eq!(user_parts[0]["type"], "text");
    for part in &user_parts[1..] {
        assert_eq!(part["type"], "image_url");
        assert!(part["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
    }
    // The credential travels in the header, never in the body.
    assert!(!req.to_string().contains("sk-test"));
}

#[tokio::test]
async fn test_question_amount_reaches_prompt() {
    let (_tmp, ws, pdf) = sample_workspace();
    let config = QuizConfig::from_lookup(|name| match name {
        n if n == API_KEY_VAR => Some("sk-test".into()),
        n if n == QUESTION_AMOUNT_VAR => Some("10".into()),
        _ => None,
    })
    .expect("valid env");
    let transport = StubTransport::ok("[]");
    let (gen, _) = generator(&ws, config, 1, transport.clone());

    gen.run(&pdf).await.expect("job should succeed");

    let requests = transport.requests.lock().unwrap();
    let system = requests[0]["messages"][0]["content"][0]["text"].as_str().unwrap();
    let user = requests[0]["messages"][1]["content"][0]["text"].as_str().unwrap();
    assert!(system.starts_with("Generate 10 questions"), "got: {system}");
    assert_eq!(user, "Generate 10 questions from the given image(s).");
}

#[test]
fn test_invalid_question_amount_fails_before_any_job() {
    let err = QuizConfig::from_lookup(|name| match name {
        n if n == API_KEY_VAR => Some("sk-test".into()),
        n if n == QUESTION_AMOUNT_VAR => Some("abc".into()),
        _ => None,
    })
    .unwrap_err();
    assert!(matches!(err, Pdf2QuizError::InvalidQuestionCount { .. }));
}

#[tokio::test]
async fn test_missing_credential_makes_no_request() {
    let (_tmp, ws, pdf) = sample_workspace();
    let no_key = QuizConfig::builder().build().expect("valid config");
    let transport = StubTransport::ok(SAMPLE_CONTENT);
    let (gen, _) = generator(&ws, no_key.clone(), 1, transport.clone());

    let err = gen.run(&pdf).await.unwrap_err();
    assert!(matches!(err, Pdf2QuizError::MissingCredential { .. }), "got {err:?}");

    let direct = pdf2quiz::generate_questions(ws.images(), ws.questions(), &pdf, &no_key, &transport)
        .await
        .unwrap_err();
    assert!(matches!(direct, Pdf2QuizError::MissingCredential { .. }));

    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    assert!(!ws.questions().join("sample.json").exists());
}

#[tokio::test]
async fn test_non_2xx_leaves_output_untouched() {
    let (_tmp, ws, pdf) = sample_workspace();
    let out = ws.questions().join("sample.json");
    std::fs::write(&out, "previous quiz").unwrap();

    let transport = StubTransport::new(Reply::Status(
        "429 Too Many Requests".into(),
        r#"{"error":{"message":"Rate limit reached"}}"#.into(),
    ));
    let (gen, _) = generator(&ws, config(), 1, transport.clone());

    let err = gen.run(&pdf).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("429 Too Many Requests"), "got: {msg}");
    assert!(msg.contains("Rate limit reached"), "got: {msg}");
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "previous quiz");
}

#[tokio::test]
async fn test_non_2xx_creates_no_output() {
    let (_tmp, ws, pdf) = sample_workspace();
    let transport = StubTransport::new(Reply::Status("500 Internal Server Error".into(), String::new()));
    let (gen, _) = generator(&ws, config(), 1, transport);

    assert!(gen.run(&pdf).await.is_err());
    assert_eq!(std::fs::read_dir(ws.questions()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_malformed_content_writes_nothing() {
    let (_tmp, ws, pdf) = sample_workspace();
    let transport = StubTransport::ok("I'm sorry, I can't help with that.");
    let (gen, _) = generator(&ws, config(), 1, transport);

    let err = gen.run(&pdf).await.unwrap_err();
    assert!(matches!(err, Pdf2QuizError::ResponseParse(_)));
    assert!(!ws.questions().join("sample.json").exists());
}

#[tokio::test]
async fn test_rasterizer_failure_stops_job() {
    let (_tmp, ws, pdf) = sample_workspace();
    let transport = StubTransport::ok(SAMPLE_CONTENT);
    let gen = QuizGenerator::with_parts(ws.clone(), config(), Arc::new(BrokenRasterizer), transport.clone());

    let err = gen.run(&pdf).await.unwrap_err();
    assert!(err.to_string().contains("broken xref"));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    assert!(!ws.questions().join("sample.json").exists());
}

#[tokio::test]
async fn test_not_a_pdf_is_rejected_before_render() {
    let (_tmp, ws, _) = sample_workspace();
    let bogus = ws.pdfs().join("bogus.pdf");
    std::fs::write(&bogus, b"PK\x03\x04zip").unwrap();
    let (gen, raster_calls) = generator(&ws, config(), 1, StubTransport::ok("[]"));

    let err = gen.run(&bogus).await.unwrap_err();
    assert!(matches!(err, Pdf2QuizError::NotAPdf { .. }));
    assert_eq!(raster_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rerun_overwrites_previous_quiz() {
    let (_tmp, ws, pdf) = sample_workspace();

    let (first, _) = generator(&ws, config(), 1, StubTransport::ok(SAMPLE_CONTENT));
    let path = first.run(&pdf).await.unwrap();

    let (second, _) = generator(&ws, config(), 1, StubTransport::ok("[]"));
    assert_eq!(second.run(&pdf).await.unwrap(), path);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
}

#[test]
fn test_workspace_discovery_after_bootstrap() {
    let (_tmp, ws, pdf) = sample_workspace();
    ws.ensure().expect("second bootstrap is harmless");
    assert_eq!(ws.discover_pdfs().unwrap(), vec![pdf]);
}

#[cfg(feature = "cli")]
#[tokio::test]
async fn test_shell_job_outcomes() {
    use pdf2quiz::shell::run_job;
    use pdf2quiz::shell::state::JobOutcome;

    let (_tmp, ws, pdf) = sample_workspace();

    let (ok_gen, _) = generator(&ws, config(), 1, StubTransport::ok(SAMPLE_CONTENT));
    assert_eq!(
        run_job(&ok_gen, &pdf).await,
        JobOutcome::Success(ws.questions().join("sample.json"))
    );

    let failing = StubTransport::new(Reply::Status("401 Unauthorized".into(), "bad key".into()));
    let (bad_gen, _) = generator(&ws, config(), 1, failing);
    match run_job(&bad_gen, &pdf).await {
        JobOutcome::Failure(msg) => assert!(msg.contains("401 Unauthorized")),
        other => panic!("expected failure, got {other:?}"),
    }
}
