//! Completion API interaction: build the chat request, send it, decode the
//! reply.
//!
//! ## Message Layout
//!
//! ```text
//! system: [text: question-format instruction]
//! user:   [text: "Generate N questions…", image_url, image_url, …]
//! ```
//!
//! Every page goes into one request so the model sees the whole document
//! when choosing what to ask about.
//!
//! ## Transport seam
//!
//! [`CompletionTransport`] is the only place that touches the network.
//! [`HttpTransport`] posts with reqwest; tests substitute a stub that
//! returns canned envelopes and counts calls.

use crate::config::QuizConfig;
use crate::error::Pdf2QuizError;
use crate::pipeline::encode::EncodedImage;
use crate::pipeline::postprocess::clean_json_reply;
use crate::prompts::{system_prompt, user_prompt};
use crate::question::{parse_questions, Question};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

// ── Request schema ───────────────────────────────────────────────────────

/// Chat-completions request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A content part: plain text or an inline image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: vec![ContentPart::Text { text: text.into() }],
        }
    }

    /// User message: the text first, then one `image_url` part per image.
    pub fn user_with_images(text: impl Into<String>, images: &[EncodedImage]) -> Self {
        let mut content = Vec::with_capacity(images.len() + 1);
        content.push(ContentPart::Text { text: text.into() });
        content.extend(images.iter().map(|img| ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: img.data_uri(),
            },
        }));
        Self {
            role: Role::User,
            content,
        }
    }
}

/// Assemble the request for `images` under `config`.
pub fn build_request(config: &QuizConfig, images: &[EncodedImage]) -> ChatRequest {
    ChatRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage::system(system_prompt(config.question_count)),
            ChatMessage::user_with_images(user_prompt(config.question_count), images),
        ],
    }
}

// ── Response schema ──────────────────────────────────────────────────────

/// Chat-completions response envelope. Only the first choice is used.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: AssistantMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub role: String,
    pub content: Option<String>,
}

/// Decode the envelope and the question array inside its first choice.
pub fn parse_response(body: &str) -> Result<Vec<Question>, Pdf2QuizError> {
    let envelope: ChatResponse = serde_json::from_str(body)
        .map_err(|e| Pdf2QuizError::ResponseParse(format!("response envelope: {e}")))?;

    let content = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Pdf2QuizError::ResponseParse("response has no choices".into()))?
        .message
        .content
        .ok_or_else(|| Pdf2QuizError::ResponseParse("first choice has no content".into()))?;

    parse_questions(&clean_json_reply(&content))
}

// ── Transport ────────────────────────────────────────────────────────────

/// Sends a [`ChatRequest`] and returns the raw response body.
///
/// Implementations must return [`Pdf2QuizError::ApiError`] for any non-2xx
/// status, carrying the status text and the body.
pub trait CompletionTransport: Send + Sync {
    fn send(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<String, Pdf2QuizError>> + Send;
}

/// reqwest-backed transport: JSON POST with bearer-token auth.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &QuizConfig) -> Result<Self, Pdf2QuizError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl CompletionTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<String, Pdf2QuizError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| Pdf2QuizError::Internal(format!("serialise request: {e}")))?;
        debug!("POST {} ({} bytes)", self.endpoint, body.len());

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Pdf2QuizError::ApiError {
                status: status.to_string(),
                body: text,
            });
        }
        Ok(text)
    }
}

/// Ask the model for questions about `images`.
pub async fn request_questions<T: CompletionTransport>(
    transport: &T,
    config: &QuizConfig,
    images: &[EncodedImage],
) -> Result<Vec<Question>, Pdf2QuizError> {
    let request = build_request(config, images);
    info!(
        "Requesting {} questions from {} with {} page images",
        config.question_count,
        config.model,
        images.len()
    );

    let body = transport.send(&request).await?;
    let questions = parse_response(&body)?;
    debug!("Model returned {} questions", questions.len());
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn image(b64: &str) -> EncodedImage {
        EncodedImage {
            path: PathBuf::from("p.jpg"),
            base64: b64.into(),
        }
    }

    /// Answer one HTTP request with `status` and `body`; yields the raw request.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..n]);
                if let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&raw[..end]).to_lowercase();
                    let len = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + len {
                        break;
                    }
                }
            }
            let reply = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&raw).into_owned()
        });
        (format!("http://{addr}/v1/chat/completions"), server)
    }

    fn local_config(endpoint: String) -> QuizConfig {
        QuizConfig::builder()
            .api_key("sk-local")
            .endpoint(endpoint)
            .question_count(2)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn http_transport_posts_with_bearer_and_json_headers() {
        let (endpoint, server) = serve_once("200 OK", r#"{"choices":[]}"#).await;
        let config = local_config(endpoint);
        let transport = HttpTransport::new(&config).unwrap();

        let body = transport
            .send(&build_request(&config, &[image("AAA")]))
            .await
            .unwrap();
        assert_eq!(body, r#"{"choices":[]}"#);

        let raw = server.await.unwrap();
        let lower = raw.to_lowercase();
        assert!(lower.starts_with("post /v1/chat/completions "), "{raw}");
        assert!(lower.contains("authorization: bearer sk-local"), "{raw}");
        assert!(lower.contains("content-type: application/json"), "{raw}");
        assert!(raw.contains("data:image/jpeg;base64,AAA"));
        assert!(!raw.split("\r\n\r\n").nth(1).unwrap_or("").contains("sk-local"));
    }

    #[tokio::test]
    async fn http_transport_maps_non_2xx_to_api_error() {
        let (endpoint, server) =
            serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let config = local_config(endpoint);
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport
            .send(&build_request(&config, &[image("AAA")]))
            .await
            .unwrap_err();
        match err {
            Pdf2QuizError::ApiError { status, body } => {
                assert_eq!(status, "500 Internal Server Error");
                assert_eq!(body, r#"{"error":"boom"}"#);
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[test]
    fn request_serialises_to_wire_shape() {
        let config = QuizConfig::builder().question_count(3).build().unwrap();
        let req = build_request(&config, &[image("AAA"), image("BBB")]);
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
        assert!(value["messages"][0]["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Generate 3 questions"));

        let user = &value["messages"][1];
        assert_eq!(user["role"], "user");
        assert_eq!(
            user["content"],
            json!([
                {"type": "text", "text": "Generate 3 questions from the given image(s)."},
                {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,AAA"}},
                {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,BBB"}},
            ])
        );
    }

    #[test]
    fn parse_first_choice() {
        let body = json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content":
                    r#"[{"id":0,"question":"Q?","options":{"A":"a","B":"b","C":"c","D":"d"},"answer":"A","hint":"because"}]"#}},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ]
        })
        .to_string();
        let qs = parse_response(&body).unwrap();
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].answer, "A");
        assert_eq!(qs[0].options["D"], "d");
    }

    #[test]
    fn parse_fenced_content() {
        let body = json!({"choices": [{"message": {"content": "```json\n[]\n```"}}]}).to_string();
        assert!(parse_response(&body).unwrap().is_empty());
    }

    #[test]
    fn parse_no_choices_is_error() {
        let err = parse_response(r#"{"choices":[]}"#).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn parse_null_content_is_error() {
        let err = parse_response(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap_err();
        assert!(matches!(err, Pdf2QuizError::ResponseParse(_)));
    }

    #[test]
    fn parse_garbage_is_error() {
        assert!(parse_response("<html>502</html>").is_err());
        let body = json!({"choices": [{"message": {"content": "Sure! Here are your questions"}}]})
            .to_string();
        assert!(parse_response(&body).is_err());
    }
}
