use std::io;

use async_stream::try_stream;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::{Client, StatusCode};
use tokio::io::AsyncBufReadExt;
use tokio_stream::wrappers::LinesStream;
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

use super::types::{
    ApiError, ChatCompletionChunk, ChatCompletionRequest, ChatMessage, ErrorResponse,
};

const API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("OPENAI_API_KEY not set. Create one at https://platform.openai.com/api-keys")]
    ApiKeyNotSet,

    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("API quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed completion stream: {0}")]
    Stream(String),
}

/// Streaming chat completion.
/// Implemented by `OpenAiClient` for production; scripted mocks used in tests.
pub trait ChatModel: Send + Sync {
    /// Stream the assistant reply as text deltas, in arrival order.
    fn stream_chat(&self, messages: Vec<ChatMessage>) -> BoxStream<'_, Result<String, ChatError>>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Clone, Debug)]
pub struct OpenAiClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    /// The key is handed in by the caller; this client never reads the environment.
    pub fn new(http: Client, api_key: &str, model: &str) -> Result<Self, ChatError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ChatError::ApiKeyNotSet);
        }
        let model = match model.trim() {
            "" => DEFAULT_MODEL,
            m => m,
        };
        Ok(Self {
            http,
            api_key: ApiKey(api_key.to_string()),
            model: model.to_string(),
            base_url: API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn open_stream(&self, messages: &[ChatMessage]) -> Result<reqwest::Response, ChatError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            stream: true,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(model = %self.model, "completion stream opened");
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body_error = serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .and_then(|body| body.error);
        let classified = match body_error {
            Some(err) => classify_api_error(status, &err),
            None if status == StatusCode::TOO_MANY_REQUESTS => ChatError::RateLimited,
            None => {
                let end = text.floor_char_boundary(200);
                ChatError::Api {
                    code: status.as_u16(),
                    message: format!("HTTP {status}: {}", &text[..end]),
                }
            }
        };
        warn!(error = %classified, "OpenAI API error");
        Err(classified)
    }
}

impl ChatModel for OpenAiClient {
    fn stream_chat(&self, messages: Vec<ChatMessage>) -> BoxStream<'_, Result<String, ChatError>> {
        Box::pin(try_stream! {
            let response = self.open_stream(&messages).await?;
            let body = response.bytes_stream().map(|chunk| chunk.map_err(io::Error::other));
            let mut lines = LinesStream::new(StreamReader::new(body).lines());

            while let Some(line) = lines.next().await {
                let line = line.map_err(|e| ChatError::Stream(e.to_string()))?;
                match parse_sse_line(&line)? {
                    SseLine::Delta(text) => {
                        yield text;
                    }
                    SseLine::Done => break,
                    SseLine::Skip => {}
                }
            }
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SseLine {
    Delta(String),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> Result<SseLine, ChatError> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }
    if data.is_empty() {
        return Ok(SseLine::Skip);
    }

    let chunk: ChatCompletionChunk =
        serde_json::from_str(data).map_err(|e| ChatError::Stream(e.to_string()))?;
    if let Some(err) = chunk.error {
        let message = err.message.unwrap_or_else(|| "stream error event".into());
        return Err(ChatError::Stream(message));
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .filter(|text| !text.is_empty())
        .map_or(SseLine::Skip, SseLine::Delta))
}

fn classify_api_error(status: StatusCode, err: &ApiError) -> ChatError {
    let message = err
        .message
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());

    match (status.as_u16(), err.kind.as_deref()) {
        (429, Some("insufficient_quota")) => ChatError::QuotaExhausted(message),
        (429, _) => ChatError::RateLimited,
        (code, _) => ChatError::Api { code, message },
    }
}
