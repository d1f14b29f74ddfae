//! OpenAI-compatible chat completions adapter.
//!
//! Sends one `POST /chat/completions` per turn and returns
//! `choices[0].message.content`. No retries; the scheduler decides what a
//! failed turn means.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::HeaderValue};
use roundtable_application::ports::completion::{
    CompletionClient, CompletionError, CompletionOptions,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://api.asi1.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "asi1-mini";

/// Completion client for any endpoint speaking the chat completions format
#[derive(Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Replace the underlying HTTP client (proxies, TLS roots, pools)
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(&self, body: &ChatCompletionRequest<'_>) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, body_text, retry_after));
        }

        let body_text = response.text().await.map_err(map_transport_error)?;
        extract_text_response(&body_text)
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionsClient {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream: false,
        };

        debug!(
            "POST {} (model={}, {} prompt bytes)",
            self.endpoint,
            self.model,
            prompt.len()
        );

        tokio::time::timeout(options.timeout, self.send_request(&body))
            .await
            .map_err(|_| CompletionError::Timeout)?
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_text_response(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| CompletionError::MalformedResponse("response has no choices".to_string()))
}

fn map_transport_error(err: reqwest::Error) -> CompletionError {
    if err.is_timeout() {
        CompletionError::Timeout
    } else {
        CompletionError::Transport(err.to_string())
    }
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> CompletionError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        CompletionError::RateLimited { retry_after }
    } else {
        CompletionError::Upstream {
            status: status.as_u16(),
            body,
        }
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    // HTTP-date form is not supported
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
