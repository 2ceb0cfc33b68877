//! Azure OpenAI chat-completions over REST.
//!
//! One POST per call to
//! `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version=…`
//! with the key in the `api-key` header. The body always carries
//! `stream: false` together with the caller's `max_tokens`, `temperature`
//! and `top_p`. Status codes are mapped to distinct [`AssistantError`]
//! variants so the UI can tell a bad key from an overloaded service.

use super::{ChatCompletion, ChatTurn, CompletionRequest};
use crate::config::AzureSettings;
use crate::error::AssistantError;
use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Request body of the chat-completions endpoint.
#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    messages: &'a [ChatTurn],
    max_tokens: usize,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

/// The parts of the response we read.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Azure OpenAI chat-completions client.
#[derive(Debug)]
pub struct AzureOpenAiClient {
    settings: AzureSettings,
    url: String,
    timeout_secs: u64,
    http: Client,
}

impl AzureOpenAiClient {
    pub fn new(settings: AzureSettings, timeout_secs: u64) -> Result<Self, AssistantError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AssistantError::Internal(format!("HTTP client: {e}")))?;
        let url = settings.chat_completions_url();
        Ok(Self {
            settings,
            url,
            timeout_secs,
            http,
        })
    }

    pub fn deployment(&self) -> &str {
        &self.settings.deployment
    }
}

#[async_trait]
impl ChatCompletion for AzureOpenAiClient {
    fn name(&self) -> &str {
        "azure-openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AssistantError> {
        let body = request_body(request);
        debug!(
            "POST chat completion to deployment '{}' (max_tokens={})",
            self.settings.deployment, request.max_tokens
        );

        let response = self
            .http
            .post(&self.url)
            .header("api-key", &self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssistantError::ApiTimeout {
                        secs: self.timeout_secs,
                    }
                } else {
                    AssistantError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let detail = response.text().await.unwrap_or_default();
            let err = status_error(status, retry_after, &detail);
            warn!("Completion call failed: {err}");
            return Err(err);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AssistantError::Connection(e.to_string()))?;
        parse_content(&bytes)
    }
}

fn request_body(request: &CompletionRequest) -> ChatBody<'_> {
    ChatBody {
        messages: &request.messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        top_p: request.top_p,
        stream: false,
    }
}

fn status_error(status: StatusCode, retry_after_secs: Option<u64>, detail: &str) -> AssistantError {
    let detail = truncate(detail, 300);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AssistantError::AuthError {
            detail: format!("HTTP {status}: {detail}"),
        },
        StatusCode::TOO_MANY_REQUESTS => AssistantError::RateLimitExceeded { retry_after_secs },
        _ => AssistantError::LlmApiError {
            message: format!("HTTP {status}: {detail}"),
        },
    }
}

fn parse_content(body: &[u8]) -> Result<String, AssistantError> {
    let parsed: ChatResponse = serde_json::from_slice(body)
        .map_err(|e| AssistantError::MalformedResponse(format!("invalid JSON: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AssistantError::MalformedResponse("response has no choices".into()))?
        .message
        .content
        .ok_or_else(|| AssistantError::MalformedResponse("first choice has no content".into()))
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
