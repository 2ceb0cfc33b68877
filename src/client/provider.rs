//! Completion through any `edgequake_llm` provider.
//!
//! Selected with `--provider` / `AUDIT_ASSISTANT_PROVIDER`. The factory reads
//! the provider's own key variable (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, …).
//! `top_p` is left at the provider default, which is 1 for every provider
//! edgequake-llm supports; temperature and the output ceiling are forwarded.
//!
//! Provider errors arrive as one opaque type. Their text is classified into
//! the same auth / rate-limit / timeout variants the Azure client returns,
//! and the configured API timeout is enforced around each call.

use super::{ChatCompletion, CompletionRequest, Role};
use crate::error::AssistantError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Model used when the provider is named without one.
pub const DEFAULT_PROVIDER_MODEL: &str = "gpt-4.1-mini";

/// Adapter from [`ChatCompletion`] to an edgequake-llm provider.
pub struct ProviderClient {
    name: String,
    provider: Arc<dyn LLMProvider>,
    timeout: Duration,
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("name", &self.name)
            .field("provider", &"<dyn LLMProvider>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderClient {
    /// Wrap a provider constructed by the caller.
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn LLMProvider>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Create `provider_name` through [`ProviderFactory::create_llm_provider`].
    pub fn from_factory(
        provider_name: &str,
        model: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, AssistantError> {
        let model = model.unwrap_or(DEFAULT_PROVIDER_MODEL);
        let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
            AssistantError::ProviderNotConfigured {
                provider: provider_name.to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self::new(provider_name, provider, timeout_secs))
    }
}

#[async_trait]
impl ChatCompletion for ProviderClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AssistantError> {
        let messages = to_chat_messages(request);
        let options = build_options(request);

        debug!(
            "Provider '{}' chat call (max_tokens={})",
            self.name, request.max_tokens
        );
        let call = async {
            self.provider
                .chat(&messages, Some(&options))
                .await
                .map(|response| response.content)
                .map_err(|e| e.to_string())
        };
        with_deadline(self.timeout, call).await.inspect_err(|e| {
            warn!("Provider '{}' failed: {e}", self.name);
        })
    }
}

/// Run `call`, turning an elapsed deadline or an error text into the
/// matching [`AssistantError`].
async fn with_deadline<F>(timeout: Duration, call: F) -> Result<String, AssistantError>
where
    F: Future<Output = Result<String, String>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(content)) => Ok(content),
        Ok(Err(message)) => Err(classify_failure(message, timeout.as_secs())),
        Err(_) => Err(AssistantError::ApiTimeout {
            secs: timeout.as_secs(),
        }),
    }
}

fn classify_failure(message: String, timeout_secs: u64) -> AssistantError {
    let lower = message.to_ascii_lowercase();
    let mentions = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if mentions(&["401", "403", "unauthorized", "forbidden", "authentication", "api key"]) {
        AssistantError::AuthError { detail: message }
    } else if mentions(&["429", "rate limit", "rate_limit", "ratelimit", "too many requests"]) {
        AssistantError::RateLimitExceeded {
            retry_after_secs: None,
        }
    } else if mentions(&["timed out", "timeout"]) {
        AssistantError::ApiTimeout { secs: timeout_secs }
    } else {
        AssistantError::LlmApiError { message }
    }
}

fn to_chat_messages(request: &CompletionRequest) -> Vec<ChatMessage> {
    request
        .messages
        .iter()
        .map(|turn| match turn.role {
            Role::System => ChatMessage::system(turn.content.as_str()),
            Role::User => ChatMessage::user(turn.content.as_str()),
        })
        .collect()
}

fn build_options(request: &CompletionRequest) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(request.temperature),
        max_tokens: Some(request.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatTurn;

    #[test]
    fn options_forward_sampling_and_ceiling() {
        let req = CompletionRequest {
            messages: vec![ChatTurn::system("s"), ChatTurn::user("u")],
            max_tokens: 600,
            temperature: 0.0,
            top_p: 1.0,
        };
        let opts = build_options(&req);
        assert_eq!(opts.temperature, Some(0.0));
        assert_eq!(opts.max_tokens, Some(600));
        assert_eq!(to_chat_messages(&req).len(), 2);
    }

    #[test]
    fn failures_are_classified_like_http_statuses() {
        assert!(matches!(
            classify_failure("HTTP 401: invalid API key".into(), 120),
            AssistantError::AuthError { .. }
        ));
        assert!(matches!(
            classify_failure("Rate limited: too many requests".into(), 120),
            AssistantError::RateLimitExceeded {
                retry_after_secs: None
            }
        ));
        assert!(matches!(
            classify_failure("request timed out".into(), 120),
            AssistantError::ApiTimeout { secs: 120 }
        ));
        match classify_failure("HTTP 500: upstream exploded".into(), 120) {
            AssistantError::LlmApiError { message } => {
                assert_eq!(message, "HTTP 500: upstream exploded")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_call_hits_the_deadline() {
        let err = with_deadline(
            Duration::from_millis(20),
            std::future::pending::<Result<String, String>>(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AssistantError::ApiTimeout { .. }));

        let ok = with_deadline(Duration::from_secs(5), async { Ok("fine".to_string()) })
            .await
            .unwrap();
        assert_eq!(ok, "fine");
    }

    #[test]
    fn unknown_provider_is_not_configured() {
        let err = ProviderClient::from_factory("no-such-provider", None, 120).unwrap_err();
        assert!(matches!(err, AssistantError::ProviderNotConfigured { .. }));
    }
}
