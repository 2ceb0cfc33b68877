//! Remote chat-completion clients.
//!
//! [`ChatCompletion`] is the only seam between the workflow and the network.
//! The analysis dispatcher builds a backend-neutral [`CompletionRequest`];
//! each backend turns it into its own wire format and returns the first
//! choice's message content untouched. Trimming happens in the dispatcher.
//!
//! - [`azure::AzureOpenAiClient`]: Azure OpenAI REST, the default
//! - [`provider::ProviderClient`]: any `edgequake_llm` provider
//!
//! [`LazyClient`] builds the configured backend on first use and keeps it for
//! the life of the process.

pub mod azure;
pub mod provider;

use crate::config::{AssistantConfig, AzureSettings, Backend};
use crate::error::AssistantError;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Speaker of one chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One message of a completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single non-streaming completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatTurn>,
    pub max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
}

impl CompletionRequest {
    /// Content of the first user message, or `""`.
    pub fn user_content(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    /// Content of the first system message, or `""`.
    pub fn system_content(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

/// A remote chat-completion service.
///
/// One call is one attempt: implementations must not retry.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Submit `request` and return the first choice's message content.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AssistantError>;
}

/// Build the client selected by `config.backend`.
///
/// Reads credentials from the environment at call time.
pub fn build_client(config: &AssistantConfig) -> Result<Arc<dyn ChatCompletion>, AssistantError> {
    match &config.backend {
        Backend::AzureOpenAi => {
            let settings = AzureSettings::from_env()?;
            let client = azure::AzureOpenAiClient::new(settings, config.api_timeout_secs)?;
            Ok(Arc::new(client))
        }
        Backend::Provider { name, model } => {
            let client = provider::ProviderClient::from_factory(
                name,
                model.as_deref(),
                config.api_timeout_secs,
            )?;
            Ok(Arc::new(client))
        }
    }
}

type Factory = dyn Fn() -> Result<Arc<dyn ChatCompletion>, AssistantError> + Send + Sync;

/// Process-wide client handle with explicit lazy initialisation.
///
/// The first successful construction is kept and shared. A failed
/// construction is returned to the caller and *not* remembered, so fixing the
/// environment and retrying the action is enough.
pub struct LazyClient {
    cell: OnceCell<Arc<dyn ChatCompletion>>,
    factory: Box<Factory>,
}

impl std::fmt::Debug for LazyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyClient")
            .field("initialised", &self.cell.get().is_some())
            .finish()
    }
}

impl LazyClient {
    /// Build the configured backend on first use.
    pub fn from_config(config: &AssistantConfig) -> Self {
        let config = config.clone();
        Self::with_factory(move || build_client(&config))
    }

    /// Build with a custom factory.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn ChatCompletion>, AssistantError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    /// Wrap an already constructed client.
    pub fn ready(client: Arc<dyn ChatCompletion>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Arc::clone(&client));
        Self {
            cell,
            factory: Box::new(move || Ok(Arc::clone(&client))),
        }
    }

    /// The shared client, constructing it if needed.
    pub fn get(&self) -> Result<Arc<dyn ChatCompletion>, AssistantError> {
        self.cell
            .get_or_try_init(|| {
                let client = (self.factory)()?;
                info!("Completion client ready: {}", client.name());
                Ok(client)
            })
            .map(Arc::clone)
    }

    pub fn is_initialised(&self) -> bool {
        self.cell.get().is_some()
    }
}
