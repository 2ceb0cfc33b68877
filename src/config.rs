//! Configuration for report analysis.
//!
//! All behaviour is controlled through [`AssistantConfig`], built via its
//! [`AssistantConfigBuilder`]. The sampling defaults (temperature 0, top_p 1)
//! and the output ceilings (800 tokens for a summary, 600 for an answer) are
//! the contract of the two analysis modes; the builder exists so tests and the
//! CLI can point the same workflow at a different backend or language.
//!
//! Credentials are *not* read here. [`AzureSettings::from_env`] is called the
//! first time an analysis needs the client, so a missing key disables
//! analysis without stopping upload and extraction.

use crate::error::AssistantError;
use serde::{Deserialize, Serialize};

/// Environment variable holding the Azure OpenAI API key.
pub const AZURE_KEY_VAR: &str = "AZURE_OPENAI_KEY";
/// Environment variable holding the Azure OpenAI endpoint URL.
pub const AZURE_ENDPOINT_VAR: &str = "AZURE_OPENAI_ENDPOINT";
/// Optional override of the deployment (model) name.
pub const AZURE_DEPLOYMENT_VAR: &str = "AZURE_OPENAI_DEPLOYMENT";
/// Optional override of the REST api-version.
pub const AZURE_API_VERSION_VAR: &str = "AZURE_OPENAI_API_VERSION";

/// Deployment used when none is configured.
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4";
/// Azure OpenAI REST api-version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";

/// Configuration for the analysis workflow.
///
/// # Example
/// ```rust
/// use audit_assistant::AssistantConfig;
///
/// let config = AssistantConfig::builder()
///     .response_language("English")
///     .api_timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.summary_max_tokens, 800);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Language both personas are told to answer in. Default: "Turkish".
    pub response_language: String,

    /// Output ceiling for summarize-and-recommend. Default: 800.
    pub summary_max_tokens: usize,

    /// Output ceiling for question answering. Default: 600.
    pub answer_max_tokens: usize,

    /// Sampling temperature. Default: 0.0.
    pub temperature: f32,

    /// Nucleus sampling mass. Default: 1.0.
    pub top_p: f32,

    /// Per-call HTTP timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Largest accepted upload in bytes. Default: 20 MiB.
    pub max_upload_bytes: usize,

    /// Which completion service answers the requests.
    pub backend: Backend,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            response_language: "Turkish".to_string(),
            summary_max_tokens: 800,
            answer_max_tokens: 600,
            temperature: 0.0,
            top_p: 1.0,
            api_timeout_secs: 120,
            max_upload_bytes: 20 * 1024 * 1024,
            backend: Backend::default(),
        }
    }
}

impl AssistantConfig {
    /// Create a new builder for `AssistantConfig`.
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AssistantConfig`].
#[derive(Debug)]
pub struct AssistantConfigBuilder {
    config: AssistantConfig,
}

impl AssistantConfigBuilder {
    pub fn response_language(mut self, language: impl Into<String>) -> Self {
        self.config.response_language = language.into();
        self
    }

    pub fn summary_max_tokens(mut self, n: usize) -> Self {
        self.config.summary_max_tokens = n;
        self
    }

    pub fn answer_max_tokens(mut self, n: usize) -> Self {
        self.config.answer_max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.top_p = p.clamp(0.0, 1.0);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AssistantConfig, AssistantError> {
        let c = &self.config;
        if c.response_language.trim().is_empty() {
            return Err(AssistantError::InvalidConfig(
                "response language must not be empty".into(),
            ));
        }
        if c.summary_max_tokens == 0 || c.answer_max_tokens == 0 {
            return Err(AssistantError::InvalidConfig(
                "output token ceilings must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(AssistantError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(AssistantError::InvalidConfig(
                "upload limit must be ≥ 1 byte".into(),
            ));
        }
        if let Backend::Provider { name, .. } = &c.backend {
            if name.trim().is_empty() {
                return Err(AssistantError::InvalidConfig(
                    "provider name must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Backend selection ────────────────────────────────────────────────────

/// Completion service selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backend {
    /// Azure OpenAI chat completions, credentials from the environment. (default)
    #[default]
    AzureOpenAi,
    /// Any provider known to `edgequake_llm::ProviderFactory`.
    Provider {
        /// Provider name, e.g. "openai", "anthropic", "ollama".
        name: String,
        /// Model id; the provider default is used when `None`.
        model: Option<String>,
    },
}

/// Azure OpenAI connection settings, read once when the client is built.
#[derive(Clone, PartialEq, Eq)]
pub struct AzureSettings {
    pub api_key: String,
    pub endpoint: String,
    pub deployment: String,
    pub api_version: String,
}

impl std::fmt::Debug for AzureSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureSettings")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl AzureSettings {
    /// Read the settings from the process environment.
    pub fn from_env() -> Result<Self, AssistantError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the settings through `lookup`, treating empty values as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AssistantError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            get(name).ok_or_else(|| AssistantError::ConfigurationMissing {
                variable: name.to_string(),
                hint: format!("Set {name} in the environment or in a .env file."),
            })
        };

        Ok(Self {
            api_key: required(AZURE_KEY_VAR)?,
            endpoint: required(AZURE_ENDPOINT_VAR)?,
            deployment: get(AZURE_DEPLOYMENT_VAR).unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string()),
            api_version: get(AZURE_API_VERSION_VAR)
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        })
    }

    /// Full chat-completions URL for the configured deployment.
    pub fn chat_completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}
