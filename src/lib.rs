//! # audit-assistant
//!
//! Upload a weekly quality-audit report (PDF or plain text) and let a hosted
//! language model summarise it, name its critical problems, propose actions,
//! or answer free-form questions grounded in the report.
//!
//! ## Why this crate?
//!
//! Audit reports arrive every week in the same shape and are read by people
//! who need three things from them: what happened, what is broken, and what
//! to do next. This crate extracts the report text locally, sends it with a
//! fixed auditor persona to a chat-completion service, and shows the answer
//! next to the upload, either in a small web UI or on the command line.
//!
//! ## Flow Overview
//!
//! ```text
//! report.pdf / report.txt
//!  │
//!  ├─ 1. Input     validate name, size and magic; stage in a TempDir
//!  ├─ 2. Extract   pdfium page text joined with "\n\n" (spawn_blocking), or UTF-8
//!  ├─ 3. Session   NoDocument → DocumentLoaded → ResultDisplayed
//!  ├─ 4. Dispatch  [system persona, user instruction + report], one call
//!  └─ 5. Display   trimmed answer in a read-only text area
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use audit_assistant::{AssistantConfig, Assistant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials from AZURE_OPENAI_KEY / AZURE_OPENAI_ENDPOINT
//!     let assistant = Assistant::from_config(AssistantConfig::default());
//!     let report = assistant.ingest_path(std::path::Path::new("week42.pdf")).await?;
//!     let summary = assistant.analyzer().summarize(report.text()).await?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `audit-assistant` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when embedding the library:
//! ```toml
//! audit-assistant = { version = "0.1", default-features = false }
//! ```
//!
//! ## Backends
//!
//! | Backend | Selected by | Credentials |
//! |---------|-------------|-------------|
//! | Azure OpenAI (default) | nothing | `AZURE_OPENAI_KEY`, `AZURE_OPENAI_ENDPOINT` |
//! | any edgequake-llm provider | `AUDIT_ASSISTANT_PROVIDER` | the provider's own key variable |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analysis;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod session;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analysis::{AnalysisMode, AnalysisRequest, Analyzer};
pub use client::{ChatCompletion, ChatTurn, CompletionRequest, LazyClient, Role};
pub use config::{AssistantConfig, AssistantConfigBuilder, AzureSettings, Backend};
pub use document::{ReportDocument, ReportFormat, ReportText};
pub use error::{AssistantError, ErrorKind};
pub use pipeline::extract::{PageTextSource, TextExtractor};
pub use server::{create_router, serve, AppState};
pub use session::{Action, Session, SessionSnapshot, SessionState};
pub use workflow::Assistant;
