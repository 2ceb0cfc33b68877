//! CLI binary for audit-assistant.
//!
//! `serve` starts the web UI; `extract`, `summarize` and `ask` run the same
//! workflow once on a local file and print the result to stdout.

use anyhow::{Context, Result};
use audit_assistant::{
    serve, AppState, Assistant, AssistantConfig, Backend, ReportDocument,
};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Web UI on http://127.0.0.1:8501
  audit-assistant serve

  # Print the extracted text (no credentials needed)
  audit-assistant extract week42.pdf

  # Summary, critical problems and action proposals
  audit-assistant summarize week42.pdf

  # Ask a question about the report
  audit-assistant ask week42.pdf "Hangi hatta en çok uygunsuzluk var?"

  # Use an edgequake-llm provider instead of Azure OpenAI
  audit-assistant --provider openai --model gpt-4.1-mini summarize week42.txt

ENVIRONMENT VARIABLES:
  AZURE_OPENAI_KEY           Azure OpenAI API key (required for analysis)
  AZURE_OPENAI_ENDPOINT      Azure OpenAI endpoint URL (required for analysis)
  AZURE_OPENAI_DEPLOYMENT    Deployment name (default: gpt-4)
  AZURE_OPENAI_API_VERSION   REST api-version (default: 2024-12-01-preview)
  AUDIT_ASSISTANT_PROVIDER   Use an edgequake-llm provider (openai, anthropic, gemini, ollama)
  AUDIT_ASSISTANT_MODEL      Model for that provider
  AUDIT_ASSISTANT_LANGUAGE   Answer language (default: Turkish)
  PDFIUM_LIB_PATH            Path to libpdfium (file or directory)
  RUST_LOG                   Log filter, e.g. audit_assistant=debug

  Variables are also read from a .env file in the working directory.
"#;

/// Summarise quality-audit reports and answer questions about them.
#[derive(Parser, Debug)]
#[command(
    name = "audit-assistant",
    version,
    about = "Summarise quality-audit reports and answer questions about them",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// edgequake-llm provider to use instead of Azure OpenAI.
    #[arg(long, global = true, env = "AUDIT_ASSISTANT_PROVIDER")]
    provider: Option<String>,

    /// Model ID for --provider.
    #[arg(long, global = true, env = "AUDIT_ASSISTANT_MODEL")]
    model: Option<String>,

    /// Language the answers are written in.
    #[arg(long, global = true, env = "AUDIT_ASSISTANT_LANGUAGE", default_value = "Turkish")]
    language: String,

    /// Per-call completion timeout in seconds.
    #[arg(long, global = true, env = "AUDIT_ASSISTANT_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the web interface.
    Serve {
        #[arg(long, env = "AUDIT_ASSISTANT_HOST", default_value = "127.0.0.1")]
        host: String,
        #[arg(long, env = "AUDIT_ASSISTANT_PORT", default_value_t = 8501)]
        port: u16,
    },
    /// Print the text extracted from a report.
    Extract { file: PathBuf },
    /// Summarise a report: 3-item summary, 2 critical problems, 3 actions.
    Summarize { file: PathBuf },
    /// Answer a question about a report.
    Ask { file: PathBuf, question: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let assistant = Assistant::from_config(config);

    match &cli.command {
        Command::Serve { host, port } => {
            if !cli.quiet {
                eprintln!(
                    "{} Serving on {}",
                    green("●"),
                    bold(&format!("http://{host}:{port}"))
                );
            }
            serve(AppState::new(assistant), host, *port)
                .await
                .with_context(|| format!("Server on {host}:{port} failed"))?;
        }
        Command::Extract { file } => {
            let report = load(&assistant, file, cli.quiet).await?;
            print_stdout(report.text().as_str())?;
        }
        Command::Summarize { file } => {
            let report = load(&assistant, file, cli.quiet).await?;
            let summary = with_spinner(
                cli.quiet,
                "Rapor analiz ediliyor...",
                assistant.analyzer().summarize(report.text()),
            )
            .await
            .context("Analysis failed")?;
            print_stdout(&summary)?;
        }
        Command::Ask { file, question } => {
            let report = load(&assistant, file, cli.quiet).await?;
            let answer = with_spinner(
                cli.quiet,
                "Yanıt aranıyor...",
                assistant.analyzer().ask(report.text(), question),
            )
            .await
            .context("Question failed")?;
            print_stdout(&answer)?;
        }
    }

    Ok(())
}

/// Map CLI args to `AssistantConfig`.
fn build_config(cli: &Cli) -> Result<AssistantConfig> {
    let backend = match &cli.provider {
        Some(name) => Backend::Provider {
            name: name.clone(),
            model: cli.model.clone(),
        },
        None => Backend::AzureOpenAi,
    };
    AssistantConfig::builder()
        .response_language(cli.language.as_str())
        .api_timeout_secs(cli.api_timeout)
        .backend(backend)
        .build()
        .context("Invalid configuration")
}

async fn load(assistant: &Assistant, file: &Path, quiet: bool) -> Result<ReportDocument> {
    let report = assistant
        .ingest_path(file)
        .await
        .with_context(|| format!("Failed to read report {}", file.display()))?;
    if !quiet {
        eprintln!(
            "{} {}  {}",
            green("✔"),
            bold(report.file_name()),
            dim(&format!("{} chars", report.text().as_str().chars().count()))
        );
    }
    Ok(report)
}

/// Show an indicatif spinner while `fut` runs.
async fn with_spinner<T>(quiet: bool, message: &str, fut: impl Future<Output = T>) -> T {
    if quiet {
        return fut.await;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    let out = fut.await;
    bar.finish_and_clear();
    out
}

fn print_stdout(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}
