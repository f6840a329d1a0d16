//! CLI binary for bbpou-validator.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ValidationConfig`, runs the pipeline once, and prints the extracted
//! record as indented JSON.

use anyhow::{Context, Result};
use bbpou_validator::{validate_document, ValidationConfig, ValidationMode};
use clap::Parser;
use std::io;
use tracing_subscriber::EnvFilter;

/// Built-in default used when no document path is given on the command line.
const DEFAULT_DOCUMENT_PATH: &str = "documents/pdfs/bbpou-participation-letter.pdf";

const AFTER_HELP: &str = r#"EXAMPLES:
  # Validate the default sample letter
  bbpou-validate

  # Validate a specific letter
  bbpou-validate letters/cashfree.pdf

  # Use a specific provider and model
  bbpou-validate --provider gemini --model gemini-2.5-flash letter.pdf

  # Reject inconsistent seal/signatory fields instead of warning
  bbpou-validate --strict letter.pdf

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (gemini, openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium
"#;

/// Validate a BBPOU participation letter with a Vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "bbpou-validate",
    version,
    about = "Extract and validate BBPOU participation details from a PDF letter",
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the participation letter PDF. Uses a built-in default when omitted.
    document_path: Option<String>,

    /// VLM model ID (e.g. gemini-2.5-flash, gpt-4.1-mini).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// VLM provider: gemini, openai, anthropic, ollama.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Rendering DPI (72–600).
    #[arg(long, env = "BBPOU_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Retries on a transient VLM failure.
    #[arg(long, env = "BBPOU_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Per-call VLM timeout in seconds.
    #[arg(long, env = "BBPOU_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "BBPOU_PASSWORD")]
    password: Option<String>,

    /// Reject records that violate the conditional-null invariants instead
    /// of accepting them with a warning.
    #[arg(long)]
    strict: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BBPOU_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let document_path = cli
        .document_path
        .as_deref()
        .unwrap_or(DEFAULT_DOCUMENT_PATH);

    let record = validate_document(document_path, &config)
        .await
        .with_context(|| format!("Validation failed for {document_path}"))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&record).context("Failed to serialise record")?
    );

    Ok(())
}

/// Map CLI args to `ValidationConfig`.
fn build_config(cli: &Cli) -> Result<ValidationConfig> {
    let mut builder = ValidationConfig::builder()
        .dpi(cli.dpi)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout);

    if cli.strict {
        builder = builder.validation_mode(ValidationMode::Strict);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }

    builder.build().context("Invalid configuration")
}
