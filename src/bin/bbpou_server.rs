//! HTTP server binary for bbpou-validator.
//!
//! Builds the immutable `ValidationConfig` once at startup, then serves the
//! validation endpoint. Each request runs the pipeline independently.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use bbpou_validator::{server, ValidationConfig, ValidationMode};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serve the BBPOU participation validation API.
#[derive(Parser, Debug)]
#[command(
    name = "bbpou-server",
    version,
    about = "HTTP API for BBPOU participation-letter validation"
)]
struct Args {
    /// Port to listen on.
    #[arg(short, long, env = "BBPOU_PORT", default_value_t = 8000)]
    port: u16,

    /// Host address to bind to.
    #[arg(long, env = "BBPOU_HOST", default_value = "0.0.0.0")]
    host: String,

    /// VLM model ID (e.g. gemini-2.5-flash).
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

    /// Reject records that violate the conditional-null invariants.
    #[arg(long)]
    strict: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BBPOU_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let mut builder = ValidationConfig::builder()
        .dpi(args.dpi)
        .max_retries(args.max_retries)
        .api_timeout_secs(args.api_timeout);
    if args.strict {
        builder = builder.validation_mode(ValidationMode::Strict);
    }
    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider);
    }
    let config = Arc::new(builder.build().context("Invalid configuration")?);

    let app = server::router(config);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("Invalid host/port")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("bbpou-server listening on http://{}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
