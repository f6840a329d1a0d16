//! Validation entry points: run the full pipeline on one document.
//!
//! Each call is processed end-to-end on the task handling it; the only
//! shared state is the immutable [`ValidationConfig`] (and the provider it
//! may carry), so concurrent HTTP requests never interfere. The VLM call is
//! the dominant source of latency — everything before it is local and takes
//! milliseconds.

use crate::config::{ValidationConfig, DEFAULT_MODEL};
use crate::error::ValidatorError;
use crate::pipeline::{encode, extract, input, render, request};
use crate::schema::BbpouParticipation;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Validate a BBPOU participation letter at `document_path`.
///
/// This is the primary entry point for the library. Runs
/// input check → provider resolution → rasterisation → encoding → request
/// assembly → extraction, and returns the schema-validated record.
///
/// # Errors
/// - Input errors (missing path, wrong suffix, bad magic) before anything
///   external runs
/// - [`ValidatorError::CorruptPdf`] / [`ValidatorError::RasterisationFailed`]
///   when pdfium cannot process the file
/// - [`ValidatorError::ExtractionFailed`] / [`ValidatorError::SchemaViolation`]
///   when the VLM call fails or its payload does not conform
pub async fn validate_document(
    document_path: impl AsRef<str>,
    config: &ValidationConfig,
) -> Result<BbpouParticipation, ValidatorError> {
    let start = Instant::now();
    let document_path = document_path.as_ref();
    info!("Validating document: {}", document_path);

    let pdf_path = input::resolve_document(document_path)?;
    let provider = resolve_provider(config)?;

    let pages = render::render_pages(&pdf_path, config).await?;
    info!("Rendered {} pages", pages.len());

    let image_parts = encode::encode_pages(&pages)?;
    drop(pages); // rasters are large; the base64 parts are all we need now

    let messages = request::build_messages(image_parts, config);
    let record = extract::extract_record(&provider, &messages, config, document_path).await?;

    info!(
        "Validation complete for {} in {}ms",
        document_path,
        start.elapsed().as_millis()
    );
    Ok(record)
}

/// Validate a letter supplied as in-memory PDF bytes.
///
/// Writes `bytes` to a managed [`tempfile`] so pdfium has a path to open;
/// the file is removed when the call returns, on every exit path.
pub async fn validate_bytes(
    bytes: &[u8],
    config: &ValidationConfig,
) -> Result<BbpouParticipation, ValidatorError> {
    let dir = tempfile::tempdir()
        .map_err(|e| ValidatorError::Internal(format!("tempdir: {e}")))?;
    let path = dir.path().join("letter.pdf");
    let mut f = std::fs::File::create(&path)
        .map_err(|e| ValidatorError::Internal(format!("tempfile: {e}")))?;
    f.write_all(bytes)
        .map_err(|e| ValidatorError::Internal(format!("tempfile write: {e}")))?;
    drop(f);

    // `dir` lives until after validation so the file is not cleaned up early
    let result = validate_document(path.to_string_lossy(), config).await;
    drop(dir);
    result
}

/// Synchronous wrapper around [`validate_document`].
///
/// Creates a temporary tokio runtime internally.
pub fn validate_sync(
    document_path: impl AsRef<str>,
    config: &ValidationConfig,
) -> Result<BbpouParticipation, ValidatorError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ValidatorError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(validate_document(document_path, config))
}

/// Resolve the VLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed
///    and configured the provider entirely; used as-is. Useful in tests or
///    when the caller needs custom middleware.
///
/// 2. **Named provider + model** (`config.provider_name`) —
///    `ProviderFactory::create_llm_provider` reads the corresponding API key
///    (`GEMINI_API_KEY`, `OPENAI_API_KEY`, …) from the environment.
///
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`) —
///    the execution environment (shell script, CI, container) chose both;
///    honoured before full auto-detection.
///
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — scans all
///    known API key variables and picks the first available provider.
fn resolve_provider(config: &ValidationConfig) -> Result<Arc<dyn LLMProvider>, ValidatorError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ValidatorError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No VLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Instantiate a named provider with the given model.
fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, ValidatorError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ValidatorError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
