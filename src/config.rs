//! Configuration for BBPOU letter validation.
//!
//! All pipeline behaviour is controlled through [`ValidationConfig`], built
//! via its [`ValidationConfigBuilder`]. The config is constructed once at
//! process startup and shared (behind an `Arc` in the HTTP server) across
//! every request — there are no module-level singletons.

use crate::error::ValidatorError;
use crate::schema::ValidationMode;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Default rendering resolution in DPI. 300 keeps seals and signature blocks
/// legible to the VLM; participation letters are one or two pages, so the
/// larger images cost little.
pub const DEFAULT_DPI: u32 = 300;

/// Model used when neither the caller nor the environment picks one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for validating a participation letter.
///
/// Built via [`ValidationConfig::builder()`] or
/// [`ValidationConfig::default()`].
///
/// # Example
/// ```rust
/// use bbpou_validator::{ValidationConfig, ValidationMode};
///
/// let config = ValidationConfig::builder()
///     .dpi(200)
///     .model("gemini-2.5-flash")
///     .validation_mode(ValidationMode::Strict)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ValidationConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–600.
    /// Default: 300.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels.
    /// Default: 4000. Caps memory regardless of page size and DPI.
    pub max_rendered_pixels: u32,

    /// VLM model identifier, e.g. "gemini-2.5-flash", "gpt-4.1-mini".
    /// If None, uses [`DEFAULT_MODEL`] or the provider's default.
    pub model: Option<String>,

    /// VLM provider name (e.g. "gemini", "openai", "ollama").
    /// If None along with `provider`, uses `ProviderFactory::from_env()`.
    pub provider_name: Option<String>,

    /// Pre-constructed VLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the extraction. Default: 0.0.
    ///
    /// Zero makes the model as deterministic as possible; the task is
    /// transcription, not generation.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 2048.
    /// The record is small; this bound keeps a rambling response from
    /// running up cost.
    pub max_tokens: usize,

    /// Retry attempts on a transient VLM failure. Default: 0.
    ///
    /// The upstream system made exactly one attempt per call; 0 preserves
    /// that. Raise it to ride out 429/503 blips — each retry waits
    /// `retry_backoff_ms * 2^attempt`.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-VLM-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Custom extraction policy. If None, uses
    /// [`crate::prompts::EXTRACTION_POLICY`].
    pub system_prompt: Option<String>,

    /// How strictly conditional-null invariants are enforced on the model's
    /// response. Default: [`ValidationMode::Lenient`].
    pub validation_mode: ValidationMode,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            max_rendered_pixels: 4000,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.0,
            max_tokens: 2048,
            max_retries: 0,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            password: None,
            system_prompt: None,
            validation_mode: ValidationMode::default(),
        }
    }
}

impl fmt::Debug for ValidationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("validation_mode", &self.validation_mode)
            .finish()
    }
}

impl ValidationConfig {
    /// Create a new builder for `ValidationConfig`.
    pub fn builder() -> ValidationConfigBuilder {
        ValidationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ValidationConfig`].
#[derive(Debug)]
pub struct ValidationConfigBuilder {
    config: ValidationConfig,
}

impl ValidationConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn validation_mode(mut self, mode: ValidationMode) -> Self {
        self.config.validation_mode = mode;
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// Range-bounded knobs (dpi, temperature) are already clamped by their
    /// setters; only constraints a setter cannot express are checked here.
    pub fn build(self) -> Result<ValidationConfig, ValidatorError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(ValidatorError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upstream_behaviour() {
        let c = ValidationConfig::default();
        assert_eq!(c.dpi, 300);
        assert_eq!(c.temperature, 0.0);
        assert_eq!(c.max_retries, 0);
        assert_eq!(c.validation_mode, ValidationMode::Lenient);
    }

    #[test]
    fn builder_clamps_dpi() {
        let c = ValidationConfig::builder().dpi(50).build().unwrap();
        assert_eq!(c.dpi, 72);
        let c = ValidationConfig::builder().dpi(10_000).build().unwrap();
        assert_eq!(c.dpi, 600);
    }

    #[test]
    fn clamped_dpi_always_builds() {
        // The setter clamp is the single source of truth for the DPI range,
        // so no setter input can make build() fail on it.
        for dpi in [0, 71, 72, 300, 600, 601, u32::MAX] {
            assert!(ValidationConfig::builder().dpi(dpi).build().is_ok());
        }
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let err = ValidationConfig::builder().max_tokens(0).build().unwrap_err();
        assert!(matches!(err, crate::error::ValidatorError::InvalidConfig(_)));
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = ValidationConfig::builder().temperature(-1.0).build().unwrap();
        assert_eq!(c.temperature, 0.0);
    }

    #[test]
    fn builder_sets_strict_mode() {
        let c = ValidationConfig::builder()
            .validation_mode(ValidationMode::Strict)
            .build()
            .unwrap();
        assert_eq!(c.validation_mode, ValidationMode::Strict);
    }

    #[test]
    fn debug_does_not_require_provider_debug() {
        let c = ValidationConfig::default();
        let s = format!("{:?}", c);
        assert!(s.contains("ValidationConfig"));
    }
}
