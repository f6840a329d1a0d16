//! Error types for the bbpou-validator library.
//!
//! The taxonomy mirrors where in the pipeline a failure can occur:
//!
//! * **Input errors** — the document path is wrong before anything external
//!   runs (missing file, non-PDF suffix, bad magic bytes). The HTTP layer
//!   maps these to 400.
//! * **Render errors** — pdfium could not open or rasterise the document.
//!   Fatal and non-retriable; 500 at the HTTP layer.
//! * **Extraction errors** — the VLM call failed, timed out, or returned a
//!   payload that does not conform to the schema contract. Fatal for the
//!   current request; 500 at the HTTP layer.
//!
//! Nothing here is retried implicitly; bounded retries for transient VLM
//! failures are an explicit knob on [`crate::config::ValidationConfig`].

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the bbpou-validator library.
#[derive(Debug, Error)]
pub enum ValidatorError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The document was not found at the given path.
    #[error("Document not found at path: {}", path.display())]
    DocumentNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{}'", path.display())]
    PermissionDenied { path: PathBuf },

    /// The path does not end in ".pdf". Only PDF letters are supported.
    #[error("Only PDF files are supported, got: '{}'", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// The file exists and has a .pdf suffix but does not start with %PDF.
    #[error("File is not a valid PDF: '{}'\nFirst bytes: {magic:?}", path.display())]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Render errors ─────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{}' is corrupt: {detail}", path.display())]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium returned an error while rendering a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The rendered page could not be compressed/encoded for transport.
    #[error("Image encoding failed for page {page}: {detail}")]
    EncodingFailed { page: usize, detail: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The VLM call failed after all configured attempts.
    #[error("Extraction failed after {attempts} attempt(s): {detail}")]
    ExtractionFailed { attempts: u32, detail: String },

    /// The VLM answered, but the payload does not conform to the schema.
    #[error("Schema violation in model response: {0}")]
    SchemaViolation(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ValidatorError {
    /// True for errors detectable before any external call — the HTTP layer
    /// answers these with 400 rather than 500.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ValidatorError::DocumentNotFound { .. }
                | ValidatorError::PermissionDenied { .. }
                | ValidatorError::UnsupportedFormat { .. }
                | ValidatorError::NotAPdf { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_not_found_mentions_path() {
        let e = ValidatorError::DocumentNotFound {
            path: PathBuf::from("/tmp/missing.pdf"),
        };
        assert!(e.to_string().contains("/tmp/missing.pdf"));
        assert!(e.is_input_error());
    }

    #[test]
    fn unsupported_format_is_input_error() {
        let e = ValidatorError::UnsupportedFormat {
            path: PathBuf::from("letter.txt"),
        };
        assert!(e.is_input_error());
        assert!(e.to_string().contains("letter.txt"));
    }

    #[test]
    fn extraction_failure_is_not_input_error() {
        let e = ValidatorError::ExtractionFailed {
            attempts: 1,
            detail: "timeout".into(),
        };
        assert!(!e.is_input_error());
        assert!(e.to_string().contains("timeout"));
    }

    #[test]
    fn schema_violation_display() {
        let e = ValidatorError::SchemaViolation("missing field `company_name`".into());
        assert!(e.to_string().contains("company_name"));
    }
}
