//! Input validation: check the document path before anything external runs.
//!
//! All three checks happen before pdfium or the VLM is touched, so a typo'd
//! path or a Word document masquerading as ".pdf" fails fast with an
//! input-class error (HTTP 400) instead of a confusing render failure.
//! The `%PDF` magic check catches misnamed files that would otherwise reach
//! pdfium and come back as an opaque "corrupt document" error.

use crate::error::ValidatorError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a document path: existence, ".pdf" suffix, and PDF magic bytes.
///
/// Returns the canonical `PathBuf` for the rest of the pipeline.
pub fn resolve_document(path_str: &str) -> Result<PathBuf, ValidatorError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(ValidatorError::DocumentNotFound { path });
    }

    if !has_pdf_extension(&path) {
        return Err(ValidatorError::UnsupportedFormat { path });
    }

    // Check read permission and magic bytes by attempting to open.
    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(ValidatorError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ValidatorError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ValidatorError::DocumentNotFound { path });
        }
    }

    debug!("Resolved document: {}", path.display());
    Ok(path)
}

/// Case-insensitive ".pdf" suffix check.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
