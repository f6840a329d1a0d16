//! Image encoding: `PageImage` → base64 JPEG wrapped in `ImageData`.
//!
//! VLM APIs accept images as base64 payloads embedded in the JSON request
//! body. Pages are normalised to RGB8 first: pdfium hands back RGBA bitmaps,
//! and the JPEG encoder rejects an alpha channel. JPEG keeps multi-page
//! letters comfortably under per-request upload limits at 300 DPI.

use crate::error::ValidatorError;
use crate::pipeline::render::PageImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rendered page as a base64 JPEG part ready for the VLM request.
///
/// Parts are produced one per page and must be kept in page order — the
/// model reads page 1 before page 2.
pub fn encode_page(page: &PageImage) -> Result<ImageData, ValidatorError> {
    let rgb = DynamicImage::ImageRgb8(page.image.to_rgb8());

    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .map_err(|e| ValidatorError::EncodingFailed {
            page: page.index + 1,
            detail: e.to_string(),
        })?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded page {} → {} bytes base64", page.index + 1, b64.len());

    Ok(ImageData::new(b64, "image/jpeg").with_detail("high"))
}

/// Encode every rendered page, preserving page order.
pub fn encode_pages(pages: &[PageImage]) -> Result<Vec<ImageData>, ValidatorError> {
    pages.iter().map(encode_page).collect()
}
