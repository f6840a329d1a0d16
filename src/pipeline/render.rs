//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread so the Tokio workers serving HTTP requests never stall during
//! CPU-heavy rendering.
//!
//! ## Resolution
//!
//! The target edge length is derived from the configured DPI against a
//! letter-size long edge (11 in), then capped by `max_rendered_pixels`.
//! At the default 300 DPI a participation letter renders around
//! 2550 × 3300 px — enough for the VLM to read seals and signature blocks.

use crate::config::ValidationConfig;
use crate::error::ValidatorError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// One rendered page, order-preserving.
#[derive(Debug)]
pub struct PageImage {
    /// 0-based source page index.
    pub index: usize,
    /// RGB raster of the page.
    pub image: DynamicImage,
}

/// Rasterise every page of the PDF into images, in document order.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
/// Deterministic for a fixed document and resolution.
pub async fn render_pages(
    pdf_path: &Path,
    config: &ValidationConfig,
) -> Result<Vec<PageImage>, ValidatorError> {
    let path = pdf_path.to_path_buf();
    let target_edge = target_edge_px(config.dpi, config.max_rendered_pixels);
    let password = config.password.clone();

    tokio::task::spawn_blocking(move || {
        render_pages_blocking(&path, target_edge, password.as_deref())
    })
    .await
    .map_err(|e| ValidatorError::Internal(format!("Render task panicked: {}", e)))?
}

/// Longest rendered edge in pixels for the given DPI, capped.
fn target_edge_px(dpi: u32, max_pixels: u32) -> u32 {
    // 11 in — the long edge of a letter/A4 page.
    (dpi * 11).min(max_pixels)
}

/// Blocking implementation of page rendering.
fn render_pages_blocking(
    pdf_path: &Path,
    target_edge: u32,
    password: Option<&str>,
) -> Result<Vec<PageImage>, ValidatorError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| ValidatorError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let render_config = PdfRenderConfig::new()
        .set_target_width(target_edge as i32)
        .set_maximum_height(target_edge as i32);

    let mut results = Vec::with_capacity(total_pages);

    for idx in 0..total_pages {
        let page = pages
            .get(idx as u16)
            .map_err(|e| ValidatorError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            ValidatorError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push(PageImage { index: idx, image });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_edge_follows_dpi() {
        assert_eq!(target_edge_px(300, 4000), 3300);
        assert_eq!(target_edge_px(150, 4000), 1650);
    }

    #[test]
    fn target_edge_is_capped() {
        assert_eq!(target_edge_px(600, 4000), 4000);
    }
}
