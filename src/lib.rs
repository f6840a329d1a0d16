//! # bbpou-validator
//!
//! Validate BBPOU participation letters with Vision Language Models (VLMs).
//!
//! A BBPOU (Bharat Bill Payment Operating Unit) participation letter is a
//! short PDF stating a company's participation in the bill-payment system:
//! entity details, participation type, a company seal, and an authorized
//! signatory. This crate renders the letter's pages to images, sends them to
//! a vision-capable model with a fixed extraction policy, and validates the
//! model's answer against a strict schema contract — the model does the
//! reading, the crate does the plumbing and never trusts the output shape.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate path, ".pdf" suffix, %PDF magic
//!  ├─ 2. Render   rasterise every page via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Encode   JPEG → base64 ImageData, page order preserved
//!  ├─ 4. Request  extraction policy + task instruction + page images
//!  ├─ 5. Extract  VLM call at temperature 0, schema-validated response
//!  └─ 6. Output   BbpouParticipation record (CLI JSON / HTTP body)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bbpou_validator::{validate_document, ValidationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / …
//!     let config = ValidationConfig::default();
//!     let record = validate_document("letter.pdf", &config).await?;
//!     println!("{}", serde_json::to_string_pretty(&record)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `bbpou-validate` binary (clap + anyhow + tracing-subscriber) |
//! | `server` | on      | Enables the `bbpou-server` binary and the [`server`] module (axum) |
//!
//! Disable both when using only the library:
//! ```toml
//! bbpou-validator = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod schema;
#[cfg(feature = "server")]
pub mod server;
pub mod validate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ValidationConfig, ValidationConfigBuilder, DEFAULT_DPI, DEFAULT_MODEL};
pub use error::ValidatorError;
pub use schema::{
    AuthorizationDate, BbpouParticipation, BbpouType, EntityType, ValidationMode, YesNo,
    DATE_NOT_MENTIONED,
};
pub use validate::{validate_bytes, validate_document, validate_sync};
