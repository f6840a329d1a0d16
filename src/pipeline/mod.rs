//! Pipeline stages for letter validation.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different rendering backend) without touching
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ request ──▶ extract
//! (path)   (pdfium)   (base64)   (messages)   (VLM + schema)
//! ```
//!
//! 1. [`input`]   — validate the document path, suffix, and PDF magic bytes
//! 2. [`render`]  — rasterise every page; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`encode`]  — JPEG-encode and base64-wrap each page for the multimodal
//!    request body
//! 4. [`request`] — assemble the policy, instruction, and image parts in the
//!    fixed order the model expects
//! 5. [`extract`] — drive the VLM call and coerce the response to the schema
//!    contract; the only stage with network I/O

pub mod encode;
pub mod extract;
pub mod input;
pub mod render;
pub mod request;
