//! HTTP API for the validation agent.
//!
//! Two routes, matching the upstream service contract exactly:
//!
//! - `GET /health` → `{"status": "ok"}`, no external dependencies
//! - `POST /agents/bbpou-participation/validate` with body
//!   `{"document_path": "..."}` → the extracted record as JSON, or
//!   `{"detail": "..."}` with 400 (bad input) / 500 (pipeline failure)
//!
//! The router carries one piece of shared state: the immutable
//! [`ValidationConfig`] built at startup. Requests run the pipeline
//! independently; there is no cross-request mutable state.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::ValidationConfig;
use crate::error::ValidatorError;
use crate::pipeline::input::has_pdf_extension;
use crate::schema::BbpouParticipation;
use crate::validate::validate_document;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ValidationConfig>,
}

/// Build the axum router with both routes and CORS enabled.
pub fn router(config: Arc<ValidationConfig>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/agents/bbpou-participation/validate",
            post(handle_validate),
        )
        .layer(cors)
        .with_state(AppState { config })
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Handler: GET /health
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Validation request body.
#[derive(Deserialize)]
pub struct ValidateRequest {
    /// Absolute or relative path to the BBPOU participation PDF document.
    pub document_path: String,
}

/// Error response body: `{"detail": "..."}`.
#[derive(Serialize)]
struct ErrorDetail {
    detail: String,
}

/// API error with the HTTP status it maps to.
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorDetail { detail: self.detail })).into_response()
    }
}

impl From<ValidatorError> for ApiError {
    fn from(err: ValidatorError) -> Self {
        let status = if err.is_input_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let detail = match status {
            StatusCode::BAD_REQUEST => err.to_string(),
            _ => format!("Validation failed: {err}"),
        };
        Self { status, detail }
    }
}

/// Handler: POST /agents/bbpou-participation/validate
///
/// The cheap path checks run here, before the pipeline, so a bad request is
/// answered without touching pdfium or the provider.
async fn handle_validate(
    State(state): State<AppState>,
    Json(payload): Json<ValidateRequest>,
) -> Result<Json<BbpouParticipation>, ApiError> {
    let path = std::path::Path::new(&payload.document_path);
    if !path.exists() {
        return Err(ApiError::bad_request(format!(
            "Document not found at path: {}",
            payload.document_path
        )));
    }
    if !has_pdf_extension(path) {
        return Err(ApiError::bad_request(
            "Only PDF files are supported for this endpoint.",
        ));
    }

    info!("Validation request for {}", payload.document_path);

    let record = validate_document(&payload.document_path, &state.config)
        .await
        .map_err(|e| {
            error!("Validation failed for {}: {}", payload.document_path, e);
            ApiError::from(e)
        })?;

    Ok(Json(record))
}
