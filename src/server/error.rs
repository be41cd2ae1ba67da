//! HTTP error mapping for the task endpoints.
//!
//! Handlers return `Result<T, ApiError>`; each variant picks the status code
//! and body shape callers of this agent expect.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::protocol::{JsonRpcError, JsonRpcResponse};
use crate::queue::QueueError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The body is not JSON at all.
    #[error("malformed JSON body: {0}")]
    MalformedJson(String),

    /// The body is JSON but a required field is missing or empty.
    #[error("{0}")]
    Validation(String),

    /// The job could not be queued.
    #[error(transparent)]
    Unavailable(#[from] QueueError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MalformedJson(detail) => {
                warn!(%detail, "rejected malformed body");
                let envelope = JsonRpcResponse::error(None, JsonRpcError::parse_error(detail));
                (StatusCode::BAD_REQUEST, Json(envelope)).into_response()
            }
            ApiError::Validation(detail) => {
                warn!(%detail, "rejected invalid submission");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "detail": detail })),
                )
                    .into_response()
            }
            ApiError::Unavailable(e) => {
                warn!(error = %e, "task queue unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
