//! `POST /`: accept a task and acknowledge it before any work happens.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use tracing::info;
use uuid::Uuid;

use crate::executor::Job;
use crate::protocol::{JsonRpcResponse, SendTaskRequest, Task};

use super::AppState;
use super::error::ApiError;

/// Fresh task id: a v4 UUID as 32 hex digits.
pub fn new_task_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Check a decoded submission and turn it into a job for `task_id`.
///
/// `default_api_key` stands in when the caller sends no credentials.
pub fn validate(
    request: &SendTaskRequest,
    default_api_key: Option<&str>,
    task_id: String,
) -> Result<Job, ApiError> {
    let message = &request.params.message;
    let first = message
        .parts
        .first()
        .ok_or_else(|| ApiError::Validation("Message cannot be empty.".to_string()))?;
    let text = first
        .text
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Message text cannot be empty.".to_string()))?;

    let webhook_url = request
        .push_config()
        .and_then(|c| c.url.as_deref())
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::Validation("Push notification URL is required.".to_string()))?;

    let api_key = request.credentials().or(default_api_key).map(str::to_string);

    Ok(Job {
        request_id: request.id.clone(),
        task_id,
        text: text.to_string(),
        webhook_url: webhook_url.to_string(),
        api_key,
        user_id: message.user_id(),
        org_id: message.org_id(),
    })
}

pub async fn submit_task(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<JsonRpcResponse>, ApiError> {
    let value: serde_json::Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::MalformedJson(e.to_string()))?;
    let request: SendTaskRequest =
        serde_json::from_value(value).map_err(|e| ApiError::Validation(e.to_string()))?;

    let job = validate(&request, state.default_api_key.as_deref(), new_task_id())?;
    let task = Task::submitted(&job.task_id);

    info!(
        task_id = %job.task_id,
        request_id = ?job.request_id,
        user_id = job.user_id.as_deref().unwrap_or(""),
        org_id = job.org_id.as_deref().unwrap_or(""),
        "task submitted"
    );
    state.queue.submit(job)?;

    Ok(Json(JsonRpcResponse::success(request.id, task)))
}
