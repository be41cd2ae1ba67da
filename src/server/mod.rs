//! HTTP surface.
//!
//! [`build`] assembles the router:
//! - `GET /` landing page
//! - `POST /` task intake
//! - `GET /.well-known/agent.json` capability descriptor
//! - `GET /health` heartbeat

pub mod agent_card;
pub mod error;
pub mod intake;
pub mod trace;

use std::sync::Arc;

use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde_json::{Value, json};

use crate::consts::VERSION;
use crate::queue::TaskQueue;

/// Shared by every handler.
pub struct AppState {
    pub queue: TaskQueue,
    /// Used when a submission carries no credentials of its own.
    pub default_api_key: Option<String>,
}

pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(landing).post(intake::submit_task))
        .route("/.well-known/agent.json", get(agent_card::agent_card))
        .route("/health", get(health))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

pub async fn landing() -> Html<&'static str> {
    Html(r#"<p style="font-size:30px">Prospect research agent</p>"#)
}

/// `{"status": "ok", "version": "..."}`.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": VERSION,
    }))
}
