use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::Settings;
use crate::consts::{AGENT_API_KEY_HEADER, MODEL_HEADER, PLANNER_TIMEOUT};
use crate::prompts::search_queries::build_search_query_prompt;

use super::repair::{queries_from_value, repair_json};
use super::{PlannerError, QueryPlanner};

/// A planner backed by the Telex model gateway.
pub struct TelexPlanner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl TelexPlanner {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            timeout: PLANNER_TIMEOUT,
        }
    }

    pub fn from_settings(client: reqwest::Client, settings: &Settings) -> Self {
        Self::new(client, &settings.ai_url, &settings.ai_model)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_messages(user_message: &str) -> Vec<ApiMessage> {
        vec![ApiMessage {
            role: "system".to_string(),
            content: build_search_query_prompt(user_message),
        }]
    }

    /// The reply text lives at `data.Messages.content`.
    fn extract_reply(body: &Value) -> Result<&str, PlannerError> {
        body.pointer("/data/Messages/content")
            .and_then(Value::as_str)
            .ok_or(PlannerError::MissingContent)
    }

    fn parse_reply(reply: &str) -> Result<Vec<String>, PlannerError> {
        repair_json(reply)
            .and_then(queries_from_value)
            .ok_or_else(|| PlannerError::Unparsable {
                reply: reply.to_string(),
            })
    }

    async fn request(&self, user_message: &str, api_key: Option<&str>) -> Result<Vec<String>, PlannerError> {
        let messages = Self::build_messages(user_message);
        let body = ApiRequest {
            model: &self.model,
            messages: &messages,
            stream: false,
        };

        let mut req = self
            .client
            .post(&self.endpoint)
            .header(MODEL_HEADER, &self.model)
            .timeout(self.timeout);
        if let Some(key) = api_key {
            req = req.header(AGENT_API_KEY_HEADER, key);
        }

        let resp = req.json(&body).send().await.map_err(classify)?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PlannerError::Status { status, body });
        }

        let payload: Value = resp.json().await.map_err(classify)?;
        let reply = Self::extract_reply(&payload)?;
        debug!(reply, "model reply");

        let queries = Self::parse_reply(reply)?;
        info!(count = queries.len(), "generated search queries");
        Ok(queries)
    }
}

fn classify(e: reqwest::Error) -> PlannerError {
    if e.is_timeout() {
        PlannerError::Timeout
    } else {
        PlannerError::Request(e)
    }
}

#[async_trait]
impl QueryPlanner for TelexPlanner {
    async fn generate_queries(
        &self,
        user_message: &str,
        api_key: Option<&str>,
    ) -> Result<Vec<String>, PlannerError> {
        self.request(user_message, api_key).await.inspect_err(|e| {
            error!(error = %e, model = %self.model, "query generation failed");
        })
    }
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [ApiMessage],
    stream: bool,
}

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}
