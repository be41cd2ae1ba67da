//! Query generation: the model that turns a lead request into search queries.

pub mod mock;
pub mod repair;
pub mod telex;

use async_trait::async_trait;
use thiserror::Error;

use crate::consts::PLANNER_FAILURE_MESSAGE;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model request timed out")]
    Timeout,

    #[error("model gateway returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model reply has no data.Messages.content")]
    MissingContent,

    #[error("model reply is not a list of queries: {reply}")]
    Unparsable { reply: String },
}

impl PlannerError {
    /// What a caller gets told. Internal detail stays in the logs.
    pub fn public_message(&self) -> &'static str {
        PLANNER_FAILURE_MESSAGE
    }
}

/// Turns free text into an ordered list of search-engine queries.
#[async_trait]
pub trait QueryPlanner: Send + Sync {
    async fn generate_queries(
        &self,
        user_message: &str,
        api_key: Option<&str>,
    ) -> Result<Vec<String>, PlannerError>;
}
