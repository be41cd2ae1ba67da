use std::sync::Mutex;

use async_trait::async_trait;

use super::{PlannerError, QueryPlanner};

/// A scripted planner for tests. Returns the same queries on every call, or
/// fails with an unparsable-reply error when built with [`MockPlanner::failing`].
pub struct MockPlanner {
    queries: Option<Vec<String>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl MockPlanner {
    pub fn new(queries: &[&str]) -> Self {
        Self {
            queries: Some(queries.iter().map(|q| q.to_string()).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            queries: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(user_message, api_key)` for each call, in order.
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryPlanner for MockPlanner {
    async fn generate_queries(
        &self,
        user_message: &str,
        api_key: Option<&str>,
    ) -> Result<Vec<String>, PlannerError> {
        self.calls
            .lock()
            .unwrap()
            .push((user_message.to_string(), api_key.map(str::to_string)));
        self.queries.clone().ok_or_else(|| PlannerError::Unparsable {
            reply: "scripted failure".to_string(),
        })
    }
}
