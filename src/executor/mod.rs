//! The background half of a task: plan, search, aggregate, notify.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::consts::DEFAULT_SEARCH_PAUSE;
use crate::digest::LeadDigest;
use crate::planner::{PlannerError, QueryPlanner};
use crate::protocol::{JsonRpcResponse, RequestId, Task, TaskState};
use crate::search::SearchProvider;
use crate::webhook::Notifier;

/// Everything the executor needs about one accepted submission.
#[derive(Debug, Clone)]
pub struct Job {
    pub request_id: Option<RequestId>,
    pub task_id: String,
    pub text: String,
    pub webhook_url: String,
    pub api_key: Option<String>,
    pub user_id: Option<String>,
    pub org_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Planner(#[from] PlannerError),
}

impl ExecutorError {
    /// Text placed on the failed task sent to the caller.
    pub fn public_message(&self) -> &str {
        match self {
            Self::Planner(e) => e.public_message(),
        }
    }
}

/// How a job ended.
#[derive(Debug, Clone)]
pub struct JobReport {
    /// The task that was (or should have been) delivered.
    pub task: Task,
    pub delivered: bool,
}

impl JobReport {
    pub fn state(&self) -> TaskState {
        self.task.status.state
    }
}

/// Runs jobs end to end. Holds no per-job state, so one instance serves
/// every worker.
pub struct TaskExecutor {
    planner: Arc<dyn QueryPlanner>,
    search: Arc<dyn SearchProvider>,
    notifier: Arc<dyn Notifier>,
    search_pause: Duration,
}

impl TaskExecutor {
    pub fn new(
        planner: Arc<dyn QueryPlanner>,
        search: Arc<dyn SearchProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            planner,
            search,
            notifier,
            search_pause: DEFAULT_SEARCH_PAUSE,
        }
    }

    pub fn with_search_pause(mut self, pause: Duration) -> Self {
        self.search_pause = pause;
        self
    }

    /// Generate queries, then run them one after another. A failed or empty
    /// search is skipped; only query generation can fail the job.
    pub async fn collect_leads(&self, job: &Job) -> Result<LeadDigest, ExecutorError> {
        let queries = self
            .planner
            .generate_queries(&job.text, job.api_key.as_deref())
            .await?;
        info!(count = queries.len(), "running search queries");

        let mut digest = LeadDigest::new();
        for query in &queries {
            match self.search.search(query).await {
                Ok(hits) => {
                    digest.extend(hits);
                    if !self.search_pause.is_zero() {
                        tokio::time::sleep(self.search_pause).await;
                    }
                }
                Err(e) => warn!(query = %query, error = %e, "search skipped"),
            }
        }

        info!(leads = digest.len(), "search finished");
        Ok(digest)
    }

    /// Produce the completed task for `job` without delivering it.
    pub async fn execute(&self, job: &Job) -> Result<Task, ExecutorError> {
        let digest = self.collect_leads(job).await?;
        Ok(Task::completed(&job.task_id, digest.render()))
    }

    /// Execute `job` and deliver the outcome. A failure still produces a
    /// delivery, carrying a failed task.
    pub async fn run(&self, job: Job) -> JobReport {
        let task = match self.execute(&job).await {
            Ok(task) => task,
            Err(e) => {
                error!(error = %e, "job failed");
                Task::failed(&job.task_id, e.public_message())
            }
        };

        let envelope = JsonRpcResponse::success(job.request_id.clone(), task.clone());
        let delivered = match self
            .notifier
            .deliver(&job.webhook_url, job.api_key.as_deref(), &envelope)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, url = %job.webhook_url, "webhook delivery failed");
                false
            }
        };

        JobReport { task, delivered }
    }
}
