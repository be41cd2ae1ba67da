pub mod google;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A titled link returned for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search request timed out")]
    Timeout,

    #[error("search provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered but the reply carried no `items`.
    #[error("no results{}", .reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
    NoItems { reason: Option<String> },

    #[error("search provider error: {0}")]
    Provider(String),
}

/// Something that can turn a query string into web results.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError>;
}
