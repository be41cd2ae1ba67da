use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Settings;
use crate::consts::{SEARCH_RESULTS_PER_QUERY, SEARCH_TIMEOUT};

use super::{SearchError, SearchHit, SearchProvider};

/// Google Custom Search JSON API client.
pub struct GoogleSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
    timeout: Duration,
}

impl GoogleSearch {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            timeout: SEARCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_settings(client: reqwest::Client, settings: &Settings) -> Self {
        Self::new(
            client,
            &settings.search_url,
            &settings.google_api_key,
            &settings.search_engine_id,
        )
    }

    /// Items missing a title or link are dropped.
    fn parse_response(body: &str) -> Result<Vec<SearchHit>, SearchError> {
        let page: SearchPage = serde_json::from_str(body)
            .map_err(|e| SearchError::Provider(format!("unreadable reply: {e}")))?;

        let Some(items) = page.items else {
            return Err(SearchError::NoItems {
                reason: page.error.map(|e| e.message),
            });
        };

        Ok(items
            .into_iter()
            .filter_map(|item| {
                Some(SearchHit {
                    title: item.title?,
                    link: item.link?,
                })
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        debug!(query, "searching");

        let num = SEARCH_RESULTS_PER_QUERY.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        let body = resp.text().await.map_err(classify)?;

        match Self::parse_response(&body) {
            Ok(hits) => {
                info!(query, count = hits.len(), "search complete");
                Ok(hits)
            }
            Err(SearchError::Provider(_)) if !status.is_success() => Err(SearchError::Status {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(e),
        }
    }
}

fn classify(e: reqwest::Error) -> SearchError {
    if e.is_timeout() {
        SearchError::Timeout
    } else {
        SearchError::Request(e)
    }
}

// --- API types ---

#[derive(Deserialize)]
struct SearchPage {
    items: Option<Vec<SearchItem>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct SearchItem {
    title: Option<String>,
    link: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}
