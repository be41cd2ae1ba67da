use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{SearchError, SearchHit, SearchProvider};

/// A scripted search provider for tests. Answers by exact query string and
/// records every query it sees.
#[derive(Default)]
pub struct MockSearch {
    replies: HashMap<String, Result<Vec<SearchHit>, String>>,
    seen: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `(title, link)` pairs.
    pub fn with_hits(mut self, query: &str, hits: &[(&str, &str)]) -> Self {
        let hits = hits
            .iter()
            .map(|(title, link)| SearchHit {
                title: title.to_string(),
                link: link.to_string(),
            })
            .collect();
        self.replies.insert(query.to_string(), Ok(hits));
        self
    }

    /// Fail `query` with a provider error.
    pub fn with_failure(mut self, query: &str, reason: &str) -> Self {
        self.replies
            .insert(query.to_string(), Err(reason.to_string()));
        self
    }

    /// Queries received so far, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        self.seen.lock().unwrap().push(query.to_string());
        match self.replies.get(query) {
            Some(Ok(hits)) => Ok(hits.clone()),
            Some(Err(reason)) => Err(SearchError::Provider(reason.clone())),
            None => Err(SearchError::NoItems { reason: None }),
        }
    }
}
