//! Aggregation of search hits into the text handed back to the caller.

use indexmap::IndexMap;

use crate::search::SearchHit;

/// Leads collected for one task, keyed by title.
///
/// Insertion order is preserved. Inserting a title that is already present
/// replaces its URL and keeps its original position (last write wins).
#[derive(Debug, Clone, Default)]
pub struct LeadDigest {
    leads: IndexMap<String, String>,
}

impl LeadDigest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the URL that was replaced, if the title was already known.
    pub fn insert(&mut self, title: impl Into<String>, url: impl Into<String>) -> Option<String> {
        self.leads.insert(title.into(), url.into())
    }

    pub fn extend<I>(&mut self, hits: I)
    where
        I: IntoIterator<Item = SearchHit>,
    {
        for hit in hits {
            self.insert(hit.title, hit.link);
        }
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.leads.get(title).map(String::as_str)
    }

    /// Numbered markdown links, one per line, starting at 1.
    pub fn render(&self) -> String {
        self.leads
            .iter()
            .enumerate()
            .map(|(i, (title, url))| format!("{}. [{}]({})", i + 1, title, url))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
