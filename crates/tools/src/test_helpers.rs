//! In-memory `SearchProvider` for tests across the workspace.

use crate::search::{SearchError, SearchHit, SearchProvider};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Returns canned hits, pages and suggestions, and records every query.
#[derive(Clone, Default)]
pub struct StaticSearch {
    hits: Vec<SearchHit>,
    pages: HashMap<String, String>,
    suggestions: Vec<String>,
    fail_suggestions: bool,
    queries: Arc<Mutex<Vec<String>>>,
}

impl StaticSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(mut self, hits: Vec<SearchHit>) -> Self {
        self.hits = hits;
        self
    }

    pub fn with_page(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.pages.insert(url.into(), text.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn failing_suggestions(mut self) -> Self {
        self.fail_suggestions = true;
        self
    }

    /// Queries received by `search`, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchHit> {
        self.queries.lock().unwrap().push(query.to_string());
        self.hits.iter().take(num_results).cloned().collect()
    }

    async fn fetch_page(&self, url: &str, max_chars: usize) -> Result<String, SearchError> {
        self.pages
            .get(url)
            .map(|text| text.chars().take(max_chars).collect())
            .ok_or_else(|| SearchError::InvalidResponse(format!("404 Not Found for url ({url})")))
    }

    async fn suggestions(&self, _query: &str) -> Result<Vec<String>, SearchError> {
        if self.fail_suggestions {
            return Err(SearchError::InvalidResponse("suggest endpoint unavailable".into()));
        }
        Ok(self.suggestions.clone())
    }
}
