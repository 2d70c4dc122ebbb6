//! Web search tool — organic results for market and pricing research.

use async_trait::async_trait;
use rangaayan_core::error::ToolError;
use rangaayan_core::tool::{Tool, ToolResult};
use serde_json::Value;
use std::sync::Arc;
use crate::search::SearchProvider;

/// Hard cap on results, whatever the model asks for.
pub const MAX_RESULTS: u64 = 10;
const DEFAULT_RESULTS: u64 = 5;

pub struct WebSearchTool {
    search: Arc<dyn SearchProvider>,
    description: String,
}

impl WebSearchTool {
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self {
            search,
            description: "Search the web for market data, trends, and pricing for products in India.".into(),
        }
    }

    /// Override the description sent to the model.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Results to return (max 10)",
                    "default": DEFAULT_RESULTS
                }
            },
            "required": ["query"]
        })
    }

    fn status_message(&self, arguments: &Value) -> String {
        match arguments["query"].as_str() {
            Some(query) => format!("Searching the web for \"{query}\"..."),
            None => "Searching the web...".into(),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::invalid(self.name(), "missing 'query'"))?;
        let num_results = arguments["num_results"]
            .as_f64()
            .map(|n| n.max(0.0) as u64)
            .unwrap_or(DEFAULT_RESULTS)
            .min(MAX_RESULTS) as usize;

        let hits = self.search.search(query, num_results).await;
        ToolResult::json(self.name(), &hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchHit;
    use crate::test_helpers::StaticSearch;
    use serde_json::json;

    fn hits(n: usize) -> Vec<SearchHit> {
        (0..n)
            .map(|i| SearchHit {
                title: format!("Result {i}"),
                url: format!("https://example.in/{i}"),
                snippet: String::new(),
            })
            .collect()
    }

    #[tokio::test]
    async fn search_returns_results() {
        let tool = WebSearchTool::new(Arc::new(StaticSearch::new().with_hits(hits(3))));
        let result = tool.execute(json!({"query": "kantha quilt", "num_results": 5})).await.unwrap();

        let data: Vec<SearchHit> = serde_json::from_str(&result.into_content()).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0].title, "Result 0");
    }

    #[tokio::test]
    async fn results_are_capped_at_ten() {
        let tool = WebSearchTool::new(Arc::new(StaticSearch::new().with_hits(hits(20))));
        let result = tool.execute(json!({"query": "q", "num_results": 50})).await.unwrap();

        let data: Vec<Value> = serde_json::from_str(&result.into_content()).unwrap();
        assert_eq!(data.len(), 10);
    }

    #[tokio::test]
    async fn default_is_five_results() {
        let tool = WebSearchTool::new(Arc::new(StaticSearch::new().with_hits(hits(8))));
        let result = tool.execute(json!({"query": "q"})).await.unwrap();

        let data: Vec<Value> = serde_json::from_str(&result.into_content()).unwrap();
        assert_eq!(data.len(), 5);
    }

    #[tokio::test]
    async fn missing_query_returns_error() {
        let tool = WebSearchTool::new(Arc::new(StaticSearch::new()));
        assert!(tool.execute(json!({})).await.is_err());
    }

    #[test]
    fn status_names_the_query() {
        let tool = WebSearchTool::new(Arc::new(StaticSearch::new()));
        assert_eq!(
            tool.status_message(&json!({"query": "bamboo lamp price"})),
            "Searching the web for \"bamboo lamp price\"..."
        );
    }

    #[test]
    fn tool_definition() {
        let tool = WebSearchTool::new(Arc::new(StaticSearch::new())).with_description("Pricing research");
        let def = tool.to_definition();
        assert_eq!(def.name, "web_search");
        assert_eq!(def.description, "Pricing research");
        assert_eq!(def.parameters["properties"]["num_results"]["default"], 5);
    }
}
