//! Page fetch tool — readable text of a web page.

use async_trait::async_trait;
use rangaayan_core::error::ToolError;
use rangaayan_core::tool::{Tool, ToolResult};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;
use crate::search::SearchProvider;

pub const DEFAULT_MAX_CHARS: usize = 3000;

pub struct FetchPageTool {
    search: Arc<dyn SearchProvider>,
    max_chars: usize,
}

impl FetchPageTool {
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self {
            search,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }
}

#[async_trait]
impl Tool for FetchPageTool {
    fn name(&self) -> &str {
        "fetch_page"
    }

    fn description(&self) -> &str {
        "Read a webpage for detailed pricing or market data."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "URL to fetch"
                }
            },
            "required": ["url"]
        })
    }

    fn status_message(&self, arguments: &Value) -> String {
        match arguments["url"].as_str() {
            Some(url) => format!("Reading {url}..."),
            None => "Reading a web page...".into(),
        }
    }

    /// Fetch failures are reported to the model as text rather than an error,
    /// so it can pick another source.
    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let url = arguments["url"]
            .as_str()
            .ok_or_else(|| ToolError::invalid(self.name(), "missing 'url'"))?;

        match self.search.fetch_page(url, self.max_chars).await {
            Ok(text) => Ok(ToolResult::Text(text)),
            Err(e) => {
                warn!(url, error = %e, "Page fetch failed");
                Ok(ToolResult::Text(format!("Failed to fetch: {e}")))
            }
        }
    }
}
