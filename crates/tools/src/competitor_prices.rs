//! Competitor price tool — marketplace listings and demand signals.

use async_trait::async_trait;
use rangaayan_core::error::ToolError;
use rangaayan_core::tool::{Tool, ToolResult};
use serde_json::Value;
use crate::marketplace::CompetitorAnalyzer;

pub struct CompetitorPricesTool {
    analyzer: CompetitorAnalyzer,
}

impl CompetitorPricesTool {
    pub fn new(analyzer: CompetitorAnalyzer) -> Self {
        Self { analyzer }
    }
}

#[async_trait]
impl Tool for CompetitorPricesTool {
    fn name(&self) -> &str {
        "get_competitor_prices"
    }

    fn description(&self) -> &str {
        "Get competitor listings and prices from Indian marketplaces (Amazon.in, Flipkart, IndiaMART, Meesho)."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "product_name": {
                    "type": "string",
                    "description": "Product to search"
                }
            },
            "required": ["product_name"]
        })
    }

    fn status_message(&self, arguments: &Value) -> String {
        match arguments["product_name"].as_str() {
            Some(product) => format!("Checking competitor prices for {product}..."),
            None => "Checking competitor prices...".into(),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let product = arguments["product_name"]
            .as_str()
            .ok_or_else(|| ToolError::invalid(self.name(), "missing 'product_name'"))?;

        let report = self.analyzer.competitor_data(product).await;
        ToolResult::json(self.name(), &report)
    }
}
